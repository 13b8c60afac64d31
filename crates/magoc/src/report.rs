//! Terminal diagnostic rendering via ariadne.

use std::io::IsTerminal;
use std::ops::Range;

use ariadne::{sources, Color, Config, Label, Report, ReportKind};

use magolor_common::diagnostics::{Diagnostic, Severity};
use magolor_common::source_map::SourceMap;

/// Render one diagnostic against its source text.
pub fn render_diagnostic(diag: &Diagnostic, source: &str, color: bool) -> String {
    let config = Config::default().with_color(color);
    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Note => ReportKind::Advice,
    };
    let label_color = match diag.severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Note => Color::Cyan,
    };

    // Ariadne needs a non-empty span inside the source.
    let clamp = |range: Range<usize>| -> Range<usize> {
        let len = source.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        if start == end {
            start..end.saturating_add(1).min(len)
        } else {
            start..end
        }
    };
    let span = clamp(diag.span.start as usize..diag.span.end as usize);

    let mut builder = Report::build(kind, (diag.file.clone(), span.clone()))
        .with_config(config)
        .with_message(&diag.message)
        .with_label(
            Label::new((diag.file.clone(), span))
                .with_message(&diag.message)
                .with_color(label_color),
        );
    if let Some(code) = diag.code {
        builder = builder.with_code(code);
    }
    for note in &diag.notes {
        builder.add_label(
            Label::new((diag.file.clone(), clamp(note.span.start as usize..note.span.end as usize)))
                .with_message(&note.message)
                .with_color(Color::Cyan),
        );
    }
    if let Some(hint) = &diag.hint {
        builder.set_help(hint);
    }

    let mut buf = Vec::new();
    builder
        .finish()
        .write(sources([(diag.file.clone(), source.to_string())]), &mut buf)
        .expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

/// Pretty-print every diagnostic to stderr, color-coded when attached to a
/// terminal.
pub fn print_diagnostics(diagnostics: &[Diagnostic], sources_map: &SourceMap) {
    let color = std::io::stderr().is_terminal();
    for diag in diagnostics {
        let source = sources_map
            .by_name(&diag.file)
            .map(|f| f.text.as_str())
            .unwrap_or("");
        eprint!("{}", render_diagnostic(diag, source, color));
    }
}
