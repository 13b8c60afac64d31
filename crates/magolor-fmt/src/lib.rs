//! Magolor source formatter.
//!
//! Deliberately conservative: the only transformation is re-indentation at
//! four spaces per brace depth. Token text, line breaks, and everything
//! else are left exactly as written, which makes the formatter idempotent
//! by construction.
//!
//! Rules:
//! - a running depth counter tracks `{`/`}` as characters stream by;
//! - the indent emitted for a line is the depth at the *start* of that
//!   line, except that a line whose first non-space character is `}` is
//!   indented one level shallower;
//! - braces inside string literals (including interpolated ones) do not
//!   move the counter;
//! - `//` comments end brace counting for their line.

/// Re-indent an entire source file. Returns the formatted text; the result
/// equals the input when the input is already canonically indented.
pub fn format_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut depth: usize = 0;

    for (i, line) in source.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue; // blank lines carry no indentation
        }

        let mut indent = depth;
        if trimmed.starts_with('}') {
            indent = indent.saturating_sub(1);
        }
        for _ in 0..indent {
            out.push_str("    ");
        }
        out.push_str(trimmed);

        depth = apply_depth(trimmed, depth);
    }

    out
}

/// Advance the depth counter across one line, skipping string contents
/// and line comments.
fn apply_depth(line: &str, mut depth: usize) -> usize {
    let mut chars = line.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        match c {
            '"' => in_string = !in_string,
            '\\' if in_string => {
                chars.next();
            }
            '/' if !in_string && chars.peek() == Some(&'/') => break,
            '{' if !in_string => depth += 1,
            '}' if !in_string => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_code_is_untouched() {
        let src = "using Std.IO;\nfn main() {}\n";
        assert_eq!(format_source(src), src);
    }

    #[test]
    fn bodies_indent_one_level() {
        let src = "fn main() {\nlet x = 1;\n}\n";
        let expected = "fn main() {\n    let x = 1;\n}\n";
        assert_eq!(format_source(src), expected);
    }

    #[test]
    fn nested_blocks_indent_per_depth() {
        let src = "fn f() {\nif (a) {\nb();\n}\n}\n";
        let expected = "fn f() {\n    if (a) {\n        b();\n    }\n}\n";
        assert_eq!(format_source(src), expected);
    }

    #[test]
    fn close_brace_line_dedents() {
        let src = "class C {\npub x: int;\n}\n";
        let formatted = format_source(src);
        assert!(formatted.ends_with("}\n"));
        assert!(formatted.contains("\n    pub x: int;\n"));
    }

    #[test]
    fn line_with_both_braces_keeps_start_depth() {
        // The depth at the start of the line decides the indent.
        let src = "fn f() {\nif (a) { b(); }\nc();\n}\n";
        let expected = "fn f() {\n    if (a) { b(); }\n    c();\n}\n";
        assert_eq!(format_source(src), expected);
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let src = "fn f() {\nlet s = \"{\";\nlet t = $\"{name}\";\ng();\n}\n";
        let expected = "fn f() {\n    let s = \"{\";\n    let t = $\"{name}\";\n    g();\n}\n";
        assert_eq!(format_source(src), expected);
    }

    #[test]
    fn braces_in_comments_are_ignored() {
        let src = "fn f() {\n// a { stray\ng();\n}\n";
        let expected = "fn f() {\n    // a { stray\n    g();\n}\n";
        assert_eq!(format_source(src), expected);
    }

    #[test]
    fn over_indented_input_is_normalized() {
        let src = "fn f() {\n            g();\n}\n";
        let expected = "fn f() {\n    g();\n}\n";
        assert_eq!(format_source(src), expected);
    }

    #[test]
    fn blank_lines_lose_trailing_whitespace() {
        let src = "fn f() {\n    \n}\n";
        assert_eq!(format_source(src), "fn f() {\n\n}\n");
    }

    #[test]
    fn formatting_is_idempotent() {
        let sources = [
            "fn f() {\nif (a) {\nb();\n} else {\nc();\n}\n}\n",
            "class C {\npub x: int;\npub fn m() {\nmatch o {\nSome(v) => {\nuse_it(v);\n}\nNone => {}\n}\n}\n}\n",
            "fn weird() { mixed(); }\n\n\nfn g() {\n}\n",
        ];
        for src in sources {
            let once = format_source(src);
            let twice = format_source(&once);
            assert_eq!(once, twice, "format must be idempotent for {src:?}");
        }
    }

    #[test]
    fn unbalanced_closers_never_underflow() {
        let src = "}\n}\nfn f() {}\n";
        let formatted = format_source(src);
        assert!(formatted.contains("fn f() {}"));
    }
}
