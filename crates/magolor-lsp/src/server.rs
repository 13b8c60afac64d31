//! The language server: lifecycle, dispatch, and request handlers.
//!
//! The server is single-threaded and cooperative: one message is read,
//! handled to completion, and answered before the next is read. Analysis is
//! synchronous and reuses the compiler front-end unchanged.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use lsp_types::{
    CompletionOptions, Diagnostic as LspDiagnostic, DiagnosticSeverity, DidChangeTextDocumentParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DidSaveTextDocumentParams,
    DocumentFormattingParams, DocumentSymbolParams, Hover, HoverContents, HoverProviderCapability,
    Location, MarkupContent, MarkupKind, NumberOrString, OneOf, Position, Range, RenameParams,
    SaveOptions, ServerCapabilities, SymbolInformation, TextDocumentPositionParams,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions, TextEdit, Url, WorkspaceEdit,
};
use serde_json::{json, Value};

use magolor_common::diagnostics::{Diagnostic, DiagnosticSink, Severity};
use magolor_common::span::LineIndex;
use magolor_parser::parse_source;
use magolor_resolve::{resolver, Module, ModuleRegistry};
use magolor_typeck::check_registered;

use crate::completion::provide_completions;
use crate::documents::DocumentStore;
use crate::semantic::{SemanticIndex, Symbol, SymbolKind};
use crate::transport::{Message, Transport};

/// Server lifecycle. `initialize` requires `Starting`; `textDocument/*`
/// requires `Initialized`; `exit` ends the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Starting,
    Initialized,
    ShuttingDown,
    Exited,
}

/// The Magolor language server.
pub struct Server {
    state: Lifecycle,
    documents: DocumentStore,
    index: SemanticIndex,
}

impl Server {
    pub fn new() -> Self {
        Self {
            state: Lifecycle::Starting,
            documents: DocumentStore::new(),
            index: SemanticIndex::new(),
        }
    }

    /// Run the blocking message loop until `exit` or EOF.
    pub fn run<R: BufRead, W: Write>(&mut self, mut transport: Transport<R, W>) -> io::Result<()> {
        while self.state != Lifecycle::Exited {
            let Some(value) = transport.read_message()? else {
                break; // EOF terminates the loop
            };
            let Some(message) = Message::from_value(&value) else {
                continue;
            };
            self.dispatch(message, &mut transport)?;
        }
        Ok(())
    }

    fn dispatch<R: BufRead, W: Write>(
        &mut self,
        message: Message,
        transport: &mut Transport<R, W>,
    ) -> io::Result<()> {
        let Some(method) = message.method.clone() else {
            return Ok(()); // responses from the client are ignored
        };

        match method.as_str() {
            "initialize" => {
                let Some(id) = message.id else { return Ok(()) };
                if self.state != Lifecycle::Starting {
                    return transport.respond_error(id, -32600, "server is already initialized");
                }
                transport.respond(id, self.initialize_result())
            }
            "initialized" => {
                self.state = Lifecycle::Initialized;
                Ok(())
            }
            "shutdown" => {
                self.state = Lifecycle::ShuttingDown;
                match message.id {
                    Some(id) => transport.respond(id, Value::Null),
                    None => Ok(()),
                }
            }
            "exit" => {
                self.state = Lifecycle::Exited;
                Ok(())
            }
            _ if method.starts_with("textDocument/") => {
                if self.state != Lifecycle::Initialized {
                    if let Some(id) = message.id {
                        return transport.respond_error(id, -32002, "server not initialized");
                    }
                    return Ok(());
                }
                self.dispatch_text_document(&method, message, transport)
            }
            _ => {
                // Unknown requests get a MethodNotFound error; unknown
                // notifications are dropped.
                match message.id {
                    Some(id) => transport.respond_error(id, -32601, "Method not found"),
                    None => Ok(()),
                }
            }
        }
    }

    fn dispatch_text_document<R: BufRead, W: Write>(
        &mut self,
        method: &str,
        message: Message,
        transport: &mut Transport<R, W>,
    ) -> io::Result<()> {
        match method {
            "textDocument/didOpen" => {
                if let Ok(params) =
                    serde_json::from_value::<DidOpenTextDocumentParams>(message.params)
                {
                    let doc = params.text_document;
                    let uri = doc.uri.to_string();
                    self.open_document(&uri, &doc.language_id, doc.version, doc.text);
                    self.publish_diagnostics(&uri, transport)?;
                }
                Ok(())
            }
            "textDocument/didChange" => {
                if let Ok(params) =
                    serde_json::from_value::<DidChangeTextDocumentParams>(message.params)
                {
                    let uri = params.text_document.uri.to_string();
                    // Full sync: the last change carries the whole document.
                    if let Some(change) = params.content_changes.into_iter().last() {
                        self.change_document(&uri, params.text_document.version, change.text);
                        self.publish_diagnostics(&uri, transport)?;
                    }
                }
                Ok(())
            }
            "textDocument/didSave" => {
                if let Ok(params) =
                    serde_json::from_value::<DidSaveTextDocumentParams>(message.params)
                {
                    let uri = params.text_document.uri.to_string();
                    if let Some(content) =
                        self.documents.get(&uri).map(|d| d.content.clone())
                    {
                        self.index.analyze(&uri, &content);
                        self.publish_diagnostics(&uri, transport)?;
                    }
                }
                Ok(())
            }
            "textDocument/didClose" => {
                if let Ok(params) =
                    serde_json::from_value::<DidCloseTextDocumentParams>(message.params)
                {
                    let uri = params.text_document.uri.to_string();
                    self.documents.close(&uri);
                    self.index.remove(&uri);
                    // Clear stale markers.
                    transport.notify(
                        "textDocument/publishDiagnostics",
                        json!({ "uri": uri, "diagnostics": [] }),
                    )?;
                }
                Ok(())
            }
            "textDocument/completion" => {
                let Some(id) = message.id else { return Ok(()) };
                let result = serde_json::from_value(message.params)
                    .ok()
                    .map(|params| self.handle_completion(params))
                    .unwrap_or_default();
                transport.respond(id, serde_json::to_value(result).unwrap_or(Value::Null))
            }
            "textDocument/hover" => {
                let Some(id) = message.id else { return Ok(()) };
                let result = serde_json::from_value(message.params)
                    .ok()
                    .and_then(|params| self.handle_hover(params));
                transport.respond(id, serde_json::to_value(result).unwrap_or(Value::Null))
            }
            "textDocument/definition" => {
                let Some(id) = message.id else { return Ok(()) };
                let result = serde_json::from_value(message.params)
                    .ok()
                    .and_then(|params| self.handle_definition(params));
                transport.respond(id, serde_json::to_value(result).unwrap_or(Value::Null))
            }
            "textDocument/references" => {
                let Some(id) = message.id else { return Ok(()) };
                let result = serde_json::from_value(message.params)
                    .ok()
                    .map(|params| self.handle_references(params))
                    .unwrap_or_default();
                transport.respond(id, serde_json::to_value(result).unwrap_or(Value::Null))
            }
            "textDocument/documentSymbol" => {
                let Some(id) = message.id else { return Ok(()) };
                let result = serde_json::from_value(message.params)
                    .ok()
                    .map(|params| self.handle_document_symbols(params))
                    .unwrap_or_default();
                transport.respond(id, serde_json::to_value(result).unwrap_or(Value::Null))
            }
            "textDocument/formatting" => {
                let Some(id) = message.id else { return Ok(()) };
                let result = serde_json::from_value(message.params)
                    .ok()
                    .map(|params| self.handle_formatting(params))
                    .unwrap_or_default();
                transport.respond(id, serde_json::to_value(result).unwrap_or(Value::Null))
            }
            "textDocument/rename" => {
                let Some(id) = message.id else { return Ok(()) };
                let result = serde_json::from_value(message.params)
                    .ok()
                    .and_then(|params| self.handle_rename(params));
                transport.respond(id, serde_json::to_value(result).unwrap_or(Value::Null))
            }
            _ => match message.id {
                Some(id) => transport.respond_error(id, -32601, "Method not found"),
                None => Ok(()),
            },
        }
    }

    fn initialize_result(&self) -> Value {
        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                        include_text: Some(true),
                    })),
                    ..Default::default()
                },
            )),
            completion_provider: Some(CompletionOptions {
                trigger_characters: Some(vec![".".to_string(), ":".to_string()]),
                resolve_provider: Some(false),
                ..Default::default()
            }),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            definition_provider: Some(OneOf::Left(true)),
            references_provider: Some(OneOf::Left(true)),
            document_symbol_provider: Some(OneOf::Left(true)),
            document_formatting_provider: Some(OneOf::Left(true)),
            rename_provider: Some(OneOf::Left(true)),
            ..Default::default()
        };
        json!({
            "capabilities": capabilities,
            "serverInfo": { "name": "magolor-lsp", "version": env!("CARGO_PKG_VERSION") }
        })
    }

    // ── Document state ─────────────────────────────────────────────────

    pub(crate) fn open_document(&mut self, uri: &str, language_id: &str, version: i32, text: String) {
        self.documents.open(uri, language_id, version, text);
        if let Some(doc) = self.documents.get(uri) {
            let content = doc.content.clone();
            self.index.analyze(uri, &content);
        }
    }

    pub(crate) fn change_document(&mut self, uri: &str, version: i32, text: String) {
        self.documents.change(uri, version, text);
        if let Some(doc) = self.documents.get(uri) {
            let content = doc.content.clone();
            self.index.analyze(uri, &content);
        }
    }

    // ── Diagnostics ────────────────────────────────────────────────────

    fn publish_diagnostics<R: BufRead, W: Write>(
        &mut self,
        uri: &str,
        transport: &mut Transport<R, W>,
    ) -> io::Result<()> {
        let Some(content) = self.documents.get(uri).map(|d| d.content.clone()) else {
            return Ok(());
        };
        let diagnostics = analyze_document(uri, &content);
        transport.notify(
            "textDocument/publishDiagnostics",
            json!({ "uri": uri, "diagnostics": diagnostics }),
        )
    }

    // ── Request handlers ───────────────────────────────────────────────

    pub(crate) fn handle_completion(
        &self,
        params: lsp_types::CompletionParams,
    ) -> Vec<lsp_types::CompletionItem> {
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = params.text_document_position.position;
        let Some(doc) = self.documents.get(&uri) else {
            return Vec::new();
        };
        let line_text = doc.line_text(position.line).to_string();
        provide_completions(&self.index, &uri, &position, &line_text)
    }

    pub(crate) fn handle_hover(&self, params: lsp_types::HoverParams) -> Option<Hover> {
        let uri = params
            .text_document_position_params
            .text_document
            .uri
            .to_string();
        let position = params.text_document_position_params.position;
        let symbol = self.index.symbol_at(&uri, &position)?;

        let signature = match symbol.kind {
            SymbolKind::Function => format!("fn {}{}", symbol.name, symbol.detail),
            SymbolKind::Method => format!("method {}{}", symbol.name, symbol.detail),
            SymbolKind::Class => format!("class {}", symbol.name),
            SymbolKind::Field | SymbolKind::Variable | SymbolKind::Parameter => {
                if symbol.type_repr.is_empty() {
                    format!("let {}", symbol.name)
                } else {
                    format!("let {}: {}", symbol.name, symbol.type_repr)
                }
            }
            SymbolKind::Module => format!("module {}", symbol.name),
        };

        let mut value = format!("```magolor\n{signature}\n```");
        if !symbol.documentation.is_empty() {
            value.push_str("\n\n");
            value.push_str(&symbol.documentation);
        }

        Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value,
            }),
            range: None,
        })
    }

    pub(crate) fn handle_definition(
        &self,
        params: lsp_types::GotoDefinitionParams,
    ) -> Option<Location> {
        let uri = params
            .text_document_position_params
            .text_document
            .uri
            .to_string();
        let position = params.text_document_position_params.position;
        let symbol = self.index.symbol_at(&uri, &position)?;
        symbol_location(&symbol.definition.uri, symbol.definition.range)
    }

    pub(crate) fn handle_references(&self, params: lsp_types::ReferenceParams) -> Vec<Location> {
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = params.text_document_position.position;
        let Some(symbol) = self.index.symbol_at(&uri, &position) else {
            return Vec::new();
        };
        let mut locations = Vec::new();
        if let Some(location) = symbol_location(&symbol.definition.uri, symbol.definition.range) {
            locations.push(location);
        }
        for reference in &symbol.references {
            if let Some(location) = symbol_location(&reference.uri, reference.range) {
                locations.push(location);
            }
        }
        locations
    }

    #[allow(deprecated)]
    pub(crate) fn handle_document_symbols(
        &self,
        params: DocumentSymbolParams,
    ) -> Vec<SymbolInformation> {
        let uri = params.text_document.uri.to_string();
        self.index
            .all_symbols(&uri)
            .iter()
            .filter_map(|symbol: &Symbol| {
                Some(SymbolInformation {
                    name: symbol.name.clone(),
                    kind: symbol.kind.to_lsp(),
                    tags: None,
                    deprecated: None,
                    location: symbol_location(&symbol.definition.uri, symbol.definition.range)?,
                    container_name: symbol.container.clone(),
                })
            })
            .collect()
    }

    pub(crate) fn handle_formatting(&self, params: DocumentFormattingParams) -> Vec<TextEdit> {
        let uri = params.text_document.uri.to_string();
        let Some(doc) = self.documents.get(&uri) else {
            return Vec::new();
        };
        let formatted = magolor_fmt::format_source(&doc.content);
        if formatted == doc.content {
            return Vec::new();
        }
        let end = doc.offset_to_position(doc.content.len());
        vec![TextEdit {
            range: Range {
                start: Position { line: 0, character: 0 },
                end,
            },
            new_text: formatted,
        }]
    }

    pub(crate) fn handle_rename(&self, params: RenameParams) -> Option<WorkspaceEdit> {
        let TextDocumentPositionParams { text_document, position } = params.text_document_position;
        let uri = text_document.uri.to_string();
        let symbol = self.index.symbol_at(&uri, &position)?;

        let mut changes: HashMap<Url, Vec<TextEdit>> = HashMap::new();
        let mut push = |uri: &str, range: Range| {
            if let Ok(parsed) = Url::parse(uri) {
                changes.entry(parsed).or_default().push(TextEdit {
                    range,
                    new_text: params.new_name.clone(),
                });
            }
        };
        push(&symbol.definition.uri, symbol.definition.range);
        for reference in &symbol.references {
            push(&reference.uri, reference.range);
        }

        Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        })
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

fn symbol_location(uri: &str, range: Range) -> Option<Location> {
    Url::parse(uri).ok().map(|uri| Location { uri, range })
}

/// Run the full pipeline over one document and translate the sink into LSP
/// diagnostics.
pub fn analyze_document(uri: &str, content: &str) -> Vec<LspDiagnostic> {
    let mut sink = DiagnosticSink::new(uri);
    let ast = parse_source(content, &mut sink);

    // Later phases only run on a syntactically sound unit; their
    // diagnostics would be noise otherwise.
    if !sink.has_error() {
        let mut registry = ModuleRegistry::new();
        registry.register(Module::new("current", uri, ast));
        resolver::resolve_imports(&mut registry, "current", &mut sink);
        check_registered(&mut registry, "current", &mut sink);
    }

    let lines = LineIndex::new(content);
    sink.into_sorted()
        .into_iter()
        .map(|diag| to_lsp_diagnostic(&diag, &lines))
        .collect()
}

fn to_lsp_diagnostic(diag: &Diagnostic, lines: &LineIndex) -> LspDiagnostic {
    let (start_line, start_col) = lines.line_col(diag.span.start);
    let (end_line, end_col) = lines.line_col(diag.span.end);
    LspDiagnostic {
        range: Range {
            start: Position { line: start_line - 1, character: start_col - 1 },
            end: Position { line: end_line - 1, character: end_col - 1 },
        },
        severity: Some(match diag.severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
            Severity::Note => DiagnosticSeverity::INFORMATION,
        }),
        code: diag.code.map(|c| NumberOrString::String(c.to_string())),
        source: Some("magolor".to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_document_reports_unresolved_import() {
        // Scenario S2.
        let diagnostics = analyze_document("file:///t.mg", "using X.Y;\nfn main() {}\n");
        assert_eq!(diagnostics.len(), 1);
        let diag = &diagnostics[0];
        assert_eq!(diag.severity, Some(DiagnosticSeverity::ERROR));
        assert!(diag.message.contains("Cannot find module: X.Y"));
        // Range spans `X.Y` on line 0.
        assert_eq!(diag.range.start, Position { line: 0, character: 6 });
        assert_eq!(diag.range.end, Position { line: 0, character: 9 });
    }

    #[test]
    fn analyze_document_clean_source_has_no_diagnostics() {
        let diagnostics = analyze_document(
            "file:///t.mg",
            "using Std.IO;\nfn main() { let name = \"world\"; Std.print($\"Hello, {name}\\n\"); }\n",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn analyze_document_surfaces_type_errors() {
        let diagnostics = analyze_document("file:///t.mg", "fn f() -> int { return \"x\"; }\n");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("return type mismatch"));
        assert_eq!(diagnostics[0].source.as_deref(), Some("magolor"));
    }
}
