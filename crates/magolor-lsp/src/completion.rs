//! The completion engine.
//!
//! Items are drawn from five sources and ranked by sort key so stdlib hits
//! outrank snippets, which outrank keywords:
//!
//! - `0_` stdlib catalog entries (context-aware for `Std.` chains and the
//!   document's builtin imports)
//! - `1_` callable symbols of the file and variables in scope
//! - `2_` snippet templates
//! - `3_` keywords
//!
//! Prefix matching is case-insensitive and positional: the completion word
//! is the identifier characters to the left of the cursor.

use lsp_types::{
    CompletionItem, CompletionItemKind, Documentation, InsertTextFormat, Position,
};

use magolor_stdlib::{catalog, StdSymbolKind};

use crate::semantic::{SemanticIndex, SymbolKind};

/// A static snippet template.
struct Snippet {
    label: &'static str,
    insert_text: &'static str,
    detail: &'static str,
    documentation: &'static str,
}

const SNIPPETS: &[Snippet] = &[
    Snippet {
        label: "fn",
        insert_text: "fn ${1:name}(${2:params}) -> ${3:void} {\n\t${0}\n}",
        detail: "Function declaration",
        documentation: "Create a new function with parameters and return type",
    },
    Snippet {
        label: "fnr",
        insert_text: "fn ${1:name}(${2:params}) -> ${3:int} {\n\treturn ${0:0};\n}",
        detail: "Function with return",
        documentation: "Create a function that returns a value",
    },
    Snippet {
        label: "main",
        insert_text: "fn main() {\n\t${0}\n}",
        detail: "Main function",
        documentation: "Entry point of the program",
    },
    Snippet {
        label: "class",
        insert_text: "class ${1:Name} {\n\tpub ${2:field}: ${3:int};\n\t\n\tpub fn ${4:method}() {\n\t\t${0}\n\t}\n}",
        detail: "Class definition",
        documentation: "Create a class with fields and methods",
    },
    Snippet {
        label: "if",
        insert_text: "if (${1:condition}) {\n\t${0}\n}",
        detail: "If statement",
        documentation: "Conditional execution",
    },
    Snippet {
        label: "ife",
        insert_text: "if (${1:condition}) {\n\t${2}\n} else {\n\t${0}\n}",
        detail: "If-else statement",
        documentation: "Conditional with alternative",
    },
    Snippet {
        label: "while",
        insert_text: "while (${1:condition}) {\n\t${0}\n}",
        detail: "While loop",
        documentation: "Loop while condition is true",
    },
    Snippet {
        label: "for",
        insert_text: "for (${1:item} in ${2:array}) {\n\t${0}\n}",
        detail: "For loop",
        documentation: "Iterate over collection",
    },
    Snippet {
        label: "match",
        insert_text: "match ${1:value} {\n\tSome(${2:v}) => {\n\t\t${3}\n\t},\n\tNone => {\n\t\t${0}\n\t}\n}",
        detail: "Match statement",
        documentation: "Pattern matching for Option values",
    },
    Snippet {
        label: "let",
        insert_text: "let ${1:mut }${2:name} = ${0:value};",
        detail: "Variable declaration",
        documentation: "Declare a variable (optionally mutable)",
    },
    Snippet {
        label: "lett",
        insert_text: "let ${1:mut }${2:name}: ${3:type} = ${0:value};",
        detail: "Variable with type",
        documentation: "Declare a typed variable",
    },
    Snippet {
        label: "using",
        insert_text: "using ${1:Std.IO};",
        detail: "Import statement",
        documentation: "Import a module",
    },
    Snippet {
        label: "cimport",
        insert_text: "cimport <${1:header.h}>${2: as ${3:Name}};",
        detail: "C/C++ import",
        documentation: "Import C/C++ header",
    },
    Snippet {
        label: "cpp",
        insert_text: "@cpp {\n\t${0}\n}",
        detail: "C++ block",
        documentation: "Inline C++ code",
    },
    Snippet {
        label: "pubfn",
        insert_text: "pub fn ${1:name}(${2:params}) -> ${3:void} {\n\t${0}\n}",
        detail: "Public function",
        documentation: "Public function declaration",
    },
    Snippet {
        label: "staticfn",
        insert_text: "pub static fn ${1:name}(${2:params}) -> ${3:void} {\n\t${0}\n}",
        detail: "Static function",
        documentation: "Static function declaration",
    },
    Snippet {
        label: "lambda",
        insert_text: "fn(${1:x}: ${2:int}) -> ${3:int} {\n\treturn ${0:x};\n}",
        detail: "Lambda function",
        documentation: "Anonymous function/closure",
    },
    Snippet {
        label: "ret",
        insert_text: "return ${0:value};",
        detail: "Return statement",
        documentation: "Return from function",
    },
    Snippet {
        label: "new",
        insert_text: "let ${1:var} = new ${2:Class}();",
        detail: "New instance",
        documentation: "Create class instance",
    },
];

const KEYWORDS: &[&str] = &[
    "fn", "let", "mut", "return", "if", "else", "while", "for", "match", "class", "new", "this",
    "true", "false", "None", "Some", "using", "pub", "priv", "static", "cimport", "int", "float",
    "string", "bool", "void",
];

/// Case-insensitive positional prefix match.
fn matches_filter(name: &str, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    if name.len() < filter.len() {
        return false;
    }
    name.bytes()
        .zip(filter.bytes())
        .all(|(n, f)| n.to_ascii_lowercase() == f.to_ascii_lowercase())
}

fn completion_kind(kind: StdSymbolKind) -> CompletionItemKind {
    match kind {
        StdSymbolKind::Function => CompletionItemKind::FUNCTION,
        StdSymbolKind::Constant => CompletionItemKind::CONSTANT,
    }
}

/// Compute completion items for a cursor position.
///
/// `line_text` is the full text of the cursor's line; the word to the left
/// of the cursor filters every source.
pub fn provide_completions(
    index: &SemanticIndex,
    uri: &str,
    position: &Position,
    line_text: &str,
) -> Vec<CompletionItem> {
    let mut items = Vec::new();

    let cursor = (position.character as usize).min(line_text.len());
    let context = &line_text[..cursor];
    let word: String = context
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    add_std_path_completions(&mut items, context);
    add_imported_functions(&mut items, index, uri, &word);
    add_callable_symbols(&mut items, index, uri, &word);
    add_variable_symbols(&mut items, index, uri, position, &word);

    for snippet in SNIPPETS {
        if matches_filter(snippet.label, &word) {
            items.push(CompletionItem {
                label: snippet.label.to_string(),
                kind: Some(CompletionItemKind::SNIPPET),
                detail: Some(snippet.detail.to_string()),
                documentation: Some(Documentation::String(snippet.documentation.to_string())),
                insert_text: Some(snippet.insert_text.to_string()),
                insert_text_format: Some(InsertTextFormat::SNIPPET),
                sort_text: Some(format!("2_{}", snippet.label)),
                ..Default::default()
            });
        }
    }

    for keyword in KEYWORDS {
        if matches_filter(keyword, &word) {
            items.push(CompletionItem {
                label: keyword.to_string(),
                kind: Some(CompletionItemKind::KEYWORD),
                sort_text: Some(format!("3_{keyword}")),
                ..Default::default()
            });
        }
    }

    items
}

/// Completions for `Std.`-rooted dotted chains: module names after `Std.`,
/// symbols after `Std.<Module>.`.
fn add_std_path_completions(items: &mut Vec<CompletionItem>, context: &str) {
    let Some(std_pos) = context.rfind("Std.") else {
        return;
    };
    let after = &context[std_pos + 4..];

    // `Std.` or `Std.Ma` -- complete module names, plus the top-level
    // aliases which live directly on `Std`.
    if !after.contains('.') && !after.contains(':') {
        for module in catalog().modules() {
            if matches_filter(module, after) {
                items.push(CompletionItem {
                    label: module.to_string(),
                    kind: Some(CompletionItemKind::MODULE),
                    detail: Some(format!("Std.{module}")),
                    sort_text: Some(format!("0_{module}")),
                    ..Default::default()
                });
            }
        }
        for symbol in catalog().module_symbols("Std") {
            if matches_filter(symbol.name, after) {
                items.push(CompletionItem {
                    label: symbol.name.to_string(),
                    kind: Some(completion_kind(symbol.kind)),
                    detail: Some(symbol.signature.clone()),
                    documentation: Some(Documentation::String("From Std".to_string())),
                    sort_text: Some(format!("0_{}", symbol.name)),
                    ..Default::default()
                });
            }
        }
        return;
    }

    // `Std.Module.` or `Std.Module.pre` -- complete that module's symbols.
    let (module, prefix) = match after.find(['.', ':']) {
        Some(sep) => (&after[..sep], after[sep..].trim_start_matches(['.', ':'])),
        None => return,
    };
    let path = format!("Std.{module}");
    for symbol in catalog().module_symbols(&path) {
        if matches_filter(symbol.name, prefix) {
            items.push(CompletionItem {
                label: symbol.name.to_string(),
                kind: Some(completion_kind(symbol.kind)),
                detail: Some(symbol.signature.clone()),
                documentation: Some(Documentation::String(format!("From {path}"))),
                sort_text: Some(format!("0_{}", symbol.name)),
                ..Default::default()
            });
        }
    }
}

/// Symbols bound by the document's builtin imports, usable unqualified.
fn add_imported_functions(
    items: &mut Vec<CompletionItem>,
    index: &SemanticIndex,
    uri: &str,
    word: &str,
) {
    for import in index.imported_modules(uri) {
        for symbol in catalog().module_symbols(&import.full_path) {
            if !matches_filter(symbol.name, word) {
                continue;
            }
            items.push(CompletionItem {
                label: symbol.name.to_string(),
                kind: Some(completion_kind(symbol.kind)),
                detail: Some(symbol.signature.clone()),
                documentation: Some(Documentation::String(format!("From {}", import.full_path))),
                sort_text: Some(format!("0_{}", symbol.name)),
                ..Default::default()
            });
        }
    }
}

fn add_callable_symbols(
    items: &mut Vec<CompletionItem>,
    index: &SemanticIndex,
    uri: &str,
    word: &str,
) {
    for symbol in index.callables(uri) {
        if !matches_filter(&symbol.name, word) {
            continue;
        }
        let kind = if symbol.kind == SymbolKind::Method {
            CompletionItemKind::METHOD
        } else {
            CompletionItemKind::FUNCTION
        };
        items.push(CompletionItem {
            label: symbol.name.clone(),
            kind: Some(kind),
            detail: Some(format!("{}{}", symbol.name, symbol.detail)),
            sort_text: Some(format!("1_{}", symbol.name)),
            ..Default::default()
        });
    }
}

fn add_variable_symbols(
    items: &mut Vec<CompletionItem>,
    index: &SemanticIndex,
    uri: &str,
    position: &Position,
    word: &str,
) {
    for symbol in index.variables_in_scope(uri, position) {
        if !matches_filter(&symbol.name, word) {
            continue;
        }
        items.push(CompletionItem {
            label: symbol.name.clone(),
            kind: Some(CompletionItemKind::VARIABLE),
            detail: (!symbol.type_repr.is_empty()).then(|| symbol.type_repr.clone()),
            sort_text: Some(format!("1_{}", symbol.name)),
            ..Default::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed(content: &str) -> SemanticIndex {
        let mut index = SemanticIndex::new();
        index.analyze("file:///t.mg", content);
        index
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn stdlib_import_completion_outranks_snippets() {
        // Scenario S5: `prin` after `using Std.IO;` completes to `print`.
        let index = indexed("using Std.IO;\nfn main(){ prin }\n");
        let items = provide_completions(
            &index,
            "file:///t.mg",
            &Position { line: 1, character: 15 },
            "fn main(){ prin",
        );
        let print = items
            .iter()
            .find(|i| i.label == "print" && i.kind == Some(CompletionItemKind::FUNCTION))
            .expect("print must be offered");
        let print_sort = print.sort_text.as_deref().unwrap();
        for snippet in items.iter().filter(|i| i.kind == Some(CompletionItemKind::SNIPPET)) {
            if snippet.label.starts_with("prin") {
                assert!(print_sort < snippet.sort_text.as_deref().unwrap());
            }
        }
        // Even without such a snippet, stdlib keys rank below snippet keys.
        assert!(print_sort.starts_with("0_"));
    }

    #[test]
    fn word_filters_case_insensitively() {
        let index = indexed("using Std.IO;\nfn main() {}\n");
        let items = provide_completions(
            &index,
            "file:///t.mg",
            &Position { line: 1, character: 4 },
            "PRIN",
        );
        assert!(labels(&items).contains(&"print"));
        assert!(labels(&items).contains(&"println"));
        assert!(!labels(&items).contains(&"readLine"));
    }

    #[test]
    fn std_dot_lists_modules() {
        let index = indexed("fn main() {}\n");
        let items = provide_completions(
            &index,
            "file:///t.mg",
            &Position { line: 0, character: 4 },
            "Std.",
        );
        let names = labels(&items);
        assert!(names.contains(&"IO"));
        assert!(names.contains(&"Math"));
        // Top-level aliases appear directly on Std.
        assert!(names.contains(&"print"));
    }

    #[test]
    fn std_module_dot_lists_its_symbols() {
        let index = indexed("fn main() {}\n");
        let items = provide_completions(
            &index,
            "file:///t.mg",
            &Position { line: 0, character: 9 },
            "Std.Math.",
        );
        let names = labels(&items);
        assert!(names.contains(&"sqrt"));
        assert!(names.contains(&"PI"));
        assert!(!names.contains(&"println"));
        let pi = items.iter().find(|i| i.label == "PI").unwrap();
        assert_eq!(pi.kind, Some(CompletionItemKind::CONSTANT));
    }

    #[test]
    fn file_symbols_and_variables_are_offered() {
        let index = indexed("fn helper() {}\nfn main() { let total = 1; }\n");
        let items = provide_completions(
            &index,
            "file:///t.mg",
            &Position { line: 1, character: 27 },
            "fn main() { let total = 1; ",
        );
        let names = labels(&items);
        assert!(names.contains(&"helper"));
        assert!(names.contains(&"total"));
        let helper = items.iter().find(|i| i.label == "helper").unwrap();
        assert_eq!(helper.sort_text.as_deref(), Some("1_helper"));
    }

    #[test]
    fn keywords_rank_last() {
        let index = indexed("fn main() {}\n");
        let items = provide_completions(
            &index,
            "file:///t.mg",
            &Position { line: 0, character: 0 },
            "",
        );
        let kw = items
            .iter()
            .find(|i| i.kind == Some(CompletionItemKind::KEYWORD))
            .unwrap();
        assert!(kw.sort_text.as_deref().unwrap().starts_with("3_"));
    }

    #[test]
    fn snippets_carry_snippet_format() {
        let index = indexed("fn main() {}\n");
        let items = provide_completions(
            &index,
            "file:///t.mg",
            &Position { line: 0, character: 0 },
            "matc",
        );
        let snippet = items.iter().find(|i| i.label == "match").unwrap();
        assert_eq!(snippet.insert_text_format, Some(InsertTextFormat::SNIPPET));
        assert!(snippet.insert_text.as_deref().unwrap().contains("Some("));
    }
}
