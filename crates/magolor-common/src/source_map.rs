//! Owned source units with precomputed line offsets.
//!
//! The source map is the compiler's view of everything it has read: each
//! unit keeps its file name, full text, and a [`LineIndex`] so byte offsets
//! can be converted to (line, column) pairs without rescanning.

use rustc_hash::FxHashMap;

use crate::span::{LineIndex, Span};

/// Identifies a source unit within a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

/// A single source unit: file name, text, and line offsets.
#[derive(Debug)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
    line_index: LineIndex,
}

impl SourceFile {
    /// Create a source unit, scanning the text for line starts once.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        Self {
            name: name.into(),
            text,
            line_index,
        }
    }

    /// Convert a byte offset to a 1-based (line, column) pair.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        self.line_index.line_col(offset)
    }

    /// The text covered by a span.
    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.start as usize..span.end as usize]
    }

    /// The full text of a 1-based line, without its trailing newline.
    pub fn line_text(&self, line: u32) -> &str {
        let Some(start) = self.line_index.line_start(line) else {
            return "";
        };
        let rest = &self.text[start as usize..];
        rest.split('\n').next().unwrap_or("").trim_end_matches('\r')
    }

    /// Number of lines in the unit.
    pub fn line_count(&self) -> usize {
        self.line_index.line_count()
    }
}

/// Collection of all source units read during a build.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
    by_name: FxHashMap<String, FileId>,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source unit, replacing any previous unit with the same name.
    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let name = name.into();
        if let Some(&id) = self.by_name.get(&name) {
            self.files[id.0 as usize] = SourceFile::new(name, text);
            return id;
        }
        let id = FileId(self.files.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.files.push(SourceFile::new(name, text));
        id
    }

    /// Get a source unit by id.
    pub fn get(&self, id: FileId) -> &SourceFile {
        &self.files[id.0 as usize]
    }

    /// Look up a source unit by file name.
    pub fn by_name(&self, name: &str) -> Option<&SourceFile> {
        self.by_name.get(name).map(|&id| self.get(id))
    }

    /// Iterate over all source units in insertion order.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }
}
