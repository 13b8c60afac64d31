//! The open-document store.
//!
//! One record per URI with the latest content, version, and a line-offset
//! table; offset <-> position conversions are O(log n) over that table.

use lsp_types::Position;
use rustc_hash::FxHashMap;

/// One open text document.
#[derive(Debug)]
pub struct TextDocument {
    pub uri: String,
    pub language_id: String,
    pub version: i32,
    pub content: String,
    /// Byte offset of the start of each line; first entry is always 0.
    line_offsets: Vec<usize>,
}

impl TextDocument {
    pub fn new(uri: impl Into<String>, language_id: impl Into<String>, version: i32, content: String) -> Self {
        let mut doc = Self {
            uri: uri.into(),
            language_id: language_id.into(),
            version,
            content,
            line_offsets: Vec::new(),
        };
        doc.update_line_offsets();
        doc
    }

    /// Replace the full content (full-sync model) and recompute offsets.
    pub fn replace(&mut self, version: i32, content: String) {
        self.version = version;
        self.content = content;
        self.update_line_offsets();
    }

    fn update_line_offsets(&mut self) {
        self.line_offsets.clear();
        self.line_offsets.push(0);
        for (i, byte) in self.content.bytes().enumerate() {
            if byte == b'\n' {
                self.line_offsets.push(i + 1);
            }
        }
    }

    /// Convert a byte offset into a 0-based LSP position.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.content.len());
        let line = self
            .line_offsets
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        Position {
            line: line as u32,
            character: (offset - self.line_offsets[line]) as u32,
        }
    }

    /// Convert a 0-based LSP position into a byte offset, clamped to the
    /// document.
    pub fn position_to_offset(&self, position: &Position) -> usize {
        let line = position.line as usize;
        if line >= self.line_offsets.len() {
            return self.content.len();
        }
        (self.line_offsets[line] + position.character as usize).min(self.content.len())
    }

    /// Text of a 0-based line without its newline.
    pub fn line_text(&self, line: u32) -> &str {
        let line = line as usize;
        if line >= self.line_offsets.len() {
            return "";
        }
        let start = self.line_offsets[line];
        let end = self
            .line_offsets
            .get(line + 1)
            .map(|&next| next - 1)
            .unwrap_or(self.content.len());
        self.content[start..end].trim_end_matches('\r')
    }

    /// The identifier under (or just before) a position.
    pub fn word_at(&self, position: &Position) -> String {
        let line = self.line_text(position.line).as_bytes();
        let mut start = (position.character as usize).min(line.len());
        let mut end = start;
        while start > 0 && is_ident_byte(line[start - 1]) {
            start -= 1;
        }
        while end < line.len() && is_ident_byte(line[end]) {
            end += 1;
        }
        String::from_utf8_lossy(&line[start..end]).into_owned()
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// URI -> latest document.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: FxHashMap<String, TextDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, uri: &str, language_id: &str, version: i32, content: String) {
        self.documents
            .insert(uri.to_string(), TextDocument::new(uri, language_id, version, content));
    }

    pub fn change(&mut self, uri: &str, version: i32, content: String) {
        if let Some(doc) = self.documents.get_mut(uri) {
            doc.replace(version, content);
        }
    }

    pub fn close(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    pub fn get(&self, uri: &str) -> Option<&TextDocument> {
        self.documents.get(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_change_close() {
        let mut store = DocumentStore::new();
        store.open("file:///a.mg", "magolor", 1, "fn main() {}".to_string());
        assert_eq!(store.get("file:///a.mg").unwrap().version, 1);

        store.change("file:///a.mg", 2, "fn main() { }".to_string());
        let doc = store.get("file:///a.mg").unwrap();
        assert_eq!(doc.version, 2);
        assert_eq!(doc.content, "fn main() { }");

        store.close("file:///a.mg");
        assert!(store.get("file:///a.mg").is_none());
    }

    #[test]
    fn offset_position_conversions() {
        let doc = TextDocument::new("u", "magolor", 1, "ab\ncd\n".to_string());
        assert_eq!(doc.offset_to_position(0), Position { line: 0, character: 0 });
        assert_eq!(doc.offset_to_position(3), Position { line: 1, character: 0 });
        assert_eq!(doc.offset_to_position(4), Position { line: 1, character: 1 });
        assert_eq!(doc.position_to_offset(&Position { line: 1, character: 1 }), 4);
        // Past-the-end clamps.
        assert_eq!(doc.position_to_offset(&Position { line: 9, character: 0 }), 6);
    }

    #[test]
    fn offset_position_involution() {
        let doc = TextDocument::new("u", "magolor", 1, "let a = 1;\nlet bb = 22;\n\nend".to_string());
        for offset in 0..doc.content.len() {
            let position = doc.offset_to_position(offset);
            assert_eq!(
                doc.position_to_offset(&position),
                offset,
                "involution failed at offset {offset}"
            );
        }
    }

    #[test]
    fn line_text_and_word_at() {
        let doc = TextDocument::new("u", "magolor", 1, "fn main() {\n    prin\n}".to_string());
        assert_eq!(doc.line_text(0), "fn main() {");
        assert_eq!(doc.line_text(1), "    prin");
        assert_eq!(doc.line_text(5), "");
        // Cursor right after `prin`.
        assert_eq!(doc.word_at(&Position { line: 1, character: 8 }), "prin");
        // Cursor in the middle of an identifier widens both ways.
        assert_eq!(doc.word_at(&Position { line: 0, character: 4 }), "main");
    }
}
