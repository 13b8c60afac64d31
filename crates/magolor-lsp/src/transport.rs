//! Length-prefixed JSON-RPC framing over arbitrary byte streams.
//!
//! Each message is a header block terminated by an empty line, then exactly
//! `Content-Length` bytes of one JSON object:
//!
//! ```text
//! Content-Length: 52\r\n
//! \r\n
//! {"jsonrpc":"2.0","id":1,"method":"initialize",...}
//! ```
//!
//! The reader blocks; one message is handled to completion before the next
//! is read. EOF on input ends the loop.

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};

/// A framed JSON-RPC transport over a reader/writer pair. The server runs
/// it over locked stdio; tests run it over in-memory buffers.
pub struct Transport<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Transport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read one framed message. Returns `Ok(None)` on clean EOF or when a
    /// header block carries no usable `Content-Length`.
    pub fn read_message(&mut self) -> io::Result<Option<Value>> {
        let mut content_length: Option<usize> = None;
        loop {
            let mut line = String::new();
            let read = self.reader.read_line(&mut line)?;
            if read == 0 {
                return Ok(None); // EOF
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                break; // end of headers
            }
            if let Some(rest) = line.strip_prefix("Content-Length:") {
                content_length = rest.trim().parse::<usize>().ok();
            }
        }

        let Some(length) = content_length else {
            return Ok(None);
        };
        let mut body = vec![0u8; length];
        self.reader.read_exact(&mut body)?;

        // A malformed body is skipped, not fatal: the loop keeps serving.
        Ok(Some(serde_json::from_slice(&body).unwrap_or(Value::Null)))
    }

    /// Frame and send one JSON value, flushing immediately.
    pub fn send(&mut self, message: &Value) -> io::Result<()> {
        let body = message.to_string();
        write!(self.writer, "Content-Length: {}\r\n\r\n{}", body.len(), body)?;
        self.writer.flush()
    }

    /// Send a successful response.
    pub fn respond(&mut self, id: Value, result: Value) -> io::Result<()> {
        self.send(&json!({ "jsonrpc": "2.0", "id": id, "result": result }))
    }

    /// Send an error response.
    pub fn respond_error(&mut self, id: Value, code: i64, message: &str) -> io::Result<()> {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }))
    }

    /// Send a notification.
    pub fn notify(&mut self, method: &str, params: Value) -> io::Result<()> {
        self.send(&json!({ "jsonrpc": "2.0", "method": method, "params": params }))
    }
}

/// A decoded JSON-RPC message.
///
/// A value with `id` and `method` is a request; with `id` only, a response;
/// with `method` only, a notification.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Option<Value>,
    pub method: Option<String>,
    pub params: Value,
}

impl Message {
    /// Decode a raw JSON value; `None` for non-objects.
    pub fn from_value(value: &Value) -> Option<Message> {
        let obj = value.as_object()?;
        Some(Message {
            id: obj.get("id").cloned(),
            method: obj.get("method").and_then(|m| m.as_str()).map(str::to_string),
            params: obj.get("params").cloned().unwrap_or(Value::Null),
        })
    }

    pub fn is_request(&self) -> bool {
        self.id.is_some() && self.method.is_some()
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none() && self.method.is_some()
    }

    pub fn is_response(&self) -> bool {
        self.id.is_some() && self.method.is_none()
    }
}
