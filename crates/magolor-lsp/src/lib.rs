//! Magolor language server.
//!
//! - [`transport`]: `Content-Length` framed JSON-RPC over byte streams
//! - [`documents`]: open-document store with offset/position conversion
//! - [`semantic`]: per-file symbol index extracted from the real parse
//! - [`completion`]: ranked completion sources
//! - [`server`]: lifecycle, dispatch, and the request handlers

pub mod completion;
pub mod documents;
pub mod semantic;
pub mod server;
pub mod transport;

pub use server::Server;

use std::io;

/// Launch the blocking LSP loop over standard streams. Returns when the
/// client sends `exit` or closes stdin.
pub fn run_stdio() -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let transport = transport::Transport::new(stdin.lock(), stdout.lock());
    Server::new().run(transport)
}
