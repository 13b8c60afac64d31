//! Shared foundation types for the Magolor compiler.
//!
//! Every later stage builds on the types defined here:
//!
//! - [`span`]: byte-offset spans and the line index used to recover
//!   human-readable (line, column) pairs on demand
//! - [`token`]: the lexer's token vocabulary
//! - [`source_map`]: owned source units with precomputed line offsets
//! - [`diagnostics`]: the diagnostic sink every component reports into

pub mod diagnostics;
pub mod source_map;
pub mod span;
pub mod token;
