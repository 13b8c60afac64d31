//! Magolor type checker.
//!
//! Checking is a two-phase traversal over one module at a time:
//!
//! - **Phase A (hoist)**: every class shape and function signature is copied
//!   into lookup tables before any body is entered, together with the public
//!   surface of each imported module. Forward references and mutual
//!   recursion need no declaration order.
//! - **Phase B (bodies)**: each function and method is checked in its own
//!   scope; every expression node gets its type slot filled.
//!
//! All violations go to the [`DiagnosticSink`] and checking continues; a
//! failed sub-expression types as the synthetic error type, which is
//! assignable in both directions so one mistake produces one diagnostic.

pub mod check;
pub mod env;

pub use check::check_module;

use magolor_common::diagnostics::DiagnosticSink;
use magolor_resolve::ModuleRegistry;

/// Check one registered module in place.
///
/// The module is taken out of the registry for the duration of the check so
/// its AST can be annotated while the other modules stay readable, then
/// re-registered.
pub fn check_registered(registry: &mut ModuleRegistry, module_name: &str, sink: &mut DiagnosticSink) {
    if let Some(mut module) = registry.remove(module_name) {
        check::check_module(&mut module, registry, sink);
        registry.register(module);
    }
}
