//! Story starter generation from a fixed set of selections.
//!
//! A caller supplies a mood, genre, character archetype and setting. The
//! selection is validated, rendered into a prompt, sent to a remote text
//! generation backend, and the structured reply is checked before being
//! handed back. The crate keeps the same split as the rest of the workspace:
//!
//! - **[`core`]**: Pure, deterministic logic (selection validation, output
//!   shape checks, markdown export). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (configuration files, prompt
//!   rendering, remote generation). Isolated behind traits for tests.
//!
//! [`flow`] drives one generation against a backend and [`action`] wraps it
//! into the plain-data result returned to callers.

pub mod action;
pub mod core;
pub mod exit_codes;
pub mod flow;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
