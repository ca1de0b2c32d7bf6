//! Stable exit codes for the `spark` CLI.

/// Stories were generated.
pub const OK: i32 = 0;
/// Invalid selection, configuration, or arguments.
pub const INVALID: i32 = 1;
/// The backend answered but produced no usable starters.
pub const EMPTY: i32 = 2;
/// The backend call itself failed.
pub const REMOTE_FAILURE: i32 = 3;
