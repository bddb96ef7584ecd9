/// Integer rectangles and the kurbo re-exports used throughout the crate.
pub mod core;
/// Process-wide backend selection and per-backend options.
pub mod config;
/// Error and result types.
pub mod error;
pub(crate) mod math;
