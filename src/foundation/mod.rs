//! Shared value types and the error taxonomy.

/// Pipeline value types (buffers, rectangles, knobs, counts).
pub mod core;
/// Error taxonomy and the structured error payload.
pub mod error;
