//! Internal helpers shared across the analyses.

mod dot;

pub use dot::escape_dot;
