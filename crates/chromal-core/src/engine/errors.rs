//! Error types for coloring runs.

use thiserror::Error;

/// Errors that can occur while building a graph or running a coloring pass.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
///
/// All public APIs return `Result<T, ColorError>` to avoid panics in library
/// code. Every error is raised before the first superstep executes: rounds
/// themselves are pure deterministic functions of the previous snapshot and
/// have no failure states of their own.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ColorError {
    /// The color budget is unusable (e.g. smaller than the maximum degree,
    /// or the graph contains a self-loop that no proper coloring can satisfy).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The color budget does not fit the packed bitmask encoding.
    #[error("color budget {budget} exceeds packed bitmask limit {limit}")]
    EncodingOverflow {
        /// The requested budget `K`.
        budget: u64,
        /// Highest budget the packed word encoding can carry.
        limit: u64,
    },

    /// An input row violated the adapter contract (missing field, wrong type).
    /// Surfaced at the attribute-extraction step, before any round executes.
    #[error("data contract error: {0}")]
    DataContract(String),

    /// Internal execution error (programmer error, not user error).
    #[error("internal error: {0}")]
    Internal(String),
}
