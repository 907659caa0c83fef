//! # Chromal Core
//!
//! Bulk-synchronous greedy graph coloring: a constructive Δ(G)+1 bound.
//!
//! Given an undirected graph and a caller-supplied color budget `K = Δ + 1`,
//! the engine computes a proper vertex coloring using at most `K + 1` color
//! values (`0..=K`) via iterative message passing: each round, already-colored
//! vertices advertise their colors along edges, inboxes are OR-combined into
//! used-color masks, and receiving vertices take their smallest free color.
//! Two convergence strategies are provided — a deterministic sequential sweep
//! and a bounded-iteration parallel frontier expansion.

pub mod engine;

// Re-export commonly used types
pub use engine::adapter::{graph_from_records, AttrValue, EdgeSchema, Record, VertexSchema};
pub use engine::coloring::{
    color_graph_fast, color_graph_fast_with_config, color_graph_naive, ColoringConfig,
    ColoringDiagnostics, SENTINEL_COLOR,
};
pub use engine::errors::ColorError;
pub use engine::graph::{ColorGraph, EdgeState, VertexId, VertexState};
pub use engine::mask::MaskBackend;
