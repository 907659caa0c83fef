//! The coloring engine.
//!
//! This module provides:
//! - **errors**: Error types for validation and execution failures
//! - **graph**: Typed vertex/edge records and versioned graph snapshots
//! - **mask**: Neighbor-color masks (the message type) and backend selection
//! - **messages**: Bulk-synchronous message-send / aggregate / update primitives
//! - **coloring**: The sweep and frontier coloring strategies
//! - **adapter**: Loose-row projection at the collaborator boundary

pub mod adapter;
pub mod coloring;
pub mod errors;
pub mod graph;
pub mod mask;
pub mod messages;
