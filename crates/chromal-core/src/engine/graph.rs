//! Typed vertex/edge records and the versioned snapshot graph.
//!
//! ## Design
//!
//! - **VertexState / EdgeState**: the fixed shapes every round works on.
//!   All loosely-typed field lookup happens once at the adapter boundary
//!   (`engine::adapter`); nothing stringly-typed survives into round logic.
//! - **ColorGraph**: an immutable snapshot. Rounds never mutate a snapshot;
//!   [`ColorGraph::with_colors`] chains the next one. Edges and the id index
//!   are shared via `Arc` across the whole chain since only colors change
//!   between rounds, so producing a snapshot costs one color vector.
//! - Stored edges are one direction of a logically undirected adjacency;
//!   consumers must consider both endpoint perspectives.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::engine::errors::ColorError;
use crate::engine::mask::Color;

/// A unique identifier for a vertex, assigned externally and stable for the
/// duration of a run.
///
/// Implements `Ord` for stable, deterministic iteration.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexId(pub u64);

/// Per-vertex state carried across supersteps: the id and the current color.
///
/// A vertex whose color exceeds the run's budget `K` has not reached a final
/// color yet; the `color = id` initialization doubles as the placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexState {
    /// The vertex identifier.
    pub id: VertexId,
    /// The current (possibly non-final) color.
    pub color: Color,
}

/// A stored edge. The graph is logically undirected; `weight` is carried
/// through for collaborators and never read by the coloring logic.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeState {
    /// One endpoint as stored.
    pub src: VertexId,
    /// The other endpoint as stored.
    pub dst: VertexId,
    /// Opaque edge attribute, preserved across the run.
    pub weight: f64,
}

/// An immutable vertex/edge snapshot with structural sharing.
///
/// Cloning a `ColorGraph` is cheap (three reference-count increments), and
/// chained snapshots share edges and the id index for the whole run.
#[derive(Debug, Clone)]
pub struct ColorGraph {
    vertices: Arc<Vec<VertexState>>,
    edges: Arc<[EdgeState]>,
    index: Arc<FxHashMap<VertexId, usize>>,
}

impl ColorGraph {
    /// Builds a snapshot from typed records, validating the adapter contract:
    /// vertex ids must be unique, edge endpoints must resolve, and self-loops
    /// are rejected (no proper coloring can satisfy one).
    pub fn new(vertices: Vec<VertexState>, edges: Vec<EdgeState>) -> Result<Self, ColorError> {
        let mut index = FxHashMap::default();
        index.reserve(vertices.len());
        for (pos, vertex) in vertices.iter().enumerate() {
            if index.insert(vertex.id, pos).is_some() {
                return Err(ColorError::DataContract(format!(
                    "duplicate vertex id {}",
                    vertex.id.0
                )));
            }
        }
        for (pos, edge) in edges.iter().enumerate() {
            if edge.src == edge.dst {
                return Err(ColorError::Configuration(format!(
                    "edge {} is a self-loop on vertex {}",
                    pos, edge.src.0
                )));
            }
            for endpoint in [edge.src, edge.dst] {
                if !index.contains_key(&endpoint) {
                    return Err(ColorError::DataContract(format!(
                        "edge {} references unknown vertex {}",
                        pos, endpoint.0
                    )));
                }
            }
        }
        Ok(Self {
            vertices: Arc::new(vertices),
            edges: edges.into(),
            index: Arc::new(index),
        })
    }

    /// All vertices in insertion order.
    pub fn vertices(&self) -> &[VertexState] {
        &self.vertices
    }

    /// All stored edges.
    pub fn edges(&self) -> &[EdgeState] {
        &self.edges
    }

    /// Looks up a vertex by id.
    pub fn vertex(&self, id: VertexId) -> Option<&VertexState> {
        self.index.get(&id).map(|&pos| &self.vertices[pos])
    }

    /// The current color of a vertex.
    pub fn color_of(&self, id: VertexId) -> Option<Color> {
        self.vertex(id).map(|v| v.color)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub(crate) fn position_of(&self, id: VertexId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Number of distinct neighbors of `id`, or `None` for an unknown vertex.
    /// Parallel edges count once.
    pub fn degree(&self, id: VertexId) -> Option<usize> {
        self.index.get(&id)?;
        let mut neighbors: Vec<VertexId> = self
            .edges
            .iter()
            .filter_map(|e| {
                if e.src == id {
                    Some(e.dst)
                } else if e.dst == id {
                    Some(e.src)
                } else {
                    None
                }
            })
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        Some(neighbors.len())
    }

    /// Maximum distinct-neighbor degree Δ(G) over all vertices.
    ///
    /// Only used to validate a caller-supplied budget; computing Δ for the
    /// budget itself remains the collaborator's job.
    pub fn max_degree(&self) -> usize {
        let mut pairs: Vec<(usize, usize)> = self
            .edges
            .iter()
            .filter_map(|e| {
                let a = self.position_of(e.src)?;
                let b = self.position_of(e.dst)?;
                Some((a.min(b), a.max(b)))
            })
            .collect();
        pairs.sort_unstable();
        pairs.dedup();

        let mut degrees = vec![0usize; self.vertices.len()];
        for (a, b) in pairs {
            degrees[a] += 1;
            degrees[b] += 1;
        }
        degrees.into_iter().max().unwrap_or(0)
    }

    /// The `color(v) = id(v)` initialization: the placeholder value that also
    /// fixes the sweep's deterministic processing order.
    pub fn init_greedy_colors(&self) -> ColorGraph {
        let vertices = self
            .vertices
            .iter()
            .map(|v| VertexState {
                id: v.id,
                color: v.id.0,
            })
            .collect();
        ColorGraph {
            vertices: Arc::new(vertices),
            edges: Arc::clone(&self.edges),
            index: Arc::clone(&self.index),
        }
    }

    /// Chains the next snapshot from a full color vector, one entry per
    /// vertex in [`ColorGraph::vertices`] order.
    pub fn with_colors(&self, colors: Vec<Color>) -> Result<ColorGraph, ColorError> {
        if colors.len() != self.vertices.len() {
            return Err(ColorError::Internal(format!(
                "color vector length {} does not match vertex count {}",
                colors.len(),
                self.vertices.len()
            )));
        }
        let vertices = self
            .vertices
            .iter()
            .zip(colors)
            .map(|(v, color)| VertexState { id: v.id, color })
            .collect();
        Ok(ColorGraph {
            vertices: Arc::new(vertices),
            edges: Arc::clone(&self.edges),
            index: Arc::clone(&self.index),
        })
    }

    /// The `VertexId -> Color` mapping, sorted by id for deterministic
    /// read-back.
    pub fn color_assignments(&self) -> Vec<(VertexId, Color)> {
        let mut out: Vec<(VertexId, Color)> =
            self.vertices.iter().map(|v| (v.id, v.color)).collect();
        out.sort_unstable_by_key(|&(id, _)| id);
        out
    }
}
