//! Bulk-synchronous superstep primitives.
//!
//! One round is `aggregate_messages` followed by `join_colors`:
//!
//! 1. Every edge is offered to the send function as an [`EdgeTriplet`] and
//!    may emit messages to either endpoint (the graph is undirected, so both
//!    perspectives are always presented).
//! 2. Messages per destination are combined with a caller-supplied merge
//!    function that must be associative and commutative — the only contract
//!    that makes tree/pairwise combining legal.
//! 3. [`join_colors`] computes every vertex's next color from its old state
//!    and the (optional) aggregated message, producing the next snapshot.
//!
//! Message generation is read-only over the previous snapshot, so under the
//! `parallel` feature edges are processed with rayon and the per-destination
//! maps merged pairwise; the merge laws guarantee results identical to the
//! sequential fold. The snapshot handoff is the hard synchronization barrier:
//! no update observes a partially aggregated message, and no read observes a
//! write from its own round.

use std::collections::hash_map::Entry;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::engine::errors::ColorError;
use crate::engine::graph::{ColorGraph, VertexId, VertexState};
use crate::engine::mask::Color;

/// Per-edge view handed to the send function: both endpoint states of one
/// stored edge, plus the carried weight.
#[derive(Debug, Clone, Copy)]
pub struct EdgeTriplet<'a> {
    /// Endpoint stored as source.
    pub src: &'a VertexState,
    /// Endpoint stored as destination.
    pub dst: &'a VertexState,
    /// Carried edge attribute; the coloring logic never reads it.
    pub weight: f64,
}

/// Messages emitted by one edge. An edge addresses at most its two endpoints.
pub type OutboundMessages<M> = SmallVec<[(VertexId, M); 2]>;

/// Runs the message-send and per-destination aggregation half of a round.
///
/// `merge` must be associative and commutative; aggregation order is
/// unspecified.
pub fn aggregate_messages<M, S, R>(
    graph: &ColorGraph,
    send: S,
    merge: R,
) -> FxHashMap<VertexId, M>
where
    M: Send,
    S: Fn(&EdgeTriplet<'_>) -> OutboundMessages<M> + Sync,
    R: Fn(M, M) -> M + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        graph
            .edges()
            .par_iter()
            .fold(FxHashMap::default, |mut acc, edge| {
                accumulate(graph, edge, &send, &merge, &mut acc);
                acc
            })
            .reduce(FxHashMap::default, |mut left, right| {
                for (to, msg) in right {
                    insert_merged(&mut left, to, msg, &merge);
                }
                left
            })
    }
    #[cfg(not(feature = "parallel"))]
    {
        let mut acc = FxHashMap::default();
        for edge in graph.edges() {
            accumulate(graph, edge, &send, &merge, &mut acc);
        }
        acc
    }
}

fn accumulate<M, S, R>(
    graph: &ColorGraph,
    edge: &crate::engine::graph::EdgeState,
    send: &S,
    merge: &R,
    acc: &mut FxHashMap<VertexId, M>,
) where
    S: Fn(&EdgeTriplet<'_>) -> OutboundMessages<M>,
    R: Fn(M, M) -> M,
{
    // Endpoints were validated at construction; a miss here would mean the
    // snapshot chain was corrupted.
    let (Some(src), Some(dst)) = (graph.vertex(edge.src), graph.vertex(edge.dst)) else {
        return;
    };
    let triplet = EdgeTriplet {
        src,
        dst,
        weight: edge.weight,
    };
    for (to, msg) in send(&triplet) {
        insert_merged(acc, to, msg, merge);
    }
}

fn insert_merged<M>(
    acc: &mut FxHashMap<VertexId, M>,
    to: VertexId,
    msg: M,
    merge: &impl Fn(M, M) -> M,
) {
    match acc.entry(to) {
        Entry::Occupied(entry) => {
            let (key, existing) = entry.remove_entry();
            acc.insert(key, merge(existing, msg));
        }
        Entry::Vacant(slot) => {
            slot.insert(msg);
        }
    }
}

/// Runs the update half of a round: every vertex's next color is a function
/// of its previous state and the aggregated message addressed to it, and the
/// results form the next snapshot.
pub fn join_colors<M>(
    graph: &ColorGraph,
    messages: &FxHashMap<VertexId, M>,
    update: impl Fn(&VertexState, Option<&M>) -> Result<Color, ColorError>,
) -> Result<ColorGraph, ColorError> {
    let mut colors = Vec::with_capacity(graph.vertex_count());
    for vertex in graph.vertices() {
        colors.push(update(vertex, messages.get(&vertex.id))?);
    }
    graph.with_colors(colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::graph::EdgeState;
    use smallvec::smallvec;

    fn path_graph(n: u64) -> ColorGraph {
        let vertices = (0..n)
            .map(|i| VertexState {
                id: VertexId(i),
                color: i,
            })
            .collect();
        let edges = (1..n)
            .map(|i| EdgeState {
                src: VertexId(i - 1),
                dst: VertexId(i),
                weight: 1.0,
            })
            .collect();
        ColorGraph::new(vertices, edges).unwrap()
    }

    #[test]
    fn both_edge_directions_are_offered() {
        // Each endpoint reports the other's id; interior vertices of a path
        // hear from both neighbors.
        let g = path_graph(3);
        let inbox = aggregate_messages(
            &g,
            |t| smallvec![(t.src.id, vec![t.dst.id]), (t.dst.id, vec![t.src.id])],
            |mut a: Vec<VertexId>, mut b| {
                a.append(&mut b);
                a.sort_unstable();
                a
            },
        );
        assert_eq!(inbox[&VertexId(0)], vec![VertexId(1)]);
        assert_eq!(inbox[&VertexId(1)], vec![VertexId(0), VertexId(2)]);
        assert_eq!(inbox[&VertexId(2)], vec![VertexId(1)]);
    }

    #[test]
    fn vertices_without_messages_keep_their_state() {
        let g = path_graph(3);
        let inbox: FxHashMap<VertexId, u64> = aggregate_messages(
            &g,
            |t| {
                if t.dst.id == VertexId(2) {
                    smallvec![(t.dst.id, 41u64)]
                } else {
                    smallvec![]
                }
            },
            |a, b| a | b,
        );
        let next = join_colors(&g, &inbox, |v, msg| {
            Ok(match msg {
                Some(&m) => m + 1,
                None => v.color,
            })
        })
        .unwrap();
        assert_eq!(next.color_of(VertexId(0)), Some(0));
        assert_eq!(next.color_of(VertexId(1)), Some(1));
        assert_eq!(next.color_of(VertexId(2)), Some(42));
        // Reads during the round saw the previous snapshot only.
        assert_eq!(g.color_of(VertexId(2)), Some(2));
    }

    #[test]
    fn aggregation_merges_with_the_supplied_reducer() {
        // Star around vertex 0: the hub hears one merged message.
        let vertices = (0..4)
            .map(|i| VertexState {
                id: VertexId(i),
                color: i,
            })
            .collect();
        let edges = (1..4)
            .map(|i| EdgeState {
                src: VertexId(0),
                dst: VertexId(i),
                weight: 1.0,
            })
            .collect();
        let g = ColorGraph::new(vertices, edges).unwrap();
        let inbox = aggregate_messages(
            &g,
            |t| smallvec![(t.src.id, 1u64 << t.dst.color)],
            |a, b| a | b,
        );
        assert_eq!(inbox[&VertexId(0)], 0b1110);
    }
}
