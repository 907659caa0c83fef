//! Integration tests for the frontier strategy: convergence bounds, seeding
//! requirements, and the sentinel fold.

use chromal_core::engine::coloring::{
    color_graph_fast_with_config, color_graph_fast_with_config_diagnostics, color_graph_naive,
    ColoringConfig, SENTINEL_COLOR,
};
use chromal_core::engine::graph::{ColorGraph, EdgeState, VertexId, VertexState};

fn graph_of(ids: impl IntoIterator<Item = u64>, edges: &[(u64, u64)]) -> ColorGraph {
    let vertices = ids
        .into_iter()
        .map(|i| VertexState {
            id: VertexId(i),
            color: i,
        })
        .collect();
    let edges = edges
        .iter()
        .map(|&(src, dst)| EdgeState {
            src: VertexId(src),
            dst: VertexId(dst),
            weight: 1.0,
        })
        .collect();
    ColorGraph::new(vertices, edges).unwrap()
}

fn config(max_iterations: usize) -> ColoringConfig {
    ColoringConfig {
        max_iterations,
        ..ColoringConfig::default()
    }
}

/// Path 0-1-...-(n-1) with budget 3: ids 0..=3 seed one end, the frontier
/// must travel `n - 4` hops to reach the far end.
fn seeded_path(n: u64) -> ColorGraph {
    let edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
    graph_of(0..n, &edges)
}

#[test]
fn sufficient_budget_reaches_the_whole_path() {
    let n = 10;
    let (colored, diagnostics) =
        color_graph_fast_with_config_diagnostics(&seeded_path(n), 3, config((n - 4) as usize))
            .unwrap();
    assert_eq!(diagnostics.sentinel_count, 0);
    assert!(diagnostics.converged);
    for edge in colored.edges() {
        assert_ne!(
            colored.color_of(edge.src).unwrap(),
            colored.color_of(edge.dst).unwrap()
        );
    }
}

#[test]
fn short_budget_leaves_the_far_end_sentinel() {
    let n = 10;
    // Three rounds advance the frontier to vertex 6; vertices 7..9 stay out
    // of reach and fold to the sentinel.
    let (colored, diagnostics) =
        color_graph_fast_with_config_diagnostics(&seeded_path(n), 3, config(3)).unwrap();
    assert_eq!(
        diagnostics.uncolored,
        vec![VertexId(7), VertexId(8), VertexId(9)]
    );
    assert_eq!(diagnostics.sentinel_count, 3);
    assert_eq!(diagnostics.colored_count, 7);
    assert!(!diagnostics.converged);
    for id in [7, 8, 9] {
        assert_eq!(colored.color_of(VertexId(id)), Some(SENTINEL_COLOR));
    }
}

#[test]
fn unseeded_component_stays_sentinel() {
    // Component one carries the seed palette; component two has no vertex
    // within the budget and never leaves the non-final state.
    let g = graph_of(
        (0..4).chain(20..24),
        &[(0, 1), (1, 2), (2, 3), (20, 21), (21, 22), (22, 23)],
    );
    let (colored, diagnostics) =
        color_graph_fast_with_config_diagnostics(&g, 3, config(30)).unwrap();
    assert_eq!(
        diagnostics.uncolored,
        vec![VertexId(20), VertexId(21), VertexId(22), VertexId(23)]
    );
    for id in 20..24 {
        assert_eq!(colored.color_of(VertexId(id)), Some(SENTINEL_COLOR));
    }
    // The sweep needs no seeding on the same input.
    let swept = color_graph_naive(&g, 3).unwrap();
    for edge in swept.edges() {
        assert_ne!(
            swept.color_of(edge.src).unwrap(),
            swept.color_of(edge.dst).unwrap()
        );
    }
}

#[test]
fn sentinel_fold_is_distinguishable_through_diagnostics() {
    // Vertex 21 folds to color 0 while seed vertex 0 legitimately holds 0;
    // the diagnostics tell the two apart.
    let g = graph_of((0..2).chain(20..22), &[(0, 1), (20, 21)]);
    let (colored, diagnostics) =
        color_graph_fast_with_config_diagnostics(&g, 3, config(5)).unwrap();
    assert_eq!(colored.color_of(VertexId(0)), Some(0));
    assert_eq!(colored.color_of(VertexId(20)), Some(SENTINEL_COLOR));
    assert!(diagnostics.uncolored.contains(&VertexId(20)));
    assert!(!diagnostics.uncolored.contains(&VertexId(0)));
}

#[test]
fn quiescent_exit_stops_early_with_identical_output() {
    let n = 12;
    let literal = color_graph_fast_with_config(&seeded_path(n), 3, config(30)).unwrap();
    let (eager, diagnostics) = color_graph_fast_with_config_diagnostics(
        &seeded_path(n),
        3,
        ColoringConfig {
            max_iterations: 30,
            stop_when_quiescent: true,
            ..ColoringConfig::default()
        },
    )
    .unwrap();
    assert_eq!(literal.color_assignments(), eager.color_assignments());
    assert!(diagnostics.rounds_run < 30);
    assert!(diagnostics.converged);
}

#[test]
fn zero_iterations_is_rejected() {
    let g = seeded_path(6);
    assert!(color_graph_fast_with_config(&g, 3, config(0)).is_err());
}

#[test]
fn frontier_advances_exactly_one_hop_per_round() {
    let n = 10;
    for rounds in 1..=6u64 {
        let (_, diagnostics) = color_graph_fast_with_config_diagnostics(
            &seeded_path(n),
            3,
            config(rounds as usize),
        )
        .unwrap();
        // Seeds 0..=3 plus one newly colored vertex per round.
        assert_eq!(diagnostics.colored_count as u64, (4 + rounds).min(n));
    }
}
