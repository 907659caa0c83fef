//! Greedy (Δ+1) coloring strategies over the superstep primitives.
//!
//! Both strategies start from the `color(v) = id(v)` initialization (see
//! [`ColorGraph::init_greedy_colors`]) and a caller-supplied color budget
//! `K = Δ(G) + 1`. A vertex is *final* once its color is `≤ K`; a color above
//! the budget is the initialization placeholder.
//!
//! - [`color_graph_naive`]: sequential sweep, one pending vertex per round in
//!   increasing id order. Exactly one round per vertex whose id exceeds the
//!   budget; correct on any topology, including disconnected graphs.
//! - [`color_graph_fast`]: bounded-iteration frontier expansion. Each round
//!   every final vertex offers its color to adjacent non-final vertices,
//!   which take the smallest color absent from their aggregated inbox. The
//!   colored frontier advances one hop per round, so the iteration budget
//!   must cover the distance from a seed to the farthest reachable vertex;
//!   components without a seed (some vertex already `≤ K`) never leave the
//!   non-final state and are folded to the sentinel at the end.
//!
//! Rounds are pure functions of the previous snapshot; a run either executes
//! its full schedule or fails during validation, never in between.

use rustc_hash::FxHashMap;

use crate::engine::errors::ColorError;
use crate::engine::graph::{ColorGraph, VertexId};
use crate::engine::mask::{Color, ColorMask, MaskBackend, PackedColorMask, WideColorMask};
use crate::engine::messages::{aggregate_messages, join_colors, OutboundMessages};

/// Color assigned to vertices never reached within the iteration budget.
///
/// The fold to a valid color matches the wire-compatible behavior; callers
/// that need to tell "assigned 0" from "never reached" read
/// [`ColoringDiagnostics::uncolored`].
pub const SENTINEL_COLOR: Color = 0;

/// Default frontier iteration budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 30;

/// Configuration for the frontier strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoringConfig {
    /// Upper bound on frontier rounds. Rounds run unconditionally up to this
    /// bound unless `stop_when_quiescent` is set.
    pub max_iterations: usize,
    /// Stop as soon as a round delivers no messages. Off by default so
    /// round-count-sensitive callers observe the literal fixed schedule; a
    /// quiescent round cannot be followed by a non-quiescent one, so enabling
    /// this never changes the final coloring.
    pub stop_when_quiescent: bool,
    /// Mask representation; `Auto` resolves from the budget.
    pub mask_backend: MaskBackend,
}

impl Default for ColoringConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            stop_when_quiescent: false,
            mask_backend: MaskBackend::Auto,
        }
    }
}

impl ColoringConfig {
    fn validate(self) -> Result<Self, ColorError> {
        if self.max_iterations == 0 {
            return Err(ColorError::Configuration(
                "color_graph_fast: max_iterations must be > 0".into(),
            ));
        }
        Ok(self)
    }
}

/// Runtime diagnostics for a coloring run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColoringDiagnostics {
    /// Rounds actually executed.
    pub rounds_run: usize,
    /// Vertices holding a final color before the sentinel fold.
    pub colored_count: usize,
    /// Vertices folded to [`SENTINEL_COLOR`].
    pub sentinel_count: usize,
    /// Exactly the folded vertices, sorted by id. Empty for the sweep.
    pub uncolored: Vec<VertexId>,
    /// Whether no further round could change the coloring.
    pub converged: bool,
}

/// Validates the caller-supplied budget against the graph and resolves the
/// mask backend. Fails fast before any round executes.
fn validate_budget(
    graph: &ColorGraph,
    budget: u64,
    backend: MaskBackend,
) -> Result<MaskBackend, ColorError> {
    let resolved = backend.resolve(budget)?;
    let max_degree = graph.max_degree() as u64;
    if budget < max_degree {
        return Err(ColorError::Configuration(format!(
            "color budget {} is below the maximum degree {}; a proper \
             greedy coloring needs at least one free color per vertex",
            budget, max_degree
        )));
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Naive sweep
// ---------------------------------------------------------------------------

/// Colors the graph with the sequential sweep strategy.
///
/// Expects the `color(v) = id(v)` initialization; already-converged input
/// (all colors `≤ budget`) passes through unchanged.
pub fn color_graph_naive(graph: &ColorGraph, budget: u64) -> Result<ColorGraph, ColorError> {
    dispatch_naive(graph, budget, MaskBackend::Auto).map(|(graph, _)| graph)
}

/// Sweep with an explicit mask backend.
pub fn color_graph_naive_with_backend(
    graph: &ColorGraph,
    budget: u64,
    backend: MaskBackend,
) -> Result<ColorGraph, ColorError> {
    dispatch_naive(graph, budget, backend).map(|(graph, _)| graph)
}

/// Sweep, also returning run diagnostics.
pub fn color_graph_naive_with_diagnostics(
    graph: &ColorGraph,
    budget: u64,
) -> Result<(ColorGraph, ColoringDiagnostics), ColorError> {
    dispatch_naive(graph, budget, MaskBackend::Auto)
}

/// Sweep with an explicit mask backend, also returning run diagnostics.
pub fn color_graph_naive_with_backend_diagnostics(
    graph: &ColorGraph,
    budget: u64,
    backend: MaskBackend,
) -> Result<(ColorGraph, ColoringDiagnostics), ColorError> {
    dispatch_naive(graph, budget, backend)
}

fn dispatch_naive(
    graph: &ColorGraph,
    budget: u64,
    backend: MaskBackend,
) -> Result<(ColorGraph, ColoringDiagnostics), ColorError> {
    match validate_budget(graph, budget, backend)? {
        MaskBackend::Packed => run_naive::<PackedColorMask>(graph, budget),
        MaskBackend::Wide => run_naive::<WideColorMask>(graph, budget),
        MaskBackend::Auto => Err(ColorError::Internal("unresolved mask backend".into())),
    }
}

fn run_naive<M: ColorMask>(
    graph: &ColorGraph,
    budget: u64,
) -> Result<(ColorGraph, ColoringDiagnostics), ColorError> {
    // One round per vertex still holding its placeholder, in increasing id
    // order: by the time an id is targeted, every smaller id is final.
    let mut targets: Vec<Color> = graph
        .vertices()
        .iter()
        .map(|v| v.id.0)
        .filter(|&id| id > budget)
        .collect();
    targets.sort_unstable();

    let rounds = targets.len();
    let mut current = graph.clone();
    for target in targets {
        current = sweep_round::<M>(&current, budget, target)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(round_target = target, "sweep round complete");
    }

    let (finalized, diagnostics) = finalize(&current, budget, rounds, true)?;
    #[cfg(feature = "tracing")]
    tracing::info!(
        rounds = diagnostics.rounds_run,
        colored = diagnostics.colored_count,
        "naive sweep finished"
    );
    Ok((finalized, diagnostics))
}

fn sweep_round<M: ColorMask>(
    graph: &ColorGraph,
    budget: u64,
    target: Color,
) -> Result<ColorGraph, ColorError> {
    // Final neighbors (color ≤ budget) report their colors to the target
    // vertex; everything else stays silent this round.
    let inbox = aggregate_messages(
        graph,
        |t| {
            let mut out = OutboundMessages::new();
            if t.src.color == target && t.dst.color <= budget {
                out.push((t.src.id, M::single(budget, t.dst.color)));
            }
            if t.dst.color == target && t.src.color <= budget {
                out.push((t.dst.id, M::single(budget, t.src.color)));
            }
            out
        },
        M::merge,
    );
    join_colors(graph, &inbox, |vertex, msg| {
        if vertex.color != target {
            return Ok(vertex.color);
        }
        // No inbox means no finally-colored neighbor yet: the smallest free
        // color is 0.
        let used = msg.cloned().unwrap_or_else(|| M::empty(budget));
        used.min_free().ok_or_else(|| {
            ColorError::Internal(format!(
                "no free color for vertex {} despite validated budget {}",
                vertex.id.0, budget
            ))
        })
    })
}

// ---------------------------------------------------------------------------
// Frontier expansion
// ---------------------------------------------------------------------------

/// Colors the graph with the frontier strategy and the default configuration
/// (30 rounds, literal fixed schedule).
pub fn color_graph_fast(graph: &ColorGraph, budget: u64) -> Result<ColorGraph, ColorError> {
    color_graph_fast_with_config(graph, budget, ColoringConfig::default())
}

/// Frontier strategy with explicit configuration.
pub fn color_graph_fast_with_config(
    graph: &ColorGraph,
    budget: u64,
    config: ColoringConfig,
) -> Result<ColorGraph, ColorError> {
    color_graph_fast_with_config_diagnostics(graph, budget, config).map(|(graph, _)| graph)
}

/// Frontier strategy with default configuration and diagnostics.
pub fn color_graph_fast_with_diagnostics(
    graph: &ColorGraph,
    budget: u64,
) -> Result<(ColorGraph, ColoringDiagnostics), ColorError> {
    color_graph_fast_with_config_diagnostics(graph, budget, ColoringConfig::default())
}

/// Frontier strategy with explicit configuration and diagnostics.
pub fn color_graph_fast_with_config_diagnostics(
    graph: &ColorGraph,
    budget: u64,
    config: ColoringConfig,
) -> Result<(ColorGraph, ColoringDiagnostics), ColorError> {
    let config = config.validate()?;
    match validate_budget(graph, budget, config.mask_backend)? {
        MaskBackend::Packed => run_fast::<PackedColorMask>(graph, budget, &config),
        MaskBackend::Wide => run_fast::<WideColorMask>(graph, budget, &config),
        MaskBackend::Auto => Err(ColorError::Internal("unresolved mask backend".into())),
    }
}

fn run_fast<M: ColorMask>(
    graph: &ColorGraph,
    budget: u64,
    config: &ColoringConfig,
) -> Result<(ColorGraph, ColoringDiagnostics), ColorError> {
    let mut current = graph.clone();
    let mut rounds_run = 0;
    let mut quiescent = false;

    for _ in 0..config.max_iterations {
        let (next, delivered) = frontier_round::<M>(&current, budget)?;
        current = next;
        rounds_run += 1;
        #[cfg(feature = "tracing")]
        tracing::debug!(round = rounds_run, delivered, "frontier round complete");
        if delivered == 0 {
            // The frontier only grows; a silent round stays silent forever.
            quiescent = true;
            if config.stop_when_quiescent {
                break;
            }
        }
    }

    let (finalized, diagnostics) = finalize(&current, budget, rounds_run, quiescent)?;
    #[cfg(feature = "tracing")]
    tracing::info!(
        rounds = diagnostics.rounds_run,
        colored = diagnostics.colored_count,
        sentinels = diagnostics.sentinel_count,
        converged = diagnostics.converged,
        "frontier coloring finished"
    );
    Ok((finalized, diagnostics))
}

fn frontier_round<M: ColorMask>(
    graph: &ColorGraph,
    budget: u64,
) -> Result<(ColorGraph, usize), ColorError> {
    // Final endpoints offer their color across every colored/non-final edge
    // boundary, in both directions.
    let inbox: FxHashMap<VertexId, M> = aggregate_messages(
        graph,
        |t| {
            let mut out = OutboundMessages::new();
            if t.src.color <= budget && t.dst.color > budget {
                out.push((t.dst.id, M::single(budget, t.src.color)));
            }
            if t.dst.color <= budget && t.src.color > budget {
                out.push((t.src.id, M::single(budget, t.dst.color)));
            }
            out
        },
        M::merge,
    );
    let delivered = inbox.len();
    let next = join_colors(graph, &inbox, |vertex, msg| match msg {
        Some(used) if vertex.color > budget => used.min_free().ok_or_else(|| {
            ColorError::Internal(format!(
                "no free color for vertex {} despite validated budget {}",
                vertex.id.0, budget
            ))
        }),
        _ => Ok(vertex.color),
    })?;
    Ok((next, delivered))
}

// ---------------------------------------------------------------------------
// Finalization
// ---------------------------------------------------------------------------

/// Folds residual non-final colors to [`SENTINEL_COLOR`] and assembles the
/// diagnostics. The returned graph carries only colors in `[0, budget]`.
fn finalize(
    graph: &ColorGraph,
    budget: u64,
    rounds_run: usize,
    quiescent: bool,
) -> Result<(ColorGraph, ColoringDiagnostics), ColorError> {
    let mut uncolored = Vec::new();
    let colors = graph
        .vertices()
        .iter()
        .map(|v| {
            if v.color > budget {
                uncolored.push(v.id);
                SENTINEL_COLOR
            } else {
                v.color
            }
        })
        .collect();
    let finalized = graph.with_colors(colors)?;
    uncolored.sort_unstable();

    let diagnostics = ColoringDiagnostics {
        rounds_run,
        colored_count: graph.vertex_count() - uncolored.len(),
        sentinel_count: uncolored.len(),
        converged: quiescent || uncolored.is_empty(),
        uncolored,
    };
    Ok((finalized, diagnostics))
}
