use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use tracing::{debug, warn};

use crate::graph::{LaneEdge, NodeIndex, PortNode, RouteGraph};
use crate::objective::Objective;
use crate::scoring::{score_path, ScoredRoute};

/// Number of completed paths collected before the search stops.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Default upper bound on the number of lanes in a path.
pub const DEFAULT_MAX_HOPS: usize = 8;

/// Default upper bound on node expansions per search call.
pub const DEFAULT_EXPANSION_BUDGET: usize = 50_000;

/// Options controlling a single [`find_paths`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub objective: Objective,
    /// Maximum number of lanes in a returned path.
    pub max_hops: usize,
    /// ISO country codes whose ports must not be visited.
    pub exclude_countries: BTreeSet<String>,
    /// Port identifiers that must not be visited.
    pub exclude_ports: BTreeSet<String>,
    /// Chokepoint slugs whose lanes must not be used.
    pub exclude_chokepoints: BTreeSet<String>,
    /// Ceiling on the running average lane risk, in `[0, 1]`.
    pub max_risk_threshold: f64,
    /// Number of completed paths to collect.
    pub max_results: usize,
    /// Stop after this many node expansions; `None` disables the bound.
    pub expansion_budget: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            objective: Objective::default(),
            max_hops: DEFAULT_MAX_HOPS,
            exclude_countries: BTreeSet::new(),
            exclude_ports: BTreeSet::new(),
            exclude_chokepoints: BTreeSet::new(),
            max_risk_threshold: 1.0,
            max_results: DEFAULT_MAX_RESULTS,
            expansion_budget: Some(DEFAULT_EXPANSION_BUDGET),
        }
    }
}

impl SearchOptions {
    /// Default options for the given objective.
    pub fn for_objective(objective: Objective) -> Self {
        Self {
            objective,
            ..Self::default()
        }
    }
}

/// Exclusion sets normalized for case-insensitive matching.
#[derive(Debug)]
struct Exclusions {
    countries: BTreeSet<String>,
    ports: BTreeSet<String>,
    chokepoints: BTreeSet<String>,
}

impl Exclusions {
    fn from_options(options: &SearchOptions) -> Self {
        let upper = |set: &BTreeSet<String>| -> BTreeSet<String> {
            set.iter()
                .map(|value| value.trim().to_ascii_uppercase())
                .collect()
        };
        Self {
            countries: upper(&options.exclude_countries),
            ports: upper(&options.exclude_ports),
            chokepoints: options
                .exclude_chokepoints
                .iter()
                .map(|value| value.trim().to_ascii_lowercase())
                .collect(),
        }
    }

    fn excludes_port(&self, port: &PortNode) -> bool {
        self.countries.contains(&port.country) || self.ports.contains(&port.id)
    }

    fn excludes_lane(&self, edge: &LaneEdge) -> bool {
        edge.chokepoints
            .iter()
            .any(|chokepoint| self.chokepoints.contains(chokepoint))
    }
}

/// Partial path held in the open set.
#[derive(Debug, Clone)]
struct PathState<'g> {
    nodes: Vec<NodeIndex>,
    edges: Vec<&'g LaneEdge>,
    cost: f64,
    risk: f64,
}

impl<'g> PathState<'g> {
    fn origin(start: NodeIndex) -> Self {
        Self {
            nodes: vec![start],
            edges: Vec::new(),
            cost: 0.0,
            risk: 0.0,
        }
    }

    fn current(&self) -> NodeIndex {
        self.nodes[self.nodes.len() - 1]
    }

    fn hops(&self) -> usize {
        self.edges.len()
    }

    fn contains(&self, node: NodeIndex) -> bool {
        self.nodes.contains(&node)
    }

    fn extend(&self, edge: &'g LaneEdge, cost: f64, risk: f64) -> Self {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend_from_slice(&self.nodes);
        nodes.push(edge.target);
        let mut edges = Vec::with_capacity(self.edges.len() + 1);
        edges.extend_from_slice(&self.edges);
        edges.push(edge);
        Self {
            nodes,
            edges,
            cost,
            risk,
        }
    }

    fn into_route(self, graph: &RouteGraph, objective: Objective) -> ScoredRoute {
        let ports = self
            .nodes
            .iter()
            .map(|&index| graph.node(index).clone())
            .collect();
        let edges = self.edges.into_iter().cloned().collect();
        score_path(ports, edges, objective, self.cost)
    }
}

/// Find up to `options.max_results` distinct paths from `start_id` to
/// `end_id`, ordered by ascending composite score.
///
/// The search is best-first on `cost + heuristic`. Neighbours are pruned when
/// they would revisit a port, touch an excluded country, port or chokepoint,
/// push the running average lane risk above `max_risk_threshold`, or exceed
/// `max_hops`. Each port keeps the best cost it was expanded with and later
/// states that cannot beat it are dropped; the destination is exempt so that
/// several completed paths can be collected. A port reached through a
/// different prefix with a different risk profile can therefore be discarded.
///
/// Unknown ports, identical endpoints, excluded endpoints and infeasible
/// constraints all yield an empty vector.
pub fn find_paths(
    graph: &RouteGraph,
    start_id: &str,
    end_id: &str,
    options: &SearchOptions,
) -> Vec<ScoredRoute> {
    let (Some(start), Some(goal)) = (graph.node_index(start_id), graph.node_index(end_id)) else {
        debug!(start = start_id, goal = end_id, "unknown endpoint; no paths");
        return Vec::new();
    };
    if start == goal || options.max_results == 0 {
        return Vec::new();
    }

    let exclusions = Exclusions::from_options(options);
    if exclusions.excludes_port(graph.node(start)) || exclusions.excludes_port(graph.node(goal)) {
        debug!(start = start_id, goal = end_id, "endpoint excluded; no paths");
        return Vec::new();
    }

    let model = options.objective.cost_model();
    let goal_position = graph.node(goal).position;
    let heuristic = |index: NodeIndex| {
        model.heuristic(graph.node(index).position.distance_km(&goal_position))
    };

    let mut open = BinaryHeap::new();
    let mut best_cost: HashMap<NodeIndex, f64> = HashMap::new();
    let mut completed: Vec<PathState<'_>> = Vec::new();
    let mut sequence = 0u64;
    let mut expansions = 0usize;

    open.push(OpenEntry::new(PathState::origin(start), heuristic(start), sequence));

    while let Some(entry) = open.pop() {
        let state = entry.state;
        let current = state.current();

        if current == goal {
            if !completed.iter().any(|done| done.nodes == state.nodes) {
                completed.push(state);
            }
            if completed.len() >= options.max_results {
                break;
            }
            continue;
        }

        if let Some(&recorded) = best_cost.get(&current) {
            if recorded <= state.cost {
                continue;
            }
        }
        best_cost.insert(current, state.cost);

        if let Some(budget) = options.expansion_budget {
            if expansions >= budget {
                warn!(
                    budget,
                    found = completed.len(),
                    "path search expansion budget exhausted"
                );
                break;
            }
        }
        expansions += 1;

        // The hop limit does not depend on the neighbour, so it is checked once.
        if state.hops() >= options.max_hops {
            continue;
        }

        for edge in graph.neighbours(current) {
            let next = edge.target;
            if state.contains(next) {
                continue;
            }
            if exclusions.excludes_port(graph.node(next)) || exclusions.excludes_lane(edge) {
                continue;
            }

            let risk = state.risk + edge.risk_score;
            if risk / (state.hops() + 1) as f64 > options.max_risk_threshold {
                continue;
            }

            let cost = state.cost + model.edge_cost(edge);
            sequence += 1;
            open.push(OpenEntry::new(
                state.extend(edge, cost, risk),
                cost + heuristic(next),
                sequence,
            ));
        }
    }

    debug!(
        start = start_id,
        goal = end_id,
        objective = %options.objective,
        found = completed.len(),
        expansions,
        "path search finished"
    );

    completed.sort_by(|a, b| a.cost.total_cmp(&b.cost));
    completed
        .into_iter()
        .map(|state| state.into_route(graph, options.objective))
        .collect()
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug)]
struct OpenEntry<'g> {
    priority: FloatOrd,
    sequence: u64,
    state: PathState<'g>,
}

impl<'g> OpenEntry<'g> {
    fn new(state: PathState<'g>, priority: f64, sequence: u64) -> Self {
        Self {
            priority: FloatOrd(priority),
            sequence,
            state,
        }
    }
}

impl PartialEq for OpenEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for OpenEntry<'_> {}

impl Ord for OpenEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap; earlier pushes win ties.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
