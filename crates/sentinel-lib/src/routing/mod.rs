//! Rerouting alternatives for a single origin/destination pair.
//!
//! This module provides:
//! - [`RerouteRequest`] - caller constraints for a rerouting query
//! - [`ReroutingReport`] - baseline route, ranked alternatives and a summary
//! - [`find_rerouting_alternatives`] - main entry point
//!
//! # Strategy Pattern
//!
//! Each searched alternative is produced by a [`SearchPreset`] that maps the
//! request onto [`SearchOptions`]. The presets run concurrently on scoped
//! threads over the shared, read-only [`RouteGraph`]. An air-freight option is
//! synthesized afterwards when every sea candidate is too slow.

mod strategy;

pub use strategy::{
    high_risk_chokepoints, search_presets, CostOptimized, RiskOptimized, SearchPreset,
    TimeOptimized,
};

use std::collections::BTreeSet;
use std::fmt;
use std::thread;

use serde::Serialize;
use tracing::debug;

use crate::graph::{LaneEdge, RouteGraph};
use crate::normalize::{PortMatch, PortNormalizer};
use crate::objective::Objective;
use crate::path::{find_paths, SearchOptions, DEFAULT_MAX_HOPS};
use crate::reference::TransportMode;
use crate::scoring::{score_path, ScoredRoute};

/// Chokepoints at or above this risk are avoided by the risk-optimized preset.
pub const HIGH_RISK_CHOKEPOINT: f64 = 0.7;

/// Added to the caller's risk ceiling for the time-optimized preset.
pub const RISK_CEILING_SLACK: f64 = 0.15;

/// Sea transit above which an air-freight option is offered.
pub const AIR_FREIGHT_THRESHOLD_HOURS: f64 = 480.0;

/// Air transit time is the sea time divided by this factor.
pub const AIR_TIME_DIVISOR: f64 = 8.0;

/// Air risk is the sea risk multiplied by this factor.
pub const AIR_RISK_FACTOR: f64 = 0.5;

/// Air cost is the sea cost multiplied by this factor.
pub const AIR_COST_MULTIPLIER: f64 = 4.0;

/// Routes kept from each searched preset.
pub const ALTERNATIVES_PER_STRATEGY: usize = 2;

/// Origin of an alternative route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    RiskOptimized,
    TimeOptimized,
    CostOptimized,
    AirFreight,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Strategy::RiskOptimized => "risk-optimized",
            Strategy::TimeOptimized => "time-optimized",
            Strategy::CostOptimized => "cost-optimized",
            Strategy::AirFreight => "air freight",
        };
        f.write_str(value)
    }
}

/// Caller constraints for a rerouting query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RerouteRequest {
    /// Free-text origin, resolved through a [`PortNormalizer`].
    pub from: String,
    /// Free-text destination, resolved through a [`PortNormalizer`].
    pub to: String,
    pub exclude_countries: BTreeSet<String>,
    pub exclude_ports: BTreeSet<String>,
    pub exclude_chokepoints: BTreeSet<String>,
    pub max_risk_threshold: f64,
    pub max_hops: usize,
}

impl RerouteRequest {
    /// Unconstrained request between two ports.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            exclude_countries: BTreeSet::new(),
            exclude_ports: BTreeSet::new(),
            exclude_chokepoints: BTreeSet::new(),
            max_risk_threshold: 1.0,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}

/// Single ranked alternative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteAlternative {
    pub strategy: Strategy,
    /// User-facing score in `[0, 100]`; higher is better.
    pub recommendation_score: f64,
    pub route: ScoredRoute,
}

/// Result of [`find_rerouting_alternatives`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReroutingReport {
    pub from: PortMatch,
    pub to: PortMatch,
    /// Best balanced route without any caller constraint.
    pub original: Option<ScoredRoute>,
    /// Deduplicated alternatives, best recommendation first.
    pub alternatives: Vec<RouteAlternative>,
    pub recommendation: String,
}

impl ReroutingReport {
    /// Highest ranked alternative, if any.
    pub fn best(&self) -> Option<&RouteAlternative> {
        self.alternatives.first()
    }
}

/// Find rerouting alternatives, resolving endpoints through the graph itself.
pub fn find_rerouting_alternatives(graph: &RouteGraph, request: &RerouteRequest) -> ReroutingReport {
    find_rerouting_alternatives_with_normalizer(graph, graph, request)
}

/// Find rerouting alternatives, resolving endpoints through `normalizer`.
pub fn find_rerouting_alternatives_with_normalizer(
    graph: &RouteGraph,
    normalizer: &dyn PortNormalizer,
    request: &RerouteRequest,
) -> ReroutingReport {
    let from = normalizer.normalize(&request.from);
    let to = normalizer.normalize(&request.to);
    let start = from.canonical_id.as_str();
    let goal = to.canonical_id.as_str();

    let presets = search_presets();
    let baseline_options = SearchOptions {
        max_hops: request.max_hops,
        ..SearchOptions::for_objective(Objective::default())
    };

    let (original, searched) = thread::scope(|scope| {
        let baseline =
            scope.spawn(|| find_paths(graph, start, goal, &baseline_options).into_iter().next());
        let handles: Vec<_> = presets
            .iter()
            .map(|preset| {
                let options = preset.search_options(graph, request);
                let strategy = preset.strategy();
                scope.spawn(move || {
                    let routes = find_paths(graph, start, goal, &options);
                    (strategy, routes)
                })
            })
            .collect();

        let original = baseline
            .join()
            .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
        let searched: Vec<_> = handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            })
            .collect();
        (original, searched)
    });

    let mut candidates: Vec<(Strategy, ScoredRoute)> = Vec::new();
    for (strategy, routes) in searched {
        candidates.extend(
            routes
                .into_iter()
                .take(ALTERNATIVES_PER_STRATEGY)
                .map(|route| (strategy, route)),
        );
    }

    let air = candidates
        .iter()
        .map(|(_, route)| route)
        .chain(original.as_ref())
        .min_by(|a, b| a.estimated_time_hours.total_cmp(&b.estimated_time_hours))
        .filter(|sea| sea.estimated_time_hours > AIR_FREIGHT_THRESHOLD_HOURS)
        .and_then(|sea| synthesize_air_freight(graph, sea));
    if let Some(air) = air {
        candidates.push((Strategy::AirFreight, air));
    }

    let mut alternatives: Vec<RouteAlternative> = Vec::new();
    for (strategy, route) in candidates {
        if alternatives
            .iter()
            .any(|existing| existing.route.ports == route.ports)
        {
            continue;
        }
        alternatives.push(RouteAlternative {
            strategy,
            recommendation_score: recommendation_score(&route),
            route,
        });
    }
    alternatives.sort_by(|a, b| b.recommendation_score.total_cmp(&a.recommendation_score));

    let recommendation = recommendation_sentence(
        &from.canonical_id,
        &to.canonical_id,
        original.as_ref(),
        alternatives.first(),
    );

    debug!(
        from = %from.canonical_id,
        to = %to.canonical_id,
        baseline = original.is_some(),
        alternatives = alternatives.len(),
        "computed rerouting alternatives"
    );

    ReroutingReport {
        from,
        to,
        original,
        alternatives,
        recommendation,
    }
}

/// User-facing score in `[0, 100]` rewarding low risk and few hops.
pub fn recommendation_score(route: &ScoredRoute) -> f64 {
    let score = 90.0 - 60.0 * route.risk_score + 10.0 * route.reliability
        - 2.0 * route.hop_count() as f64;
    score.clamp(0.0, 100.0)
}

/// Direct air leg between the endpoints of `sea`, derived from its statistics.
///
/// Returns `None` for routes without at least one lane.
pub fn synthesize_air_freight(graph: &RouteGraph, sea: &ScoredRoute) -> Option<ScoredRoute> {
    let origin = sea.ports.first()?;
    let destination = sea.ports.last()?;
    if sea.edges.is_empty() {
        return None;
    }
    let source = graph.node_index(&origin.id)?;
    let target = graph.node_index(&destination.id)?;

    let hours = sea.estimated_time_hours / AIR_TIME_DIVISOR;
    let edge = LaneEdge {
        from: origin.id.clone(),
        to: destination.id.clone(),
        distance_km: origin.position.distance_km(&destination.position),
        base_transit_hours: hours,
        base_cost: sea.estimated_cost * AIR_COST_MULTIPLIER,
        mode: TransportMode::Air,
        chokepoints: Vec::new(),
        country_risk: sea.risk_breakdown.country * AIR_RISK_FACTOR,
        chokepoint_risk: 0.0,
        risk_score: sea.risk_score * AIR_RISK_FACTOR,
        source,
        target,
    };

    Some(score_path(
        vec![origin.clone(), destination.clone()],
        vec![edge],
        Objective::Time,
        hours,
    ))
}

fn recommendation_sentence(
    from: &str,
    to: &str,
    original: Option<&ScoredRoute>,
    best: Option<&RouteAlternative>,
) -> String {
    let (best, original) = match (best, original) {
        (None, None) => return format!("No viable route found from {from} to {to}."),
        (None, Some(original)) => {
            return format!(
                "No alternative satisfies the constraints; the current route via {} remains the only option.",
                original.path_label()
            )
        }
        (Some(best), None) => {
            return format!(
                "Recommended {} route via {} ({} risk, {:.0} hours).",
                best.strategy,
                best.route.path_label(),
                best.route.risk_level,
                best.route.estimated_time_hours
            )
        }
        (Some(best), Some(original)) => (best, original),
    };

    let route = &best.route;
    let lead = format!("Take the {} route via {}", best.strategy, route.path_label());

    if original.risk_score > 0.0 {
        let reduction = (original.risk_score - route.risk_score) / original.risk_score * 100.0;
        if reduction >= 1.0 {
            return format!("{lead}: {reduction:.0}% lower risk than the current route.");
        }
    }

    let hours_saved = original.estimated_time_hours - route.estimated_time_hours;
    if hours_saved >= 1.0 {
        return format!("{lead}: saves {hours_saved:.0} hours versus the current route.");
    }

    let cost_saved = original.estimated_cost - route.estimated_cost;
    if cost_saved >= 1.0 {
        return format!("{lead}: saves {cost_saved:.0} in freight cost versus the current route.");
    }

    format!(
        "The current route via {} is already the best option.",
        original.path_label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, Coordinates, PortNode};
    use crate::reference::ReferenceData;
    use crate::risk::{RiskLevel, StaticRiskTable};
    use crate::scoring::RiskBreakdown;

    fn port(id: &str) -> PortNode {
        PortNode {
            id: id.to_string(),
            name: id.to_string(),
            country: "AA".to_string(),
            position: Coordinates { lat: 0.0, lng: 0.0 },
        }
    }

    fn route(hops: usize, risk: f64, hours: f64, cost: f64) -> ScoredRoute {
        let ports: Vec<_> = (0..=hops).map(|i| port(&format!("P{i}"))).collect();
        let edges = (0..hops)
            .map(|i| LaneEdge {
                from: format!("P{i}"),
                to: format!("P{}", i + 1),
                distance_km: 100.0,
                base_transit_hours: hours / hops as f64,
                base_cost: cost / hops as f64,
                mode: TransportMode::Sea,
                chokepoints: Vec::new(),
                country_risk: risk,
                chokepoint_risk: 0.0,
                risk_score: risk,
                source: i,
                target: i + 1,
            })
            .collect();
        score_path(ports, edges, Objective::Time, hours)
    }

    #[test]
    fn recommendation_score_rewards_low_risk_and_few_hops() {
        let safe = route(2, 0.1, 100.0, 100.0);
        // 90 - 6 + 9 - 4
        assert!((recommendation_score(&safe) - 89.0).abs() < 1e-9);

        let risky = route(2, 0.9, 100.0, 100.0);
        assert!(recommendation_score(&risky) < recommendation_score(&safe));
    }

    #[test]
    fn recommendation_score_is_clamped() {
        let extreme = route(40, 1.0, 100.0, 100.0);
        assert_eq!(recommendation_score(&extreme), 0.0);
        let ideal = route(0, 0.0, 0.0, 0.0);
        assert_eq!(recommendation_score(&ideal), 100.0);
    }

    #[test]
    fn sentence_prefers_risk_reduction() {
        let original = route(2, 0.5, 100.0, 100.0);
        let best = RouteAlternative {
            strategy: Strategy::RiskOptimized,
            recommendation_score: 80.0,
            route: route(3, 0.25, 150.0, 200.0),
        };
        let sentence = recommendation_sentence("P0", "P3", Some(&original), Some(&best));
        assert!(sentence.contains("50% lower risk"), "{sentence}");
    }

    #[test]
    fn sentence_falls_back_to_time_then_cost() {
        let original = route(2, 0.5, 100.0, 100.0);
        let faster = RouteAlternative {
            strategy: Strategy::TimeOptimized,
            recommendation_score: 80.0,
            route: route(2, 0.5, 60.0, 100.0),
        };
        let sentence = recommendation_sentence("P0", "P2", Some(&original), Some(&faster));
        assert!(sentence.contains("saves 40 hours"), "{sentence}");

        let cheaper = RouteAlternative {
            strategy: Strategy::CostOptimized,
            recommendation_score: 80.0,
            route: route(2, 0.5, 100.0, 70.0),
        };
        let sentence = recommendation_sentence("P0", "P2", Some(&original), Some(&cheaper));
        assert!(sentence.contains("saves 30 in freight cost"), "{sentence}");

        let same = RouteAlternative {
            strategy: Strategy::CostOptimized,
            recommendation_score: 80.0,
            route: original.clone(),
        };
        let sentence = recommendation_sentence("P0", "P2", Some(&original), Some(&same));
        assert!(sentence.contains("already the best option"), "{sentence}");
    }

    #[test]
    fn sentence_reports_missing_routes() {
        let sentence = recommendation_sentence("AAA", "BBB", None, None);
        assert_eq!(sentence, "No viable route found from AAA to BBB.");
    }

    #[test]
    fn air_freight_divides_sea_time() {
        let graph = build_graph(&ReferenceData::builtin(), &StaticRiskTable::builtin());
        let sea = find_paths(
            &graph,
            "CNSHA",
            "USNYC",
            &SearchOptions::for_objective(Objective::Time),
        )
        .into_iter()
        .next()
        .expect("sea route");

        let air = synthesize_air_freight(&graph, &sea).expect("air route");
        assert_eq!(air.hop_count(), 1);
        assert_eq!(air.edges[0].mode, TransportMode::Air);
        assert!((air.estimated_time_hours - sea.estimated_time_hours / 8.0).abs() < 1e-9);
        assert!((air.estimated_cost - sea.estimated_cost * 4.0).abs() < 1e-9);
        assert!((air.risk_score - sea.risk_score * 0.5).abs() < 1e-9);
        assert_eq!(air.port_ids(), vec!["CNSHA", "USNYC"]);
    }

    #[test]
    fn air_freight_requires_a_lane() {
        let graph = RouteGraph::default();
        let single = score_path(vec![port("A")], Vec::new(), Objective::Time, 0.0);
        assert!(synthesize_air_freight(&graph, &single).is_none());
        assert_eq!(single.risk_level, RiskLevel::Low);
        assert_eq!(
            single.risk_breakdown,
            RiskBreakdown {
                country: 0.0,
                chokepoint: 0.0,
                distance: 0.0
            }
        );
    }
}
