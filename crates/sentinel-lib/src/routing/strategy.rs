//! Search presets used by the alternatives aggregator.
//!
//! Each preset turns a [`RerouteRequest`] into [`SearchOptions`] for one sea
//! search. New presets can be added without touching the orchestration in
//! [`super::find_rerouting_alternatives`].

use std::collections::BTreeSet;

use crate::graph::RouteGraph;
use crate::objective::Objective;
use crate::path::SearchOptions;

use super::{RerouteRequest, Strategy, HIGH_RISK_CHOKEPOINT, RISK_CEILING_SLACK};

/// Trait for searched alternative strategies.
pub trait SearchPreset: Send + Sync {
    /// Label attached to routes found by this preset.
    fn strategy(&self) -> Strategy;

    /// Search options derived from the caller's request.
    fn search_options(&self, graph: &RouteGraph, request: &RerouteRequest) -> SearchOptions;
}

/// Minimise risk and avoid every high-risk chokepoint automatically.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskOptimized;

impl SearchPreset for RiskOptimized {
    fn strategy(&self) -> Strategy {
        Strategy::RiskOptimized
    }

    fn search_options(&self, graph: &RouteGraph, request: &RerouteRequest) -> SearchOptions {
        let mut options = base_options(Objective::Risk, request);
        options.exclude_chokepoints.extend(high_risk_chokepoints(graph));
        options
    }
}

/// Minimise transit hours under a loosened risk ceiling.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOptimized;

impl SearchPreset for TimeOptimized {
    fn strategy(&self) -> Strategy {
        Strategy::TimeOptimized
    }

    fn search_options(&self, _graph: &RouteGraph, request: &RerouteRequest) -> SearchOptions {
        let mut options = base_options(Objective::Time, request);
        options.max_risk_threshold = (request.max_risk_threshold + RISK_CEILING_SLACK).min(1.0);
        options
    }
}

/// Minimise freight cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostOptimized;

impl SearchPreset for CostOptimized {
    fn strategy(&self) -> Strategy {
        Strategy::CostOptimized
    }

    fn search_options(&self, _graph: &RouteGraph, request: &RerouteRequest) -> SearchOptions {
        base_options(Objective::Cost, request)
    }
}

/// Presets in the order their results are deduplicated.
pub fn search_presets() -> Vec<Box<dyn SearchPreset>> {
    vec![
        Box::new(RiskOptimized),
        Box::new(TimeOptimized),
        Box::new(CostOptimized),
    ]
}

/// Chokepoint ids whose snapshot risk is at or above [`HIGH_RISK_CHOKEPOINT`].
pub fn high_risk_chokepoints(graph: &RouteGraph) -> BTreeSet<String> {
    graph
        .chokepoints()
        .iter()
        .filter(|info| info.risk >= HIGH_RISK_CHOKEPOINT)
        .map(|info| info.id.clone())
        .collect()
}

fn base_options(objective: Objective, request: &RerouteRequest) -> SearchOptions {
    SearchOptions {
        objective,
        max_hops: request.max_hops,
        exclude_countries: request.exclude_countries.clone(),
        exclude_ports: request.exclude_ports.clone(),
        exclude_chokepoints: request.exclude_chokepoints.clone(),
        max_risk_threshold: request.max_risk_threshold,
        ..SearchOptions::default()
    }
}
