//! Final statistics for completed paths.

use serde::Serialize;

use crate::graph::{LaneEdge, PortNode};
use crate::objective::Objective;
use crate::risk::{clamp_unit, RiskLevel};

/// Route length at which the distance component of the breakdown saturates.
pub const DISTANCE_RISK_NORMALIZER_KM: f64 = 20_000.0;

/// Where a route's risk comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskBreakdown {
    /// Mean country component across the route's lanes.
    pub country: f64,
    /// Mean chokepoint component across the route's lanes.
    pub chokepoint: f64,
    /// Exposure from sheer route length, normalized into `[0, 1]`.
    pub distance: f64,
}

/// Completed, scored route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRoute {
    /// Objective the route was found under. `composite_score` is only
    /// comparable between routes sharing it.
    pub objective: Objective,
    pub ports: Vec<PortNode>,
    pub edges: Vec<LaneEdge>,
    pub total_distance_km: f64,
    pub estimated_time_hours: f64,
    pub estimated_cost: f64,
    /// Mean lane risk.
    pub risk_score: f64,
    /// `1 - risk_score`.
    pub reliability: f64,
    pub composite_score: f64,
    pub risk_level: RiskLevel,
    pub risk_breakdown: RiskBreakdown,
}

impl ScoredRoute {
    /// Number of lanes travelled.
    pub fn hop_count(&self) -> usize {
        self.edges.len()
    }

    /// Ordered port identifiers.
    pub fn port_ids(&self) -> Vec<&str> {
        self.ports.iter().map(|port| port.id.as_str()).collect()
    }

    /// Chokepoints transited, in travel order, without repeats.
    pub fn chokepoints(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for id in self.edges.iter().flat_map(|edge| edge.chokepoints.iter()) {
            if !seen.contains(&id.as_str()) {
                seen.push(id.as_str());
            }
        }
        seen
    }

    /// Compact `A -> B -> C` rendering of the port names.
    pub fn path_label(&self) -> String {
        self.ports
            .iter()
            .map(|port| port.name.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Compute statistics for a path made of `ports` joined by `edges`.
///
/// `composite_score` is the search cost accumulated under `objective`.
pub fn score_path(
    ports: Vec<PortNode>,
    edges: Vec<LaneEdge>,
    objective: Objective,
    composite_score: f64,
) -> ScoredRoute {
    let total_distance_km = edges.iter().map(|edge| edge.distance_km).sum::<f64>();
    let estimated_time_hours = edges.iter().map(|edge| edge.base_transit_hours).sum::<f64>();
    let estimated_cost = edges.iter().map(|edge| edge.base_cost).sum::<f64>();

    let risk_score = clamp_unit(mean(edges.iter().map(|edge| edge.risk_score)));
    let risk_breakdown = RiskBreakdown {
        country: mean(edges.iter().map(|edge| edge.country_risk)),
        chokepoint: mean(edges.iter().map(|edge| edge.chokepoint_risk)),
        distance: clamp_unit(total_distance_km / DISTANCE_RISK_NORMALIZER_KM),
    };

    ScoredRoute {
        objective,
        ports,
        edges,
        total_distance_km,
        estimated_time_hours,
        estimated_cost,
        risk_score,
        reliability: 1.0 - risk_score,
        composite_score,
        risk_level: RiskLevel::from_score(risk_score),
        risk_breakdown,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Coordinates;
    use crate::reference::TransportMode;

    fn node(id: &str) -> PortNode {
        PortNode {
            id: id.to_string(),
            name: format!("Port {id}"),
            country: "AA".to_string(),
            position: Coordinates { lat: 0.0, lng: 0.0 },
        }
    }

    fn edge(from: &str, to: &str, km: f64, hours: f64, risk: f64, chokepoints: &[&str]) -> LaneEdge {
        LaneEdge {
            from: from.to_string(),
            to: to.to_string(),
            distance_km: km,
            base_transit_hours: hours,
            base_cost: km / 2.0,
            mode: TransportMode::Sea,
            chokepoints: chokepoints.iter().map(|c| c.to_string()).collect(),
            country_risk: risk / 2.0,
            chokepoint_risk: risk / 2.0,
            risk_score: risk,
            source: 0,
            target: 0,
        }
    }

    #[test]
    fn totals_and_means_are_computed() {
        let route = score_path(
            vec![node("A"), node("B"), node("C")],
            vec![
                edge("A", "B", 1000.0, 40.0, 0.2, &["narrows"]),
                edge("B", "C", 900.0, 36.0, 0.6, &["narrows", "gate"]),
            ],
            Objective::Time,
            76.0,
        );

        assert_eq!(route.total_distance_km, 1900.0);
        assert_eq!(route.estimated_time_hours, 76.0);
        assert_eq!(route.estimated_cost, 950.0);
        assert!((route.risk_score - 0.4).abs() < 1e-9);
        assert!((route.reliability - 0.6).abs() < 1e-9);
        assert_eq!(route.risk_level, RiskLevel::Medium);
        assert!((route.risk_breakdown.country - 0.2).abs() < 1e-9);
        assert!((route.risk_breakdown.distance - 0.095).abs() < 1e-9);
        assert_eq!(route.hop_count(), 2);
        assert_eq!(route.chokepoints(), vec!["narrows", "gate"]);
        assert_eq!(route.path_label(), "Port A -> Port B -> Port C");
    }

    #[test]
    fn empty_edge_list_has_zero_risk() {
        let route = score_path(vec![node("A")], Vec::new(), Objective::Risk, 0.0);
        assert_eq!(route.risk_score, 0.0);
        assert_eq!(route.reliability, 1.0);
        assert_eq!(route.hop_count(), 0);
    }
}
