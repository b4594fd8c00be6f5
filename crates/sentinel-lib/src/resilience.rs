//! Read-only risk audit of a caller-supplied route.
//!
//! Nothing here searches. Unknown ports and missing lanes are reported as
//! vulnerabilities so that a partially valid route still yields a report.

use serde::Serialize;
use tracing::debug;

use crate::graph::RouteGraph;
use crate::risk::{ChokepointInfo, RiskLevel};

/// Lanes and chokepoints at or above this risk are flagged.
pub const VULNERABILITY_THRESHOLD: f64 = 0.5;

/// Alternative connections per port beyond which redundancy saturates.
pub const REDUNDANCY_SATURATION: usize = 3;

/// Category of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityKind {
    UnknownPort,
    MissingLane,
    HighRiskLane,
    HighRiskChokepoint,
}

/// Single weakness found along the route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vulnerability {
    pub kind: VulnerabilityKind,
    /// Port id, `FROM-TO` lane label or chokepoint id.
    pub location: String,
    pub risk: f64,
    pub severity: RiskLevel,
    pub description: String,
}

/// Result of [`analyze_route_resilience`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResilienceReport {
    /// `(1 - mean lane risk) * 100`; zero when no lane could be resolved.
    pub overall_resilience: f64,
    pub vulnerabilities: Vec<Vulnerability>,
    /// How many alternative connections the route's ports offer, `0..=100`.
    pub redundancy_score: f64,
    pub recommendations: Vec<String>,
}

/// Audit the route visiting `path_ids` in order.
pub fn analyze_route_resilience<S: AsRef<str>>(graph: &RouteGraph, path_ids: &[S]) -> ResilienceReport {
    let mut vulnerabilities = Vec::new();
    let mut indices = Vec::with_capacity(path_ids.len());

    for id in path_ids {
        let id = id.as_ref();
        match graph.node_index(id) {
            Some(index) => indices.push(Some(index)),
            None => {
                indices.push(None);
                vulnerabilities.push(Vulnerability {
                    kind: VulnerabilityKind::UnknownPort,
                    location: id.trim().to_ascii_uppercase(),
                    risk: 1.0,
                    severity: RiskLevel::Critical,
                    description: format!("port {id} is not in the route network"),
                });
            }
        }
    }

    let mut lane_risks = Vec::new();
    let mut chokepoints: Vec<&str> = Vec::new();
    for pair in indices.windows(2) {
        let (Some(from), Some(to)) = (pair[0], pair[1]) else {
            continue;
        };
        let from_id = &graph.node(from).id;
        let to_id = &graph.node(to).id;
        let Some(edge) = graph.lane_between(from_id, to_id) else {
            vulnerabilities.push(Vulnerability {
                kind: VulnerabilityKind::MissingLane,
                location: format!("{from_id}-{to_id}"),
                risk: 1.0,
                severity: RiskLevel::Critical,
                description: format!("no lane connects {from_id} and {to_id}"),
            });
            continue;
        };

        lane_risks.push(edge.risk_score);
        if edge.risk_score >= VULNERABILITY_THRESHOLD {
            vulnerabilities.push(Vulnerability {
                kind: VulnerabilityKind::HighRiskLane,
                location: format!("{from_id}-{to_id}"),
                risk: edge.risk_score,
                severity: RiskLevel::from_score(edge.risk_score),
                description: format!(
                    "lane {from_id}-{to_id} carries {} risk ({:.2})",
                    RiskLevel::from_score(edge.risk_score),
                    edge.risk_score
                ),
            });
        }
        for chokepoint in &edge.chokepoints {
            if !chokepoints.contains(&chokepoint.as_str()) {
                chokepoints.push(chokepoint);
            }
        }
    }

    for id in &chokepoints {
        let risk = graph.chokepoint_risk(id);
        if risk >= VULNERABILITY_THRESHOLD {
            let name = chokepoint_name(graph, id);
            vulnerabilities.push(Vulnerability {
                kind: VulnerabilityKind::HighRiskChokepoint,
                location: id.to_string(),
                risk,
                severity: RiskLevel::from_score(risk),
                description: format!("route transits {name} ({} risk)", RiskLevel::from_score(risk)),
            });
        }
    }

    let overall_resilience = if lane_risks.is_empty() {
        0.0
    } else {
        let mean = lane_risks.iter().sum::<f64>() / lane_risks.len() as f64;
        (1.0 - mean) * 100.0
    };

    let resolved: Vec<_> = indices.iter().flatten().copied().collect();
    let redundancy_score = if resolved.is_empty() {
        0.0
    } else {
        let total = resolved
            .iter()
            .map(|&index| {
                let spare = graph.degree(index).saturating_sub(1).min(REDUNDANCY_SATURATION);
                spare as f64 / REDUNDANCY_SATURATION as f64
            })
            .sum::<f64>();
        total / resolved.len() as f64 * 100.0
    };

    let recommendations = recommendations(
        graph,
        &vulnerabilities,
        overall_resilience,
        redundancy_score,
    );

    debug!(
        ports = path_ids.len(),
        vulnerabilities = vulnerabilities.len(),
        overall_resilience,
        redundancy_score,
        "analyzed route resilience"
    );

    ResilienceReport {
        overall_resilience,
        vulnerabilities,
        redundancy_score,
        recommendations,
    }
}

/// Chokepoint snapshot sorted by descending risk, then id.
pub fn get_chokepoint_risks(graph: &RouteGraph) -> Vec<ChokepointInfo> {
    let mut chokepoints = graph.chokepoints().to_vec();
    chokepoints.sort_by(|a, b| b.risk.total_cmp(&a.risk).then_with(|| a.id.cmp(&b.id)));
    chokepoints
}

fn chokepoint_name(graph: &RouteGraph, id: &str) -> String {
    graph
        .chokepoints()
        .iter()
        .find(|info| info.id == id)
        .map(|info| info.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn recommendations(
    graph: &RouteGraph,
    vulnerabilities: &[Vulnerability],
    overall_resilience: f64,
    redundancy_score: f64,
) -> Vec<String> {
    let mut advice = Vec::new();

    let unresolved = vulnerabilities
        .iter()
        .filter(|v| {
            matches!(
                v.kind,
                VulnerabilityKind::UnknownPort | VulnerabilityKind::MissingLane
            )
        })
        .count();
    if unresolved > 0 {
        advice.push(format!(
            "Verify the route: {unresolved} port or lane reference(s) could not be resolved."
        ));
    }

    let hot: Vec<String> = vulnerabilities
        .iter()
        .filter(|v| v.kind == VulnerabilityKind::HighRiskChokepoint)
        .map(|v| chokepoint_name(graph, &v.location))
        .collect();
    if !hot.is_empty() {
        advice.push(format!(
            "Prepare a contingency route avoiding {}.",
            hot.join(" and ")
        ));
    }

    if vulnerabilities
        .iter()
        .any(|v| v.kind == VulnerabilityKind::HighRiskLane)
    {
        advice.push("Review cargo insurance for the high-risk legs of this route.".to_string());
    }

    if redundancy_score < 50.0 {
        advice.push(
            "Few alternative connections exist along this route; pre-book capacity at transshipment hubs."
                .to_string(),
        );
    }

    if overall_resilience < 50.0 && unresolved == 0 {
        advice.push("Overall resilience is low; request a risk-optimized reroute.".to_string());
    }

    if advice.is_empty() {
        advice.push("Route resilience is adequate; keep monitoring chokepoint risk.".to_string());
    }
    advice
}
