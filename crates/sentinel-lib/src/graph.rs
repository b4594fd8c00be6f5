use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::augment::{AugmentationRow, AugmentationSource};
use crate::reference::{LaneRecord, ReferenceData, TransportMode};
use crate::risk::{clamp_unit, ChokepointInfo, RiskProvider};

/// Mean Earth radius used by the great-circle distance.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Weight applied to each transited chokepoint's risk before capping.
pub const CHOKEPOINT_WEIGHT: f64 = 0.5;

/// Upper bound on the additive chokepoint contribution to a lane's risk.
pub const CHOKEPOINT_CAP: f64 = 0.4;

/// Augmentation rows carry no tariff; cost is estimated from distance.
pub const AUGMENTED_COST_PER_KM: f64 = 0.4;

/// Dense index of a port inside a [`RouteGraph`].
pub type NodeIndex = usize;

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Great-circle (haversine) distance in kilometres.
    pub fn distance_km(&self, other: &Self) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = lat2 - lat1;
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

/// Port within the routing graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortNode {
    pub id: String,
    pub name: String,
    pub country: String,
    pub position: Coordinates,
}

/// Directed lane between two ports. Every lane has a mirrored reverse edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneEdge {
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    pub base_transit_hours: f64,
    pub base_cost: f64,
    pub mode: TransportMode,
    pub chokepoints: Vec<String>,
    /// Country component of `risk_score`.
    pub country_risk: f64,
    /// Chokepoint component of `risk_score`, already weighted and capped.
    pub chokepoint_risk: f64,
    pub risk_score: f64,
    #[serde(skip)]
    pub(crate) source: NodeIndex,
    #[serde(skip)]
    pub(crate) target: NodeIndex,
}

/// Risk components computed for a lane at build time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneRisk {
    pub country: f64,
    pub chokepoint: f64,
    pub total: f64,
}

/// Compute the risk of a lane between two countries transiting `chokepoints`.
pub fn lane_risk(
    risk: &dyn RiskProvider,
    from_country: &str,
    to_country: &str,
    chokepoints: &[String],
) -> LaneRisk {
    let country = (risk.country_risk(from_country).security_mean()
        + risk.country_risk(to_country).security_mean())
        / 2.0;
    let chokepoint = chokepoints
        .iter()
        .map(|id| risk.chokepoint_risk(id) * CHOKEPOINT_WEIGHT)
        .sum::<f64>()
        .min(CHOKEPOINT_CAP);

    LaneRisk {
        country,
        chokepoint,
        total: clamp_unit(country + chokepoint),
    }
}

#[derive(Debug, Default)]
struct GraphData {
    nodes: Vec<PortNode>,
    index: HashMap<String, NodeIndex>,
    edges: Vec<LaneEdge>,
    adjacency: Vec<Vec<usize>>,
    chokepoints: Vec<ChokepointInfo>,
}

/// Immutable port/lane graph shared by every search call.
///
/// Cloning is cheap; the underlying data is reference counted and never
/// mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    data: Arc<GraphData>,
}

impl RouteGraph {
    /// Number of ports in the graph.
    pub fn node_count(&self) -> usize {
        self.data.nodes.len()
    }

    /// Number of directed lane edges (twice the number of lanes).
    pub fn edge_count(&self) -> usize {
        self.data.edges.len()
    }

    /// Resolve a port identifier (case-insensitive) to its dense index.
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.data.index.get(&id.trim().to_ascii_uppercase()).copied()
    }

    /// Port at a dense index.
    pub fn node(&self, index: NodeIndex) -> &PortNode {
        &self.data.nodes[index]
    }

    /// Lookup a port by identifier.
    pub fn port(&self, id: &str) -> Option<&PortNode> {
        self.node_index(id).map(|index| self.node(index))
    }

    /// Every port, ordered by insertion.
    pub fn ports(&self) -> &[PortNode] {
        &self.data.nodes
    }

    /// Every directed edge.
    pub fn edges(&self) -> &[LaneEdge] {
        &self.data.edges
    }

    /// Outgoing edges of a port, ordered by target identifier.
    pub fn neighbours(&self, index: NodeIndex) -> impl Iterator<Item = &LaneEdge> + '_ {
        self.data
            .adjacency
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&edge| &self.data.edges[edge])
    }

    /// Number of lanes leaving a port.
    pub fn degree(&self, index: NodeIndex) -> usize {
        self.data
            .adjacency
            .get(index)
            .map(Vec::len)
            .unwrap_or_default()
    }

    /// Directed lane from `from` to `to`, if one exists.
    pub fn lane_between(&self, from: &str, to: &str) -> Option<&LaneEdge> {
        let source = self.node_index(from)?;
        let target = self.node_index(to)?;
        self.neighbours(source).find(|edge| edge.target == target)
    }

    /// Chokepoint risk snapshot captured when the graph was built.
    pub fn chokepoints(&self) -> &[ChokepointInfo] {
        &self.data.chokepoints
    }

    /// Snapshot risk for a chokepoint; unknown ids are zero.
    pub fn chokepoint_risk(&self, id: &str) -> f64 {
        self.data
            .chokepoints
            .iter()
            .find(|info| info.id.eq_ignore_ascii_case(id))
            .map(|info| info.risk)
            .unwrap_or(0.0)
    }
}

/// Build the route graph from static reference data only.
pub fn build_graph(reference: &ReferenceData, risk: &dyn RiskProvider) -> RouteGraph {
    build_graph_with_rows(reference, risk, &[])
}

/// Build the route graph, merging the rows returned by `source` when the
/// fetch succeeds. A failed fetch is logged and ignored.
pub fn build_graph_with_augmentation(
    reference: &ReferenceData,
    risk: &dyn RiskProvider,
    source: Option<&dyn AugmentationSource>,
) -> RouteGraph {
    let rows = match source {
        Some(source) => match source.fetch() {
            Ok(rows) => rows,
            Err(err) => {
                warn!(
                    source = %source.describe(),
                    error = %err,
                    "augmentation fetch failed; using static reference data only"
                );
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    build_graph_with_rows(reference, risk, &rows)
}

/// Build the route graph from reference data plus already-fetched
/// augmentation rows.
pub fn build_graph_with_rows(
    reference: &ReferenceData,
    risk: &dyn RiskProvider,
    rows: &[AugmentationRow],
) -> RouteGraph {
    let mut builder = GraphBuilder::new(risk);

    for port in &reference.ports {
        builder.add_port(&port.id, &port.name, &port.country, port.lat, port.lng);
    }
    for lane in &reference.lanes {
        builder.add_lane(lane);
    }

    let static_lanes = builder.data.edges.len() / 2;
    for row in rows {
        builder.add_lane(&LaneRecord {
            from: row.from.clone(),
            to: row.to.clone(),
            distance_km: row.distance,
            transit_hours: row.time,
            cost: row.distance * AUGMENTED_COST_PER_KM,
            mode: TransportMode::Sea,
            chokepoints: Vec::new(),
        });
    }
    let augmented_lanes = builder.data.edges.len() / 2 - static_lanes;

    if builder.skipped_ports > 0 {
        warn!(
            skipped_ports = builder.skipped_ports,
            "ignored malformed port rows"
        );
    }
    if builder.skipped_lanes > 0 {
        warn!(
            skipped_lanes = builder.skipped_lanes,
            "ignored lane rows referencing unknown ports or carrying invalid values",
        );
    }

    let graph = builder.finish();
    debug!(
        ports = graph.node_count(),
        lanes = graph.edge_count() / 2,
        augmented_lanes,
        "built route graph"
    );
    graph
}

struct GraphBuilder<'a> {
    risk: &'a dyn RiskProvider,
    data: GraphData,
    pairs: HashSet<(NodeIndex, NodeIndex)>,
    skipped_ports: usize,
    skipped_lanes: usize,
}

impl<'a> GraphBuilder<'a> {
    fn new(risk: &'a dyn RiskProvider) -> Self {
        Self {
            risk,
            data: GraphData {
                chokepoints: risk.chokepoints(),
                ..GraphData::default()
            },
            pairs: HashSet::new(),
            skipped_ports: 0,
            skipped_lanes: 0,
        }
    }

    fn add_port(&mut self, id: &str, name: &str, country: &str, lat: f64, lng: f64) {
        let id = id.trim().to_ascii_uppercase();
        if id.is_empty() || !lat.is_finite() || !lng.is_finite() {
            self.skipped_ports += 1;
            return;
        }
        if self.data.index.contains_key(&id) {
            debug!(port = %id, "duplicate port row ignored");
            return;
        }

        let index = self.data.nodes.len();
        self.data.index.insert(id.clone(), index);
        self.data.nodes.push(PortNode {
            id,
            name: name.to_string(),
            country: country.trim().to_ascii_uppercase(),
            position: Coordinates { lat, lng },
        });
        self.data.adjacency.push(Vec::new());
    }

    fn add_lane(&mut self, lane: &LaneRecord) {
        let from = self.data.index.get(&lane.from.trim().to_ascii_uppercase());
        let to = self.data.index.get(&lane.to.trim().to_ascii_uppercase());
        let (Some(&source), Some(&target)) = (from, to) else {
            self.skipped_lanes += 1;
            return;
        };

        let numbers = [lane.distance_km, lane.transit_hours, lane.cost];
        if source == target || numbers.iter().any(|n| !n.is_finite() || *n < 0.0) {
            self.skipped_lanes += 1;
            return;
        }

        let key = (source.min(target), source.max(target));
        if !self.pairs.insert(key) {
            debug!(from = %lane.from, to = %lane.to, "duplicate lane ignored");
            return;
        }

        let chokepoints: Vec<String> = lane
            .chokepoints
            .iter()
            .map(|id| id.trim().to_ascii_lowercase())
            .filter(|id| !id.is_empty())
            .collect();
        let source_node = &self.data.nodes[source];
        let target_node = &self.data.nodes[target];
        let risk = lane_risk(
            self.risk,
            &source_node.country,
            &target_node.country,
            &chokepoints,
        );

        let forward = LaneEdge {
            from: source_node.id.clone(),
            to: target_node.id.clone(),
            distance_km: lane.distance_km,
            base_transit_hours: lane.transit_hours,
            base_cost: lane.cost,
            mode: lane.mode,
            chokepoints,
            country_risk: risk.country,
            chokepoint_risk: risk.chokepoint,
            risk_score: risk.total,
            source,
            target,
        };
        let reverse = LaneEdge {
            from: forward.to.clone(),
            to: forward.from.clone(),
            source: target,
            target: source,
            ..forward.clone()
        };

        for edge in [forward, reverse] {
            let edge_index = self.data.edges.len();
            self.data.adjacency[edge.source].push(edge_index);
            self.data.edges.push(edge);
        }
    }

    fn finish(mut self) -> RouteGraph {
        let GraphData {
            nodes,
            edges,
            adjacency,
            ..
        } = &mut self.data;
        for neighbours in adjacency.iter_mut() {
            neighbours.sort_by(|&a, &b| nodes[edges[a].target].id.cmp(&nodes[edges[b].target].id));
        }

        RouteGraph {
            data: Arc::new(self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::PortRecord;
    use crate::risk::{RiskFactors, StaticRiskTable};

    fn port(id: &str, country: &str, lat: f64, lng: f64) -> PortRecord {
        PortRecord {
            id: id.to_string(),
            name: id.to_string(),
            country: country.to_string(),
            lat,
            lng,
        }
    }

    fn lane(from: &str, to: &str, chokepoints: &[&str]) -> LaneRecord {
        LaneRecord {
            from: from.to_string(),
            to: to.to_string(),
            distance_km: 100.0,
            transit_hours: 5.0,
            cost: 50.0,
            mode: TransportMode::Sea,
            chokepoints: chokepoints.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn risk_table() -> StaticRiskTable {
        StaticRiskTable::new(
            [
                ("AA".to_string(), RiskFactors::uniform(0.2)),
                ("BB".to_string(), RiskFactors::uniform(0.6)),
            ],
            [
                ("narrows".to_string(), 0.5),
                ("gate".to_string(), 0.9),
            ],
        )
    }

    #[test]
    fn haversine_matches_known_distance() {
        let rotterdam = Coordinates {
            lat: 51.95,
            lng: 4.14,
        };
        let felixstowe = Coordinates {
            lat: 51.96,
            lng: 1.35,
        };
        let km = rotterdam.distance_km(&felixstowe);
        assert!((km - 191.0).abs() < 5.0, "unexpected distance {km}");
        assert_eq!(rotterdam.distance_km(&rotterdam), 0.0);
    }

    #[test]
    fn lane_risk_averages_countries_and_caps_chokepoints() {
        let table = risk_table();
        let plain = lane_risk(&table, "AA", "BB", &[]);
        assert!((plain.country - 0.4).abs() < 1e-9);
        assert_eq!(plain.chokepoint, 0.0);

        let single = lane_risk(&table, "AA", "AA", &["narrows".to_string()]);
        assert!((single.chokepoint - 0.25).abs() < 1e-9);
        assert!((single.total - 0.45).abs() < 1e-9);

        let stacked = lane_risk(
            &table,
            "AA",
            "AA",
            &["narrows".to_string(), "gate".to_string()],
        );
        assert_eq!(stacked.chokepoint, CHOKEPOINT_CAP);
    }

    #[test]
    fn lane_risk_is_clamped() {
        let table = StaticRiskTable::new(
            [("HI".to_string(), RiskFactors::uniform(1.0))],
            [("gate".to_string(), 1.0)],
        );
        let risk = lane_risk(&table, "HI", "HI", &["gate".to_string()]);
        assert_eq!(risk.total, 1.0);
    }

    #[test]
    fn lanes_are_mirrored() {
        let reference = ReferenceData {
            ports: vec![port("A", "AA", 0.0, 0.0), port("B", "BB", 0.0, 1.0)],
            lanes: vec![lane("A", "B", &["narrows"])],
        };
        let graph = build_graph(&reference, &risk_table());

        let forward = graph.lane_between("A", "B").expect("forward lane");
        let reverse = graph.lane_between("B", "A").expect("reverse lane");
        assert_eq!(forward.risk_score, reverse.risk_score);
        assert_eq!(forward.base_transit_hours, reverse.base_transit_hours);
        assert_eq!(forward.chokepoints, reverse.chokepoints);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let mut bad_numbers = lane("A", "B", &[]);
        bad_numbers.distance_km = f64::NAN;
        let reference = ReferenceData {
            ports: vec![
                port("A", "AA", 0.0, 0.0),
                port("B", "AA", 0.0, 1.0),
                port("", "AA", 0.0, 2.0),
                port("C", "AA", f64::INFINITY, 0.0),
            ],
            lanes: vec![
                lane("A", "ZZZZZ", &[]),
                lane("A", "A", &[]),
                bad_numbers,
                lane("a", "b", &[]),
                lane("B", "A", &[]),
            ],
        };
        let graph = build_graph(&reference, &risk_table());

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2, "only one lane survives");
        assert!(graph.lane_between("A", "A").is_none());
    }

    #[test]
    fn augmentation_rows_extend_the_graph() {
        let reference = ReferenceData {
            ports: vec![
                port("A", "AA", 0.0, 0.0),
                port("B", "AA", 0.0, 1.0),
                port("C", "AA", 0.0, 2.0),
            ],
            lanes: vec![lane("A", "B", &[])],
        };
        let rows = vec![
            AugmentationRow {
                from: "B".to_string(),
                to: "C".to_string(),
                distance: 120.0,
                time: 6.0,
                from_country: Some("AA".to_string()),
                to_country: Some("AA".to_string()),
            },
            AugmentationRow {
                from: "B".to_string(),
                to: "NOWHERE".to_string(),
                distance: 1.0,
                time: 1.0,
                from_country: None,
                to_country: None,
            },
        ];
        let graph = build_graph_with_rows(&reference, &risk_table(), &rows);

        let added = graph.lane_between("C", "B").expect("augmented lane");
        assert_eq!(added.base_cost, 120.0 * AUGMENTED_COST_PER_KM);
        assert!(added.chokepoints.is_empty());
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn static_lanes_win_over_augmentation_rows() {
        let reference = ReferenceData {
            ports: vec![port("A", "AA", 0.0, 0.0), port("B", "AA", 0.0, 1.0)],
            lanes: vec![lane("A", "B", &["narrows"])],
        };
        let rows = vec![AugmentationRow {
            from: "B".to_string(),
            to: "A".to_string(),
            distance: 300.0,
            time: 2.0,
            from_country: None,
            to_country: None,
        }];
        let graph = build_graph_with_rows(&reference, &risk_table(), &rows);

        assert_eq!(graph.edge_count(), 2);
        for (from, to) in [("A", "B"), ("B", "A")] {
            let edge = graph.lane_between(from, to).expect("static lane");
            assert_eq!(edge.base_transit_hours, 5.0);
            assert_eq!(edge.base_cost, 50.0);
            assert_eq!(edge.distance_km, 100.0);
            assert_eq!(edge.chokepoints, vec!["narrows".to_string()]);
        }
    }

    #[test]
    fn neighbours_are_sorted_by_target_id() {
        let reference = ReferenceData {
            ports: vec![
                port("HUB", "AA", 0.0, 0.0),
                port("ZED", "AA", 0.0, 1.0),
                port("ALF", "AA", 1.0, 0.0),
                port("MID", "AA", 1.0, 1.0),
            ],
            lanes: vec![
                lane("HUB", "ZED", &[]),
                lane("HUB", "ALF", &[]),
                lane("MID", "HUB", &[]),
            ],
        };
        let graph = build_graph(&reference, &risk_table());
        let hub = graph.node_index("hub").unwrap();
        let targets: Vec<_> = graph.neighbours(hub).map(|e| e.to.as_str()).collect();
        assert_eq!(targets, vec!["ALF", "MID", "ZED"]);
        assert_eq!(graph.degree(hub), 3);
    }

    #[test]
    fn builtin_network_is_symmetric() {
        let graph = build_graph(&ReferenceData::builtin(), &StaticRiskTable::builtin());
        assert!(graph.node_count() > 30);
        for edge in graph.edges() {
            let reverse = graph
                .lane_between(&edge.to, &edge.from)
                .expect("every lane is mirrored");
            assert_eq!(reverse.risk_score, edge.risk_score);
            assert_eq!(reverse.base_transit_hours, edge.base_transit_hours);
            assert!((0.0..=1.0).contains(&edge.risk_score));
            assert_ne!(edge.from, edge.to);
        }
    }
}
