#![allow(dead_code)]

use sentinel_lib::reference::{LaneRecord, PortRecord};
use sentinel_lib::{build_graph, ReferenceData, RiskFactors, RouteGraph, StaticRiskTable};

pub fn port(id: &str, country: &str, lat: f64, lng: f64) -> PortRecord {
    PortRecord {
        id: id.to_string(),
        name: format!("Port {id}"),
        country: country.to_string(),
        lat,
        lng,
    }
}

pub fn lane(from: &str, to: &str, km: f64, hours: f64, chokepoints: &[&str]) -> LaneRecord {
    LaneRecord {
        from: from.to_string(),
        to: to.to_string(),
        distance_km: km,
        transit_hours: hours,
        cost: km / 2.0,
        mode: Default::default(),
        chokepoints: chokepoints.iter().map(|c| c.to_string()).collect(),
    }
}

/// A(AA) - B(BB) - C(CC) with no direct A-C lane and no risk data.
pub fn chain_graph() -> RouteGraph {
    let reference = ReferenceData {
        ports: vec![
            port("A", "AA", 0.0, 0.0),
            port("B", "BB", 0.0, 9.0),
            port("C", "CC", 0.0, 17.0),
        ],
        lanes: vec![
            lane("A", "B", 1000.0, 40.0, &[]),
            lane("B", "C", 900.0, 36.0, &[]),
        ],
    };
    build_graph(&reference, &StaticRiskTable::default())
}

/// Two parallel A -> C paths.
///
/// A-B-C is short (20 h) and risky (0.8 per lane). A-D-C is slow (60 h) and
/// its lanes carry half of `d_country_risk`.
pub fn parallel_graph(d_country_risk: f64) -> RouteGraph {
    let reference = ReferenceData {
        ports: vec![
            port("A", "AA", 0.0, 0.0),
            port("B", "HI", 0.0, 4.0),
            port("C", "AA", 0.0, 8.0),
            port("D", "LO", 4.0, 4.0),
        ],
        lanes: vec![
            lane("A", "B", 450.0, 10.0, &["hot"]),
            lane("B", "C", 450.0, 10.0, &["hot"]),
            lane("A", "D", 650.0, 30.0, &[]),
            lane("D", "C", 650.0, 30.0, &[]),
        ],
    };
    let risk = StaticRiskTable::new(
        [
            ("AA".to_string(), RiskFactors::ZERO),
            ("HI".to_string(), RiskFactors::uniform(0.8)),
            ("LO".to_string(), RiskFactors::uniform(d_country_risk)),
        ],
        [("hot".to_string(), 0.8)],
    );
    build_graph(&reference, &risk)
}

/// Network bundled with the library.
pub fn builtin_graph() -> RouteGraph {
    build_graph(&ReferenceData::builtin(), &StaticRiskTable::builtin())
}
