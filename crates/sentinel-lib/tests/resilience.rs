mod common;

use sentinel_lib::resilience::VulnerabilityKind;
use sentinel_lib::{
    analyze_route_resilience, find_paths, get_chokepoint_risks, Objective, RiskLevel,
    SearchOptions,
};

use common::{builtin_graph, parallel_graph};

#[test]
fn audit_of_a_found_route_matches_its_risk() {
    let graph = builtin_graph();
    let routes = find_paths(
        &graph,
        "CNSHA",
        "NLRTM",
        &SearchOptions::for_objective(Objective::Time),
    );
    let route = &routes[0];

    let report = analyze_route_resilience(&graph, &route.port_ids());
    assert!((report.overall_resilience - (1.0 - route.risk_score) * 100.0).abs() < 1e-9);
    assert!((0.0..=100.0).contains(&report.redundancy_score));
    assert!(report
        .vulnerabilities
        .iter()
        .any(|v| v.location == "bab_el_mandeb" && v.severity == RiskLevel::Critical));
    assert!(!report.recommendations.is_empty());
}

#[test]
fn risky_fixture_lanes_are_flagged() {
    let graph = parallel_graph(0.4);
    let report = analyze_route_resilience(&graph, &["A", "B", "C"]);
    let lanes: Vec<_> = report
        .vulnerabilities
        .iter()
        .filter(|v| v.kind == VulnerabilityKind::HighRiskLane)
        .map(|v| v.location.as_str())
        .collect();
    assert_eq!(lanes, vec!["A-B", "B-C"]);
    assert!((report.overall_resilience - 20.0).abs() < 1e-9);
    assert!(report.vulnerabilities.iter().any(|v| v.location == "hot"));

    let safe = analyze_route_resilience(&graph, &["a", "d", "c"]);
    assert!(safe.vulnerabilities.is_empty());
    assert!((safe.overall_resilience - 80.0).abs() < 1e-9);
}

#[test]
fn audit_does_not_require_a_searchable_route() {
    let graph = builtin_graph();
    let report = analyze_route_resilience(&graph, &["USLAX", "NLRTM"]);
    assert_eq!(report.vulnerabilities.len(), 1);
    assert_eq!(report.vulnerabilities[0].kind, VulnerabilityKind::MissingLane);
    assert_eq!(report.vulnerabilities[0].location, "USLAX-NLRTM");
}

#[test]
fn chokepoint_snapshot_is_complete_and_sorted() {
    let graph = builtin_graph();
    let snapshot = get_chokepoint_risks(&graph);
    assert_eq!(snapshot.len(), 10);
    assert!(snapshot.windows(2).all(|pair| pair[0].risk >= pair[1].risk));
    let suez = snapshot
        .iter()
        .find(|info| info.id == "suez_canal")
        .expect("suez listed");
    assert_eq!(suez.name, "Suez Canal");
    assert_eq!(suez.level, RiskLevel::High);
}
