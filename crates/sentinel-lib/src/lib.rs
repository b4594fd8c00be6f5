//! Sentinel maritime rerouting library.
//!
//! This crate builds an immutable port/lane graph from reference data and a
//! risk snapshot, searches it for ranked routes under competing objectives and
//! exclusion constraints, and aggregates the results into rerouting
//! recommendations. Higher-level consumers (the CLI) should only depend on the
//! functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod augment;
pub mod config;
pub mod error;
pub mod graph;
pub mod normalize;
pub mod objective;
pub mod output;
pub mod path;
pub mod reference;
pub mod resilience;
pub mod risk;
pub mod routing;
pub mod scoring;

pub use augment::{
    parse_augmentation_rows, AugmentationRow, AugmentationSource, HttpAugmentationSource,
};
pub use config::{ConfigOverrides, SentinelConfig};
pub use error::{Error, Result};
pub use graph::{
    build_graph, build_graph_with_augmentation, build_graph_with_rows, LaneEdge, PortNode,
    RouteGraph,
};
pub use normalize::{MatchType, PortMatch, PortNormalizer};
pub use objective::{BalancedWeights, CostModel, Objective};
pub use output::{ChokepointTable, Render, RenderMode, RouteList};
pub use path::{find_paths, SearchOptions};
pub use reference::{ReferenceData, TransportMode};
pub use resilience::{analyze_route_resilience, get_chokepoint_risks, ResilienceReport};
pub use risk::{ChokepointInfo, RiskFactors, RiskLevel, RiskProvider, StaticRiskTable};
pub use routing::{
    find_rerouting_alternatives, find_rerouting_alternatives_with_normalizer, RerouteRequest,
    ReroutingReport, RouteAlternative, Strategy,
};
pub use scoring::{score_path, RiskBreakdown, ScoredRoute};
