//! Free-text port resolution.
//!
//! Callers usually type port names, LOCODEs or country codes. A
//! [`PortNormalizer`] turns that text into an identifier the graph understands.
//! Unresolved input passes through uppercased and simply fails to match a
//! port later, which the search reports as an empty result.

use serde::Serialize;
use strsim::jaro_winkler;

use crate::graph::RouteGraph;

/// Minimum Jaro-Winkler similarity accepted by fuzzy name matching.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.85;

/// How a [`PortMatch`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    ExactId,
    Name,
    Country,
    Fuzzy,
    Unresolved,
}

/// Result of normalizing free-text port input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortMatch {
    pub canonical_id: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub match_type: MatchType,
}

impl PortMatch {
    fn unresolved(input: &str) -> Self {
        Self {
            canonical_id: input.to_ascii_uppercase(),
            confidence: 0.0,
            match_type: MatchType::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.match_type != MatchType::Unresolved
    }
}

/// Resolves free-text port or country input to a canonical port id.
pub trait PortNormalizer: Send + Sync {
    fn normalize(&self, input: &str) -> PortMatch;
}

impl PortNormalizer for RouteGraph {
    fn normalize(&self, input: &str) -> PortMatch {
        let input = input.trim();
        if input.is_empty() {
            return PortMatch::unresolved(input);
        }

        if let Some(port) = self.port(input) {
            return PortMatch {
                canonical_id: port.id.clone(),
                confidence: 1.0,
                match_type: MatchType::ExactId,
            };
        }

        if let Some(port) = self
            .ports()
            .iter()
            .find(|port| port.name.eq_ignore_ascii_case(input))
        {
            return PortMatch {
                canonical_id: port.id.clone(),
                confidence: 0.95,
                match_type: MatchType::Name,
            };
        }

        if input.len() == 2 && input.chars().all(|c| c.is_ascii_alphabetic()) {
            let country = input.to_ascii_uppercase();
            if let Some(port) = self
                .ports()
                .iter()
                .filter(|port| port.country == country)
                .min_by(|a, b| a.id.cmp(&b.id))
            {
                return PortMatch {
                    canonical_id: port.id.clone(),
                    confidence: 0.6,
                    match_type: MatchType::Country,
                };
            }
        }

        let needle = input.to_lowercase();
        let best = self
            .ports()
            .iter()
            .map(|port| (port, jaro_winkler(&needle, &port.name.to_lowercase())))
            .filter(|(_, score)| *score >= FUZZY_MATCH_THRESHOLD)
            // Highest score wins; ties go to the lowest id.
            .min_by(|(a, sa), (b, sb)| sb.total_cmp(sa).then_with(|| a.id.cmp(&b.id)));

        match best {
            Some((port, score)) => PortMatch {
                canonical_id: port.id.clone(),
                confidence: score,
                match_type: MatchType::Fuzzy,
            },
            None => PortMatch::unresolved(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::reference::ReferenceData;
    use crate::risk::StaticRiskTable;

    fn graph() -> RouteGraph {
        build_graph(&ReferenceData::builtin(), &StaticRiskTable::builtin())
    }

    #[test]
    fn exact_ids_are_case_insensitive() {
        let matched = graph().normalize(" nlrtm ");
        assert_eq!(matched.canonical_id, "NLRTM");
        assert_eq!(matched.match_type, MatchType::ExactId);
        assert_eq!(matched.confidence, 1.0);
    }

    #[test]
    fn names_resolve_to_ids() {
        let matched = graph().normalize("rotterdam");
        assert_eq!(matched.canonical_id, "NLRTM");
        assert_eq!(matched.match_type, MatchType::Name);
    }

    #[test]
    fn country_codes_pick_lowest_id() {
        let matched = graph().normalize("cn");
        assert_eq!(matched.canonical_id, "CNNGB");
        assert_eq!(matched.match_type, MatchType::Country);
    }

    #[test]
    fn misspelled_names_match_fuzzily() {
        let matched = graph().normalize("Rotterdamm");
        assert_eq!(matched.canonical_id, "NLRTM");
        assert_eq!(matched.match_type, MatchType::Fuzzy);
        assert!(matched.confidence >= FUZZY_MATCH_THRESHOLD);
    }

    #[test]
    fn unknown_input_passes_through_uppercased() {
        let matched = graph().normalize("atlantis-xq");
        assert_eq!(matched.canonical_id, "ATLANTIS-XQ");
        assert!(!matched.is_resolved());
        assert_eq!(matched.confidence, 0.0);
    }
}
