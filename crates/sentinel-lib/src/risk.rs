//! Static risk model for countries and maritime chokepoints.
//!
//! Risk data is reached exclusively through the [`RiskProvider`] trait so the
//! graph builder never depends on where the numbers come from. The bundled
//! [`StaticRiskTable`] is backed by an embedded JSON snapshot and can be
//! replaced by a file on disk or constructed programmatically in tests.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

const BUILTIN_RISK_TABLES: &str = include_str!("../data/risk.json");

/// Per-country risk vector. Every component is normalized into `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFactors {
    pub political: f64,
    pub conflict: f64,
    pub sanctions: f64,
    pub piracy: f64,
    pub weather: f64,
    pub congestion: f64,
}

impl RiskFactors {
    /// Risk vector used for unknown countries.
    pub const ZERO: RiskFactors = RiskFactors {
        political: 0.0,
        conflict: 0.0,
        sanctions: 0.0,
        piracy: 0.0,
        weather: 0.0,
        congestion: 0.0,
    };

    /// Uniform risk vector, mostly useful for fixtures.
    pub fn uniform(value: f64) -> Self {
        let value = clamp_unit(value);
        Self {
            political: value,
            conflict: value,
            sanctions: value,
            piracy: value,
            weather: value,
            congestion: value,
        }
    }

    /// Mean of the security-related components (political, conflict,
    /// sanctions, piracy) that feed lane risk.
    pub fn security_mean(&self) -> f64 {
        (self.political + self.conflict + self.sanctions + self.piracy) / 4.0
    }

    fn clamped(self) -> Self {
        Self {
            political: clamp_unit(self.political),
            conflict: clamp_unit(self.conflict),
            sanctions: clamp_unit(self.sanctions),
            piracy: clamp_unit(self.piracy),
            weather: clamp_unit(self.weather),
            congestion: clamp_unit(self.congestion),
        }
    }
}

/// Snapshot entry for a single chokepoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChokepointInfo {
    pub id: String,
    pub name: String,
    pub risk: f64,
    pub level: RiskLevel,
}

/// Coarse risk bucket shown to users alongside raw scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Bucket a `[0, 1]` risk score.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            RiskLevel::Critical
        } else if score >= 0.5 {
            RiskLevel::High
        } else if score >= 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(value)
    }
}

/// Source of country and chokepoint risk used when building the route graph.
///
/// Lookups never fail: unknown keys contribute zero risk.
pub trait RiskProvider: Send + Sync {
    /// Risk factors for an ISO country code.
    fn country_risk(&self, country_code: &str) -> RiskFactors;

    /// Scalar risk for a chokepoint slug such as `suez_canal`.
    fn chokepoint_risk(&self, chokepoint_id: &str) -> f64;

    /// Snapshot of every chokepoint known to the provider, ordered by id.
    fn chokepoints(&self) -> Vec<ChokepointInfo>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ChokepointEntry {
    #[serde(default)]
    name: Option<String>,
    risk: f64,
}

#[derive(Debug, Deserialize)]
struct RiskTablesFile {
    #[serde(default)]
    countries: BTreeMap<String, RiskFactors>,
    #[serde(default)]
    chokepoints: BTreeMap<String, ChokepointEntry>,
}

/// Hash-map backed [`RiskProvider`].
#[derive(Debug, Clone, Default)]
pub struct StaticRiskTable {
    countries: HashMap<String, RiskFactors>,
    chokepoints: BTreeMap<String, ChokepointEntry>,
}

impl StaticRiskTable {
    /// Build a table from explicit maps. Values are clamped into `[0, 1]`.
    pub fn new<C, K>(countries: C, chokepoints: K) -> Self
    where
        C: IntoIterator<Item = (String, RiskFactors)>,
        K: IntoIterator<Item = (String, f64)>,
    {
        let countries = countries
            .into_iter()
            .map(|(code, factors)| (code.to_ascii_uppercase(), factors.clamped()))
            .collect();
        let chokepoints = chokepoints
            .into_iter()
            .map(|(id, risk)| {
                (
                    id.to_ascii_lowercase(),
                    ChokepointEntry {
                        name: None,
                        risk: clamp_unit(risk),
                    },
                )
            })
            .collect();
        Self {
            countries,
            chokepoints,
        }
    }

    /// Risk tables bundled with the crate.
    pub fn builtin() -> Self {
        // The embedded snapshot is validated by the unit tests below.
        Self::from_json_str(BUILTIN_RISK_TABLES, "builtin").unwrap_or_default()
    }

    /// Load risk tables from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ReferenceDataNotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw, &path.display().to_string())
    }

    /// Parse risk tables from a JSON document.
    pub fn from_json_str(raw: &str, source_name: &str) -> Result<Self> {
        let file: RiskTablesFile =
            serde_json::from_str(raw).map_err(|err| Error::ReferenceDataParse {
                kind: "risk",
                source_name: source_name.to_string(),
                message: err.to_string(),
            })?;

        let countries: HashMap<String, RiskFactors> = file
            .countries
            .into_iter()
            .map(|(code, factors)| (code.to_ascii_uppercase(), factors.clamped()))
            .collect();
        let chokepoints: BTreeMap<String, ChokepointEntry> = file
            .chokepoints
            .into_iter()
            .map(|(id, entry)| {
                (
                    id.to_ascii_lowercase(),
                    ChokepointEntry {
                        name: entry.name,
                        risk: clamp_unit(entry.risk),
                    },
                )
            })
            .collect();

        debug!(
            source = source_name,
            countries = countries.len(),
            chokepoints = chokepoints.len(),
            "loaded risk tables"
        );

        Ok(Self {
            countries,
            chokepoints,
        })
    }
}

impl RiskProvider for StaticRiskTable {
    fn country_risk(&self, country_code: &str) -> RiskFactors {
        self.countries
            .get(&country_code.to_ascii_uppercase())
            .copied()
            .unwrap_or(RiskFactors::ZERO)
    }

    fn chokepoint_risk(&self, chokepoint_id: &str) -> f64 {
        self.chokepoints
            .get(&chokepoint_id.to_ascii_lowercase())
            .map(|entry| entry.risk)
            .unwrap_or(0.0)
    }

    fn chokepoints(&self) -> Vec<ChokepointInfo> {
        self.chokepoints
            .iter()
            .map(|(id, entry)| ChokepointInfo {
                id: id.clone(),
                name: entry.name.clone().unwrap_or_else(|| display_name(id)),
                risk: entry.risk,
                level: RiskLevel::from_score(entry.risk),
            })
            .collect()
    }
}

/// Clamp a value into `[0, 1]`, mapping NaN to zero.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn display_name(slug: &str) -> String {
    slug.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
