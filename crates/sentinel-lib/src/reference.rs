//! Static port and lane reference tables.
//!
//! The bundled snapshot is embedded at compile time. Callers may point the
//! loader at an alternative JSON document with the same shape:
//!
//! ```json
//! {
//!   "ports": [{ "id": "NLRTM", "name": "Rotterdam", "country": "NL", "lat": 51.95, "lng": 4.14 }],
//!   "lanes": [{ "from": "NLRTM", "to": "GBFXT", "distance_km": 250, "transit_hours": 12, "cost": 180 }]
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const BUILTIN_REFERENCE: &str = include_str!("../data/reference.json");

/// Mode of transport for a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    #[default]
    Sea,
    Air,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            TransportMode::Sea => "sea",
            TransportMode::Air => "air",
        };
        f.write_str(value)
    }
}

/// Port row as stored in the reference tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub id: String,
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
}

/// Lane row as stored in the reference tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneRecord {
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    pub transit_hours: f64,
    pub cost: f64,
    #[serde(default)]
    pub mode: TransportMode,
    #[serde(default)]
    pub chokepoints: Vec<String>,
}

/// Complete set of static reference data used to build a route graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub ports: Vec<PortRecord>,
    #[serde(default)]
    pub lanes: Vec<LaneRecord>,
}

/// Document shape before individual rows are decoded.
#[derive(Debug, Default, Deserialize)]
struct RawReference {
    #[serde(default)]
    ports: Vec<Value>,
    #[serde(default)]
    lanes: Vec<Value>,
}

/// Decode each row on its own, returning the rows that parsed and the number
/// that did not.
pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> (Vec<T>, usize) {
    let mut skipped = 0;
    let decoded = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                debug!(error = %err, "malformed row");
                skipped += 1;
                None
            }
        })
        .collect();
    (decoded, skipped)
}

impl ReferenceData {
    /// Reference data bundled with the crate.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_REFERENCE, "builtin").unwrap_or_default()
    }

    /// Load reference data from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ReferenceDataNotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw, &path.display().to_string())
    }

    /// Parse reference data from a JSON document.
    ///
    /// Only a document that is not a JSON object with `ports`/`lanes` arrays
    /// is an error. Individual rows with missing or mistyped fields are
    /// dropped and counted.
    pub fn from_json_str(raw: &str, source_name: &str) -> Result<Self> {
        let document: RawReference =
            serde_json::from_str(raw).map_err(|err| Error::ReferenceDataParse {
                kind: "reference",
                source_name: source_name.to_string(),
                message: err.to_string(),
            })?;

        let (ports, skipped_ports) = decode_rows::<PortRecord>(document.ports);
        let (lanes, skipped_lanes) = decode_rows::<LaneRecord>(document.lanes);
        if skipped_ports + skipped_lanes > 0 {
            warn!(
                source = source_name,
                skipped_ports,
                skipped_lanes,
                "ignored malformed reference rows"
            );
        }

        let data = ReferenceData { ports, lanes };
        debug!(
            source = source_name,
            ports = data.ports.len(),
            lanes = data.lanes.len(),
            "loaded reference data"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_reference_parses() {
        let data = ReferenceData::from_json_str(BUILTIN_REFERENCE, "builtin")
            .expect("embedded reference data parses");
        assert!(data.ports.iter().any(|port| port.id == "NLRTM"));
        assert!(data
            .lanes
            .iter()
            .any(|lane| lane.chokepoints.contains(&"suez_canal".to_string())));
    }

    #[test]
    fn mode_defaults_to_sea() {
        let raw = r#"{ "lanes": [{ "from": "A", "to": "B", "distance_km": 1, "transit_hours": 1, "cost": 1 }] }"#;
        let data = ReferenceData::from_json_str(raw, "inline").unwrap();
        assert_eq!(data.lanes[0].mode, TransportMode::Sea);
        assert!(data.ports.is_empty());
    }

    #[test]
    fn malformed_rows_do_not_discard_the_document() {
        let raw = r#"{
          "ports": [
            { "id": "A", "name": "Alpha", "country": "AA", "lat": 0.0, "lng": 0.0 },
            { "id": "B", "name": "Bravo", "country": "BB", "lat": 0.0, "lng": 1.0 },
            { "id": "C", "name": "Charlie", "country": "CC", "lat": "north", "lng": 2.0 }
          ],
          "lanes": [
            { "from": "A", "to": "B", "distance_km": 110, "transit_hours": 6, "cost": 90 },
            { "from": "B", "to": "C", "distance_km": 110, "transit_hours": 6 },
            { "from": "A", "to": "C", "distance_km": null, "transit_hours": 6, "cost": 1 }
          ]
        }"#;
        let data = ReferenceData::from_json_str(raw, "inline").expect("document still loads");
        let ids: Vec<_> = data.ports.iter().map(|port| port.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(data.lanes.len(), 1);
        assert_eq!(data.lanes[0].cost, 90.0);
    }

    #[test]
    fn non_json_document_is_an_error() {
        let error = ReferenceData::from_json_str("{ not json", "inline").unwrap_err();
        assert!(matches!(error, Error::ReferenceDataParse { kind: "reference", .. }));

        let error = ReferenceData::from_json_str(r#"{ "lanes": 3 }"#, "inline").unwrap_err();
        assert!(matches!(error, Error::ReferenceDataParse { .. }));
    }

    #[test]
    fn missing_file_is_reported() {
        let error = ReferenceData::from_path(Path::new("/nonexistent/reference.json")).unwrap_err();
        assert!(matches!(error, Error::ReferenceDataNotFound { .. }));
    }
}
