//! Optional live augmentation rows merged into the static lane network.
//!
//! Augmentation is strictly best-effort. Rows that fail to decode are dropped
//! individually, and the graph builder catches every error returned from an
//! [`AugmentationSource`] and falls back to the static reference data.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::reference::decode_rows;

/// Default timeout applied to the augmentation request.
pub const DEFAULT_AUGMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Lane row supplied by an external graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AugmentationRow {
    pub from: String,
    pub to: String,
    /// Lane length in kilometres.
    pub distance: f64,
    /// Transit time in hours.
    pub time: f64,
    /// Country reported by the store. Informational only: lane risk uses the
    /// country of the matching reference port.
    #[serde(default)]
    pub from_country: Option<String>,
    /// See [`AugmentationRow::from_country`].
    #[serde(default)]
    pub to_country: Option<String>,
}

/// Provider of augmentation rows.
pub trait AugmentationSource {
    /// Human-readable description used in log messages.
    fn describe(&self) -> String;

    /// Fetch the current set of rows.
    fn fetch(&self) -> Result<Vec<AugmentationRow>>;
}

/// Fetches augmentation rows as a JSON array from an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpAugmentationSource {
    url: String,
    timeout: Duration,
}

impl HttpAugmentationSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_AUGMENT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(user_agent())
            .build()
            .map_err(Error::Http)
    }
}

impl AugmentationSource for HttpAugmentationSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Vec<AugmentationRow>> {
        let client = self.client()?;
        debug!(url = %self.url, timeout_ms = self.timeout.as_millis() as u64, "fetching augmentation rows");
        let response = client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::AugmentationStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        let rows = parse_augmentation_rows(&body)?;
        debug!(rows = rows.len(), "received augmentation rows");
        Ok(rows)
    }
}

/// Decode a JSON array of augmentation rows.
///
/// A body that is not a JSON array is an error. Rows inside the array that
/// fail to decode are skipped and counted in a warning.
pub fn parse_augmentation_rows(body: &str) -> Result<Vec<AugmentationRow>> {
    let raw: Vec<Value> = serde_json::from_str(body)?;
    let (rows, skipped) = decode_rows::<AugmentationRow>(raw);
    if skipped > 0 {
        warn!(skipped, kept = rows.len(), "ignored malformed augmentation rows");
    }
    Ok(rows)
}

fn user_agent() -> String {
    format!("sentinel-lib/{}", env!("CARGO_PKG_VERSION"))
}
