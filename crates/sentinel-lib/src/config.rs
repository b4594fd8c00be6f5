//! Runtime configuration for data sources.
//!
//! Each setting is taken from explicit overrides first, then `SENTINEL_*`
//! environment variables, then files in the platform config directory, and
//! finally the data embedded in the crate.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use tracing::debug;

use crate::augment::{AugmentationSource, HttpAugmentationSource, DEFAULT_AUGMENT_TIMEOUT};
use crate::error::{Error, Result};
use crate::graph::{build_graph_with_augmentation, RouteGraph};
use crate::reference::ReferenceData;
use crate::risk::StaticRiskTable;

/// Environment variable overriding the reference data file.
pub const REFERENCE_PATH_ENV: &str = "SENTINEL_REFERENCE_PATH";
/// Environment variable overriding the risk table file.
pub const RISK_PATH_ENV: &str = "SENTINEL_RISK_PATH";
/// Environment variable enabling live augmentation from a URL.
pub const AUGMENT_URL_ENV: &str = "SENTINEL_AUGMENT_URL";
/// Environment variable setting the augmentation timeout in whole seconds.
pub const AUGMENT_TIMEOUT_ENV: &str = "SENTINEL_AUGMENT_TIMEOUT_SECS";

/// Reference data file looked up in the platform configuration directory.
pub const REFERENCE_FILENAME: &str = "reference.json";
/// Risk table file looked up in the platform configuration directory.
pub const RISK_FILENAME: &str = "risk.json";

/// Values supplied explicitly by the caller, typically from CLI flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub reference_path: Option<PathBuf>,
    pub risk_path: Option<PathBuf>,
    pub augment_url: Option<String>,
    pub augment_timeout: Option<Duration>,
    /// Skip augmentation even if the environment configures it.
    pub offline: bool,
}

/// Resolved data sources for building a [`RouteGraph`].
///
/// Each value is taken from the first of: explicit override, environment
/// variable, file in the platform configuration directory, built-in data.
#[derive(Debug, Clone, PartialEq)]
pub struct SentinelConfig {
    /// Reference data file; `None` selects the embedded network.
    pub reference_path: Option<PathBuf>,
    /// Risk table file; `None` selects the embedded tables.
    pub risk_path: Option<PathBuf>,
    pub augment_url: Option<String>,
    pub augment_timeout: Duration,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            reference_path: None,
            risk_path: None,
            augment_url: None,
            augment_timeout: DEFAULT_AUGMENT_TIMEOUT,
        }
    }
}

impl SentinelConfig {
    /// Resolve configuration from overrides, the process environment and the
    /// platform configuration directory.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let config_dir = match default_config_dir() {
            Ok(dir) => Some(dir),
            Err(err) => {
                debug!(error = %err, "no configuration directory; skipping config files");
                None
            }
        };
        Self::resolve_with(overrides, |key| env::var(key).ok(), config_dir.as_deref())
    }

    /// Resolve configuration with an explicit environment lookup and
    /// configuration directory.
    pub fn resolve_with<F>(
        overrides: ConfigOverrides,
        lookup: F,
        config_dir: Option<&Path>,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let config_file = |name: &str| {
            config_dir
                .map(|dir| dir.join(name))
                .filter(|path| path.is_file())
        };

        let reference_path = overrides
            .reference_path
            .or_else(|| var(REFERENCE_PATH_ENV).map(PathBuf::from))
            .or_else(|| config_file(REFERENCE_FILENAME));
        let risk_path = overrides
            .risk_path
            .or_else(|| var(RISK_PATH_ENV).map(PathBuf::from))
            .or_else(|| config_file(RISK_FILENAME));

        let augment_url = if overrides.offline {
            None
        } else {
            overrides.augment_url.or_else(|| var(AUGMENT_URL_ENV))
        };

        let augment_timeout = match overrides.augment_timeout {
            Some(timeout) => timeout,
            None => match var(AUGMENT_TIMEOUT_ENV) {
                Some(raw) => parse_timeout(&raw)?,
                None => DEFAULT_AUGMENT_TIMEOUT,
            },
        };

        let config = Self {
            reference_path,
            risk_path,
            augment_url,
            augment_timeout,
        };
        debug!(?config, "resolved configuration");
        Ok(config)
    }

    /// Load the configured reference data.
    pub fn load_reference(&self) -> Result<ReferenceData> {
        match &self.reference_path {
            Some(path) => ReferenceData::from_path(path),
            None => Ok(ReferenceData::builtin()),
        }
    }

    /// Load the configured risk tables.
    pub fn load_risk(&self) -> Result<StaticRiskTable> {
        match &self.risk_path {
            Some(path) => StaticRiskTable::from_path(path),
            None => Ok(StaticRiskTable::builtin()),
        }
    }

    /// Augmentation source, when a URL is configured.
    pub fn augmentation_source(&self) -> Option<HttpAugmentationSource> {
        self.augment_url
            .as_ref()
            .map(|url| HttpAugmentationSource::new(url.clone()).with_timeout(self.augment_timeout))
    }

    /// Load every configured source and build the route graph.
    ///
    /// File errors are returned; a failing augmentation fetch only logs.
    pub fn build_graph(&self) -> Result<RouteGraph> {
        let reference = self.load_reference()?;
        let risk = self.load_risk()?;
        let source = self.augmentation_source();
        Ok(build_graph_with_augmentation(
            &reference,
            &risk,
            source.as_ref().map(|s| s as &dyn AugmentationSource),
        ))
    }
}

/// Platform configuration directory searched for data files.
pub fn default_config_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("org", "sentinel-zero", "sentinel").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.config_dir().to_path_buf())
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| Error::InvalidConfigValue {
            key: AUGMENT_TIMEOUT_ENV,
            value: raw.to_string(),
        })
}
