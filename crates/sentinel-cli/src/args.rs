//! Command-line argument types and their conversion into library requests.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};

use sentinel_lib::{BalancedWeights, ConfigOverrides, Objective, RerouteRequest, SearchOptions};

/// Data source options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Reference data JSON file (ports and lanes).
    #[arg(long, global = true, value_name = "PATH")]
    pub reference: Option<PathBuf>,

    /// Risk table JSON file (countries and chokepoints).
    #[arg(long, global = true, value_name = "PATH")]
    pub risk: Option<PathBuf>,

    /// URL returning augmentation lane rows as a JSON array.
    #[arg(long, global = true, value_name = "URL")]
    pub augment_url: Option<String>,

    /// Augmentation request timeout in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub augment_timeout: Option<u64>,

    /// Never fetch augmentation rows.
    #[arg(long, global = true)]
    pub offline: bool,
}

impl DataArgs {
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            reference_path: self.reference.clone(),
            risk_path: self.risk.clone(),
            augment_url: self.augment_url.clone(),
            augment_timeout: self.augment_timeout.map(Duration::from_secs),
            offline: self.offline,
        }
    }
}

/// Hard constraints applied to a search.
#[derive(Args, Debug, Clone)]
pub struct ConstraintArgs {
    /// Country codes to avoid (repeatable or comma separated).
    #[arg(long = "avoid-country", value_delimiter = ',', value_name = "CODE")]
    pub avoid_countries: Vec<String>,

    /// Port identifiers to avoid (repeatable or comma separated).
    #[arg(long = "avoid-port", value_delimiter = ',', value_name = "ID")]
    pub avoid_ports: Vec<String>,

    /// Chokepoint slugs to avoid (repeatable or comma separated).
    #[arg(long = "avoid-chokepoint", value_delimiter = ',', value_name = "SLUG")]
    pub avoid_chokepoints: Vec<String>,

    /// Maximum running average lane risk, between 0 and 1.
    #[arg(long, default_value_t = 1.0, value_parser = parse_unit)]
    pub max_risk: f64,

    /// Maximum number of lanes in a route.
    #[arg(long, default_value_t = 8)]
    pub max_hops: usize,
}

impl ConstraintArgs {
    pub fn to_request(&self, from: &str, to: &str) -> RerouteRequest {
        RerouteRequest {
            exclude_countries: to_set(&self.avoid_countries),
            exclude_ports: to_set(&self.avoid_ports),
            exclude_chokepoints: to_set(&self.avoid_chokepoints),
            max_risk_threshold: self.max_risk,
            max_hops: self.max_hops,
            ..RerouteRequest::new(from, to)
        }
    }

    pub fn to_search_options(&self, objective: Objective, limit: usize) -> SearchOptions {
        SearchOptions {
            objective,
            max_hops: self.max_hops,
            exclude_countries: to_set(&self.avoid_countries),
            exclude_ports: to_set(&self.avoid_ports),
            exclude_chokepoints: to_set(&self.avoid_chokepoints),
            max_risk_threshold: self.max_risk,
            max_results: limit,
            ..SearchOptions::default()
        }
    }
}

/// Objective selected with `--objective`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ObjectiveArg {
    Risk,
    Time,
    Cost,
    #[default]
    Balanced,
}

/// Weights of the balanced objective.
#[derive(Args, Debug, Clone)]
pub struct WeightArgs {
    /// Weight of transit time in the balanced objective.
    #[arg(long, default_value_t = 0.4)]
    pub time_weight: f64,

    /// Weight of freight cost in the balanced objective.
    #[arg(long, default_value_t = 0.3)]
    pub cost_weight: f64,

    /// Weight of risk in the balanced objective.
    #[arg(long, default_value_t = 0.3)]
    pub risk_weight: f64,
}

impl ObjectiveArg {
    pub fn to_objective(self, weights: &WeightArgs) -> Objective {
        match self {
            ObjectiveArg::Risk => Objective::Risk,
            ObjectiveArg::Time => Objective::Time,
            ObjectiveArg::Cost => Objective::Cost,
            ObjectiveArg::Balanced => Objective::Balanced(BalancedWeights {
                time: weights.time_weight,
                cost: weights.cost_weight,
                risk: weights.risk_weight,
            }),
        }
    }
}

fn to_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_unit(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("`{raw}` must be between 0 and 1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints() -> ConstraintArgs {
        ConstraintArgs {
            avoid_countries: vec!["YE".to_string(), " ".to_string()],
            avoid_ports: vec!["EGPSD".to_string()],
            avoid_chokepoints: vec!["suez_canal".to_string()],
            max_risk: 0.4,
            max_hops: 6,
        }
    }

    #[test]
    fn request_carries_constraints() {
        let request = constraints().to_request("CNSHA", "NLRTM");
        assert_eq!(request.from, "CNSHA");
        assert_eq!(request.exclude_countries.len(), 1);
        assert!(request.exclude_ports.contains("EGPSD"));
        assert_eq!(request.max_risk_threshold, 0.4);
        assert_eq!(request.max_hops, 6);
    }

    #[test]
    fn search_options_use_limit_and_objective() {
        let options = constraints().to_search_options(Objective::Cost, 3);
        assert_eq!(options.max_results, 3);
        assert_eq!(options.objective, Objective::Cost);
        assert!(options.exclude_chokepoints.contains("suez_canal"));
    }

    #[test]
    fn balanced_objective_uses_weights() {
        let weights = WeightArgs {
            time_weight: 1.0,
            cost_weight: 0.0,
            risk_weight: 0.5,
        };
        assert_eq!(
            ObjectiveArg::Balanced.to_objective(&weights),
            Objective::Balanced(BalancedWeights {
                time: 1.0,
                cost: 0.0,
                risk: 0.5
            })
        );
        assert_eq!(ObjectiveArg::Time.to_objective(&weights), Objective::Time);
    }

    #[test]
    fn unit_parser_rejects_out_of_range_values() {
        assert_eq!(parse_unit("0.25"), Ok(0.25));
        assert!(parse_unit("1.5").is_err());
        assert!(parse_unit("high").is_err());
    }
}
