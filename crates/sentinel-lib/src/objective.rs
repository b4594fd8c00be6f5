//! Search objectives implementing the Strategy pattern.
//!
//! Each objective is a small [`CostModel`] that prices a single lane and
//! estimates the remaining cost from a great-circle distance. The search loop
//! only talks to the trait, so every cost function can be exercised on its own.
//!
//! The heuristics are deliberately not admissible for the risk objective: a
//! kilometre says nothing reliable about remaining risk. The search trades
//! optimality guarantees for speed and diversity, and results remain sorted
//! by their actual accumulated cost.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::LaneEdge;

/// Multiplier turning a `[0, 1]` lane risk into search cost units.
pub const RISK_COST_SCALE: f64 = 1000.0;

/// Speed used to convert remaining kilometres into hours.
pub const HEURISTIC_SPEED_KMH: f64 = 40.0;

/// Freight rate used to convert remaining kilometres into cost.
pub const HEURISTIC_COST_PER_KM: f64 = 0.25;

/// Risk units charged per remaining kilometre.
pub const HEURISTIC_RISK_PER_KM: f64 = 0.01;

/// Relative weights of the balanced objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalancedWeights {
    pub time: f64,
    pub cost: f64,
    pub risk: f64,
}

impl Default for BalancedWeights {
    fn default() -> Self {
        Self {
            time: 0.4,
            cost: 0.3,
            risk: 0.3,
        }
    }
}

/// Quantity minimised by the path search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Risk,
    Time,
    Cost,
    Balanced(BalancedWeights),
}

impl Default for Objective {
    fn default() -> Self {
        Objective::Balanced(BalancedWeights::default())
    }
}

impl Objective {
    /// Strategy implementing this objective.
    pub fn cost_model(&self) -> Box<dyn CostModel> {
        match *self {
            Objective::Risk => Box::new(RiskCost),
            Objective::Time => Box::new(TimeCost),
            Objective::Cost => Box::new(FreightCost),
            Objective::Balanced(weights) => Box::new(BalancedCost::new(weights)),
        }
    }

    /// Cost of traversing `edge` under this objective.
    pub fn edge_cost(&self, edge: &LaneEdge) -> f64 {
        self.cost_model().edge_cost(edge)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Objective::Risk => "risk",
            Objective::Time => "time",
            Objective::Cost => "cost",
            Objective::Balanced(_) => "balanced",
        };
        f.write_str(value)
    }
}

/// Trait for objective-specific cost functions.
pub trait CostModel: Send + Sync {
    /// Cost of traversing a single lane.
    fn edge_cost(&self, edge: &LaneEdge) -> f64;

    /// Estimated cost to cover `remaining_km` of great-circle distance.
    fn heuristic(&self, remaining_km: f64) -> f64;
}

/// Minimise accumulated lane risk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskCost;

impl CostModel for RiskCost {
    fn edge_cost(&self, edge: &LaneEdge) -> f64 {
        edge.risk_score * RISK_COST_SCALE
    }

    fn heuristic(&self, remaining_km: f64) -> f64 {
        remaining_km * HEURISTIC_RISK_PER_KM
    }
}

/// Minimise transit hours.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeCost;

impl CostModel for TimeCost {
    fn edge_cost(&self, edge: &LaneEdge) -> f64 {
        edge.base_transit_hours
    }

    fn heuristic(&self, remaining_km: f64) -> f64 {
        remaining_km / HEURISTIC_SPEED_KMH
    }
}

/// Minimise freight cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreightCost;

impl CostModel for FreightCost {
    fn edge_cost(&self, edge: &LaneEdge) -> f64 {
        edge.base_cost
    }

    fn heuristic(&self, remaining_km: f64) -> f64 {
        remaining_km * HEURISTIC_COST_PER_KM
    }
}

/// Weighted blend of time, cost and scaled risk.
#[derive(Debug, Clone, Copy)]
pub struct BalancedCost {
    weights: BalancedWeights,
}

impl BalancedCost {
    /// Negative or non-finite weights are treated as zero.
    pub fn new(weights: BalancedWeights) -> Self {
        let sanitize = |w: f64| if w.is_finite() { w.max(0.0) } else { 0.0 };
        Self {
            weights: BalancedWeights {
                time: sanitize(weights.time),
                cost: sanitize(weights.cost),
                risk: sanitize(weights.risk),
            },
        }
    }
}

impl CostModel for BalancedCost {
    fn edge_cost(&self, edge: &LaneEdge) -> f64 {
        self.weights.time * TimeCost.edge_cost(edge)
            + self.weights.cost * FreightCost.edge_cost(edge)
            + self.weights.risk * RiskCost.edge_cost(edge)
    }

    fn heuristic(&self, remaining_km: f64) -> f64 {
        self.weights.time * TimeCost.heuristic(remaining_km)
            + self.weights.cost * FreightCost.heuristic(remaining_km)
            + self.weights.risk * RiskCost.heuristic(remaining_km)
    }
}
