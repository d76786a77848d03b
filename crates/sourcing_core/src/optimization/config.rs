//! Allocation optimizer configuration
//!
//! Defines the per-supplier cost inputs, the strategy (objective plus
//! constraints) and the solver settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{CostSummary, SupplierSimulation};

/// Default risk aversion used by the command line
pub const DEFAULT_RISK_AVERSION: f64 = 5.0;

/// Per-unit cost distribution summary of one supplier, as the optimizer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierCost {
    pub supplier: String,
    /// Expected per-unit cost
    pub mean: f64,
    /// Variance of the per-unit cost
    pub variance: f64,
    /// Expected fraction of the order delivered, used by the yield floor
    pub delivered_fraction: f64,
}

impl SupplierCost {
    pub fn new(supplier: impl Into<String>, mean: f64, variance: f64) -> Self {
        Self {
            supplier: supplier.into(),
            mean,
            variance,
            delivered_fraction: 1.0,
        }
    }

    #[must_use]
    pub fn with_delivered_fraction(mut self, delivered_fraction: f64) -> Self {
        self.delivered_fraction = delivered_fraction;
        self
    }

    /// Summarize an empirical per-unit cost sample
    pub fn from_samples(supplier: impl Into<String>, per_unit_costs: &[f64]) -> Self {
        let summary = CostSummary::from_samples(per_unit_costs);
        Self::new(supplier, summary.mean, summary.variance)
    }

    pub fn from_simulation(simulation: &SupplierSimulation) -> Self {
        let summary = simulation.result.per_unit_summary();
        Self::new(&simulation.supplier, summary.mean, summary.variance)
            .with_delivered_fraction(simulation.result.delivered_fraction())
    }
}

/// Inclusive bounds on one supplier's weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl WeightBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && 0.0 <= self.min && self.min <= self.max
    }
}

/// Which member of the mean-variance family to solve
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AllocationStrategy {
    /// Minimize `E[cost] + λ·Var[cost]` over the weight simplex
    #[default]
    MeanVariance,
    /// Same objective, with the portfolio's expected delivered fraction held
    /// at or above a floor
    YieldFloor { min_delivered_fraction: f64 },
}

/// Complete configuration for an allocation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Weight on cost variance (λ ≥ 0)
    pub risk_aversion: f64,

    pub strategy: AllocationStrategy,

    /// Per-supplier bounds; suppliers not listed get `[0, 1]`
    #[serde(default)]
    pub weight_bounds: HashMap<String, WeightBounds>,

    /// Tolerance on the weight sum during bisection
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Bisection step cap
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_tolerance() -> f64 {
    1e-10
}

fn default_max_iterations() -> usize {
    1_000
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            risk_aversion: DEFAULT_RISK_AVERSION,
            strategy: AllocationStrategy::MeanVariance,
            weight_bounds: HashMap::new(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl AllocationConfig {
    pub fn with_risk_aversion(risk_aversion: f64) -> Self {
        Self {
            risk_aversion,
            ..Default::default()
        }
    }

    pub fn bounds_for(&self, supplier: &str) -> WeightBounds {
        self.weight_bounds
            .get(supplier)
            .copied()
            .unwrap_or_default()
    }
}
