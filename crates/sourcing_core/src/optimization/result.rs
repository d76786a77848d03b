//! Allocation result types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A valid allocation: non-negative weights summing to one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Supplier name -> share of the order
    pub allocations: HashMap<String, f64>,

    /// Blended expected per-unit cost `Σ w_i μ_i`
    pub expected_cost: f64,

    /// Blended per-unit cost variance `Σ w_i² σ_i²` (suppliers independent)
    pub cost_variance: f64,

    /// `expected_cost + λ · cost_variance`
    pub objective_value: f64,

    pub risk_aversion: f64,

    /// Expected fraction of the order delivered under this allocation
    pub delivered_fraction: f64,

    /// Lagrange multiplier of the yield floor, when it was binding
    pub yield_floor_multiplier: Option<f64>,

    /// Bisection steps performed
    pub iterations: usize,
}

impl OptimizationResult {
    pub fn weight(&self, supplier: &str) -> f64 {
        self.allocations.get(supplier).copied().unwrap_or(0.0)
    }

    /// Allocations from largest to smallest share, ties by name
    pub fn sorted_allocations(&self) -> Vec<(&str, f64)> {
        let mut sorted: Vec<(&str, f64)> = self
            .allocations
            .iter()
            .map(|(name, weight)| (name.as_str(), *weight))
            .collect();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        sorted
    }
}
