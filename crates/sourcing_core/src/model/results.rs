//! Simulation outputs
//!
//! Contains the per-trial arrays produced by the aggregator and the summary
//! statistics derived from them.

use serde::{Deserialize, Serialize};

/// Units lost and money spent because of one risk draw
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DiscreteRiskOutcome {
    pub lost_units: u64,
    pub cost: f64,
}

impl DiscreteRiskOutcome {
    pub const NONE: DiscreteRiskOutcome = DiscreteRiskOutcome {
        lost_units: 0,
        cost: 0.0,
    };
}

/// Per-trial results for one supplier.
///
/// `lost_units[i]` is the raw sum of every channel and is not clamped to the
/// order size; a value at or above `order_size` means the whole order was lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub order_size: u64,
    pub trials: usize,
    /// Total landed cost of the full order in each trial
    pub total_cost: Vec<f64>,
    pub lost_units: Vec<u64>,
    /// Sampled manufacturing yield fraction in each trial
    pub manufacturing_yield: Vec<f64>,
}

impl SimulationResult {
    pub fn mean_total_cost(&self) -> f64 {
        mean(&self.total_cost)
    }

    /// Total cost divided by the order size, one value per trial
    pub fn per_unit_costs(&self) -> Vec<f64> {
        let order = self.order_size as f64;
        self.total_cost.iter().map(|c| c / order).collect()
    }

    pub fn mean_lost_units(&self) -> f64 {
        if self.lost_units.is_empty() {
            return 0.0;
        }
        self.lost_units.iter().map(|u| *u as f64).sum::<f64>() / self.lost_units.len() as f64
    }

    pub fn mean_manufacturing_yield(&self) -> f64 {
        mean(&self.manufacturing_yield)
    }

    /// Expected fraction of the order delivered after risk losses, in [0, 1]
    pub fn delivered_fraction(&self) -> f64 {
        if self.order_size == 0 {
            return 0.0;
        }
        let lost = self.mean_lost_units().min(self.order_size as f64);
        1.0 - lost / self.order_size as f64
    }

    pub fn per_unit_summary(&self) -> CostSummary {
        CostSummary::from_samples(&self.per_unit_costs())
    }
}

/// A supplier name paired with its simulation output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierSimulation {
    pub supplier: String,
    pub result: SimulationResult,
}

/// Distribution summary of a cost sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostSummary {
    pub samples: usize,
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p05: f64,
    pub p50: f64,
    pub p95: f64,
}

impl CostSummary {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            samples: samples.len(),
            mean,
            variance,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p05: percentile(&sorted, 0.05),
            p50: percentile(&sorted, 0.50),
            p95: percentile(&sorted, 0.95),
        }
    }
}

/// Linear-interpolated percentile of an already sorted slice
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let rank = p.clamp(0.0, 1.0) * (len - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
