//! Portfolio-level delivery outlook for an allocation

use serde::{Deserialize, Serialize};

use crate::model::SupplierSimulation;
use crate::optimization::OptimizationResult;

/// Expected losses of a blended order and the order size needed to cover them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioOutlook {
    pub order_size: u64,
    /// `Σ w_i · mean(lost_units_i)`
    pub expected_lost_units: f64,
    /// `(order_size − expected_lost_units) / order_size`
    pub yield_rate: f64,
    /// Units to order so the expected delivery covers `order_size`;
    /// `f64::INFINITY` when the expected losses consume the whole order
    pub recommended_order_size: f64,
}

impl PortfolioOutlook {
    pub fn new(order_size: u64, expected_lost_units: f64) -> Self {
        if order_size == 0 {
            return Self {
                order_size,
                expected_lost_units,
                yield_rate: 1.0,
                recommended_order_size: 0.0,
            };
        }

        let order = order_size as f64;
        let yield_rate = (order - expected_lost_units) / order;
        let recommended_order_size = if yield_rate > 0.0 {
            (order / yield_rate).floor()
        } else {
            f64::INFINITY
        };

        Self {
            order_size,
            expected_lost_units,
            yield_rate,
            recommended_order_size,
        }
    }

    /// Blend each supplier's mean lost units by its allocation weight.
    ///
    /// Suppliers missing from the allocation contribute nothing.
    pub fn from_allocation(
        allocation: &OptimizationResult,
        simulations: &[SupplierSimulation],
        order_size: u64,
    ) -> Self {
        let expected_lost_units = simulations
            .iter()
            .map(|s| allocation.weight(&s.supplier) * s.result.mean_lost_units())
            .sum();
        Self::new(order_size, expected_lost_units)
    }

    /// Whether any finite order covers the expected losses
    pub fn is_feasible(&self) -> bool {
        self.recommended_order_size.is_finite()
    }
}
