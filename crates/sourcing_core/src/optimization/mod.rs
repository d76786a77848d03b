//! Portfolio optimizer
//!
//! Turns per-supplier per-unit cost summaries into order allocation weights
//! that minimize `E[cost] + λ · Var[cost]`, treating suppliers as independent.
//! Strategies share the same mean-variance core and differ only in their
//! constraints.
//!
//! # Example
//!
//! ```ignore
//! use sourcing_core::optimization::{AllocationConfig, SupplierCost, optimize};
//!
//! let costs = vec![
//!     SupplierCost::new("China", 47_800.0, 2.1e6),
//!     SupplierCost::new("Mexico", 49_300.0, 4.0e5),
//! ];
//! let result = optimize(&costs, &AllocationConfig::with_risk_aversion(0.001))?;
//! for (supplier, weight) in result.sorted_allocations() {
//!     println!("{supplier}: {:.1}%", weight * 100.0);
//! }
//! ```

mod config;
mod mean_variance;
mod result;
mod yield_floor;

pub use config::{
    AllocationConfig, AllocationStrategy, DEFAULT_RISK_AVERSION, SupplierCost, WeightBounds,
};
pub use result::OptimizationResult;

use std::collections::{HashMap, HashSet};

use crate::error::OptimizationError;
use crate::model::SupplierSimulation;

use mean_variance::{Term, solve};
use yield_floor::solve_with_floor;

/// Main optimization entry point
///
/// Validates the inputs, then solves the configured strategy. Every failure
/// comes back as an [`OptimizationError`]; a returned result always holds
/// non-negative weights summing to one.
///
/// # Errors
/// - [`OptimizationError::NoSuppliers`] for an empty cost list
/// - [`OptimizationError::InvalidCost`] for a non-finite mean, a negative or
///   non-finite variance, or a duplicated supplier name
/// - [`OptimizationError::InvalidRiskAversion`] when λ is negative or NaN
/// - [`OptimizationError::Degenerate`] when no supplier has any cost variance
/// - [`OptimizationError::Infeasible`] when the bounds or the yield floor
///   cannot be met
pub fn optimize(
    costs: &[SupplierCost],
    config: &AllocationConfig,
) -> Result<OptimizationResult, OptimizationError> {
    if costs.is_empty() {
        return Err(OptimizationError::NoSuppliers);
    }

    let lambda = config.risk_aversion;
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(OptimizationError::InvalidRiskAversion(lambda));
    }

    validate_costs(costs)?;

    if costs.iter().all(|c| c.variance == 0.0) {
        return Err(OptimizationError::Degenerate);
    }

    let mut terms = Vec::with_capacity(costs.len());
    for cost in costs {
        let bounds = config.bounds_for(&cost.supplier);
        if !bounds.is_valid() {
            return Err(OptimizationError::Infeasible(format!(
                "invalid weight bounds [{}, {}] for {}",
                bounds.min, bounds.max, cost.supplier
            )));
        }
        terms.push(Term {
            mean: cost.mean,
            curvature: 2.0 * lambda * cost.variance,
            bounds,
        });
    }

    let (solution, multiplier) = match config.strategy {
        AllocationStrategy::MeanVariance => {
            (solve(&terms, config.tolerance, config.max_iterations)?, None)
        }
        AllocationStrategy::YieldFloor {
            min_delivered_fraction,
        } => {
            if !min_delivered_fraction.is_finite() {
                return Err(OptimizationError::Infeasible(format!(
                    "delivered fraction floor {min_delivered_fraction} is not finite"
                )));
            }
            let fractions: Vec<f64> = costs.iter().map(|c| c.delivered_fraction).collect();
            let floored = solve_with_floor(
                &terms,
                &fractions,
                min_delivered_fraction,
                config.tolerance,
                config.max_iterations,
            )?;
            (floored.solution, floored.multiplier)
        }
    };

    let weights = solution.weights;
    let expected_cost: f64 = weights.iter().zip(costs).map(|(w, c)| w * c.mean).sum();
    let cost_variance: f64 = weights
        .iter()
        .zip(costs)
        .map(|(w, c)| w * w * c.variance)
        .sum();
    let delivered_fraction: f64 = weights
        .iter()
        .zip(costs)
        .map(|(w, c)| w * c.delivered_fraction)
        .sum();

    let allocations: HashMap<String, f64> = costs
        .iter()
        .zip(&weights)
        .map(|(c, w)| (c.supplier.clone(), w.max(0.0)))
        .collect();

    Ok(OptimizationResult {
        allocations,
        expected_cost,
        cost_variance,
        objective_value: expected_cost + lambda * cost_variance,
        risk_aversion: lambda,
        delivered_fraction,
        yield_floor_multiplier: multiplier,
        iterations: solution.iterations,
    })
}

fn validate_costs(costs: &[SupplierCost]) -> Result<(), OptimizationError> {
    let mut seen = HashSet::with_capacity(costs.len());
    for cost in costs {
        let invalid = |reason| OptimizationError::InvalidCost {
            supplier: cost.supplier.clone(),
            reason,
        };
        if !seen.insert(cost.supplier.as_str()) {
            return Err(invalid("duplicate supplier"));
        }
        if !cost.mean.is_finite() {
            return Err(invalid("mean is not finite"));
        }
        if !cost.variance.is_finite() || cost.variance < 0.0 {
            return Err(invalid("variance must be finite and non-negative"));
        }
        if !(0.0..=1.0).contains(&cost.delivered_fraction) {
            return Err(invalid("delivered fraction must lie in [0, 1]"));
        }
    }
    Ok(())
}

/// Optimize directly from simulation results, one cost summary per supplier
pub fn optimize_simulations(
    simulations: &[SupplierSimulation],
    config: &AllocationConfig,
) -> Result<OptimizationResult, OptimizationError> {
    let costs: Vec<SupplierCost> = simulations.iter().map(SupplierCost::from_simulation).collect();
    optimize(&costs, config)
}
