//! Supplier landed-cost simulation library
//!
//! This crate estimates the distribution of landed cost for sourcing a
//! component from alternative supplier countries and picks a risk-adjusted
//! blend of suppliers. It provides:
//! - A continuous cost-driver sampler over normal, lognormal, gamma,
//!   triangular and beta families
//! - A discrete risk generator (disruption, border delay, quality,
//!   cancellation, tariff escalation, currency shocks)
//! - A Monte Carlo aggregator producing per-trial total cost and lost units
//! - A mean-variance allocation optimizer, optionally with a delivered
//!   fraction floor
//! - A one-at-a-time sensitivity sweep and a portfolio delivery outlook
//!
//! # Example
//!
//! ```ignore
//! use sourcing_core::{
//!     AllocationConfig, SimulationConfig, optimize_simulations, simulate_registry,
//! };
//! use sourcing_core::presets::default_registry;
//!
//! let registry = default_registry();
//! let runs = simulate_registry(&registry, &SimulationConfig::default(), 42)?;
//! let allocation = optimize_simulations(&runs, &AllocationConfig::with_risk_aversion(0.001))?;
//! println!("Blended cost per unit: ${:.2}", allocation.expected_cost);
//! ```
//!
//! The crate performs no I/O and does not log; all outcomes are reported
//! through return values.

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod error;
pub mod optimization;
pub mod risk;
pub mod sampling;
pub mod simulation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;
pub mod presets;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::{
    PortfolioOutlook, SensitivityConfig, SensitivityFactor, SensitivityReport, run_sensitivity,
};
pub use error::{OptimizationError, SamplingError, SimulationError};
pub use model::{CountryParams, EconomicAssumptions, SimulationResult, SupplierRegistry};
pub use optimization::{
    AllocationConfig, AllocationStrategy, OptimizationResult, SupplierCost, optimize,
    optimize_simulations,
};
pub use simulation::{
    SimulationConfig, simulate_named, simulate_registry, simulate_supplier,
    simulate_supplier_seeded,
};
