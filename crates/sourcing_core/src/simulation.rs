//! Monte Carlo aggregator
//!
//! Combines the continuous sampler and the discrete risk generator into
//! per-trial total cost and lost units for a supplier. Landed cost per unit
//! is
//!
//! ```text
//! base_unit × (1 + tariff × (1 + escalation)) × (1 + currency_shock)
//! ```
//!
//! and the trial total is `landed_unit × order_size` plus every risk
//! channel's cost.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::SimulationError;
use crate::model::{
    CountryParams, EconomicAssumptions, SimulationResult, SupplierRegistry, SupplierSimulation,
};
use crate::risk::DiscreteRiskGenerator;
use crate::sampling::{DEFAULT_BATCH_SIZE, sample_drivers};

/// Default order size used by the presets and the command line
pub const DEFAULT_ORDER_SIZE: u64 = 8_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Units in the order being sourced
    pub order_size: u64,
    /// Number of Monte Carlo trials per supplier
    #[serde(default = "default_trials")]
    pub trials: usize,
    #[serde(default)]
    pub economics: EconomicAssumptions,
}

fn default_trials() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            order_size: DEFAULT_ORDER_SIZE,
            trials: default_trials(),
            economics: EconomicAssumptions::default(),
        }
    }
}

/// Run every trial for one supplier with the given random source.
///
/// Pure in everything except `rng`: two calls with identically seeded
/// sources and the same inputs return identical arrays.
pub fn simulate_supplier<R: Rng + ?Sized>(
    params: &CountryParams,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SimulationResult, SimulationError> {
    if config.trials == 0 {
        return Err(SimulationError::EmptyRun);
    }

    let risks = DiscreteRiskGenerator::for_country(params, config.order_size, config.economics)?;
    let draws = sample_drivers(&params.drivers, rng, config.trials)?;
    let base_unit_costs = draws.base_unit_costs();

    let order = config.order_size as f64;
    let tariff = params.trade.tariff.fixed;

    let mut total_cost = Vec::with_capacity(config.trials);
    let mut lost_units = Vec::with_capacity(config.trials);

    for base_unit in base_unit_costs {
        let escalation = risks.tariff_escalation(rng);
        let currency = risks.currency_shock(rng);
        let landed_unit = base_unit * (1.0 + tariff * (1.0 + escalation)) * (1.0 + currency);

        let trial = risks.draw_trial(rng);
        total_cost.push(landed_unit * order + trial.cost());
        lost_units.push(trial.lost_units());
    }

    Ok(SimulationResult {
        order_size: config.order_size,
        trials: config.trials,
        total_cost,
        lost_units,
        manufacturing_yield: draws.manufacturing_yield,
    })
}

/// Run one supplier with a fresh `SmallRng` seeded from `seed`
pub fn simulate_supplier_seeded(
    params: &CountryParams,
    config: &SimulationConfig,
    seed: u64,
) -> Result<SimulationResult, SimulationError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    simulate_supplier(params, config, &mut rng)
}

/// Derive one sub-seed per supplier from the run seed, in sorted-name order
pub fn supplier_seeds(registry: &SupplierRegistry, seed: u64) -> Vec<(&str, u64)> {
    let mut master = SmallRng::seed_from_u64(seed);
    registry
        .names()
        .into_iter()
        .map(|name| (name, master.next_u64()))
        .collect()
}

/// Simulate every supplier in the registry.
///
/// Suppliers run independently, in parallel when the `parallel` feature is
/// enabled. Results come back in sorted-name order and do not depend on
/// thread scheduling.
pub fn simulate_registry(
    registry: &SupplierRegistry,
    config: &SimulationConfig,
    seed: u64,
) -> Result<Vec<SupplierSimulation>, SimulationError> {
    let seeds = supplier_seeds(registry, seed);

    let run = |(name, supplier_seed): &(&str, u64)| -> Result<SupplierSimulation, SimulationError> {
        let params = registry
            .get(name)
            .ok_or_else(|| SimulationError::UnknownSupplier(name.to_string()))?;
        Ok(SupplierSimulation {
            supplier: name.to_string(),
            result: simulate_supplier_seeded(params, config, *supplier_seed)?,
        })
    };

    #[cfg(feature = "parallel")]
    let results: Result<Vec<_>, _> = seeds.par_iter().map(run).collect();

    #[cfg(not(feature = "parallel"))]
    let results: Result<Vec<_>, _> = seeds.iter().map(run).collect();

    results
}

/// Simulate a single named supplier using the same sub-seed it would get in
/// a full registry run
pub fn simulate_named(
    registry: &SupplierRegistry,
    supplier: &str,
    config: &SimulationConfig,
    seed: u64,
) -> Result<SimulationResult, SimulationError> {
    let params = registry
        .get(supplier)
        .ok_or_else(|| SimulationError::UnknownSupplier(supplier.to_string()))?;
    let supplier_seed = supplier_seeds(registry, seed)
        .into_iter()
        .find_map(|(name, s)| (name == supplier).then_some(s))
        .unwrap_or(seed);
    simulate_supplier_seeded(params, config, supplier_seed)
}
