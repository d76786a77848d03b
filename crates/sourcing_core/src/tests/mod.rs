//! Integration tests for the sourcing simulation engine
//!
//! Tests are organized by topic:
//! - `simulation` - Aggregator determinism and exact end-to-end scenarios
//! - `optimization` - Allocation properties across risk aversion sweeps
//! - `sensitivity` - Tornado sweep skipping and ranking
//! - `portfolio` - Simulation to allocation to order recommendation

mod optimization;

use crate::model::{
    CostDistribution, CostDrivers, CountryParams, RiskParams, TariffParams, TradeParams,
};

/// Driver means used by the deterministic fixtures, in summation order
pub(crate) const FIXED_MEANS: [f64; 7] = [30.0, 4.0, 4.0, 12.0, 4.0, 5.0, 10.0];

/// A supplier with zero-spread drivers and no risk at all
pub(crate) fn riskless_supplier() -> CountryParams {
    let fixed = |mean: f64| CostDistribution::Normal { mean, std: 0.0 };
    let [raw, labor, indirect, logistics, electricity, depreciation, working_capital] = FIXED_MEANS;
    CountryParams {
        drivers: CostDrivers {
            raw: fixed(raw),
            labor: fixed(labor),
            indirect: fixed(indirect),
            logistics: fixed(logistics),
            electricity: fixed(electricity),
            depreciation: fixed(depreciation),
            working_capital: fixed(working_capital),
            yield_params: CostDistribution::Beta { a: 19.0, b: 1.0 },
        },
        trade: TradeParams {
            tariff: TariffParams { fixed: 0.0 },
            tariff_escalation: 0.0,
            currency_std: 0.0,
        },
        risks: RiskParams {
            disruption_lambda: 0.0,
            disruption_min_impact: 100.0,
            disruption_max_impact: 1_000.0,
            disruption_days_delayed: 10.0,
            border_delay_lambda: 0.0,
            border_min_impact: 100.0,
            border_max_impact: 1_000.0,
            border_days_delayed: 20.0,
            damage_probability: 0.0,
            defective_probability: 0.0,
            quality_days_delayed: 15.0,
            cancellation_probability: 0.0,
            cancellation_days_delayed: 90.0,
        },
    }
}
