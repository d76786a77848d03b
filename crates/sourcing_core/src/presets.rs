//! Built-in supplier registry and sensitivity factor lists
//!
//! Three candidate countries for a single sourced component: a domestic US
//! plant, a nearshore Mexican plant and an offshore Chinese plant. Per-unit
//! driver costs are in dollars; impacts are in units per event.

use crate::analysis::{ParameterPath, RiskField, SensitivityFactor};
use crate::model::{
    CostDistribution, CostDriver, CostDrivers, CountryParams, DistributionField, RiskParams,
    SupplierRegistry, TariffParams, TradeParams,
};

fn normal(mean: f64, std: f64) -> CostDistribution {
    CostDistribution::Normal { mean, std }
}

fn lognormal(mean: f64, std: f64) -> CostDistribution {
    CostDistribution::LogNormal { mean, std }
}

fn gamma(shape: f64, scale: f64) -> CostDistribution {
    CostDistribution::Gamma { shape, scale }
}

fn triangular(min: f64, mode: f64, max: f64) -> CostDistribution {
    CostDistribution::Triangular { min, mode, max }
}

fn beta(a: f64, b: f64) -> CostDistribution {
    CostDistribution::Beta { a, b }
}

pub fn china() -> CountryParams {
    CountryParams {
        drivers: CostDrivers {
            raw: normal(30.0, 3.0),
            // ~4 ± 0.5
            labor: lognormal(1.379, 0.120),
            indirect: gamma(16.0, 0.25),
            // Real-scale mean 12, std 8: volatile ocean freight
            logistics: lognormal(2.301, 0.606),
            electricity: triangular(3.60, 4.00, 4.40),
            depreciation: normal(5.0, 0.25),
            working_capital: normal(10.0, 1.0),
            // ~0.95 ± 0.03
            yield_params: beta(49.0, 3.0),
        },
        trade: TradeParams {
            tariff: TariffParams { fixed: 0.25 },
            tariff_escalation: 0.15,
            currency_std: 0.03,
        },
        risks: RiskParams {
            disruption_lambda: 0.15,
            disruption_min_impact: 100.0,
            disruption_max_impact: 1_000.0,
            disruption_days_delayed: 10.0,
            // No land border crossing
            border_delay_lambda: 0.0,
            border_min_impact: 100.0,
            border_max_impact: 1_000.0,
            border_days_delayed: 0.0,
            damage_probability: 0.02,
            defective_probability: 0.0,
            quality_days_delayed: 15.0,
            cancellation_probability: 0.15,
            cancellation_days_delayed: 90.0,
        },
    }
}

pub fn mexico() -> CountryParams {
    CountryParams {
        drivers: CostDrivers {
            raw: normal(35.0, 3.5),
            // ~8 ± 1.5
            labor: lognormal(2.0635, 0.1786),
            indirect: gamma(20.66, 0.387),
            logistics: normal(7.0, 0.056),
            electricity: triangular(2.5, 3.0, 3.5),
            depreciation: normal(1.0, 0.05),
            working_capital: normal(6.0, 0.6),
            // ~0.9 ± 0.08
            yield_params: beta(12.0, 1.0),
        },
        trade: TradeParams {
            tariff: TariffParams { fixed: 0.25 },
            tariff_escalation: 0.1,
            currency_std: 0.08,
        },
        risks: RiskParams {
            disruption_lambda: 0.1,
            disruption_min_impact: 500.0,
            disruption_max_impact: 1_500.0,
            disruption_days_delayed: 5.0,
            border_delay_lambda: 0.83,
            border_min_impact: 100.0,
            border_max_impact: 1_000.0,
            border_days_delayed: 20.0,
            damage_probability: 0.015,
            defective_probability: 0.05,
            quality_days_delayed: 5.0,
            cancellation_probability: 0.0001,
            cancellation_days_delayed: 90.0,
        },
    }
}

pub fn us() -> CountryParams {
    CountryParams {
        drivers: CostDrivers {
            raw: normal(40.0, 4.0),
            // ~12 ± 2
            labor: lognormal(2.48, 0.15),
            indirect: gamma(25.0, 0.40),
            logistics: normal(9.0, 0.0),
            electricity: triangular(3.5, 4.0, 4.5),
            depreciation: normal(5.0, 0.25),
            working_capital: normal(5.0, 0.5),
            // ~0.8 ± 0.04
            yield_params: beta(79.0, 20.0),
        },
        trade: TradeParams::default(),
        risks: RiskParams {
            disruption_lambda: 0.002,
            disruption_min_impact: 5_000.0,
            disruption_max_impact: 15_000.0,
            disruption_days_delayed: 20.0,
            border_delay_lambda: 0.0,
            border_min_impact: 0.0,
            border_max_impact: 0.0,
            border_days_delayed: 0.0,
            damage_probability: 0.01,
            defective_probability: 0.0,
            quality_days_delayed: 15.0,
            cancellation_probability: 0.0001,
            cancellation_days_delayed: 90.0,
        },
    }
}

/// Registry with the three built-in countries
pub fn default_registry() -> SupplierRegistry {
    SupplierRegistry::new()
        .with_supplier("China", china())
        .with_supplier("Mexico", mexico())
        .with_supplier("US", us())
}

fn driver_mean(driver: CostDriver) -> SensitivityFactor {
    SensitivityFactor::new(
        format!("{} Mean", driver.label()),
        ParameterPath::driver(driver, DistributionField::Mean),
    )
}

fn risk(field: RiskField) -> SensitivityFactor {
    SensitivityFactor::new(field.label(), ParameterPath::Risk(field))
}

fn trade_factors() -> [SensitivityFactor; 3] {
    [
        SensitivityFactor::new("Tariff (Fixed)", ParameterPath::TariffFixed),
        SensitivityFactor::new("Tariff Escalation", ParameterPath::TariffEscalation),
        SensitivityFactor::new("Currency Volatility", ParameterPath::CurrencyVolatility),
    ]
}

/// Factors for a built-in supplier, or every leaf of `params` for any other
pub fn default_factors(supplier: &str, params: &CountryParams) -> Vec<SensitivityFactor> {
    let mut factors = vec![
        driver_mean(CostDriver::RawMaterial),
        driver_mean(CostDriver::Labor),
    ];

    match supplier {
        "US" => factors.extend([
            risk(RiskField::DisruptionLambda),
            risk(RiskField::DisruptionDaysDelayed),
            risk(RiskField::DamageProbability),
            risk(RiskField::QualityDaysDelayed),
        ]),
        "Mexico" => {
            factors.extend(trade_factors());
            factors.extend([
                risk(RiskField::DisruptionLambda),
                risk(RiskField::DisruptionDaysDelayed),
                risk(RiskField::BorderDelayLambda),
                risk(RiskField::BorderDaysDelayed),
                risk(RiskField::DamageProbability),
                risk(RiskField::DefectiveProbability),
                risk(RiskField::QualityDaysDelayed),
            ]);
        }
        "China" => {
            factors.extend(trade_factors());
            factors.extend([
                risk(RiskField::DisruptionLambda),
                risk(RiskField::DisruptionDaysDelayed),
                risk(RiskField::DamageProbability),
                risk(RiskField::QualityDaysDelayed),
                risk(RiskField::CancellationProbability),
                risk(RiskField::CancellationDaysDelayed),
            ]);
        }
        _ => return all_factors(params),
    }

    factors
}

/// One factor per numeric leaf present in `params`
pub fn all_factors(params: &CountryParams) -> Vec<SensitivityFactor> {
    let mut factors = Vec::new();

    for driver in CostDriver::ALL {
        for field in DistributionField::ALL {
            let path = ParameterPath::driver(driver, field);
            if path.get(params).is_some() {
                factors.push(SensitivityFactor::new(
                    format!("{} {}", driver.label(), field.label()),
                    path,
                ));
            }
        }
    }

    for field in DistributionField::ALL {
        let path = ParameterPath::Yield(field);
        if path.get(params).is_some() {
            factors.push(SensitivityFactor::new(
                format!("Manufacturing Yield {}", field.label()),
                path,
            ));
        }
    }

    factors.extend(trade_factors());
    factors.extend(RiskField::ALL.into_iter().map(risk));
    factors
}
