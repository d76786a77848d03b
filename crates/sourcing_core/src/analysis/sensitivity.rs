//! One-at-a-time sensitivity sweep (tornado ranking).
//!
//! Each factor names a numeric leaf of a `CountryParams` through a typed
//! [`ParameterPath`]. The sweep copies the parameters, scales that leaf by
//! `1 − swing` and `1 + swing`, reruns the aggregator for both variants and
//! records the change in mean total cost. Zero leaves are omitted and reruns
//! that fail are reported as skipped; neither stops the batch.

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::SimulationError;
use crate::model::{CostDriver, CountryParams, DistributionField, RiskParams};
use crate::simulation::{SimulationConfig, simulate_supplier_seeded};

/// Default symmetric perturbation, ±20%
pub const DEFAULT_SWING: f64 = 0.20;

/// Scalar risk parameter addressable by a sensitivity factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskField {
    DisruptionLambda,
    DisruptionMinImpact,
    DisruptionMaxImpact,
    DisruptionDaysDelayed,
    BorderDelayLambda,
    BorderMinImpact,
    BorderMaxImpact,
    BorderDaysDelayed,
    DamageProbability,
    DefectiveProbability,
    QualityDaysDelayed,
    CancellationProbability,
    CancellationDaysDelayed,
}

impl RiskField {
    pub const ALL: [RiskField; 13] = [
        RiskField::DisruptionLambda,
        RiskField::DisruptionMinImpact,
        RiskField::DisruptionMaxImpact,
        RiskField::DisruptionDaysDelayed,
        RiskField::BorderDelayLambda,
        RiskField::BorderMinImpact,
        RiskField::BorderMaxImpact,
        RiskField::BorderDaysDelayed,
        RiskField::DamageProbability,
        RiskField::DefectiveProbability,
        RiskField::QualityDaysDelayed,
        RiskField::CancellationProbability,
        RiskField::CancellationDaysDelayed,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RiskField::DisruptionLambda => "disruption_lambda",
            RiskField::DisruptionMinImpact => "disruption_min_impact",
            RiskField::DisruptionMaxImpact => "disruption_max_impact",
            RiskField::DisruptionDaysDelayed => "disruption_days_delayed",
            RiskField::BorderDelayLambda => "border_delay_lambda",
            RiskField::BorderMinImpact => "border_min_impact",
            RiskField::BorderMaxImpact => "border_max_impact",
            RiskField::BorderDaysDelayed => "border_days_delayed",
            RiskField::DamageProbability => "damage_probability",
            RiskField::DefectiveProbability => "defective_probability",
            RiskField::QualityDaysDelayed => "quality_days_delayed",
            RiskField::CancellationProbability => "cancellation_probability",
            RiskField::CancellationDaysDelayed => "cancellation_days_delayed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskField::DisruptionLambda => "Disruption Lambda",
            RiskField::DisruptionMinImpact => "Disruption Min Impact",
            RiskField::DisruptionMaxImpact => "Disruption Max Impact",
            RiskField::DisruptionDaysDelayed => "Disruption Days Delayed",
            RiskField::BorderDelayLambda => "Border Delay Lambda",
            RiskField::BorderMinImpact => "Border Min Impact",
            RiskField::BorderMaxImpact => "Border Max Impact",
            RiskField::BorderDaysDelayed => "Border Days Delayed",
            RiskField::DamageProbability => "Damage Probability",
            RiskField::DefectiveProbability => "Defective Probability",
            RiskField::QualityDaysDelayed => "Quality Days Delayed",
            RiskField::CancellationProbability => "Cancellation Probability",
            RiskField::CancellationDaysDelayed => "Cancellation Days Delayed",
        }
    }

    fn get_mut(self, risks: &mut RiskParams) -> &mut f64 {
        match self {
            RiskField::DisruptionLambda => &mut risks.disruption_lambda,
            RiskField::DisruptionMinImpact => &mut risks.disruption_min_impact,
            RiskField::DisruptionMaxImpact => &mut risks.disruption_max_impact,
            RiskField::DisruptionDaysDelayed => &mut risks.disruption_days_delayed,
            RiskField::BorderDelayLambda => &mut risks.border_delay_lambda,
            RiskField::BorderMinImpact => &mut risks.border_min_impact,
            RiskField::BorderMaxImpact => &mut risks.border_max_impact,
            RiskField::BorderDaysDelayed => &mut risks.border_days_delayed,
            RiskField::DamageProbability => &mut risks.damage_probability,
            RiskField::DefectiveProbability => &mut risks.defective_probability,
            RiskField::QualityDaysDelayed => &mut risks.quality_days_delayed,
            RiskField::CancellationProbability => &mut risks.cancellation_probability,
            RiskField::CancellationDaysDelayed => &mut risks.cancellation_days_delayed,
        }
    }
}

/// Typed address of one numeric leaf in a `CountryParams`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterPath {
    /// A field of a continuous cost driver's distribution
    Driver {
        driver: CostDriver,
        field: DistributionField,
    },
    /// A field of the manufacturing yield distribution
    Yield(DistributionField),
    TariffFixed,
    TariffEscalation,
    CurrencyVolatility,
    Risk(RiskField),
}

fn driver_key(driver: CostDriver) -> &'static str {
    match driver {
        CostDriver::RawMaterial => "raw",
        CostDriver::Labor => "labor",
        CostDriver::Indirect => "indirect",
        CostDriver::Logistics => "logistics",
        CostDriver::Electricity => "electricity",
        CostDriver::Depreciation => "depreciation",
        CostDriver::WorkingCapital => "working_capital",
    }
}

impl ParameterPath {
    pub fn driver(driver: CostDriver, field: DistributionField) -> Self {
        ParameterPath::Driver { driver, field }
    }

    /// Dotted key as written in registry files, e.g. `raw.mean`
    pub fn key(&self) -> String {
        match self {
            ParameterPath::Driver { driver, field } => {
                format!("{}.{}", driver_key(*driver), field.key())
            }
            ParameterPath::Yield(field) => format!("yield_params.{}", field.key()),
            ParameterPath::TariffFixed => "tariff.fixed".to_string(),
            ParameterPath::TariffEscalation => "tariff_escal".to_string(),
            ParameterPath::CurrencyVolatility => "currency_std".to_string(),
            ParameterPath::Risk(field) => field.key().to_string(),
        }
    }

    /// Read the leaf; `None` when the distribution family has no such field
    pub fn get(&self, params: &CountryParams) -> Option<f64> {
        match self {
            ParameterPath::Driver { driver, field } => params.drivers.get(*driver).field(*field),
            ParameterPath::Yield(field) => params.drivers.yield_params.field(*field),
            ParameterPath::TariffFixed => Some(params.trade.tariff.fixed),
            ParameterPath::TariffEscalation => Some(params.trade.tariff_escalation),
            ParameterPath::CurrencyVolatility => Some(params.trade.currency_std),
            ParameterPath::Risk(field) => {
                let mut risks = params.risks;
                Some(*field.get_mut(&mut risks))
            }
        }
    }

    pub fn get_mut<'a>(&self, params: &'a mut CountryParams) -> Option<&'a mut f64> {
        match self {
            ParameterPath::Driver { driver, field } => {
                params.drivers.get_mut(*driver).field_mut(*field)
            }
            ParameterPath::Yield(field) => params.drivers.yield_params.field_mut(*field),
            ParameterPath::TariffFixed => Some(&mut params.trade.tariff.fixed),
            ParameterPath::TariffEscalation => Some(&mut params.trade.tariff_escalation),
            ParameterPath::CurrencyVolatility => Some(&mut params.trade.currency_std),
            ParameterPath::Risk(field) => Some(field.get_mut(&mut params.risks)),
        }
    }

    /// Copy of `params` with this leaf replaced by `value`
    pub fn with_value(&self, params: &CountryParams, value: f64) -> Option<CountryParams> {
        let mut copy = params.clone();
        *self.get_mut(&mut copy)? = value;
        Some(copy)
    }
}

/// A labelled parameter to perturb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityFactor {
    pub label: String,
    pub path: ParameterPath,
}

impl SensitivityFactor {
    pub fn new(label: impl Into<String>, path: ParameterPath) -> Self {
        Self {
            label: label.into(),
            path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityConfig {
    /// Relative perturbation applied in both directions
    pub swing: f64,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            swing: DEFAULT_SWING,
        }
    }
}

/// Effect of one factor on mean total cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityEntry {
    pub label: String,
    pub path: ParameterPath,
    pub base_value: f64,
    /// Mean total cost with the leaf scaled by `1 − swing`
    pub low_mean: f64,
    /// Mean total cost with the leaf scaled by `1 + swing`
    pub high_mean: f64,
    /// `high_mean − low_mean`
    pub impact: f64,
}

/// A factor whose perturbed reruns could not be evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFactor {
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub baseline_mean: f64,
    pub swing: f64,
    /// Sorted by absolute impact, largest first
    pub entries: Vec<SensitivityEntry>,
    pub skipped: Vec<SkippedFactor>,
}

enum FactorOutcome {
    Measured(SensitivityEntry),
    Skipped(SkippedFactor),
    ZeroLeaf,
}

fn evaluate_factor(
    params: &CountryParams,
    config: &SimulationConfig,
    factor: &SensitivityFactor,
    swing: f64,
    seed: u64,
) -> FactorOutcome {
    let skipped = |reason: String| {
        FactorOutcome::Skipped(SkippedFactor {
            label: factor.label.clone(),
            reason,
        })
    };

    let Some(base_value) = factor.path.get(params) else {
        return skipped(format!("parameter {} not present", factor.path.key()));
    };
    if base_value == 0.0 {
        return FactorOutcome::ZeroLeaf;
    }

    let low_value = base_value * (1.0 - swing);
    let high_value = base_value * (1.0 + swing);
    let (Some(low_params), Some(high_params)) = (
        factor.path.with_value(params, low_value),
        factor.path.with_value(params, high_value),
    ) else {
        return skipped(format!("parameter {} not present", factor.path.key()));
    };

    let mean_cost = |variant: &CountryParams| -> Result<f64, SimulationError> {
        Ok(simulate_supplier_seeded(variant, config, seed)?.mean_total_cost())
    };

    match (mean_cost(&low_params), mean_cost(&high_params)) {
        (Ok(low_mean), Ok(high_mean)) => FactorOutcome::Measured(SensitivityEntry {
            label: factor.label.clone(),
            path: factor.path,
            base_value,
            low_mean,
            high_mean,
            impact: high_mean - low_mean,
        }),
        (Err(e), _) | (_, Err(e)) => skipped(e.to_string()),
    }
}

/// Run the sweep for one supplier.
///
/// The baseline and every rerun use the same `seed`, so differences between
/// them come from the perturbation rather than sampling noise. The baseline
/// parameters are never modified. An error is returned only when the baseline
/// itself cannot be simulated.
pub fn run_sensitivity(
    params: &CountryParams,
    config: &SimulationConfig,
    factors: &[SensitivityFactor],
    sensitivity: &SensitivityConfig,
    seed: u64,
) -> Result<SensitivityReport, SimulationError> {
    let baseline_mean = simulate_supplier_seeded(params, config, seed)?.mean_total_cost();
    let swing = sensitivity.swing;

    #[cfg(feature = "parallel")]
    let outcomes: Vec<FactorOutcome> = factors
        .par_iter()
        .map(|factor| evaluate_factor(params, config, factor, swing, seed))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<FactorOutcome> = factors
        .iter()
        .map(|factor| evaluate_factor(params, config, factor, swing, seed))
        .collect();

    let mut entries = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            FactorOutcome::Measured(entry) => entries.push(entry),
            FactorOutcome::Skipped(factor) => skipped.push(factor),
            FactorOutcome::ZeroLeaf => {}
        }
    }

    entries.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));

    Ok(SensitivityReport {
        baseline_mean,
        swing,
        entries,
        skipped,
    })
}
