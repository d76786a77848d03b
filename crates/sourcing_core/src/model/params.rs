//! Per-supplier parameter trees
//!
//! A `CountryParams` is the immutable description of one supplier country:
//! the continuous cost drivers (each with its own distribution family), the
//! trade exposure (tariff and currency), and the discrete risk channels.
//! The serialized shape is flat, matching the registry files:
//!
//! ```yaml
//! raw: { dist: normal, mean: 30, std: 3 }
//! labor: { dist: lognormal, mean: 1.379, std: 0.120 }
//! tariff: { fixed: 0.25 }
//! tariff_escal: 0.15
//! disruption_lambda: 0.15
//! ```
//!
//! Unknown keys are ignored so registries may carry annotations.

use serde::{Deserialize, Serialize};

/// Distribution family for a single cost driver.
///
/// `LogNormal` takes the parameters of the underlying normal, not the mean
/// and standard deviation of the lognormal itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dist", rename_all = "lowercase")]
pub enum CostDistribution {
    Normal { mean: f64, std: f64 },
    LogNormal { mean: f64, std: f64 },
    Gamma { shape: f64, scale: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
    Beta { a: f64, b: f64 },
}

/// Named numeric field inside a `CostDistribution`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionField {
    Mean,
    Std,
    Shape,
    Scale,
    Min,
    Mode,
    Max,
    A,
    B,
}

impl DistributionField {
    pub const ALL: [DistributionField; 9] = [
        DistributionField::Mean,
        DistributionField::Std,
        DistributionField::Shape,
        DistributionField::Scale,
        DistributionField::Min,
        DistributionField::Mode,
        DistributionField::Max,
        DistributionField::A,
        DistributionField::B,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DistributionField::Mean => "Mean",
            DistributionField::Std => "Std",
            DistributionField::Shape => "Shape",
            DistributionField::Scale => "Scale",
            DistributionField::Min => "Min",
            DistributionField::Mode => "Mode",
            DistributionField::Max => "Max",
            DistributionField::A => "(a)",
            DistributionField::B => "(b)",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            DistributionField::Mean => "mean",
            DistributionField::Std => "std",
            DistributionField::Shape => "shape",
            DistributionField::Scale => "scale",
            DistributionField::Min => "min",
            DistributionField::Mode => "mode",
            DistributionField::Max => "max",
            DistributionField::A => "a",
            DistributionField::B => "b",
        }
    }
}

impl CostDistribution {
    /// Family name as written in registry files
    pub fn family(&self) -> &'static str {
        match self {
            CostDistribution::Normal { .. } => "normal",
            CostDistribution::LogNormal { .. } => "lognormal",
            CostDistribution::Gamma { .. } => "gamma",
            CostDistribution::Triangular { .. } => "triangular",
            CostDistribution::Beta { .. } => "beta",
        }
    }

    /// Read a named field, `None` if this family has no such field
    pub fn field(&self, field: DistributionField) -> Option<f64> {
        use DistributionField as F;
        match (*self, field) {
            (CostDistribution::Normal { mean, .. }, F::Mean)
            | (CostDistribution::LogNormal { mean, .. }, F::Mean) => Some(mean),
            (CostDistribution::Normal { std, .. }, F::Std)
            | (CostDistribution::LogNormal { std, .. }, F::Std) => Some(std),
            (CostDistribution::Gamma { shape, .. }, F::Shape) => Some(shape),
            (CostDistribution::Gamma { scale, .. }, F::Scale) => Some(scale),
            (CostDistribution::Triangular { min, .. }, F::Min) => Some(min),
            (CostDistribution::Triangular { mode, .. }, F::Mode) => Some(mode),
            (CostDistribution::Triangular { max, .. }, F::Max) => Some(max),
            (CostDistribution::Beta { a, .. }, F::A) => Some(a),
            (CostDistribution::Beta { b, .. }, F::B) => Some(b),
            _ => None,
        }
    }

    pub fn field_mut(&mut self, field: DistributionField) -> Option<&mut f64> {
        use DistributionField as F;
        match (self, field) {
            (CostDistribution::Normal { mean, .. }, F::Mean)
            | (CostDistribution::LogNormal { mean, .. }, F::Mean) => Some(mean),
            (CostDistribution::Normal { std, .. }, F::Std)
            | (CostDistribution::LogNormal { std, .. }, F::Std) => Some(std),
            (CostDistribution::Gamma { shape, .. }, F::Shape) => Some(shape),
            (CostDistribution::Gamma { scale, .. }, F::Scale) => Some(scale),
            (CostDistribution::Triangular { min, .. }, F::Min) => Some(min),
            (CostDistribution::Triangular { mode, .. }, F::Mode) => Some(mode),
            (CostDistribution::Triangular { max, .. }, F::Max) => Some(max),
            (CostDistribution::Beta { a, .. }, F::A) => Some(a),
            (CostDistribution::Beta { b, .. }, F::B) => Some(b),
            _ => None,
        }
    }

    /// Expected value of a single draw
    pub fn mean(&self) -> f64 {
        match *self {
            CostDistribution::Normal { mean, .. } => mean,
            CostDistribution::LogNormal { mean, std } => (mean + std * std / 2.0).exp(),
            CostDistribution::Gamma { shape, scale } => shape * scale,
            CostDistribution::Triangular { min, mode, max } => (min + mode + max) / 3.0,
            CostDistribution::Beta { a, b } => a / (a + b),
        }
    }
}

/// One of the continuous per-unit cost components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostDriver {
    RawMaterial,
    Labor,
    Indirect,
    Logistics,
    Electricity,
    Depreciation,
    WorkingCapital,
}

impl CostDriver {
    /// Summation order used for the per-trial base unit cost
    pub const ALL: [CostDriver; 7] = [
        CostDriver::RawMaterial,
        CostDriver::Labor,
        CostDriver::Indirect,
        CostDriver::Logistics,
        CostDriver::Electricity,
        CostDriver::Depreciation,
        CostDriver::WorkingCapital,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CostDriver::RawMaterial => "Raw Material",
            CostDriver::Labor => "Labor",
            CostDriver::Indirect => "Indirect",
            CostDriver::Logistics => "Logistics",
            CostDriver::Electricity => "Electricity",
            CostDriver::Depreciation => "Depreciation",
            CostDriver::WorkingCapital => "Working Capital",
        }
    }
}

/// Continuous cost drivers plus the manufacturing yield fraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostDrivers {
    pub raw: CostDistribution,
    pub labor: CostDistribution,
    pub indirect: CostDistribution,
    pub logistics: CostDistribution,
    pub electricity: CostDistribution,
    pub depreciation: CostDistribution,
    pub working_capital: CostDistribution,
    /// Fraction of units that come off the line usable, usually `beta`
    pub yield_params: CostDistribution,
}

impl CostDrivers {
    pub fn get(&self, driver: CostDriver) -> &CostDistribution {
        match driver {
            CostDriver::RawMaterial => &self.raw,
            CostDriver::Labor => &self.labor,
            CostDriver::Indirect => &self.indirect,
            CostDriver::Logistics => &self.logistics,
            CostDriver::Electricity => &self.electricity,
            CostDriver::Depreciation => &self.depreciation,
            CostDriver::WorkingCapital => &self.working_capital,
        }
    }

    pub fn get_mut(&mut self, driver: CostDriver) -> &mut CostDistribution {
        match driver {
            CostDriver::RawMaterial => &mut self.raw,
            CostDriver::Labor => &mut self.labor,
            CostDriver::Indirect => &mut self.indirect,
            CostDriver::Logistics => &mut self.logistics,
            CostDriver::Electricity => &mut self.electricity,
            CostDriver::Depreciation => &mut self.depreciation,
            CostDriver::WorkingCapital => &mut self.working_capital,
        }
    }

    /// Expected base unit cost (sum of driver means, yield excluded)
    pub fn expected_unit_cost(&self) -> f64 {
        CostDriver::ALL.iter().map(|d| self.get(*d).mean()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TariffParams {
    /// Base ad-valorem tariff rate, e.g. 0.25 for 25%
    pub fixed: f64,
}

/// Trade exposure: tariff, escalation probability and currency volatility
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TradeParams {
    #[serde(default)]
    pub tariff: TariffParams,
    /// Probability that the tariff escalates during a trial
    #[serde(default, rename = "tariff_escal")]
    pub tariff_escalation: f64,
    /// Standard deviation of the multiplicative currency shock
    #[serde(default)]
    pub currency_std: f64,
}

/// Discrete risk channel parameters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    pub disruption_lambda: f64,
    pub disruption_min_impact: f64,
    pub disruption_max_impact: f64,
    pub disruption_days_delayed: f64,

    pub border_delay_lambda: f64,
    pub border_min_impact: f64,
    pub border_max_impact: f64,
    pub border_days_delayed: f64,

    pub damage_probability: f64,
    pub defective_probability: f64,
    pub quality_days_delayed: f64,

    pub cancellation_probability: f64,
    pub cancellation_days_delayed: f64,
}

/// Parameters of a Poisson-count, uniform-severity channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventChannel {
    pub name: &'static str,
    pub lambda: f64,
    pub min_impact: f64,
    pub max_impact: f64,
    pub days_delayed: f64,
}

impl RiskParams {
    pub fn disruption(&self) -> EventChannel {
        EventChannel {
            name: "disruption",
            lambda: self.disruption_lambda,
            min_impact: self.disruption_min_impact,
            max_impact: self.disruption_max_impact,
            days_delayed: self.disruption_days_delayed,
        }
    }

    pub fn border_delay(&self) -> EventChannel {
        EventChannel {
            name: "border_delay",
            lambda: self.border_delay_lambda,
            min_impact: self.border_min_impact,
            max_impact: self.border_max_impact,
            days_delayed: self.border_days_delayed,
        }
    }
}

/// Everything the simulator needs to know about one supplier country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryParams {
    #[serde(flatten)]
    pub drivers: CostDrivers,
    #[serde(flatten)]
    pub trade: TradeParams,
    #[serde(flatten)]
    pub risks: RiskParams,
}
