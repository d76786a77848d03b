//! Drivers built on top of the aggregator and optimizer.
//!
//! - [`run_sensitivity`] reruns one supplier with each factor scaled by
//!   `1 ± swing` and ranks factors by their effect on mean total cost.
//! - [`PortfolioOutlook`] turns an allocation and the per-supplier lost units
//!   into a portfolio yield rate and a recommended order size.

mod portfolio;
mod sensitivity;

pub use portfolio::PortfolioOutlook;
pub use sensitivity::{
    DEFAULT_SWING, ParameterPath, RiskField, SensitivityConfig, SensitivityEntry,
    SensitivityFactor, SensitivityReport, SkippedFactor, run_sensitivity,
};
