mod economics;
mod params;
mod registry;
mod results;

pub use economics::{DEFAULT_ANNUAL_DISCOUNT_RATE, EconomicAssumptions};
pub use params::{
    CostDistribution, CostDriver, CostDrivers, CountryParams, DistributionField, EventChannel,
    RiskParams, TariffParams, TradeParams,
};
pub use registry::SupplierRegistry;
pub use results::{
    CostSummary, DiscreteRiskOutcome, SimulationResult, SupplierSimulation, percentile,
};
