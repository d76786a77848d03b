use std::fmt;

/// Errors raised while preparing a distribution or risk channel for sampling
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingError {
    InvalidDistributionParameters {
        family: &'static str,
        reason: &'static str,
    },
    InvalidRiskParameter {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl fmt::Display for SamplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingError::InvalidDistributionParameters { family, reason } => {
                write!(f, "invalid {family} parameters: {reason}")
            }
            SamplingError::InvalidRiskParameter {
                parameter,
                value,
                reason,
            } => write!(f, "invalid risk parameter {parameter}={value}: {reason}"),
        }
    }
}

impl std::error::Error for SamplingError {}

/// Errors from running the Monte Carlo aggregator
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Sampling(SamplingError),
    /// A run was requested with zero trials
    EmptyRun,
    UnknownSupplier(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Sampling(e) => write!(f, "{e}"),
            SimulationError::EmptyRun => write!(f, "simulation requires at least one trial"),
            SimulationError::UnknownSupplier(name) => {
                write!(f, "supplier {name:?} not found in registry")
            }
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Sampling(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SamplingError> for SimulationError {
    fn from(e: SamplingError) -> Self {
        SimulationError::Sampling(e)
    }
}

/// Reasons the allocation optimizer could not produce a valid allocation.
///
/// Callers receive these as the `Err` side of the optimizer's result and must
/// check for them before reading any allocation.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizationError {
    NoSuppliers,
    InvalidCost {
        supplier: String,
        reason: &'static str,
    },
    InvalidRiskAversion(f64),
    /// Every supplier's cost distribution has zero variance
    Degenerate,
    Infeasible(String),
    NotConverged {
        iterations: usize,
    },
}

impl fmt::Display for OptimizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationError::NoSuppliers => write!(f, "no suppliers to allocate across"),
            OptimizationError::InvalidCost { supplier, reason } => {
                write!(f, "invalid cost distribution for {supplier:?}: {reason}")
            }
            OptimizationError::InvalidRiskAversion(lambda) => {
                write!(f, "risk aversion must be finite and non-negative, got {lambda}")
            }
            OptimizationError::Degenerate => {
                write!(f, "every supplier cost distribution is degenerate (zero variance)")
            }
            OptimizationError::Infeasible(reason) => write!(f, "allocation infeasible: {reason}"),
            OptimizationError::NotConverged { iterations } => {
                write!(f, "allocation did not converge after {iterations} iterations")
            }
        }
    }
}

impl std::error::Error for OptimizationError {}
