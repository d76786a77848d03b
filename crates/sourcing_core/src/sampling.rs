//! Continuous cost sampler
//!
//! Draws batches of per-unit cost components from the distribution family
//! declared for each driver. A zero spread (std or scale of exactly 0, or a
//! triangular with `min == max`) is not an error: every draw returns the
//! distribution's point value.

use rand::Rng;
use rand::distr::Distribution;
use rand_distr::{Beta, Gamma, LogNormal, Normal, Triangular};

use crate::error::SamplingError;
use crate::model::{CostDistribution, CostDriver, CostDrivers};

/// Default number of trials per supplier
pub const DEFAULT_BATCH_SIZE: usize = 50_000;

/// A `CostDistribution` whose parameters have been validated
#[derive(Debug, Clone)]
pub enum PreparedDistribution {
    Constant(f64),
    Normal(Normal<f64>),
    LogNormal(LogNormal<f64>),
    Gamma(Gamma<f64>),
    Triangular(Triangular<f64>),
    Beta(Beta<f64>),
}

impl Distribution<f64> for PreparedDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            PreparedDistribution::Constant(value) => *value,
            PreparedDistribution::Normal(d) => d.sample(rng),
            PreparedDistribution::LogNormal(d) => d.sample(rng),
            PreparedDistribution::Gamma(d) => d.sample(rng),
            PreparedDistribution::Triangular(d) => d.sample(rng),
            PreparedDistribution::Beta(d) => d.sample(rng),
        }
    }
}

impl CostDistribution {
    /// Whether every draw is the same value
    pub fn is_degenerate(&self) -> bool {
        match *self {
            CostDistribution::Normal { std, .. } | CostDistribution::LogNormal { std, .. } => {
                std == 0.0
            }
            CostDistribution::Gamma { scale, .. } => scale == 0.0,
            CostDistribution::Triangular { min, max, .. } => min == max,
            CostDistribution::Beta { .. } => false,
        }
    }

    /// Validate parameters and build a sampler
    pub fn prepare(&self) -> Result<PreparedDistribution, SamplingError> {
        let invalid = |family: &'static str, reason: &'static str| {
            SamplingError::InvalidDistributionParameters { family, reason }
        };

        match *self {
            CostDistribution::Normal { mean, std } => {
                if !mean.is_finite() {
                    return Err(invalid("normal", "mean must be finite"));
                }
                if std == 0.0 {
                    return Ok(PreparedDistribution::Constant(mean));
                }
                Normal::new(mean, std)
                    .map(PreparedDistribution::Normal)
                    .map_err(|_| invalid("normal", "std must be non-negative and finite"))
            }
            CostDistribution::LogNormal { mean, std } => {
                if !mean.is_finite() {
                    return Err(invalid("lognormal", "mean must be finite"));
                }
                if std == 0.0 {
                    return Ok(PreparedDistribution::Constant(mean.exp()));
                }
                LogNormal::new(mean, std)
                    .map(PreparedDistribution::LogNormal)
                    .map_err(|_| invalid("lognormal", "std must be non-negative and finite"))
            }
            CostDistribution::Gamma { shape, scale } => {
                if scale == 0.0 && shape.is_finite() && shape > 0.0 {
                    return Ok(PreparedDistribution::Constant(0.0));
                }
                Gamma::new(shape, scale)
                    .map(PreparedDistribution::Gamma)
                    .map_err(|_| invalid("gamma", "shape and scale must be positive and finite"))
            }
            CostDistribution::Triangular { min, mode, max } => {
                if !(min <= mode && mode <= max) {
                    return Err(invalid("triangular", "requires min <= mode <= max"));
                }
                if min == max {
                    return Ok(PreparedDistribution::Constant(mode));
                }
                Triangular::new(min, max, mode)
                    .map(PreparedDistribution::Triangular)
                    .map_err(|_| invalid("triangular", "bounds must be finite"))
            }
            CostDistribution::Beta { a, b } => Beta::new(a, b)
                .map(PreparedDistribution::Beta)
                .map_err(|_| invalid("beta", "a and b must be positive and finite")),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, SamplingError> {
        Ok(self.prepare()?.sample(rng))
    }

    /// Draw `n` independent samples
    pub fn sample_batch<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
    ) -> Result<Vec<f64>, SamplingError> {
        let dist = self.prepare()?;
        Ok((0..n).map(|_| dist.sample(rng)).collect())
    }
}

/// One sample array per cost driver, all of the same length
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousDraws {
    /// Indexed in `CostDriver::ALL` order
    pub drivers: [Vec<f64>; 7],
    pub manufacturing_yield: Vec<f64>,
}

impl ContinuousDraws {
    pub fn len(&self) -> usize {
        self.manufacturing_yield.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manufacturing_yield.is_empty()
    }

    pub fn driver(&self, driver: CostDriver) -> &[f64] {
        let idx = match driver {
            CostDriver::RawMaterial => 0,
            CostDriver::Labor => 1,
            CostDriver::Indirect => 2,
            CostDriver::Logistics => 3,
            CostDriver::Electricity => 4,
            CostDriver::Depreciation => 5,
            CostDriver::WorkingCapital => 6,
        };
        &self.drivers[idx]
    }

    /// Per-trial base unit cost: the sum of every driver, yield excluded
    pub fn base_unit_costs(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.drivers.iter().map(|samples| samples[i]).sum())
            .collect()
    }
}

/// Sample every driver of a supplier for a batch of `n` trials.
///
/// Drivers are drawn one whole array at a time in `CostDriver::ALL` order,
/// followed by the yield array.
pub fn sample_drivers<R: Rng + ?Sized>(
    drivers: &CostDrivers,
    rng: &mut R,
    n: usize,
) -> Result<ContinuousDraws, SamplingError> {
    let mut arrays: [Vec<f64>; 7] = Default::default();
    for (slot, driver) in arrays.iter_mut().zip(CostDriver::ALL) {
        *slot = drivers.get(driver).sample_batch(rng, n)?;
    }
    let manufacturing_yield = drivers.yield_params.sample_batch(rng, n)?;

    Ok(ContinuousDraws {
        drivers: arrays,
        manufacturing_yield,
    })
}
