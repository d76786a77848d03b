//! Discrete risk event generator
//!
//! Four independent channels turn random events into lost units and money:
//!
//! - disruption and border delay: Poisson event count, each event losing a
//!   uniformly drawn number of units
//! - quality: binomial damaged and defective counts, two separate outcomes
//! - cancellation: a single Bernoulli draw that loses the whole order
//!
//! Tariff escalation and currency shocks are drawn here too; the aggregator
//! folds them into landed cost.

use rand::Rng;
use rand::distr::{Bernoulli, Distribution, Uniform};
use rand::seq::IndexedRandom;
use rand_distr::{Binomial, Normal, Poisson};

use crate::error::SamplingError;
use crate::model::{
    CountryParams, DiscreteRiskOutcome, EconomicAssumptions, EventChannel, RiskParams, TradeParams,
};

/// Possible escalation magnitudes, applied as `tariff × (1 + escalation)`
pub const ESCALATION_STEPS: [f64; 3] = [0.25, 0.50, 1.00];

fn invalid(parameter: &'static str, value: f64, reason: &'static str) -> SamplingError {
    SamplingError::InvalidRiskParameter {
        parameter,
        value,
        reason,
    }
}

fn probability(parameter: &'static str, p: f64) -> Result<Bernoulli, SamplingError> {
    Bernoulli::new(p).map_err(|_| invalid(parameter, p, "probability must lie in [0, 1]"))
}

/// Prepared sampler for one Poisson/uniform channel
#[derive(Debug, Clone)]
struct EventSampler {
    /// `None` when the rate is zero: the channel can never fire
    events: Option<Poisson<f64>>,
    severity: Uniform<f64>,
    days_delayed: f64,
}

impl EventSampler {
    fn new(channel: &EventChannel) -> Result<Self, SamplingError> {
        let events = if channel.lambda == 0.0 {
            None
        } else {
            let poisson = Poisson::new(channel.lambda).map_err(|_| {
                invalid(channel.name, channel.lambda, "event rate must be positive and finite")
            })?;
            Some(poisson)
        };

        let severity = Uniform::new_inclusive(channel.min_impact, channel.max_impact)
            .map_err(|_| {
                invalid(
                    channel.name,
                    channel.min_impact,
                    "impact range must be finite with min <= max",
                )
            })?;

        if !(channel.days_delayed >= 0.0) {
            return Err(invalid(
                channel.name,
                channel.days_delayed,
                "days delayed must be non-negative",
            ));
        }

        Ok(Self {
            events,
            severity,
            days_delayed: channel.days_delayed,
        })
    }

    fn draw<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        econ: &EconomicAssumptions,
    ) -> DiscreteRiskOutcome {
        let Some(poisson) = &self.events else {
            return DiscreteRiskOutcome::NONE;
        };

        let count = poisson.sample(rng) as u64;
        if count == 0 {
            return DiscreteRiskOutcome::NONE;
        }

        let total: f64 = (0..count).map(|_| self.severity.sample(rng)).sum();
        let lost_units = total as u64;
        DiscreteRiskOutcome {
            lost_units,
            cost: econ.event_cost(lost_units, self.days_delayed),
        }
    }
}

/// Outcomes of every channel for one trial
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrialRisk {
    pub disruption: DiscreteRiskOutcome,
    pub border_delay: DiscreteRiskOutcome,
    pub damage: DiscreteRiskOutcome,
    pub defective: DiscreteRiskOutcome,
    pub cancellation: DiscreteRiskOutcome,
}

impl TrialRisk {
    pub fn lost_units(&self) -> u64 {
        self.disruption.lost_units
            + self.border_delay.lost_units
            + self.damage.lost_units
            + self.defective.lost_units
            + self.cancellation.lost_units
    }

    pub fn cost(&self) -> f64 {
        self.disruption.cost
            + self.border_delay.cost
            + self.damage.cost
            + self.defective.cost
            + self.cancellation.cost
    }
}

/// Validated discrete-risk sampler for one supplier and order size.
///
/// Construction checks every parameter, so drawing never fails.
#[derive(Debug, Clone)]
pub struct DiscreteRiskGenerator {
    economics: EconomicAssumptions,
    order_size: u64,
    disruption: EventSampler,
    border_delay: EventSampler,
    damage: Binomial,
    defective: Binomial,
    quality_days_delayed: f64,
    cancellation: Bernoulli,
    cancellation_days_delayed: f64,
    escalation: Bernoulli,
    currency: Option<Normal<f64>>,
}

impl DiscreteRiskGenerator {
    pub fn new(
        risks: &RiskParams,
        trade: &TradeParams,
        order_size: u64,
        economics: EconomicAssumptions,
    ) -> Result<Self, SamplingError> {
        let binomial = |parameter: &'static str, p: f64| {
            Binomial::new(order_size, p)
                .map_err(|_| invalid(parameter, p, "probability must lie in [0, 1]"))
        };

        if !(risks.quality_days_delayed >= 0.0) {
            return Err(invalid(
                "quality_days_delayed",
                risks.quality_days_delayed,
                "days delayed must be non-negative",
            ));
        }
        if !(risks.cancellation_days_delayed >= 0.0) {
            return Err(invalid(
                "cancellation_days_delayed",
                risks.cancellation_days_delayed,
                "days delayed must be non-negative",
            ));
        }

        let currency = if trade.currency_std == 0.0 {
            None
        } else {
            let normal = Normal::new(0.0, trade.currency_std).map_err(|_| {
                invalid(
                    "currency_std",
                    trade.currency_std,
                    "volatility must be non-negative and finite",
                )
            })?;
            Some(normal)
        };

        Ok(Self {
            economics,
            order_size,
            disruption: EventSampler::new(&risks.disruption())?,
            border_delay: EventSampler::new(&risks.border_delay())?,
            damage: binomial("damage_probability", risks.damage_probability)?,
            defective: binomial("defective_probability", risks.defective_probability)?,
            quality_days_delayed: risks.quality_days_delayed,
            cancellation: probability("cancellation_probability", risks.cancellation_probability)?,
            cancellation_days_delayed: risks.cancellation_days_delayed,
            escalation: probability("tariff_escal", trade.tariff_escalation)?,
            currency,
        })
    }

    pub fn for_country(
        params: &CountryParams,
        order_size: u64,
        economics: EconomicAssumptions,
    ) -> Result<Self, SamplingError> {
        Self::new(&params.risks, &params.trade, order_size, economics)
    }

    pub fn disruption<R: Rng + ?Sized>(&self, rng: &mut R) -> DiscreteRiskOutcome {
        self.disruption.draw(rng, &self.economics)
    }

    pub fn border_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> DiscreteRiskOutcome {
        self.border_delay.draw(rng, &self.economics)
    }

    pub fn damage<R: Rng + ?Sized>(&self, rng: &mut R) -> DiscreteRiskOutcome {
        self.quality_outcome(self.damage.sample(rng))
    }

    pub fn defective<R: Rng + ?Sized>(&self, rng: &mut R) -> DiscreteRiskOutcome {
        self.quality_outcome(self.defective.sample(rng))
    }

    /// A clean batch causes no delay
    fn quality_outcome(&self, units: u64) -> DiscreteRiskOutcome {
        if units == 0 {
            return DiscreteRiskOutcome::NONE;
        }
        DiscreteRiskOutcome {
            lost_units: units,
            cost: self.economics.event_cost(units, self.quality_days_delayed),
        }
    }

    /// All or nothing: a cancelled order loses every unit
    pub fn cancellation<R: Rng + ?Sized>(&self, rng: &mut R) -> DiscreteRiskOutcome {
        if !self.cancellation.sample(rng) {
            return DiscreteRiskOutcome::NONE;
        }
        DiscreteRiskOutcome {
            lost_units: self.order_size,
            cost: self
                .economics
                .event_cost(self.order_size, self.cancellation_days_delayed),
        }
    }

    /// Escalation add-on to the base tariff rate, 0 when no escalation occurs
    pub fn tariff_escalation<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if !self.escalation.sample(rng) {
            return 0.0;
        }
        ESCALATION_STEPS.choose(rng).copied().unwrap_or(0.0)
    }

    /// Multiplicative currency shock around zero
    pub fn currency_shock<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.currency.as_ref().map_or(0.0, |d| d.sample(rng))
    }

    /// Draw every risk channel for one trial
    pub fn draw_trial<R: Rng + ?Sized>(&self, rng: &mut R) -> TrialRisk {
        TrialRisk {
            disruption: self.disruption(rng),
            border_delay: self.border_delay(rng),
            damage: self.damage(rng),
            defective: self.defective(rng),
            cancellation: self.cancellation(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn quiet_risks() -> RiskParams {
        RiskParams {
            disruption_min_impact: 100.0,
            disruption_max_impact: 1_000.0,
            disruption_days_delayed: 10.0,
            border_min_impact: 100.0,
            border_max_impact: 1_000.0,
            border_days_delayed: 20.0,
            quality_days_delayed: 15.0,
            cancellation_days_delayed: 90.0,
            ..Default::default()
        }
    }

    fn generator(risks: RiskParams, order_size: u64) -> DiscreteRiskGenerator {
        DiscreteRiskGenerator::new(
            &risks,
            &TradeParams::default(),
            order_size,
            EconomicAssumptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_lambda_never_fires() {
        let generator = generator(quiet_risks(), 8_000);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..10_000 {
            assert_eq!(generator.disruption(&mut rng), DiscreteRiskOutcome::NONE);
            assert_eq!(generator.border_delay(&mut rng), DiscreteRiskOutcome::NONE);
        }
    }

    #[test]
    fn test_disruption_losses_within_severity_bounds() {
        let risks = RiskParams {
            disruption_lambda: 0.5,
            ..quiet_risks()
        };
        let generator = generator(risks, 8_000);
        let econ = EconomicAssumptions::default();
        let mut rng = SmallRng::seed_from_u64(11);

        let mut fired = 0;
        for _ in 0..5_000 {
            let outcome = generator.disruption(&mut rng);
            if outcome.lost_units > 0 {
                fired += 1;
                assert!(outcome.lost_units >= 100);
                assert_eq!(outcome.cost, econ.event_cost(outcome.lost_units, 10.0));
            } else {
                assert_eq!(outcome.cost, 0.0);
            }
        }
        // P(at least one event) = 1 - e^-0.5 ≈ 0.39
        let rate = fired as f64 / 5_000.0;
        assert!((rate - 0.393).abs() < 0.03, "fire rate {rate}");
    }

    #[test]
    fn test_cancellation_extremes() {
        let econ = EconomicAssumptions::default();
        let mut rng = SmallRng::seed_from_u64(5);

        let never = generator(quiet_risks(), 10_000);
        for _ in 0..1_000 {
            assert_eq!(never.cancellation(&mut rng), DiscreteRiskOutcome::NONE);
        }

        let always = generator(
            RiskParams {
                cancellation_probability: 1.0,
                ..quiet_risks()
            },
            10_000,
        );
        let expected = DiscreteRiskOutcome {
            lost_units: 10_000,
            cost: econ.event_cost(10_000, 90.0),
        };
        for _ in 0..1_000 {
            assert_eq!(always.cancellation(&mut rng), expected);
        }
    }

    #[test]
    fn test_quality_outcomes_are_independent_draws() {
        let risks = RiskParams {
            damage_probability: 0.02,
            defective_probability: 0.05,
            ..quiet_risks()
        };
        let generator = generator(risks, 10_000);
        let mut rng = SmallRng::seed_from_u64(9);

        let n = 2_000;
        let (mut damaged, mut defective) = (0u64, 0u64);
        for _ in 0..n {
            let trial = generator.draw_trial(&mut rng);
            damaged += trial.damage.lost_units;
            defective += trial.defective.lost_units;
        }
        let mean_damaged = damaged as f64 / n as f64;
        let mean_defective = defective as f64 / n as f64;
        assert!((mean_damaged - 200.0).abs() < 5.0, "damaged {mean_damaged}");
        assert!((mean_defective - 500.0).abs() < 8.0, "defective {mean_defective}");
    }

    #[test]
    fn test_clean_quality_batch_costs_nothing() {
        // quality_days_delayed is non-zero, but no damaged units means no delay
        let generator = generator(quiet_risks(), 10_000);
        let mut rng = SmallRng::seed_from_u64(13);
        for _ in 0..100 {
            assert_eq!(generator.damage(&mut rng), DiscreteRiskOutcome::NONE);
            assert_eq!(generator.defective(&mut rng), DiscreteRiskOutcome::NONE);
        }
    }

    #[test]
    fn test_tariff_escalation_draws_from_fixed_steps() {
        let trade = TradeParams {
            tariff_escalation: 1.0,
            ..Default::default()
        };
        let generator = DiscreteRiskGenerator::new(
            &quiet_risks(),
            &trade,
            1_000,
            EconomicAssumptions::default(),
        )
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(21);
        for _ in 0..500 {
            let step = generator.tariff_escalation(&mut rng);
            assert!(ESCALATION_STEPS.contains(&step));
        }
    }

    #[test]
    fn test_invalid_probability_is_rejected() {
        let risks = RiskParams {
            damage_probability: 1.2,
            ..quiet_risks()
        };
        let err = DiscreteRiskGenerator::new(
            &risks,
            &TradeParams::default(),
            1_000,
            EconomicAssumptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SamplingError::InvalidRiskParameter {
                parameter: "damage_probability",
                ..
            }
        ));
    }
}
