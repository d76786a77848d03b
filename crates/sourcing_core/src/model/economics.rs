//! Economic assumptions shared by every supplier
//!
//! These convert a risk event (units lost, days of delay) into money.

use serde::{Deserialize, Serialize};

/// Default annual discount rate, in percent
pub const DEFAULT_ANNUAL_DISCOUNT_RATE: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicAssumptions {
    /// Sale price of the finished vehicle the component goes into
    pub unit_price: f64,
    /// Manufacturing cost of the finished vehicle
    pub unit_manufacturing_cost: f64,
    /// Weighted average cost of capital, annual fraction
    pub wacc: f64,
    /// Cost to expedite a replacement for one lost unit
    pub expedite_cost_per_unit: f64,
    /// Annual discount rate in percent, as published (4.5 means 4.5%).
    /// Applied as given: the opportunity cost scales by `(1 + rate) / 365`.
    pub annual_discount_rate: f64,
}

impl Default for EconomicAssumptions {
    fn default() -> Self {
        Self {
            unit_price: 41_630.0,
            unit_manufacturing_cost: 38_000.0,
            wacc: 0.0877,
            expedite_cost_per_unit: 50.71,
            annual_discount_rate: DEFAULT_ANNUAL_DISCOUNT_RATE,
        }
    }
}

impl EconomicAssumptions {
    #[must_use]
    pub fn with_discount_rate(mut self, annual_discount_rate: f64) -> Self {
        self.annual_discount_rate = annual_discount_rate;
        self
    }

    pub fn per_unit_margin(&self) -> f64 {
        self.unit_price - self.unit_manufacturing_cost
    }

    /// Profit forgone on lost units, annual rate prorated to one day
    pub fn opportunity_cost(&self, lost_units: u64) -> f64 {
        self.per_unit_margin() * lost_units as f64 * (1.0 + self.annual_discount_rate) / 365.0
    }

    pub fn expedited_shipping_cost(&self, lost_units: u64) -> f64 {
        self.expedite_cost_per_unit * lost_units as f64
    }

    /// Cost of capital tied up during a delay; per shipment, not per unit
    pub fn carrying_cost(&self, days_delayed: f64) -> f64 {
        self.wacc * self.unit_manufacturing_cost * days_delayed
    }

    /// Money cost of one risk event
    pub fn event_cost(&self, lost_units: u64, days_delayed: f64) -> f64 {
        self.opportunity_cost(lost_units)
            + self.expedited_shipping_cost(lost_units)
            + self.carrying_cost(days_delayed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_cost_components() {
        let econ = EconomicAssumptions::default();
        let cost = econ.event_cost(100, 10.0);

        let opportunity = 3_630.0 * 100.0 * 5.5 / 365.0;
        let expedite = 50.71 * 100.0;
        let carry = 0.0877 * 38_000.0 * 10.0;
        assert!((cost - (opportunity + expedite + carry)).abs() < 1e-6);
    }

    #[test]
    fn test_event_cost_zero_event() {
        let econ = EconomicAssumptions::default();
        assert_eq!(econ.event_cost(0, 0.0), 0.0);
    }

    #[test]
    fn test_event_cost_monotone_in_units_and_days() {
        let econ = EconomicAssumptions::default();
        let mut previous = econ.event_cost(0, 5.0);
        for units in [1, 10, 100, 1_000, 10_000] {
            let cost = econ.event_cost(units, 5.0);
            assert!(cost >= previous);
            previous = cost;
        }

        let mut previous = econ.event_cost(50, 0.0);
        for days in [0.5, 1.0, 15.0, 90.0] {
            let cost = econ.event_cost(50, days);
            assert!(cost >= previous);
            previous = cost;
        }
    }
}
