//! Discount rate pre-fetch
//!
//! The simulation takes the annual discount rate in percent, as published. Before a
//! run the command line resolves it once: an explicit override wins, then the
//! latest effective federal funds rate from FRED, then a fixed fallback.
//! Fetch failures are logged and never stop the run.

use std::time::Duration;

use color_eyre::eyre::{WrapErr, eyre};
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use sourcing_core::EconomicAssumptions;

pub const FRED_OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
pub const FED_FUNDS_SERIES: &str = "FEDFUNDS";

/// Fallback rate in percent, used when no observation can be fetched
pub const DEFAULT_DISCOUNT_RATE_PERCENT: f64 = 4.5;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the discount rate came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RateSource {
    /// Given on the command line
    Override,
    /// Latest FRED observation, dated
    Fetched { observed: Date },
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiscountRate {
    /// Annual rate in percent, e.g. 4.33
    pub percent: f64,
    pub source: RateSource,
}

impl DiscountRate {
    pub fn fallback() -> Self {
        Self {
            percent: DEFAULT_DISCOUNT_RATE_PERCENT,
            source: RateSource::Fallback,
        }
    }

    /// Default economics carrying this rate, handed over in percent
    pub fn economics(&self) -> EconomicAssumptions {
        EconomicAssumptions::default().with_discount_rate(self.percent)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    /// FRED reports missing values as "."
    value: String,
}

/// Most recent observation with a numeric value
fn latest_observation(response: &ObservationsResponse) -> color_eyre::Result<(Date, f64)> {
    response
        .observations
        .iter()
        .rev()
        .find_map(|obs| {
            let value = obs.value.parse::<f64>().ok()?;
            let date = obs.date.parse::<Date>().ok()?;
            Some((date, value))
        })
        .ok_or_else(|| eyre!("no usable {FED_FUNDS_SERIES} observations"))
}

fn fetch_latest(api_key: &str) -> color_eyre::Result<(Date, f64)> {
    let agent = ureq::AgentBuilder::new().timeout(FETCH_TIMEOUT).build();
    let response: ObservationsResponse = agent
        .get(FRED_OBSERVATIONS_URL)
        .query("series_id", FED_FUNDS_SERIES)
        .query("api_key", api_key)
        .query("file_type", "json")
        .call()
        .wrap_err("FRED request failed")?
        .into_json()
        .wrap_err("FRED response was not valid JSON")?;
    latest_observation(&response)
}

/// Resolve the discount rate for a run
pub fn resolve_discount_rate(
    override_percent: Option<f64>,
    api_key: Option<&str>,
    offline: bool,
) -> DiscountRate {
    if let Some(percent) = override_percent {
        tracing::info!(percent, "using discount rate from command line");
        return DiscountRate {
            percent,
            source: RateSource::Override,
        };
    }

    let api_key = match api_key {
        Some(key) if !offline && !key.is_empty() => key,
        _ => {
            tracing::info!(
                percent = DEFAULT_DISCOUNT_RATE_PERCENT,
                offline,
                "no rate fetch attempted, using fallback discount rate"
            );
            return DiscountRate::fallback();
        }
    };

    match fetch_latest(api_key) {
        Ok((observed, percent)) => {
            tracing::info!(percent, %observed, "fetched {FED_FUNDS_SERIES}");
            DiscountRate {
                percent,
                source: RateSource::Fetched { observed },
            }
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                percent = DEFAULT_DISCOUNT_RATE_PERCENT,
                "rate fetch failed, using fallback discount rate"
            );
            DiscountRate::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> ObservationsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_latest_skips_missing_values() {
        let body = response(
            r#"{"observations": [
                {"date": "2025-07-01", "value": "4.33"},
                {"date": "2025-08-01", "value": "4.35"},
                {"date": "2025-09-01", "value": "."}
            ]}"#,
        );
        let (date, value) = latest_observation(&body).unwrap();
        assert_eq!(date, jiff::civil::date(2025, 8, 1));
        assert_eq!(value, 4.35);
    }

    #[test]
    fn test_no_observations_is_an_error() {
        assert!(latest_observation(&response(r#"{"observations": []}"#)).is_err());
    }

    #[test]
    fn test_override_wins() {
        let rate = resolve_discount_rate(Some(5.25), Some("key"), false);
        assert_eq!(rate.source, RateSource::Override);
        assert_eq!(rate.economics().annual_discount_rate, 5.25);
    }

    #[test]
    fn test_offline_and_keyless_fall_back() {
        assert_eq!(resolve_discount_rate(None, Some("key"), true), DiscountRate::fallback());
        assert_eq!(resolve_discount_rate(None, None, false), DiscountRate::fallback());
        assert_eq!(resolve_discount_rate(None, Some(""), false), DiscountRate::fallback());
    }

    #[test]
    fn test_fallback_rate_reaches_core_in_percent() {
        let economics = resolve_discount_rate(None, None, true).economics();
        assert_eq!(economics.annual_discount_rate, 4.5);

        let expected = 3_630.0 * 100.0 * 5.5 / 365.0;
        assert!((economics.opportunity_cost(100) - expected).abs() < 1e-9);
    }
}
