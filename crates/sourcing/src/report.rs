//! Report assembly and rendering
//!
//! Run and sensitivity outcomes are collected into serializable report
//! structs, then rendered either as aligned text tables or as pretty JSON.

use std::fmt::Write;

use clap::ValueEnum;
use color_eyre::eyre::WrapErr;
use serde::Serialize;
use sourcing_core::model::{CostSummary, SupplierSimulation};
use sourcing_core::{OptimizationResult, PortfolioOutlook, SensitivityReport};

use crate::format::{
    format_compact_currency, format_currency, format_currency_delta, format_percentage,
    format_units,
};
use crate::indicator::{DiscountRate, RateSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Cost and delivery summary for one supplier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierReport {
    pub supplier: String,
    pub per_unit: CostSummary,
    pub mean_total_cost: f64,
    pub mean_lost_units: f64,
    pub mean_manufacturing_yield: f64,
    pub delivered_fraction: f64,
}

impl SupplierReport {
    pub fn from_simulation(simulation: &SupplierSimulation) -> Self {
        let result = &simulation.result;
        Self {
            supplier: simulation.supplier.clone(),
            per_unit: result.per_unit_summary(),
            mean_total_cost: result.mean_total_cost(),
            mean_lost_units: result.mean_lost_units(),
            mean_manufacturing_yield: result.mean_manufacturing_yield(),
            delivered_fraction: result.delivered_fraction(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationShare {
    pub supplier: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum AllocationReport {
    Allocated {
        /// Largest share first
        allocations: Vec<AllocationShare>,
        expected_cost: f64,
        cost_variance: f64,
        objective_value: f64,
        delivered_fraction: f64,
        yield_floor_multiplier: Option<f64>,
        outlook: PortfolioOutlook,
    },
    Failed {
        reason: String,
    },
}

impl AllocationReport {
    pub fn allocated(result: &OptimizationResult, outlook: PortfolioOutlook) -> Self {
        let allocations = result
            .sorted_allocations()
            .into_iter()
            .map(|(supplier, weight)| AllocationShare {
                supplier: supplier.to_string(),
                weight,
            })
            .collect();

        AllocationReport::Allocated {
            allocations,
            expected_cost: result.expected_cost,
            cost_variance: result.cost_variance,
            objective_value: result.objective_value,
            delivered_fraction: result.delivered_fraction,
            yield_floor_multiplier: result.yield_floor_multiplier,
            outlook,
        }
    }

    pub fn failed(reason: impl ToString) -> Self {
        AllocationReport::Failed {
            reason: reason.to_string(),
        }
    }
}

/// Everything produced by one `run` invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub order_size: u64,
    pub trials: usize,
    pub discount_rate: DiscountRate,
    pub risk_aversion: f64,
    /// Sorted by supplier name
    pub suppliers: Vec<SupplierReport>,
    pub allocation: AllocationReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRunReport {
    pub supplier: String,
    pub seed: u64,
    pub order_size: u64,
    pub trials: usize,
    pub discount_rate: DiscountRate,
    #[serde(flatten)]
    pub report: SensitivityReport,
}

pub fn to_json<T: Serialize>(report: &T) -> color_eyre::Result<String> {
    serde_json::to_string_pretty(report).wrap_err("Failed to serialize report")
}

fn describe_rate(rate: &DiscountRate) -> String {
    match rate.source {
        RateSource::Override => format!("{:.2}% (override)", rate.percent),
        RateSource::Fetched { observed } => {
            format!("{:.2}% (fed funds, {observed})", rate.percent)
        }
        RateSource::Fallback => format!("{:.2}% (default)", rate.percent),
    }
}

impl RunReport {
    pub fn render(&self, format: OutputFormat) -> color_eyre::Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => to_json(self),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Order size {} | {} trials | seed {} | discount rate {}",
            format_units(self.order_size as f64),
            format_units(self.trials as f64),
            self.seed,
            describe_rate(&self.discount_rate)
        );
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "{:<12} {:>12} {:>10} {:>12} {:>12} {:>12} {:>10} {:>10}",
            "Supplier", "Unit cost", "Std", "P05", "P95", "Order cost", "Lost", "Delivered"
        );
        for supplier in &self.suppliers {
            let _ = writeln!(
                out,
                "{:<12} {:>12} {:>10} {:>12} {:>12} {:>12} {:>10} {:>10}",
                supplier.supplier,
                format_currency(supplier.per_unit.mean),
                format_currency(supplier.per_unit.std_dev),
                format_currency(supplier.per_unit.p05),
                format_currency(supplier.per_unit.p95),
                format_compact_currency(supplier.mean_total_cost),
                format_units(supplier.mean_lost_units),
                format_percentage(supplier.delivered_fraction),
            );
        }
        let _ = writeln!(out);

        match &self.allocation {
            AllocationReport::Allocated {
                allocations,
                expected_cost,
                cost_variance,
                objective_value,
                delivered_fraction,
                yield_floor_multiplier,
                outlook,
            } => {
                let _ = writeln!(out, "Allocation (risk aversion {})", self.risk_aversion);
                for share in allocations {
                    let _ = writeln!(
                        out,
                        "  {:<12} {:>8}",
                        share.supplier,
                        format_percentage(share.weight)
                    );
                }
                let _ = writeln!(
                    out,
                    "  Blended unit cost   {}",
                    format_currency(*expected_cost)
                );
                let _ = writeln!(
                    out,
                    "  Cost std dev        {}",
                    format_currency(cost_variance.sqrt())
                );
                let _ = writeln!(out, "  Objective           {objective_value:.4}");
                let _ = writeln!(
                    out,
                    "  Delivered fraction  {}",
                    format_percentage(*delivered_fraction)
                );
                if let Some(multiplier) = yield_floor_multiplier {
                    let _ = writeln!(out, "  Yield floor binding (multiplier {multiplier:.4})");
                }
                let _ = writeln!(out);
                let _ = writeln!(out, "Outlook");
                let _ = writeln!(
                    out,
                    "  Expected lost units {}",
                    format_units(outlook.expected_lost_units)
                );
                let _ = writeln!(
                    out,
                    "  Yield rate          {}",
                    format_percentage(outlook.yield_rate)
                );
                let _ = writeln!(
                    out,
                    "  Recommended order   {}",
                    format_units(outlook.recommended_order_size)
                );
            }
            AllocationReport::Failed { reason } => {
                let _ = writeln!(out, "Allocation unavailable: {reason}");
            }
        }

        out
    }
}

impl SensitivityRunReport {
    pub fn render(&self, format: OutputFormat) -> color_eyre::Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => to_json(self),
        }
    }

    pub fn to_text(&self) -> String {
        let report = &self.report;
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{} | order size {} | {} trials | seed {} | discount rate {}",
            self.supplier,
            format_units(self.order_size as f64),
            format_units(self.trials as f64),
            self.seed,
            describe_rate(&self.discount_rate)
        );
        let _ = writeln!(
            out,
            "Baseline mean order cost {} | swing ±{}",
            format_currency(report.baseline_mean),
            format_percentage(report.swing)
        );
        let _ = writeln!(out);

        if report.entries.is_empty() {
            let _ = writeln!(out, "No factor moved the mean cost");
        } else {
            let _ = writeln!(
                out,
                "{:<30} {:>12} {:>16} {:>16} {:>14}",
                "Factor", "Base", "Low", "High", "Impact"
            );
            for entry in &report.entries {
                let _ = writeln!(
                    out,
                    "{:<30} {:>12.4} {:>16} {:>16} {:>14}",
                    entry.label,
                    entry.base_value,
                    format_currency(entry.low_mean),
                    format_currency(entry.high_mean),
                    format_currency_delta(entry.impact),
                );
            }
        }

        if !report.skipped.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Skipped");
            for skipped in &report.skipped {
                let _ = writeln!(out, "  {}: {}", skipped.label, skipped.reason);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sourcing_core::analysis::{ParameterPath, SensitivityEntry, SkippedFactor};
    use sourcing_core::model::SimulationResult;

    use super::*;

    fn simulation(name: &str, lost: u64) -> SupplierSimulation {
        SupplierSimulation {
            supplier: name.to_string(),
            result: SimulationResult {
                order_size: 100,
                trials: 2,
                total_cost: vec![1_000.0, 3_000.0],
                lost_units: vec![lost, lost],
                manufacturing_yield: vec![0.9, 0.8],
            },
        }
    }

    fn allocation() -> OptimizationResult {
        OptimizationResult {
            allocations: HashMap::from([
                ("Mexico".to_string(), 0.25),
                ("China".to_string(), 0.75),
            ]),
            expected_cost: 20.0,
            cost_variance: 4.0,
            objective_value: 40.0,
            risk_aversion: 5.0,
            delivered_fraction: 0.9,
            yield_floor_multiplier: None,
            iterations: 12,
        }
    }

    fn run_report(allocation: AllocationReport) -> RunReport {
        RunReport {
            seed: 7,
            order_size: 100,
            trials: 2,
            discount_rate: DiscountRate::fallback(),
            risk_aversion: 5.0,
            suppliers: vec![SupplierReport::from_simulation(&simulation("China", 10))],
            allocation,
        }
    }

    #[test]
    fn test_supplier_report_from_simulation() {
        let report = SupplierReport::from_simulation(&simulation("China", 10));
        assert_eq!(report.supplier, "China");
        assert_eq!(report.mean_total_cost, 2_000.0);
        assert_eq!(report.per_unit.mean, 20.0);
        assert_eq!(report.mean_lost_units, 10.0);
        assert!((report.mean_manufacturing_yield - 0.85).abs() < 1e-12);
        assert!((report.delivered_fraction - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_allocated_shares_are_sorted() {
        let outlook = PortfolioOutlook::new(100, 10.0);
        let report = AllocationReport::allocated(&allocation(), outlook);
        let AllocationReport::Allocated { allocations, .. } = report else {
            panic!("expected an allocation");
        };
        assert_eq!(allocations[0].supplier, "China");
        assert_eq!(allocations[1].supplier, "Mexico");
    }

    #[test]
    fn test_run_report_text() {
        let outlook = PortfolioOutlook::new(100, 10.0);
        let text = run_report(AllocationReport::allocated(&allocation(), outlook)).to_text();
        assert!(text.contains("seed 7"));
        assert!(text.contains("4.50% (default)"));
        assert!(text.contains("75.00%"));
        assert!(text.contains("Blended unit cost   $20.00"));
        assert!(text.contains("Recommended order   111"));
    }

    #[test]
    fn test_failed_allocation_text_and_json() {
        let report = run_report(AllocationReport::failed("no supplier has any cost variance"));
        assert!(report.to_text().contains("Allocation unavailable"));

        let json: serde_json::Value =
            serde_json::from_str(&report.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["allocation"]["status"], "failed");
        assert_eq!(json["discount_rate"]["source"]["kind"], "fallback");
        assert_eq!(json["suppliers"][0]["per_unit"]["mean"], 20.0);
    }

    #[test]
    fn test_unbounded_order_serializes_as_null() {
        let outlook = PortfolioOutlook::new(100, 150.0);
        let report = run_report(AllocationReport::allocated(&allocation(), outlook));
        let json: serde_json::Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();
        assert!(json["allocation"]["outlook"]["recommended_order_size"].is_null());
        assert!(report.to_text().contains("Recommended order   ∞"));
    }

    #[test]
    fn test_sensitivity_report_rendering() {
        let report = SensitivityRunReport {
            supplier: "US".to_string(),
            seed: 1,
            order_size: 100,
            trials: 10,
            discount_rate: DiscountRate::fallback(),
            report: SensitivityReport {
                baseline_mean: 50_000.0,
                swing: 0.2,
                entries: vec![SensitivityEntry {
                    label: "Raw Material Mean".to_string(),
                    path: ParameterPath::TariffFixed,
                    base_value: 40.0,
                    low_mean: 44_000.0,
                    high_mean: 56_000.0,
                    impact: 12_000.0,
                }],
                skipped: vec![SkippedFactor {
                    label: "Labor Mean".to_string(),
                    reason: "not present".to_string(),
                }],
            },
        };

        let text = report.to_text();
        assert!(text.contains("swing ±20.00%"));
        assert!(text.contains("+$12,000"));
        assert!(text.contains("Labor Mean: not present"));

        let json: serde_json::Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();
        assert_eq!(json["baseline_mean"], 50_000.0);
        assert_eq!(json["entries"][0]["impact"], 12_000.0);
    }
}
