//! Tests for the allocation optimizer
//!
//! These tests verify:
//! - Weights always lie in [0, 1] and sum to one
//! - Raising risk aversion moves weight off the most volatile supplier
//! - Equal means favour the lower-variance supplier
//! - Empty and degenerate inputs come back as errors

use std::collections::HashMap;

use crate::error::OptimizationError;
use crate::optimization::{
    AllocationConfig, AllocationStrategy, SupplierCost, WeightBounds, optimize,
    optimize_simulations,
};
use crate::presets::default_registry;
use crate::simulation::{SimulationConfig, simulate_registry};

const SUM_TOLERANCE: f64 = 1e-6;

fn three_suppliers() -> Vec<SupplierCost> {
    vec![
        // Cheapest and most volatile
        SupplierCost::new("China", 10.0, 4.0),
        SupplierCost::new("Mexico", 10.5, 1.0),
        SupplierCost::new("US", 11.0, 0.5),
    ]
}

fn assert_valid(result: &crate::optimization::OptimizationResult) {
    let total: f64 = result.allocations.values().sum();
    assert!((total - 1.0).abs() < SUM_TOLERANCE, "weights sum to {total}");
    for (name, w) in &result.allocations {
        assert!((0.0..=1.0).contains(w), "{name} has weight {w}");
    }
}

#[test]
fn test_weights_valid_across_lambda_sweep() {
    let costs = three_suppliers();
    for lambda in [0.0, 0.01, 0.1, 0.5, 1.0, 5.0, 50.0, 1e4] {
        let result = optimize(&costs, &AllocationConfig::with_risk_aversion(lambda)).unwrap();
        assert_valid(&result);
        assert_eq!(result.risk_aversion, lambda);
    }
}

#[test]
fn test_zero_lambda_concentrates_in_cheapest() {
    let result = optimize(&three_suppliers(), &AllocationConfig::with_risk_aversion(0.0)).unwrap();
    assert_eq!(result.weight("China"), 1.0);
    assert_eq!(result.weight("Mexico"), 0.0);
    assert!((result.expected_cost - 10.0).abs() < 1e-12);
}

#[test]
fn test_weight_leaves_most_volatile_supplier_as_lambda_grows() {
    let costs = three_suppliers();
    let mut previous = f64::INFINITY;
    for step in 0..40 {
        let lambda = 0.02 * step as f64;
        let result = optimize(&costs, &AllocationConfig::with_risk_aversion(lambda)).unwrap();
        let w = result.weight("China");
        assert!(w <= previous + 1e-9, "λ={lambda}: {w} > {previous}");
        previous = w;
    }
    assert!(previous < 1.0);
}

#[test]
fn test_equal_means_favour_lower_variance() {
    let costs = vec![
        SupplierCost::new("Steady", 20.0, 1.0),
        SupplierCost::new("Volatile", 20.0, 9.0),
    ];
    let result = optimize(&costs, &AllocationConfig::with_risk_aversion(0.5)).unwrap();
    assert_valid(&result);
    assert!(result.weight("Steady") > result.weight("Volatile"));
    // Inverse-variance split
    assert!((result.weight("Steady") - 0.9).abs() < 1e-6);
}

#[test]
fn test_objective_reported_consistently() {
    let result = optimize(&three_suppliers(), &AllocationConfig::with_risk_aversion(0.3)).unwrap();
    let expected: f64 = three_suppliers()
        .iter()
        .map(|c| result.weight(&c.supplier) * c.mean)
        .sum();
    let variance: f64 = three_suppliers()
        .iter()
        .map(|c| result.weight(&c.supplier).powi(2) * c.variance)
        .sum();
    assert!((result.expected_cost - expected).abs() < 1e-9);
    assert!((result.cost_variance - variance).abs() < 1e-9);
    assert!((result.objective_value - (expected + 0.3 * variance)).abs() < 1e-9);
}

#[test]
fn test_empty_supplier_set_fails() {
    let err = optimize(&[], &AllocationConfig::default()).unwrap_err();
    assert_eq!(err, OptimizationError::NoSuppliers);
}

#[test]
fn test_single_degenerate_supplier_fails() {
    let costs = vec![SupplierCost::new("US", 75.0, 0.0)];
    let err = optimize(&costs, &AllocationConfig::default()).unwrap_err();
    assert_eq!(err, OptimizationError::Degenerate);
}

#[test]
fn test_single_supplier_takes_everything() {
    let costs = vec![SupplierCost::new("US", 75.0, 2.0)];
    let result = optimize(&costs, &AllocationConfig::default()).unwrap();
    assert!((result.weight("US") - 1.0).abs() < 1e-9);
}

#[test]
fn test_invalid_inputs_fail() {
    let config = AllocationConfig::default();

    let nan_mean = vec![SupplierCost::new("A", f64::NAN, 1.0)];
    assert!(matches!(
        optimize(&nan_mean, &config),
        Err(OptimizationError::InvalidCost { .. })
    ));

    let negative_variance = vec![SupplierCost::new("A", 1.0, -1.0)];
    assert!(matches!(
        optimize(&negative_variance, &config),
        Err(OptimizationError::InvalidCost { .. })
    ));

    let duplicate = vec![SupplierCost::new("A", 1.0, 1.0), SupplierCost::new("A", 2.0, 1.0)];
    assert!(matches!(
        optimize(&duplicate, &config),
        Err(OptimizationError::InvalidCost { .. })
    ));

    assert_eq!(
        optimize(&three_suppliers(), &AllocationConfig::with_risk_aversion(-1.0)).unwrap_err(),
        OptimizationError::InvalidRiskAversion(-1.0)
    );
}

#[test]
fn test_weight_bounds() {
    let config = AllocationConfig {
        risk_aversion: 0.0,
        weight_bounds: HashMap::from([("China".to_string(), WeightBounds::new(0.0, 0.4))]),
        ..Default::default()
    };
    let result = optimize(&three_suppliers(), &config).unwrap();
    assert_valid(&result);
    assert!((result.weight("China") - 0.4).abs() < 1e-9);
    assert!((result.weight("Mexico") - 0.6).abs() < 1e-9);

    let infeasible = AllocationConfig {
        weight_bounds: HashMap::from([
            ("China".to_string(), WeightBounds::new(0.0, 0.2)),
            ("Mexico".to_string(), WeightBounds::new(0.0, 0.2)),
            ("US".to_string(), WeightBounds::new(0.0, 0.2)),
        ]),
        ..Default::default()
    };
    assert!(matches!(
        optimize(&three_suppliers(), &infeasible),
        Err(OptimizationError::Infeasible(_))
    ));
}

#[test]
fn test_yield_floor_strategy() {
    let costs = vec![
        SupplierCost::new("Cheap", 10.0, 1.0).with_delivered_fraction(0.8),
        SupplierCost::new("Reliable", 12.0, 1.0).with_delivered_fraction(0.99),
    ];

    let unconstrained = optimize(&costs, &AllocationConfig::with_risk_aversion(0.1)).unwrap();
    assert!(unconstrained.delivered_fraction < 0.9);
    assert!(unconstrained.yield_floor_multiplier.is_none());

    let floored = AllocationConfig {
        risk_aversion: 0.1,
        strategy: AllocationStrategy::YieldFloor {
            min_delivered_fraction: 0.9,
        },
        ..Default::default()
    };
    let result = optimize(&costs, &floored).unwrap();
    assert_valid(&result);
    assert!(result.delivered_fraction >= 0.9 - 1e-6);
    assert!(result.yield_floor_multiplier.is_some());
    assert!(result.expected_cost > unconstrained.expected_cost);

    let impossible = AllocationConfig {
        strategy: AllocationStrategy::YieldFloor {
            min_delivered_fraction: 0.995,
        },
        ..floored
    };
    assert!(matches!(
        optimize(&costs, &impossible),
        Err(OptimizationError::Infeasible(_))
    ));
}

#[test]
fn test_optimize_from_simulations() {
    let registry = default_registry();
    let config = SimulationConfig {
        trials: 2_000,
        ..Default::default()
    };
    let runs = simulate_registry(&registry, &config, 42).unwrap();
    for lambda in [0.0, 0.001, 0.1] {
        let result = optimize_simulations(&runs, &AllocationConfig::with_risk_aversion(lambda))
            .unwrap();
        assert_valid(&result);
        assert_eq!(result.allocations.len(), 3);
    }
}

#[test]
fn test_cost_from_samples_uses_population_variance() {
    let steady = SupplierCost::from_samples("Steady", &[10.0, 10.0, 10.0, 10.0]);
    let swingy = SupplierCost::from_samples("Swingy", &[8.0, 12.0, 8.0, 12.0]);
    assert_eq!(steady.mean, 10.0);
    assert_eq!(steady.variance, 0.0);
    assert_eq!(swingy.mean, 10.0);
    assert_eq!(swingy.variance, 4.0);
    assert_eq!(swingy.delivered_fraction, 1.0);

    // Same mean, so any risk aversion puts everything on the steady supplier
    let result = optimize(&[steady, swingy], &AllocationConfig::with_risk_aversion(1.0)).unwrap();
    assert_valid(&result);
    assert!((result.weight("Steady") - 1.0).abs() < SUM_TOLERANCE);
}
