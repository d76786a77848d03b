//! Mean-variance allocation with a minimum expected delivered fraction
//!
//! The floor `Σ w_i d_i ≥ f` is dualized with a multiplier η ≥ 0, which
//! turns each supplier's mean into `μ_i − η d_i` and leaves the rest of the
//! problem to the unconstrained core. The delivered fraction of the inner
//! solution is non-decreasing in η, so η is found by bisection. At the end
//! the solutions on either side of the binding η are blended so the floor
//! holds with equality when a linear supplier switches on at the kink.

use crate::error::OptimizationError;

use super::mean_variance::{Solution, Term, solve};

const FLOOR_TOLERANCE: f64 = 1e-9;

/// Doublings allowed while searching for a multiplier that meets the floor
const MAX_EXPANSIONS: usize = 128;

#[derive(Debug, Clone)]
pub(crate) struct FlooredSolution {
    pub solution: Solution,
    /// `None` when the unconstrained allocation already met the floor
    pub multiplier: Option<f64>,
}

fn delivered(weights: &[f64], fractions: &[f64]) -> f64 {
    weights.iter().zip(fractions).map(|(w, d)| w * d).sum()
}

fn shifted(terms: &[Term], fractions: &[f64], eta: f64) -> Vec<Term> {
    terms
        .iter()
        .zip(fractions)
        .map(|(t, d)| Term {
            mean: t.mean - eta * d,
            ..*t
        })
        .collect()
}

/// Largest delivered fraction any allocation within the bounds can reach
fn max_delivered(terms: &[Term], fractions: &[f64]) -> f64 {
    let mut order: Vec<usize> = (0..terms.len()).collect();
    order.sort_by(|&a, &b| fractions[b].total_cmp(&fractions[a]));

    let mut remaining = 1.0 - terms.iter().map(|t| t.bounds.min).sum::<f64>();
    let mut total: f64 = terms
        .iter()
        .zip(fractions)
        .map(|(t, d)| t.bounds.min * d)
        .sum();

    for i in order {
        if remaining <= 0.0 {
            break;
        }
        let add = (terms[i].bounds.max - terms[i].bounds.min).min(remaining);
        total += add * fractions[i];
        remaining -= add;
    }
    total
}

pub(crate) fn solve_with_floor(
    terms: &[Term],
    fractions: &[f64],
    floor: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<FlooredSolution, OptimizationError> {
    let unconstrained = solve(terms, tolerance, max_iterations)?;
    let mut iterations = unconstrained.iterations;
    if delivered(&unconstrained.weights, fractions) >= floor - FLOOR_TOLERANCE {
        return Ok(FlooredSolution {
            solution: unconstrained,
            multiplier: None,
        });
    }

    let reachable = max_delivered(terms, fractions);
    if reachable < floor - FLOOR_TOLERANCE {
        return Err(OptimizationError::Infeasible(format!(
            "delivered fraction floor {floor:.4} exceeds the reachable {reachable:.4}"
        )));
    }

    let mut low = (0.0, unconstrained);
    let mut eta_high = 1.0;
    let mut high = None;
    for _ in 0..MAX_EXPANSIONS {
        let candidate = solve(&shifted(terms, fractions, eta_high), tolerance, max_iterations)?;
        iterations += candidate.iterations;
        if delivered(&candidate.weights, fractions) >= floor - FLOOR_TOLERANCE {
            high = Some((eta_high, candidate));
            break;
        }
        low = (eta_high, candidate);
        eta_high *= 2.0;
    }
    let Some(mut high) = high else {
        return Err(OptimizationError::NotConverged { iterations });
    };

    let mut steps = 0;
    while steps < max_iterations && high.0 - low.0 > tolerance * high.0.max(1.0) {
        steps += 1;
        let eta = 0.5 * (low.0 + high.0);
        let candidate = solve(&shifted(terms, fractions, eta), tolerance, max_iterations)?;
        iterations += candidate.iterations;
        if delivered(&candidate.weights, fractions) >= floor - FLOOR_TOLERANCE {
            high = (eta, candidate);
        } else {
            low = (eta, candidate);
        }
    }

    let low_delivered = delivered(&low.1.weights, fractions);
    let high_delivered = delivered(&high.1.weights, fractions);
    let theta = if high_delivered > low_delivered {
        ((floor - low_delivered) / (high_delivered - low_delivered)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let weights = low
        .1
        .weights
        .iter()
        .zip(&high.1.weights)
        .map(|(lo, hi)| theta * hi + (1.0 - theta) * lo)
        .collect();

    Ok(FlooredSolution {
        solution: Solution {
            weights,
            iterations,
        },
        multiplier: Some(high.0),
    })
}
