//! Mean-variance allocation core
//!
//! With suppliers treated as independent, the objective
//!
//! ```text
//! Σ w_i μ_i + λ Σ w_i² σ_i²      subject to  Σ w_i = 1,  lo_i ≤ w_i ≤ hi_i
//! ```
//!
//! is separable and convex. Stationarity gives, for a simplex multiplier ν,
//! `w_i(ν) = clamp((ν − μ_i) / (2λσ_i²), lo_i, hi_i)` for suppliers with
//! curvature, and a step from `lo_i` to `hi_i` at `ν = μ_i` for suppliers
//! whose cost enters linearly (zero variance, or λ = 0). The weight sum is
//! non-decreasing in ν, so ν is found by bisection. Linear suppliers tied at
//! the final ν share whatever weight is left, in proportion to their bound
//! ranges.

use crate::error::OptimizationError;

use super::config::WeightBounds;

/// Relative distance under which a linear supplier counts as tied with ν
const TIE_TOLERANCE: f64 = 1e-9;

/// Slack allowed on the final weight sum and bounds
const FEASIBILITY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub(crate) struct Solution {
    pub weights: Vec<f64>,
    pub iterations: usize,
}

/// One supplier's term in the objective
#[derive(Debug, Clone, Copy)]
pub(crate) struct Term {
    pub mean: f64,
    /// `2λσ²`, zero for linear terms
    pub curvature: f64,
    pub bounds: WeightBounds,
}

impl Term {
    fn is_linear(&self) -> bool {
        self.curvature == 0.0
    }

    /// Weight at multiplier `nu`; `ties_high` picks the upper side of a step
    fn weight_at(&self, nu: f64, ties_high: bool) -> f64 {
        if self.is_linear() {
            if self.mean < nu || (ties_high && self.mean == nu) {
                self.bounds.max
            } else {
                self.bounds.min
            }
        } else {
            ((nu - self.mean) / self.curvature).clamp(self.bounds.min, self.bounds.max)
        }
    }

    /// Multipliers at which this term sits at its lower and upper bound
    fn breakpoints(&self) -> (f64, f64) {
        (
            self.mean + self.curvature * self.bounds.min,
            self.mean + self.curvature * self.bounds.max,
        )
    }
}

fn weight_sum(terms: &[Term], nu: f64, ties_high: bool) -> f64 {
    terms.iter().map(|t| t.weight_at(nu, ties_high)).sum()
}

pub(crate) fn check_feasible(terms: &[Term]) -> Result<(), OptimizationError> {
    let min_total: f64 = terms.iter().map(|t| t.bounds.min).sum();
    let max_total: f64 = terms.iter().map(|t| t.bounds.max).sum();
    if min_total > 1.0 + FEASIBILITY_TOLERANCE {
        return Err(OptimizationError::Infeasible(format!(
            "minimum weights sum to {min_total:.6} > 1"
        )));
    }
    if max_total < 1.0 - FEASIBILITY_TOLERANCE {
        return Err(OptimizationError::Infeasible(format!(
            "maximum weights sum to {max_total:.6} < 1"
        )));
    }
    Ok(())
}

/// Solve for the weights minimizing the mean-variance objective
pub(crate) fn solve(
    terms: &[Term],
    tolerance: f64,
    max_iterations: usize,
) -> Result<Solution, OptimizationError> {
    check_feasible(terms)?;

    let (mut lo, mut hi) = terms.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), term| {
            let (at_min, at_max) = term.breakpoints();
            (lo.min(at_min), hi.max(at_max))
        },
    );
    lo -= 1.0 + lo.abs() * 1e-6;
    hi += 1.0 + hi.abs() * 1e-6;

    let mut iterations = 0;
    let mut nu = 0.5 * (lo + hi);
    let mut bracketed = false;

    while iterations < max_iterations {
        iterations += 1;
        nu = 0.5 * (lo + hi);

        if weight_sum(terms, nu, false) > 1.0 + tolerance {
            hi = nu;
        } else if weight_sum(terms, nu, true) < 1.0 - tolerance {
            lo = nu;
        } else {
            bracketed = true;
            break;
        }

        // The bracket has collapsed onto a step of a linear term
        if hi - lo <= f64::EPSILON * lo.abs().max(hi.abs()).max(1.0) {
            nu = 0.5 * (lo + hi);
            bracketed = true;
            break;
        }
    }

    if !bracketed {
        return Err(OptimizationError::NotConverged { iterations });
    }

    let weights = settle_weights(terms, nu);

    let total: f64 = weights.iter().sum();
    let within_bounds = weights.iter().zip(terms).all(|(w, t)| {
        *w >= t.bounds.min - FEASIBILITY_TOLERANCE && *w <= t.bounds.max + FEASIBILITY_TOLERANCE
    });
    if !within_bounds
        || (total - 1.0).abs() > FEASIBILITY_TOLERANCE
        || weights.iter().any(|w| !w.is_finite())
    {
        return Err(OptimizationError::NotConverged { iterations });
    }

    Ok(Solution {
        weights,
        iterations,
    })
}

/// Turn a multiplier into weights that sum to one
fn settle_weights(terms: &[Term], nu: f64) -> Vec<f64> {
    let tie = TIE_TOLERANCE * nu.abs().max(1.0);
    let is_tied = |t: &Term| t.is_linear() && (t.mean - nu).abs() <= tie;

    let mut weights: Vec<f64> = terms
        .iter()
        .map(|t| {
            if is_tied(t) {
                t.bounds.min
            } else {
                t.weight_at(nu, false)
            }
        })
        .collect();

    let residual = 1.0 - weights.iter().sum::<f64>();

    // Leftover weight goes to tied linear terms by bound range
    let tied_room: f64 = terms
        .iter()
        .filter(|t| is_tied(t))
        .map(|t| t.bounds.max - t.bounds.min)
        .sum();
    if tied_room > 0.0 {
        for (w, t) in weights.iter_mut().zip(terms) {
            if is_tied(t) {
                let share = residual * (t.bounds.max - t.bounds.min) / tied_room;
                *w = (t.bounds.min + share).clamp(t.bounds.min, t.bounds.max);
            }
        }
        return weights;
    }

    // Otherwise shift ν by the residual across curved terms off their bounds
    let free = |w: f64, t: &Term| !t.is_linear() && w > t.bounds.min && w < t.bounds.max;
    let slope: f64 = weights
        .iter()
        .zip(terms)
        .filter(|(w, t)| free(**w, t))
        .map(|(_, t)| 1.0 / t.curvature)
        .sum();
    if slope > 0.0 {
        let shift = residual / slope;
        for (w, t) in weights.iter_mut().zip(terms) {
            if free(*w, t) {
                *w = (*w + shift / t.curvature).clamp(t.bounds.min, t.bounds.max);
            }
        }
    }

    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(mean: f64, variance: f64, lambda: f64) -> Term {
        Term {
            mean,
            curvature: 2.0 * lambda * variance,
            bounds: WeightBounds::default(),
        }
    }

    #[test]
    fn test_linear_terms_pick_cheapest() {
        let terms = [term(10.0, 4.0, 0.0), term(8.0, 9.0, 0.0), term(12.0, 1.0, 0.0)];
        let solution = solve(&terms, 1e-10, 1_000).unwrap();
        assert_eq!(solution.weights, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_linear_ties_split_evenly() {
        let terms = [term(8.0, 4.0, 0.0), term(8.0, 9.0, 0.0), term(12.0, 1.0, 0.0)];
        let solution = solve(&terms, 1e-10, 1_000).unwrap();
        assert!((solution.weights[0] - 0.5).abs() < 1e-12);
        assert!((solution.weights[1] - 0.5).abs() < 1e-12);
        assert_eq!(solution.weights[2], 0.0);
    }

    #[test]
    fn test_equal_means_weight_inverse_to_variance() {
        // Minimum-variance split for independent suppliers: w ∝ 1/σ²
        let terms = [term(10.0, 1.0, 2.0), term(10.0, 3.0, 2.0)];
        let solution = solve(&terms, 1e-12, 1_000).unwrap();
        assert!((solution.weights[0] - 0.75).abs() < 1e-8);
        assert!((solution.weights[1] - 0.25).abs() < 1e-8);
    }

    #[test]
    fn test_bounds_are_respected() {
        let mut capped = term(8.0, 1.0, 0.5);
        capped.bounds = WeightBounds::new(0.0, 0.6);
        let mut floor = term(12.0, 1.0, 0.5);
        floor.bounds = WeightBounds::new(0.1, 1.0);
        let terms = [capped, floor, term(11.0, 2.0, 0.5)];

        let solution = solve(&terms, 1e-12, 1_000).unwrap();
        let w = &solution.weights;
        assert!(w[0] <= 0.6 + 1e-12);
        assert!(w[1] >= 0.1 - 1e-12);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_infeasible_bounds() {
        let mut a = term(8.0, 1.0, 1.0);
        a.bounds = WeightBounds::new(0.7, 1.0);
        let mut b = term(9.0, 1.0, 1.0);
        b.bounds = WeightBounds::new(0.7, 1.0);

        let err = solve(&[a, b], 1e-10, 1_000).unwrap_err();
        assert!(matches!(err, OptimizationError::Infeasible(_)));
    }

    #[test]
    fn test_zero_variance_supplier_mixed_with_risky() {
        // A riskless supplier at 10 caps ν; the risky supplier at 9 takes
        // (10 - 9) / (2·1·2) = 0.25 and the riskless one takes the rest.
        let terms = [term(10.0, 0.0, 1.0), term(9.0, 2.0, 1.0)];
        let solution = solve(&terms, 1e-12, 1_000).unwrap();
        assert!((solution.weights[1] - 0.25).abs() < 1e-6);
        assert!((solution.weights[0] - 0.75).abs() < 1e-6);
    }
}
