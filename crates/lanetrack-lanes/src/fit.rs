use faer::prelude::SpSolverLstsq;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// A lane line `x = a·y² + b·y + c` in the pixel space of the rectified view.
///
/// # Example
///
/// ```
/// use lanetrack_lanes::LaneFit;
///
/// let ys = [0.0, 10.0, 20.0, 30.0];
/// let xs = ys.iter().map(|y| 0.5 * y * y + 2.0 * y + 300.0).collect::<Vec<_>>();
///
/// let fit = LaneFit::fit(&ys, &xs).unwrap();
/// assert!((fit.a - 0.5).abs() < 1e-9);
/// assert!((fit.eval(40.0) - 1180.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneFit {
    /// Quadratic coefficient.
    pub a: f64,
    /// Linear coefficient.
    pub b: f64,
    /// Constant coefficient.
    pub c: f64,
}

impl LaneFit {
    /// Create a fit from its coefficients.
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Evaluate the column of the line at a row.
    #[inline]
    pub fn eval(&self, y: f64) -> f64 {
        (self.a * y + self.b) * y + self.c
    }

    /// Whether all coefficients are finite.
    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite()
    }

    /// Evaluate the line at every row `0..height`.
    pub fn sample(&self, height: usize) -> Vec<f64> {
        (0..height).map(|y| self.eval(y as f64)).collect()
    }

    /// Least-squares fit of `x = a·y² + b·y + c`.
    ///
    /// The rows are centered and scaled, then the system is solved by QR least squares.
    ///
    /// # Arguments
    ///
    /// * `ys` - The row of every sample.
    /// * `xs` - The column of every sample.
    ///
    /// # Errors
    ///
    /// * [`FitError::MismatchedLengths`] when `ys` and `xs` differ in length.
    /// * [`FitError::InsufficientData`] with fewer than three distinct rows.
    /// * [`FitError::Singular`] when the system has no finite solution.
    pub fn fit(ys: &[f64], xs: &[f64]) -> Result<Self, FitError> {
        if ys.len() != xs.len() {
            return Err(FitError::MismatchedLengths(xs.len(), ys.len()));
        }

        let distinct = count_distinct_up_to(ys, 3);
        if distinct < 3 {
            return Err(FitError::InsufficientData(distinct));
        }

        let n = ys.len() as f64;
        let mean = ys.iter().sum::<f64>() / n;
        let std = (ys.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n).sqrt();
        if !(std > 0.0) || !std.is_finite() {
            return Err(FitError::Singular);
        }

        // design matrix over t = (y - mean) / std
        let mat_a = faer::Mat::<f64>::from_fn(ys.len(), 3, |i, j| {
            let t = (ys[i] - mean) / std;
            match j {
                0 => t * t,
                1 => t,
                _ => 1.0,
            }
        });
        let mat_b = faer::Mat::<f64>::from_fn(xs.len(), 1, |i, _| xs[i]);

        let params = mat_a.qr().solve_lstsq(mat_b);
        let coeffs = params.col(0);
        let (ap, bp, cp) = (coeffs[0], coeffs[1], coeffs[2]);

        // back to x = a·y² + b·y + c
        let s2 = std * std;
        let fit = Self {
            a: ap / s2,
            b: bp / std - 2.0 * ap * mean / s2,
            c: ap * mean * mean / s2 - bp * mean / std + cp,
        };

        if !fit.is_finite() {
            return Err(FitError::Singular);
        }

        Ok(fit)
    }
}

/// Count distinct values, stopping once `limit` have been seen.
fn count_distinct_up_to(values: &[f64], limit: usize) -> usize {
    let mut seen: Vec<f64> = Vec::with_capacity(limit);
    for &v in values {
        if !seen.contains(&v) {
            seen.push(v);
            if seen.len() >= limit {
                break;
            }
        }
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn recovers_a_vertical_line() -> Result<(), FitError> {
        let ys = (0..720).map(|y| y as f64).collect::<Vec<_>>();
        let xs = vec![300.0; ys.len()];

        let fit = LaneFit::fit(&ys, &xs)?;
        approx::assert_abs_diff_eq!(fit.a, 0.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(fit.b, 0.0, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(fit.c, 300.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn recovers_a_noisy_parabola() -> Result<(), FitError> {
        let mut rng = StdRng::seed_from_u64(7);
        let truth = LaneFit::new(2e-4, -0.3, 450.0);

        let mut ys = Vec::new();
        let mut xs = Vec::new();
        for _ in 0..2000 {
            let y = rng.random_range(0.0..720.0);
            ys.push(y);
            xs.push(truth.eval(y) + rng.random_range(-2.0..2.0));
        }

        let fit = LaneFit::fit(&ys, &xs)?;
        approx::assert_abs_diff_eq!(fit.a, truth.a, epsilon = 1e-5);
        approx::assert_abs_diff_eq!(fit.b, truth.b, epsilon = 1e-2);
        approx::assert_abs_diff_eq!(fit.c, truth.c, epsilon = 1.0);
        Ok(())
    }

    #[test]
    fn needs_three_distinct_rows() {
        assert_eq!(LaneFit::fit(&[], &[]), Err(FitError::InsufficientData(0)));

        let ys = [5.0, 5.0, 6.0, 6.0];
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(LaneFit::fit(&ys, &xs), Err(FitError::InsufficientData(2)));

        assert_eq!(
            LaneFit::fit(&[1.0, 2.0], &[1.0]),
            Err(FitError::MismatchedLengths(1, 2))
        );
    }

    #[test]
    fn exact_through_three_points() -> Result<(), FitError> {
        let fit = LaneFit::fit(&[0.0, 1.0, 2.0], &[1.0, 2.0, 5.0])?;
        approx::assert_abs_diff_eq!(fit.a, 1.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(fit.b, 0.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(fit.c, 1.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn non_finite_samples_are_singular() {
        let ys = [0.0, 1.0, 2.0, 3.0];
        let xs = [0.0, f64::NAN, 1.0, 2.0];
        assert_eq!(LaneFit::fit(&ys, &xs), Err(FitError::Singular));
    }

    #[test]
    fn sample_matches_eval() {
        let fit = LaneFit::new(1.0, -2.0, 3.0);
        assert_eq!(fit.sample(3), vec![3.0, 2.0, 3.0]);
    }
}
