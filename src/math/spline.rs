//! Interpolating cubic spline.
//!
//! We solve for the second derivatives `M_i` at each knot. On every interior
//! knot, continuity of the first derivative gives:
//!
//! ```text
//! h_{i-1} M_{i-1} + 2 (h_{i-1} + h_i) M_i + h_i M_{i+1}
//!     = 6 [ (y_{i+1} - y_i) / h_i - (y_i - y_{i-1}) / h_{i-1} ]
//! ```
//!
//! End conditions:
//! - 2 knots: `M_0 = M_1 = 0` (straight line)
//! - 3 knots: `M_0 = M_1 = M_2` (a single parabola, the not-a-knot limit)
//! - 4+ knots: not-a-knot (third derivative continuous at `x_1` and `x_{n-2}`)
//!
//! The system is tiny (one row per annual anchor), so a dense LU solve via
//! nalgebra is plenty.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    second: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline through `(x, y)` knots; `x` must be strictly increasing.
    pub fn fit(knots: &[(f64, f64)]) -> Result<Self, AppError> {
        let n = knots.len();
        if n < 2 {
            return Err(AppError::no_data(format!(
                "Cubic interpolation needs at least 2 anchor points, got {n}."
            )));
        }
        if knots.iter().any(|(x, y)| !(x.is_finite() && y.is_finite())) {
            return Err(AppError::no_data("Non-finite anchor point for cubic interpolation."));
        }
        if knots.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(AppError::no_data(
                "Anchor points for cubic interpolation must be strictly increasing in time.",
            ));
        }

        let xs: Vec<f64> = knots.iter().map(|k| k.0).collect();
        let ys: Vec<f64> = knots.iter().map(|k| k.1).collect();
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

        let mut a = DMatrix::<f64>::zeros(n, n);
        let mut b = DVector::<f64>::zeros(n);

        for i in 1..n - 1 {
            a[(i, i - 1)] = h[i - 1];
            a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            a[(i, i + 1)] = h[i];
            b[i] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        }

        match n {
            2 => {
                a[(0, 0)] = 1.0;
                a[(1, 1)] = 1.0;
            }
            3 => {
                a[(0, 0)] = 1.0;
                a[(0, 1)] = -1.0;
                a[(2, 1)] = 1.0;
                a[(2, 2)] = -1.0;
            }
            _ => {
                a[(0, 0)] = h[1];
                a[(0, 1)] = -(h[0] + h[1]);
                a[(0, 2)] = h[0];
                a[(n - 1, n - 3)] = h[n - 2];
                a[(n - 1, n - 2)] = -(h[n - 3] + h[n - 2]);
                a[(n - 1, n - 1)] = h[n - 3];
            }
        }

        let m = a
            .lu()
            .solve(&b)
            .filter(|m| m.iter().all(|v| v.is_finite()))
            .ok_or_else(|| AppError::no_data("Cubic interpolation system is singular."))?;

        Ok(Self {
            xs,
            ys,
            second: m.iter().copied().collect(),
        })
    }

    /// First and last knot positions.
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Evaluate the spline; `None` outside the knot range (no extrapolation).
    pub fn eval(&self, x: f64) -> Option<f64> {
        let (lo, hi) = self.domain();
        if !(x >= lo && x <= hi) {
            return None;
        }

        // Index of the interval [x_i, x_{i+1}] containing x.
        let i = self
            .xs
            .partition_point(|&k| k <= x)
            .saturating_sub(1)
            .min(self.xs.len() - 2);

        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let (m0, m1) = (self.second[i], self.second[i + 1]);
        let h = x1 - x0;
        let l = x1 - x;
        let r = x - x0;

        Some(
            m0 * l.powi(3) / (6.0 * h)
                + m1 * r.powi(3) / (6.0 * h)
                + (y0 / h - m0 * h / 6.0) * l
                + (y1 / h - m1 * h / 6.0) * r,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8 * (1.0 + b.abs())
    }

    #[test]
    fn passes_through_every_knot() {
        let knots = [(0.0, 27_078.0), (12.0, 27_340.0), (24.0, 24_231.0), (36.0, 25_638.0), (48.0, 27_828.0)];
        let spline = CubicSpline::fit(&knots).unwrap();
        for (x, y) in knots {
            assert!(close(spline.eval(x).unwrap(), y), "knot ({x}, {y}) not reproduced");
        }
    }

    #[test]
    fn not_a_knot_reproduces_cubic_polynomial() {
        let f = |x: f64| 0.5 * x.powi(3) - 2.0 * x * x + 3.0 * x + 7.0;
        let knots: Vec<(f64, f64)> = [0.0, 1.0, 2.5, 4.0, 7.0, 8.0].iter().map(|&x| (x, f(x))).collect();
        let spline = CubicSpline::fit(&knots).unwrap();
        for i in 0..=80 {
            let x = i as f64 / 10.0;
            assert!(close(spline.eval(x).unwrap(), f(x)), "mismatch at x={x}");
        }
    }

    #[test]
    fn three_knots_form_a_parabola() {
        let f = |x: f64| 2.0 * x * x - x + 1.0;
        let knots = [(0.0, f(0.0)), (1.0, f(1.0)), (3.0, f(3.0))];
        let spline = CubicSpline::fit(&knots).unwrap();
        assert!(close(spline.eval(2.0).unwrap(), f(2.0)));
        assert!(close(spline.eval(0.5).unwrap(), f(0.5)));
    }

    #[test]
    fn two_knots_are_linear() {
        let spline = CubicSpline::fit(&[(0.0, 10.0), (4.0, 30.0)]).unwrap();
        assert!(close(spline.eval(1.0).unwrap(), 15.0));
    }

    #[test]
    fn does_not_extrapolate() {
        let spline = CubicSpline::fit(&[(0.0, 1.0), (1.0, 2.0), (2.0, 4.0), (3.0, 3.0)]).unwrap();
        assert!(spline.eval(-0.1).is_none());
        assert!(spline.eval(3.1).is_none());
        assert!(spline.eval(f64::NAN).is_none());
        assert_eq!(spline.domain(), (0.0, 3.0));
    }

    #[test]
    fn rejects_bad_knots() {
        assert!(CubicSpline::fit(&[(0.0, 1.0)]).is_err());
        assert!(CubicSpline::fit(&[(0.0, 1.0), (0.0, 2.0)]).is_err());
        assert!(CubicSpline::fit(&[(1.0, 1.0), (0.0, 2.0)]).is_err());
        let err = CubicSpline::fit(&[(0.0, f64::NAN), (1.0, 2.0)]).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_NO_DATA);
    }
}
