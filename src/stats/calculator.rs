//! Statistics Calculator Module
//! Least-squares fitting behind the scatter-chart trendlines.

/// Slope and intercept of an ordinary least-squares line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Handles the regression arithmetic for trendline charts.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Fit a least-squares line through the points.
    ///
    /// Returns `None` for fewer than two points or a constant-x input,
    /// where no line is defined.
    pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<LinearFit> {
        let n = x.len().min(y.len());
        if n < 2 {
            return None;
        }

        let mean_x = x[..n].iter().sum::<f64>() / n as f64;
        let mean_y = y[..n].iter().sum::<f64>() / n as f64;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for i in 0..n {
            let dx = x[i] - mean_x;
            sxx += dx * dx;
            sxy += dx * (y[i] - mean_y);
        }
        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        Some(LinearFit {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    /// Coefficient of determination of predictions against observations.
    pub fn r_squared(observed: &[f64], predicted: &[f64]) -> f64 {
        let n = observed.len().min(predicted.len());
        if n == 0 {
            return f64::NAN;
        }

        let mean = observed[..n].iter().sum::<f64>() / n as f64;
        let ss_res: f64 = (0..n).map(|i| (observed[i] - predicted[i]).powi(2)).sum();
        let ss_tot: f64 = observed[..n].iter().map(|v| (v - mean).powi(2)).sum();
        if ss_tot == 0.0 {
            return f64::NAN;
        }

        1.0 - ss_res / ss_tot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_line_is_recovered() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();

        let fit = StatsCalculator::linear_fit(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);

        let predicted: Vec<f64> = x.iter().map(|&v| fit.predict(v)).collect();
        assert!((StatsCalculator::r_squared(&y, &predicted) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_have_no_fit() {
        assert!(StatsCalculator::linear_fit(&[1.0], &[2.0]).is_none());
        assert!(StatsCalculator::linear_fit(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn noisy_fit_scores_below_one() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.1, 1.9, 3.2, 3.8, 5.3];
        let fit = StatsCalculator::linear_fit(&x, &y).unwrap();
        let predicted: Vec<f64> = x.iter().map(|&v| fit.predict(v)).collect();
        let r2 = StatsCalculator::r_squared(&y, &predicted);
        assert!(r2 > 0.9 && r2 < 1.0);
    }
}
