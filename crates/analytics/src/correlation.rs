use crate::align::MIN_OBSERVATIONS;
use crate::error::AnalyticsError;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// A Pearson coefficient together with its significance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    pub coefficient: f64,
    pub p_value: f64,
    pub n_observations: usize,
}

/// Pearson product-moment correlation of two aligned sequences.
///
/// The p-value is two-sided, from Student's t with `n - 2` degrees of freedom under
/// the null hypothesis of zero correlation.
///
/// # Errors
///
/// * `LengthMismatch` if the sequences differ in length.
/// * `InsufficientData` for fewer than `MIN_OBSERVATIONS` points.
/// * `UndefinedStatistic` if either sequence is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Correlation, AnalyticsError> {
    if x.len() != y.len() {
        return Err(AnalyticsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = x.len();
    if n < MIN_OBSERVATIONS {
        return Err(AnalyticsError::InsufficientData {
            found: n,
            required: MIN_OBSERVATIONS,
        });
    }

    let coefficient = coefficient(x, y).ok_or_else(|| {
        AnalyticsError::UndefinedStatistic("at least one input has zero variance".to_string())
    })?;
    let p_value = two_sided_p_value(coefficient, n)?;

    Ok(Correlation {
        coefficient,
        p_value,
        n_observations: n,
    })
}

/// The bare Pearson coefficient, without a minimum-sample guard.
///
/// Returns `None` when the inputs differ in length, hold fewer than two points,
/// or either of them is constant. The result is clamped to `[-1, 1]`.
pub fn coefficient(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 || is_constant(x) || is_constant(y) {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    // Deviations are rescaled to at most 1 in magnitude so the sums of squares
    // cannot overflow. r is invariant under positive scaling.
    let scale_x = max_abs_deviation(x, mean_x);
    let scale_y = max_abs_deviation(y, mean_y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = (xi - mean_x) / scale_x;
        let dy = (yi - mean_y) / scale_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

fn max_abs_deviation(values: &[f64], mean: f64) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max((v - mean).abs()))
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

fn two_sided_p_value(r: f64, n: usize) -> Result<f64, AnalyticsError> {
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }
    let df = (n - 2) as f64;
    let t_stat = r * (df / (1.0 - r * r)).sqrt();
    let t_dist = StudentsT::new(0.0, 1.0, df).map_err(|e| {
        AnalyticsError::Calculation(format!("Failed to create t-distribution: {}", e))
    })?;
    let p_value = 2.0 * (1.0 - t_dist.cdf(t_stat.abs()));
    Ok(p_value.clamp(0.0, 1.0))
}
