//! Statistics to validate population codes against theory: histogram comparison, Pearson correlation
//! between pairs of neurons and covariance ellipses of their joint firing rates.
use nalgebra::Matrix2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::PopCodeError;

/// Pearson correlation coefficient together with its two-sided p-value (null hypothesis: no correlation).
/// Both are NaN if one of the series has zero variance.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Correlation {
    pub coefficient: f64,
    pub p_value: f64,
}

impl Correlation {
    fn undefined() -> Self {
        Correlation {
            coefficient: f64::NAN,
            p_value: f64::NAN,
        }
    }

    pub fn is_defined(&self) -> bool {
        !self.coefficient.is_nan()
    }
}

/// A covariance ellipse, i.e., the principal axes of a 2D sample.
/// The width is measured along the direction given by `angle` (dominant axis), the height orthogonally to it.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct EllipseFit {
    /// The sample mean.
    pub center: [f64; 2],
    /// The direction of the dominant axis, in degrees, in [0, 180).
    pub angle: f64,
    /// Full length of the dominant axis, i.e., four standard deviations.
    pub width: f64,
    /// Full length of the minor axis, i.e., four standard deviations.
    pub height: f64,
    /// The eigenvalues of the covariance matrix, in decreasing order.
    pub eigenvalues: [f64; 2],
}

/// Deviation of an empirical activity histogram from its theoretical counterpart.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct HistogramComparison {
    /// The largest absolute difference over all neurons.
    pub max_abs_deviation: f64,
    /// The largest absolute difference relative to the peak of the theoretical histogram.
    pub normalized_deviation: f64,
    /// The total empirical activity.
    pub empirical_total: f64,
    /// The total theoretical activity.
    pub theoretical_total: f64,
}

fn check_pair(x: &[f64], y: &[f64]) -> Result<(), PopCodeError> {
    if x.len() != y.len() {
        return Err(PopCodeError::IncompatibleSpikeTrains(format!(
            "The series have different lengths ({} and {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(PopCodeError::InsufficientData(format!(
            "At least two samples are required, got {}",
            x.len()
        )));
    }
    Ok(())
}

fn is_constant(x: &[f64]) -> bool {
    x.iter().all(|&v| v == x[0])
}

/// The mean of a constant series is its value, without rounding.
fn mean(x: &[f64]) -> f64 {
    if is_constant(x) {
        return x[0];
    }
    x.iter().sum::<f64>() / x.len() as f64
}

/// Returns the centered sums of squares and cross-products (sxx, syy, sxy) and the means of the two series.
fn centered_moments(x: &[f64], y: &[f64]) -> ((f64, f64, f64), (f64, f64)) {
    let (mx, my) = (mean(x), mean(y));
    let moments = x
        .iter()
        .zip(y.iter())
        .fold((0.0, 0.0, 0.0), |(sxx, syy, sxy), (xi, yi)| {
            let (dx, dy) = (xi - mx, yi - my);
            (sxx + dx * dx, syy + dy * dy, sxy + dx * dy)
        });
    (moments, (mx, my))
}

/// Compute the Pearson correlation coefficient between two series and its two-sided p-value,
/// based on the Student's t distribution with `n - 2` degrees of freedom.
///
/// Returns an error if the series have different lengths or less than two samples.
/// If one of the series is constant, the correlation is undefined and reported as NaN.
///
/// # Example
/// ```
/// use rusty_popcode::stats::pearson;
///
/// let correlation = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
/// assert!((correlation.coefficient - 1.0).abs() < 1e-12);
/// assert!(correlation.p_value < 1e-6);
///
/// let correlation = pearson(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]).unwrap();
/// assert!(correlation.coefficient.is_nan());
/// ```
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Correlation, PopCodeError> {
    check_pair(x, y)?;
    if is_constant(x) || is_constant(y) {
        log::debug!("Correlation of a constant series is undefined");
        return Ok(Correlation::undefined());
    }

    let ((sxx, syy, sxy), _) = centered_moments(x, y);
    if sxx == 0.0 || syy == 0.0 {
        return Ok(Correlation::undefined());
    }

    let coefficient = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    if coefficient.is_nan() {
        return Ok(Correlation::undefined());
    }

    let dof = (x.len() - 2) as f64;
    let p_value = if dof == 0.0 {
        1.0
    } else if coefficient.abs() == 1.0 {
        0.0
    } else {
        let t = coefficient * (dof / (1.0 - coefficient * coefficient)).sqrt();
        let student = StudentsT::new(0.0, 1.0, dof)
            .map_err(|e| PopCodeError::InvalidParameter(e.to_string()))?;
        (2.0 * student.sf(t.abs())).min(1.0)
    };

    Ok(Correlation {
        coefficient,
        p_value,
    })
}

/// Returns the sample covariance matrix (normalized by `n - 1`) of two series.
/// Returns an error if the series have different lengths or less than two samples.
pub fn covariance_matrix(x: &[f64], y: &[f64]) -> Result<Matrix2<f64>, PopCodeError> {
    check_pair(x, y)?;
    let ((sxx, syy, sxy), _) = centered_moments(x, y);
    let norm = (x.len() - 1) as f64;
    Ok(Matrix2::new(sxx / norm, sxy / norm, sxy / norm, syy / norm))
}

/// Fit a covariance ellipse to the joint samples `(x[t], y[t])`.
///
/// The axes are the eigenvectors of the sample covariance matrix; each full axis is `4 * sqrt(eigenvalue)` long,
/// i.e., the ellipse extends two standard deviations from its center in every principal direction.
/// Returns an error if the series have different lengths or less than two samples.
pub fn fit_ellipse(x: &[f64], y: &[f64]) -> Result<EllipseFit, PopCodeError> {
    let cov = covariance_matrix(x, y)?;
    let eigen = cov.symmetric_eigen();

    let (major, minor) = if eigen.eigenvalues[0] >= eigen.eigenvalues[1] {
        (0, 1)
    } else {
        (1, 0)
    };
    // rounding can make the eigenvalues of a singular covariance slightly negative
    let eigenvalues = [
        eigen.eigenvalues[major].max(0.0),
        eigen.eigenvalues[minor].max(0.0),
    ];

    let axis = eigen.eigenvectors.column(major);
    let mut angle = axis[1].atan2(axis[0]).to_degrees().rem_euclid(180.0);
    // rem_euclid rounds tiny negative angles up to 180
    if angle >= 180.0 {
        angle = 0.0;
    }

    Ok(EllipseFit {
        center: [mean(x), mean(y)],
        angle,
        width: 4.0 * eigenvalues[0].sqrt(),
        height: 4.0 * eigenvalues[1].sqrt(),
        eigenvalues,
    })
}

/// Returns the correlation between the series of the reference neuron and the series of every neuron.
/// The correlations are computed in parallel; the result is ordered by neuron.
pub fn correlation_profile(
    series: &[Vec<f64>],
    reference: usize,
) -> Result<Vec<Correlation>, PopCodeError> {
    let reference_series = series.get(reference).ok_or_else(|| {
        PopCodeError::OutOfBounds(format!(
            "Neuron {} does not exist in a population of {} neurons",
            reference,
            series.len()
        ))
    })?;
    series
        .par_iter()
        .map(|other| pearson(reference_series, other))
        .collect()
}

/// Compare an empirical activity histogram with its theoretical counterpart.
/// Returns an error if the histograms have different lengths or are empty.
pub fn compare_histograms(
    empirical: &[f64],
    theoretical: &[f64],
) -> Result<HistogramComparison, PopCodeError> {
    if empirical.len() != theoretical.len() || empirical.is_empty() {
        return Err(PopCodeError::IncompatibleSpikeTrains(format!(
            "Cannot compare histograms with {} and {} bins",
            empirical.len(),
            theoretical.len()
        )));
    }
    let max_abs_deviation = empirical
        .iter()
        .zip(theoretical.iter())
        .map(|(e, t)| (e - t).abs())
        .fold(0.0, f64::max);
    let peak = theoretical.iter().cloned().fold(0.0, f64::max);

    Ok(HistogramComparison {
        max_abs_deviation,
        normalized_deviation: max_abs_deviation / peak,
        empirical_total: empirical.iter().sum(),
        theoretical_total: theoretical.iter().sum(),
    })
}
