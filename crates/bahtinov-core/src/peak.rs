//! Subpixel peak location by a least-squares parabola fit.

use log::trace;
use serde::{Deserialize, Serialize};

/// Pivots smaller than this make the normal equations singular.
const PIVOT_EPS: f64 = 1e-18;
/// Curvatures smaller than this in magnitude are treated as flat.
const CURVATURE_EPS: f64 = 1e-12;

/// Why the fitter returned the discrete maximum instead of the vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakFitFallback {
    /// Fewer than 3 samples in the window.
    TooFewSamples,
    /// The 3x3 normal-equation matrix is singular.
    Singular,
    /// Fitted curvature is non-negative or vanishing: no concave peak.
    NotConcave,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakFitKind {
    Quadratic,
    Fallback(PeakFitFallback),
}

/// Result of [`fit_peak_quadratic`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakFit {
    /// Peak position in sample-index units.
    pub position: f64,
    pub kind: PeakFitKind,
}

impl PeakFit {
    #[inline]
    pub fn is_fallback(&self) -> bool {
        matches!(self.kind, PeakFitKind::Fallback(_))
    }
}

/// Locate the peak of `samples` near `estimate` to subpixel precision.
///
/// Fits `y = a*x^2 + b*x + c` over `[estimate - range, estimate + range]`
/// (clamped to the array) and returns the vertex `-b / (2a)` clamped into
/// that window. Degenerate fits fall back to the discrete argmax of the
/// window; the returned [`PeakFitKind`] tells which path was taken.
///
/// `range` is raised to at least 1 and `estimate` is clamped into the array.
/// An empty slice yields position 0 with [`PeakFitFallback::TooFewSamples`].
pub fn fit_peak_quadratic(samples: &[f64], estimate: usize, range: usize) -> PeakFit {
    if samples.is_empty() {
        return fallback(0.0, PeakFitFallback::TooFewSamples);
    }
    let estimate = estimate.min(samples.len() - 1);
    let range = range.max(1);
    let lo = estimate.saturating_sub(range);
    let hi = (estimate + range).min(samples.len() - 1);
    let window = &samples[lo..=hi];

    let discrete = (lo + argmax(window)) as f64;
    if window.len() < 3 {
        return fallback(discrete, PeakFitFallback::TooFewSamples);
    }

    // Abscissae relative to the estimate keep the normal equations well scaled.
    let mut s = [0.0f64; 5]; // sum of x^0..x^4
    let mut t = [0.0f64; 3]; // sum of y, x*y, x^2*y
    for (k, &y) in window.iter().enumerate() {
        let x = (lo + k) as f64 - estimate as f64;
        let x2 = x * x;
        s[0] += 1.0;
        s[1] += x;
        s[2] += x2;
        s[3] += x2 * x;
        s[4] += x2 * x2;
        t[0] += y;
        t[1] += x * y;
        t[2] += x2 * y;
    }

    let m = [[s[4], s[3], s[2]], [s[3], s[2], s[1]], [s[2], s[1], s[0]]];
    let rhs = [t[2], t[1], t[0]];
    let Some([a, b, _c]) = solve3(m, rhs) else {
        return fallback(discrete, PeakFitFallback::Singular);
    };

    if a >= 0.0 || a.abs() < CURVATURE_EPS {
        return fallback(discrete, PeakFitFallback::NotConcave);
    }

    let vertex = estimate as f64 - b / (2.0 * a);
    PeakFit {
        position: vertex.clamp(lo as f64, hi as f64),
        kind: PeakFitKind::Quadratic,
    }
}

fn fallback(position: f64, reason: PeakFitFallback) -> PeakFit {
    trace!("peak fit fell back to discrete maximum at {position}: {reason:?}");
    PeakFit {
        position,
        kind: PeakFitKind::Fallback(reason),
    }
}

/// Index of the first maximum.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Gaussian elimination with partial pivoting on a 3x3 system.
fn solve3(mut m: [[f64; 3]; 3], mut rhs: [f64; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let pivot_row = (col..3)
            .max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))
            .unwrap_or(col);
        if m[pivot_row][col].abs() < PIVOT_EPS {
            return None;
        }
        m.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in col + 1..3 {
            let f = m[row][col] / m[col][col];
            for k in col..3 {
                m[row][k] -= f * m[col][k];
            }
            rhs[row] -= f * rhs[col];
        }
    }

    let mut x = [0.0f64; 3];
    for row in (0..3).rev() {
        let mut acc = rhs[row];
        for k in row + 1..3 {
            acc -= m[row][k] * x[k];
        }
        x[row] = acc / m[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}
