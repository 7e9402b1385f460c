use bahtinov_core::PeakFitKind;
use serde::{Deserialize, Serialize};

/// One detected line in scan coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineCandidate {
    /// Orientation in `[0, π)`, on the one-degree scan grid.
    pub angle_rad: f64,
    /// Scan-frame row: integer before refinement, subpixel after.
    pub row: f64,
    /// Mean brightness of the row at detection time.
    pub value: f64,
}

/// Output of a line detection run on one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BahtinovLineSet {
    /// Frame size the rows refer to.
    pub width: usize,
    pub height: usize,
    /// Refined lines in detection rank (brightest first).
    pub lines: Vec<LineCandidate>,
    /// How each row was refined, same order as `lines`.
    pub fits: Vec<PeakFitKind>,
}

impl BahtinovLineSet {
    pub fn angles(&self) -> Vec<f64> {
        self.lines.iter().map(|l| l.angle_rad).collect()
    }

    pub fn rows(&self) -> Vec<f64> {
        self.lines.iter().map(|l| l.row).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of rows that fell back to the discrete maximum.
    pub fn fallback_count(&self) -> usize {
        self.fits
            .iter()
            .filter(|k| matches!(k, PeakFitKind::Fallback(_)))
            .count()
    }
}
