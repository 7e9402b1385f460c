//! Greedy selection of mutually separated line orientations.

use crate::detector::LineCandidate;
use crate::scan::{step_angle, AngleScan};
use log::debug;

/// Pick `line_count` candidates from a finished scan.
///
/// Each round takes the brightest remaining step (first one on ties) and
/// zeroes every step within `±suppression_steps` of it, wrapping modulo the
/// scan length. Rounds depend on earlier suppressions, so this runs
/// sequentially after the full scan.
pub fn select_lines(
    scan: &AngleScan,
    line_count: usize,
    suppression_steps: usize,
) -> Vec<LineCandidate> {
    let n = scan.len();
    if n == 0 {
        return Vec::new();
    }
    let mut values = scan.values.clone();
    let mut out = Vec::with_capacity(line_count);

    for _ in 0..line_count {
        let mut best = 0usize;
        for (i, &v) in values.iter().enumerate() {
            if v > values[best] {
                best = i;
            }
        }

        let candidate = LineCandidate {
            angle_rad: step_angle(best),
            row: scan.rows[best] as f64,
            value: values[best],
        };
        debug!(
            "line {}: step {best} row {} value {:.4}",
            out.len(),
            scan.rows[best],
            candidate.value
        );
        out.push(candidate);

        // A window of half the scan or more covers every step.
        let radius = suppression_steps.min(n / 2);
        for off in 0..=radius {
            values[(best + off) % n] = 0.0;
            values[(best + n - off) % n] = 0.0;
        }
    }
    out
}
