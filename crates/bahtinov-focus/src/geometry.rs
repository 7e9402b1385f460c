//! Full-length lines in image coordinates and the point/line operations the
//! focus evaluator needs.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// `|dx| <= VERTICAL_EPS * |dy|` counts as a vertical line.
const VERTICAL_EPS: f64 = 1e-12;
/// Relative slope difference below which two lines are parallel.
const PARALLEL_EPS: f64 = 1e-12;

/// A line segment spanning the frame, with its slope-intercept form.
///
/// Slope and intercept are derived from the endpoints, so equality and the
/// serialized form use the endpoints only. JSON has no `inf`/`NaN`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(from = "LineEndpoints", into = "LineEndpoints")]
pub struct GeometricLine {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
    /// `dy / dx`, `f64::INFINITY` for a vertical line.
    pub slope: f64,
    /// `y` at `x = 0`, `NaN` for a vertical line.
    pub intercept: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct LineEndpoints {
    start: Point2<f64>,
    end: Point2<f64>,
}

impl From<LineEndpoints> for GeometricLine {
    fn from(e: LineEndpoints) -> Self {
        Self::from_endpoints(e.start, e.end)
    }
}

impl From<GeometricLine> for LineEndpoints {
    fn from(l: GeometricLine) -> Self {
        Self {
            start: l.start,
            end: l.end,
        }
    }
}

impl PartialEq for GeometricLine {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

/// Foot of the perpendicular from a point onto a line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerpendicularOffset {
    pub distance: f64,
    pub closest: Point2<f64>,
}

impl GeometricLine {
    pub fn from_endpoints(start: Point2<f64>, end: Point2<f64>) -> Self {
        let d = end - start;
        let (slope, intercept) = if d.x.abs() <= VERTICAL_EPS * d.y.abs() {
            (f64::INFINITY, f64::NAN)
        } else {
            let m = d.y / d.x;
            (m, start.y - m * start.x)
        };
        Self {
            start,
            end,
            slope,
            intercept,
        }
    }

    /// Line reported by the scanner at `angle_rad` and scan-frame `row` in a
    /// `width x height` frame.
    ///
    /// The segment has half-length `min(cx, cy)` and passes through
    /// `center + (row - cy) * (sin, -cos)`.
    pub fn from_scan(angle_rad: f64, row: f64, width: usize, height: usize) -> Self {
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let r = cx.min(cy);
        let (sin, cos) = angle_rad.sin_cos();
        let offset = row - cy;
        let mid = Point2::new(cx + offset * sin, cy - offset * cos);
        let half = Vector2::new(r * cos, r * sin);
        Self::from_endpoints(mid - half, mid + half)
    }

    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.slope.is_infinite()
    }

    /// `(A, B, C)` of `A x + B y + C = 0` through both endpoints.
    pub fn coefficients(&self) -> (f64, f64, f64) {
        let (s, e) = (self.start, self.end);
        (e.y - s.y, s.x - e.x, e.x * s.y - s.x * e.y)
    }

    /// Intersection with `other`, `None` when the lines are parallel.
    pub fn intersect(&self, other: &GeometricLine) -> Option<Point2<f64>> {
        match (self.is_vertical(), other.is_vertical()) {
            (true, true) => None,
            (true, false) => {
                let x = self.start.x;
                Some(Point2::new(x, other.slope * x + other.intercept))
            }
            (false, true) => other.intersect(self),
            (false, false) => {
                let dm = self.slope - other.slope;
                let scale = 1.0f64.max(self.slope.abs()).max(other.slope.abs());
                if dm.abs() <= PARALLEL_EPS * scale {
                    return None;
                }
                let x = (other.intercept - self.intercept) / dm;
                Some(Point2::new(x, self.slope * x + self.intercept))
            }
        }
    }

    /// Perpendicular distance and closest point from `p`.
    ///
    /// `None` when the endpoints coincide.
    pub fn perpendicular_offset(&self, p: Point2<f64>) -> Option<PerpendicularOffset> {
        let (a, b, c) = self.coefficients();
        let norm2 = a * a + b * b;
        if norm2 <= 0.0 {
            return None;
        }
        let k = (a * p.x + b * p.y + c) / norm2;
        Some(PerpendicularOffset {
            distance: (a * p.x + b * p.y + c).abs() / norm2.sqrt(),
            closest: Point2::new(p.x - k * a, p.y - k * b),
        })
    }

    /// Which side of the directed segment `start -> end` the point lies on.
    ///
    /// Returns `-1`, `0` or `1`, the negated sign of
    /// `(p.x - s.x) * (e.y - s.y) - (p.y - s.y) * (e.x - s.x)`.
    pub fn side(&self, p: Point2<f64>) -> f64 {
        let (s, e) = (self.start, self.end);
        let cross = (p.x - s.x) * (e.y - s.y) - (p.y - s.y) * (e.x - s.x);
        if cross > 0.0 {
            -1.0
        } else if cross < 0.0 {
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> GeometricLine {
        GeometricLine::from_endpoints(Point2::new(x0, y0), Point2::new(x1, y1))
    }

    #[test]
    fn diagonals_cross_at_center() {
        let p = line(0.0, 0.0, 10.0, 10.0)
            .intersect(&line(0.0, 10.0, 10.0, 0.0))
            .expect("intersection");
        assert_relative_eq!(p, Point2::new(5.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn vertical_line_has_infinite_slope_and_still_intersects() {
        let v = line(3.0, 0.0, 3.0, 10.0);
        assert!(v.is_vertical());
        assert!(v.intercept.is_nan());

        let p = v.intersect(&line(0.0, 1.0, 10.0, 6.0)).expect("intersection");
        assert_relative_eq!(p, Point2::new(3.0, 2.5), epsilon = 1e-12);
        assert!(v.intersect(&line(5.0, 0.0, 5.0, 1.0)).is_none());
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        assert!(line(0.0, 0.0, 10.0, 10.0)
            .intersect(&line(0.0, 3.0, 10.0, 13.0))
            .is_none());
    }

    #[test]
    fn perpendicular_offset_to_horizontal_line() {
        let l = line(0.0, 6.0, 10.0, 6.0);
        let off = l.perpendicular_offset(Point2::new(5.0, 5.0)).expect("offset");
        assert_relative_eq!(off.distance, 1.0, epsilon = 1e-12);
        assert_relative_eq!(off.closest, Point2::new(5.0, 6.0), epsilon = 1e-12);
        assert!(line(1.0, 1.0, 1.0, 1.0)
            .perpendicular_offset(Point2::new(0.0, 0.0))
            .is_none());
    }

    #[test]
    fn side_flips_across_the_line() {
        let l = line(0.0, 6.0, 10.0, 6.0);
        assert_eq!(l.side(Point2::new(5.0, 5.0)), -1.0);
        assert_eq!(l.side(Point2::new(5.0, 7.0)), 1.0);
        assert_eq!(l.side(Point2::new(2.0, 6.0)), 0.0);
    }

    #[test]
    fn scan_line_passes_through_offset_point() {
        // 30 degrees, 4 rows below center in a 100x100 frame
        let l = GeometricLine::from_scan(30f64.to_radians(), 54.0, 100, 100);
        let (s, c) = 30f64.to_radians().sin_cos();
        let mid = nalgebra::center(&l.start, &l.end);
        assert_relative_eq!(mid, Point2::new(50.0 + 4.0 * s, 50.0 - 4.0 * c), epsilon = 1e-9);
        assert_relative_eq!((l.end - l.start).norm(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(l.slope, 30f64.to_radians().tan(), epsilon = 1e-9);
    }

    #[test]
    fn right_angle_scan_line_is_vertical() {
        let l = GeometricLine::from_scan(std::f64::consts::FRAC_PI_2, 50.0, 100, 100);
        assert!(l.is_vertical());
    }

    #[test]
    fn vertical_lines_compare_equal() {
        let a = GeometricLine::from_scan(std::f64::consts::FRAC_PI_2, 100.0, 200, 200);
        let b = GeometricLine::from_scan(std::f64::consts::FRAC_PI_2, 100.0, 200, 200);
        assert!(a.intercept.is_nan());
        assert_eq!(a, b);
        assert_ne!(a, GeometricLine::from_scan(std::f64::consts::FRAC_PI_2, 101.0, 200, 200));
    }

    #[test]
    fn vertical_line_survives_json() {
        let l = GeometricLine::from_scan(std::f64::consts::FRAC_PI_2, 100.0, 200, 200);
        let json = serde_json::to_string(&l).expect("serialize");
        assert!(!json.contains("null"));
        let back: GeometricLine = serde_json::from_str(&json).expect("deserialize");
        assert_relative_eq!(back.start, l.start, epsilon = 1e-9);
        assert_relative_eq!(back.end, l.end, epsilon = 1e-9);
        assert!(back.is_vertical());
        assert!(back.intercept.is_nan());
    }

    #[test]
    fn sloped_line_json_restores_slope_and_intercept() {
        let l = line(0.0, 1.0, 10.0, 6.0);
        let back: GeometricLine =
            serde_json::from_str(&serde_json::to_string(&l).expect("serialize"))
                .expect("deserialize");
        assert_relative_eq!(back.slope, 0.5, epsilon = 1e-12);
        assert_relative_eq!(back.intercept, 1.0, epsilon = 1e-12);
    }
}
