//! Closed 2-D outlines of beam-pipe apertures.
//!
//! Outlines live in the transverse plane of the beam. A point `(h, v)`
//! is the 3-D point `(0, v, h)`: `h` runs along Z, `v` along Y, and the
//! beam travels along +X.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::errors::ProfileError;

/// Distance below which two outline points are the same point (mm).
pub const POINT_TOLERANCE: f64 = 1e-6;

const ARC_SAMPLES: usize = 24;
const FULL_CURVE_SAMPLES: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub h: f64,
    pub v: f64,
}

impl Point2 {
    pub const fn new(h: f64, v: f64) -> Self {
        Self { h, v }
    }

    pub fn distance(&self, other: Point2) -> f64 {
        (self.h - other.h).hypot(self.v - other.v)
    }

    /// Rotate anticlockwise in the (h, v) plane about the origin.
    pub fn rotated(&self, degrees: f64) -> Point2 {
        let (s, c) = degrees.to_radians().sin_cos();
        Point2::new(self.h * c - self.v * s, self.h * s + self.v * c)
    }

    pub fn translated(&self, dh: f64, dv: f64) -> Point2 {
        Point2::new(self.h + dh, self.v + dv)
    }

    pub fn lerp(&self, other: Point2, t: f64) -> Point2 {
        Point2::new(
            self.h + (other.h - self.h) * t,
            self.v + (other.v - self.v) * t,
        )
    }

    /// Polar angle about `centre`, measured from +h towards +v.
    pub fn angle_from(&self, centre: Point2) -> f64 {
        (self.v - centre.v).atan2(self.h - centre.h)
    }
}

/// Circle through three points, with the signed sweep from the first
/// point to the last that passes the middle one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub centre: Point2,
    pub radius: f64,
    /// Polar angle of the start point (radians).
    pub start_angle: f64,
    /// Positive is anticlockwise in (h, v) (radians).
    pub sweep: f64,
}

impl ArcGeometry {
    pub fn from_points(start: Point2, through: Point2, end: Point2) -> Option<Self> {
        let (ax, ay) = (start.h, start.v);
        let (bx, by) = (through.h, through.v);
        let (cx, cy) = (end.h, end.v);
        let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
        let scale = start.distance(through).max(through.distance(end)).max(1.0);
        if d.abs() < 1e-12 * scale * scale {
            return None;
        }
        let a2 = ax * ax + ay * ay;
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let centre = Point2::new(
            (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d,
            (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d,
        );
        let radius = centre.distance(start);

        let a0 = start.angle_from(centre);
        let ccw_to_end = (end.angle_from(centre) - a0).rem_euclid(TAU);
        let ccw_to_mid = (through.angle_from(centre) - a0).rem_euclid(TAU);
        let sweep = if ccw_to_mid < ccw_to_end {
            ccw_to_end
        } else {
            ccw_to_end - TAU
        };
        Some(Self {
            centre,
            radius,
            start_angle: a0,
            sweep,
        })
    }

    pub fn point_at(&self, t: f64) -> Point2 {
        let a = self.start_angle + self.sweep * t;
        Point2::new(
            self.centre.h + self.radius * a.cos(),
            self.centre.v + self.radius * a.sin(),
        )
    }

    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }
}

/// One piece of an outline.
///
/// `Circle` and `Ellipse` are complete closed curves and must be the only
/// segment of their profile. They start at their +h extreme and wind so
/// that the outline's face normal points along +X.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    Line {
        start: Point2,
        end: Point2,
    },
    Arc {
        start: Point2,
        through: Point2,
        end: Point2,
    },
    Circle {
        centre: Point2,
        radius: f64,
    },
    Ellipse {
        centre: Point2,
        semi_h: f64,
        semi_v: f64,
        /// Rotation of the h semi-axis, degrees anticlockwise.
        angle: f64,
    },
}

impl Segment {
    pub fn line(start: Point2, end: Point2) -> Self {
        Segment::Line { start, end }
    }

    pub fn arc(start: Point2, through: Point2, end: Point2) -> Self {
        Segment::Arc {
            start,
            through,
            end,
        }
    }

    pub fn start(&self) -> Point2 {
        match *self {
            Segment::Line { start, .. } | Segment::Arc { start, .. } => start,
            _ => self.point_at(0.0),
        }
    }

    pub fn end(&self) -> Point2 {
        match *self {
            Segment::Line { end, .. } | Segment::Arc { end, .. } => end,
            _ => self.point_at(0.0),
        }
    }

    pub fn is_closed_curve(&self) -> bool {
        matches!(self, Segment::Circle { .. } | Segment::Ellipse { .. })
    }

    /// Point at parameter `t` in `[0, 1]` along the segment.
    pub fn point_at(&self, t: f64) -> Point2 {
        match *self {
            Segment::Line { start, end } => start.lerp(end, t),
            Segment::Arc {
                start,
                through,
                end,
            } => match ArcGeometry::from_points(start, through, end) {
                Some(arc) => arc.point_at(t),
                None => start.lerp(end, t),
            },
            Segment::Circle { centre, radius } => {
                let a = TAU * t;
                Point2::new(centre.h + radius * a.cos(), centre.v - radius * a.sin())
            }
            Segment::Ellipse {
                centre,
                semi_h,
                semi_v,
                angle,
            } => {
                let a = TAU * t;
                let local = Point2::new(semi_h * a.cos(), -semi_v * a.sin()).rotated(angle);
                local.translated(centre.h, centre.v)
            }
        }
    }

    pub fn length(&self) -> f64 {
        match *self {
            Segment::Line { start, end } => start.distance(end),
            Segment::Arc {
                start,
                through,
                end,
            } => ArcGeometry::from_points(start, through, end)
                .map(|arc| arc.length())
                .unwrap_or_else(|| start.distance(end)),
            Segment::Circle { radius, .. } => TAU * radius,
            Segment::Ellipse { semi_h, semi_v, .. } => {
                // Ramanujan's second approximation.
                let (a, b) = (semi_h, semi_v);
                let h = ((a - b) / (a + b)).powi(2);
                PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
            }
        }
    }

    pub fn reversed(&self) -> Segment {
        match *self {
            Segment::Line { start, end } => Segment::Line {
                start: end,
                end: start,
            },
            Segment::Arc {
                start,
                through,
                end,
            } => Segment::Arc {
                start: end,
                through,
                end: start,
            },
            closed => closed,
        }
    }

    fn map_points(&self, f: impl Fn(Point2) -> Point2) -> Segment {
        match *self {
            Segment::Line { start, end } => Segment::Line {
                start: f(start),
                end: f(end),
            },
            Segment::Arc {
                start,
                through,
                end,
            } => Segment::Arc {
                start: f(start),
                through: f(through),
                end: f(end),
            },
            Segment::Circle { centre, radius } => Segment::Circle {
                centre: f(centre),
                radius,
            },
            Segment::Ellipse {
                centre,
                semi_h,
                semi_v,
                angle,
            } => Segment::Ellipse {
                centre: f(centre),
                semi_h,
                semi_v,
                angle,
            },
        }
    }

    /// Points along the segment, excluding its end point.
    fn dense_points(&self, out: &mut Vec<Point2>) {
        let n = match self {
            Segment::Line { .. } => 1,
            Segment::Arc { .. } => ARC_SAMPLES,
            _ => FULL_CURVE_SAMPLES,
        };
        out.extend((0..n).map(|i| self.point_at(i as f64 / n as f64)));
    }
}

/// Axis-aligned bounds of an outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2 {
    pub min: Point2,
    pub max: Point2,
}

impl Bounds2 {
    pub fn centre(&self) -> Point2 {
        self.min.lerp(self.max, 0.5)
    }

    pub fn width(&self) -> f64 {
        self.max.h - self.min.h
    }

    pub fn height(&self) -> f64 {
        self.max.v - self.min.v
    }
}

/// A closed outline made of chained segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub segments: Vec<Segment>,
}

impl Profile {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Closed polygon through `points`.
    pub fn polygon(points: &[Point2]) -> Self {
        let n = points.len();
        let segments = (0..n)
            .map(|i| Segment::line(points[i], points[(i + 1) % n]))
            .collect();
        Self { segments }
    }

    pub fn circle(centre: Point2, radius: f64) -> Self {
        Self::new(vec![Segment::Circle { centre, radius }])
    }

    pub fn ellipse(centre: Point2, semi_h: f64, semi_v: f64) -> Self {
        Self::new(vec![Segment::Ellipse {
            centre,
            semi_h,
            semi_v,
            angle: 0.0,
        }])
    }

    /// Check that the outline is a closed, non-degenerate chain.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.segments.is_empty() {
            return Err(ProfileError::Empty);
        }
        for (index, segment) in self.segments.iter().enumerate() {
            match *segment {
                Segment::Circle { radius, .. } => {
                    if self.segments.len() > 1 {
                        return Err(ProfileError::MixedClosedCurve { kind: "circle" });
                    }
                    if radius <= 0.0 || !radius.is_finite() {
                        return Err(ProfileError::NonPositiveSize {
                            kind: "circle",
                            size: radius,
                        });
                    }
                }
                Segment::Ellipse { semi_h, semi_v, .. } => {
                    if self.segments.len() > 1 {
                        return Err(ProfileError::MixedClosedCurve { kind: "ellipse" });
                    }
                    let size = semi_h.min(semi_v);
                    if size <= 0.0 || !size.is_finite() {
                        return Err(ProfileError::NonPositiveSize {
                            kind: "ellipse",
                            size,
                        });
                    }
                }
                Segment::Line { start, end } => {
                    if start.distance(end) <= POINT_TOLERANCE {
                        return Err(ProfileError::DegenerateLine { index });
                    }
                }
                Segment::Arc {
                    start,
                    through,
                    end,
                } => {
                    if start.distance(end) <= POINT_TOLERANCE
                        || ArcGeometry::from_points(start, through, end).is_none()
                    {
                        return Err(ProfileError::DegenerateArc { index });
                    }
                }
            }
        }
        let n = self.segments.len();
        for index in 0..n {
            let prev = &self.segments[(index + n - 1) % n];
            let gap = prev.end().distance(self.segments[index].start());
            if gap > POINT_TOLERANCE {
                return Err(ProfileError::Open { index, gap });
            }
        }
        Ok(())
    }

    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// Fractions of the total length at which each segment starts.
    pub fn breakpoints(&self) -> Vec<f64> {
        let total = self.length();
        if total <= 0.0 {
            return vec![0.0];
        }
        let mut acc = 0.0;
        self.segments
            .iter()
            .map(|s| {
                let f = acc / total;
                acc += s.length();
                f
            })
            .collect()
    }

    /// Point at fraction `f` of the outline length (wraps around).
    pub fn point_at_fraction(&self, f: f64) -> Point2 {
        let total = self.length();
        let Some(first) = self.segments.first() else {
            return Point2::default();
        };
        if total <= 0.0 {
            return first.start();
        }
        let mut remaining = f.rem_euclid(1.0) * total;
        for segment in &self.segments {
            let len = segment.length();
            if remaining <= len {
                let t = if len > 0.0 { remaining / len } else { 0.0 };
                return segment.point_at(t);
            }
            remaining -= len;
        }
        first.start()
    }

    /// `n` points evenly spaced along the outline, starting at its start.
    pub fn sample(&self, n: usize) -> Vec<Point2> {
        (0..n)
            .map(|i| self.point_at_fraction(i as f64 / n as f64))
            .collect()
    }

    /// Dense point chain used for areas and bounds.
    pub fn dense_points(&self) -> Vec<Point2> {
        let mut out = Vec::new();
        for segment in &self.segments {
            segment.dense_points(&mut out);
        }
        out
    }

    /// Positive when the outline's face normal points along +X.
    pub fn signed_area(&self) -> f64 {
        let pts = self.dense_points();
        let n = pts.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let (a, b) = (pts[i], pts[(i + 1) % n]);
                a.v * b.h - b.v * a.h
            })
            .sum();
        twice / 2.0
    }

    pub fn bounds(&self) -> Bounds2 {
        let pts = self.dense_points();
        let mut min = Point2::new(f64::MAX, f64::MAX);
        let mut max = Point2::new(f64::MIN, f64::MIN);
        for p in &pts {
            min.h = min.h.min(p.h);
            min.v = min.v.min(p.v);
            max.h = max.h.max(p.h);
            max.v = max.v.max(p.v);
        }
        Bounds2 { min, max }
    }

    /// The same outline traversed the other way round.
    ///
    /// Full circles and ellipses have a fixed winding and are returned as is.
    pub fn reversed(&self) -> Profile {
        Profile {
            segments: self.segments.iter().rev().map(Segment::reversed).collect(),
        }
    }

    /// This outline wound so that `signed_area` is non-negative.
    pub fn with_positive_winding(&self) -> Profile {
        if self.signed_area() < 0.0 {
            self.reversed()
        } else {
            self.clone()
        }
    }

    pub fn translated(&self, dh: f64, dv: f64) -> Profile {
        Profile {
            segments: self
                .segments
                .iter()
                .map(|s| s.map_points(|p| p.translated(dh, dv)))
                .collect(),
        }
    }

    /// Rotate anticlockwise in the (h, v) plane about the origin.
    pub fn rotated(&self, degrees: f64) -> Profile {
        Profile {
            segments: self
                .segments
                .iter()
                .map(|s| match s.map_points(|p| p.rotated(degrees)) {
                    Segment::Ellipse {
                        centre,
                        semi_h,
                        semi_v,
                        angle,
                    } => Segment::Ellipse {
                        centre,
                        semi_h,
                        semi_v,
                        angle: angle + degrees,
                    },
                    other => other,
                })
                .collect(),
        }
    }
}
