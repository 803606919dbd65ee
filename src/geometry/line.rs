//! Composite lines made of straight segments and Bezier curves.

use super::Vec3;
use crate::error::{ArchitectError, Result};
use crate::types::BlockPosition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default number of intervals a Bezier curve is sampled with.
pub const DEFAULT_BEZIER_PRECISION: usize = 50;

/// Containment tolerance for straight segments.
pub const SEGMENT_TOLERANCE: f64 = 1e-6;

/// Containment tolerance for sampled curves.
pub const CURVE_TOLERANCE: f64 = 0.01;

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment3 {
    pub start: Vec3,
    pub end: Vec3,
}

impl Segment3 {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// A point lies on the segment when the distances to both ends add up to its length.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let d1 = self.start.distance(point);
        let d2 = self.end.distance(point);
        (d1 + d2 - self.length()).abs() < SEGMENT_TOLERANCE
    }

    /// Whether the ray from `origin` along `direction` crosses this segment.
    ///
    /// Solves the line/line closest-approach parameters with cross products:
    /// the hit must fall within the segment, in front of the origin, and the
    /// two lines must actually meet there.
    pub fn intersects_ray(&self, origin: Vec3, direction: Vec3) -> bool {
        segment_ray_hit(self.start, self.end, origin, direction)
    }

    pub fn controls(&self) -> [Vec3; 2] {
        [self.start, self.end]
    }
}

fn segment_ray_hit(start: Vec3, end: Vec3, origin: Vec3, direction: Vec3) -> bool {
    let segment_direction = end - start;
    let cross_dir = segment_direction.cross(direction);
    let denom = cross_dir.length_squared();
    if cross_dir.length() < SEGMENT_TOLERANCE {
        return false;
    }

    let start_to_origin = origin - start;
    let u = start_to_origin.cross(direction).dot(cross_dir) / denom;
    let t = start_to_origin.cross(segment_direction).dot(cross_dir) / denom;
    if !(0.0..=1.0).contains(&u) || t < 0.0 {
        return false;
    }

    // u and t alone only say the projections cross. Skew lines that pass
    // each other at a distance are not a hit.
    let on_segment = start + segment_direction * u;
    let on_ray = origin + direction * t;
    on_segment.distance(on_ray) < SEGMENT_TOLERANCE
}

/// Distance from `point` to the segment `start..end`.
fn distance_to_segment(point: Vec3, start: Vec3, end: Vec3) -> f64 {
    let span = end - start;
    let len2 = span.length_squared();
    if len2 == 0.0 {
        return point.distance(start);
    }
    let t = ((point - start).dot(span) / len2).clamp(0.0, 1.0);
    point.distance(start + span * t)
}

/// A Bezier curve of arbitrary degree, evaluated by sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierCurve3 {
    controls: Vec<Vec3>,
    precision: usize,
}

impl BezierCurve3 {
    pub fn new(controls: Vec<Vec3>) -> Result<Self> {
        Self::with_precision(controls, DEFAULT_BEZIER_PRECISION)
    }

    pub fn with_precision(controls: Vec<Vec3>, precision: usize) -> Result<Self> {
        if controls.len() < 2 {
            return Err(ArchitectError::InvalidGeometry(format!(
                "a Bezier curve needs at least 2 control points, got {}",
                controls.len()
            )));
        }
        Ok(Self {
            controls,
            precision: precision.max(1),
        })
    }

    pub fn controls(&self) -> &[Vec3] {
        &self.controls
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn set_precision(&mut self, precision: usize) {
        self.precision = precision.max(1);
    }

    /// Point at parameter `t` in `[0, 1]`, by Bernstein summation.
    pub fn interpolate(&self, t: f64) -> Vec3 {
        let n = self.controls.len() - 1;
        let mut binomial = 1.0;
        let mut result = Vec3::ZERO;
        for (i, control) in self.controls.iter().enumerate() {
            if i > 0 {
                binomial = binomial * (n - i + 1) as f64 / i as f64;
            }
            let factor = binomial * (1.0 - t).powi((n - i) as i32) * t.powi(i as i32);
            result += *control * factor;
        }
        result
    }

    /// `precision + 1` evenly spaced samples, endpoints included.
    pub fn points(&self) -> Vec<Vec3> {
        (0..=self.precision)
            .map(|i| self.interpolate(i as f64 / self.precision as f64))
            .collect()
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.points()
            .windows(2)
            .any(|w| distance_to_segment(point, w[0], w[1]) <= CURVE_TOLERANCE)
    }

    pub fn intersects_ray(&self, origin: Vec3, direction: Vec3) -> bool {
        self.points()
            .windows(2)
            .any(|w| segment_ray_hit(w[0], w[1], origin, direction))
    }
}

/// One piece of a [`Line3`].
#[derive(Debug, Clone, PartialEq)]
pub enum Line3Part {
    Segment(Segment3),
    Bezier(BezierCurve3),
}

impl Line3Part {
    /// Two points make a segment, more make a curve.
    pub fn from_points(points: Vec<Vec3>) -> Result<Self> {
        match points.len() {
            2 => Ok(Line3Part::Segment(Segment3::new(points[0], points[1]))),
            _ => BezierCurve3::new(points).map(Line3Part::Bezier),
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        match self {
            Line3Part::Segment(segment) => segment.contains_point(point),
            Line3Part::Bezier(curve) => curve.contains_point(point),
        }
    }

    pub fn intersects_ray(&self, origin: Vec3, direction: Vec3) -> bool {
        match self {
            Line3Part::Segment(segment) => segment.intersects_ray(origin, direction),
            Line3Part::Bezier(curve) => curve.intersects_ray(origin, direction),
        }
    }

    pub fn controls(&self) -> Vec<Vec3> {
        match self {
            Line3Part::Segment(segment) => segment.controls().to_vec(),
            Line3Part::Bezier(curve) => curve.controls.clone(),
        }
    }

    /// The polyline this part is rasterized along.
    pub fn polyline(&self) -> Vec<Vec3> {
        match self {
            Line3Part::Segment(segment) => segment.controls().to_vec(),
            Line3Part::Bezier(curve) => curve.points(),
        }
    }

    fn set_first(&mut self, point: Vec3) {
        match self {
            Line3Part::Segment(segment) => segment.start = point,
            Line3Part::Bezier(curve) => curve.controls[0] = point,
        }
    }

    fn set_last(&mut self, point: Vec3) {
        match self {
            Line3Part::Segment(segment) => segment.end = point,
            Line3Part::Bezier(curve) => {
                let last = curve.controls.len() - 1;
                curve.controls[last] = point;
            }
        }
    }
}

/// An ordered chain of parts. Consecutive parts share their joining point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Vec3>>", into = "Vec<Vec<Vec3>>")]
pub struct Line3 {
    parts: Vec<Line3Part>,
    closed: bool,
}

impl Line3 {
    pub fn new(parts: Vec<Line3Part>) -> Self {
        Self {
            parts,
            closed: false,
        }
    }

    /// A loop whose last part ends where the first begins.
    pub fn closed(parts: Vec<Line3Part>) -> Self {
        Self {
            parts,
            closed: true,
        }
    }

    pub fn parts(&self) -> &[Line3Part] {
        &self.parts
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Override the sampling precision of every curve.
    pub fn with_precision(mut self, precision: usize) -> Self {
        for part in &mut self.parts {
            if let Line3Part::Bezier(curve) = part {
                curve.set_precision(precision);
            }
        }
        self
    }

    /// Move the joint `index`: the start of part `index` and the end of part `index - 1`.
    /// On a closed line joint `0` and joint `parts.len()` are the same point.
    pub fn set_point(&mut self, index: usize, point: Vec3) {
        let count = self.parts.len();
        if count == 0 {
            return;
        }
        if index < count {
            self.parts[index].set_first(point);
        }
        if index > 0 && index <= count {
            self.parts[index - 1].set_last(point);
        }
        if self.closed {
            if index == count {
                self.parts[0].set_first(point);
            } else if index == 0 {
                self.parts[count - 1].set_last(point);
            }
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.parts.iter().any(|part| part.contains_point(point))
    }

    pub fn intersects_ray(&self, origin: Vec3, direction: Vec3) -> bool {
        self.parts
            .iter()
            .any(|part| part.intersects_ray(origin, direction))
    }

    /// Every cell the line passes through, in traversal order without repeats.
    pub fn blocks(&self) -> Vec<BlockPosition> {
        let mut seen = HashSet::new();
        let mut cells = Vec::new();
        for part in &self.parts {
            for edge in part.polyline().windows(2) {
                for cell in traverse_cells(edge[0], edge[1]) {
                    if seen.insert(cell) {
                        cells.push(cell);
                    }
                }
            }
        }
        cells
    }
}

/// Amanatides–Woo grid traversal from `start` to `end`.
fn traverse_cells(start: Vec3, end: Vec3) -> Vec<BlockPosition> {
    let mut cell = BlockPosition::containing(start).to_array();
    let last = BlockPosition::containing(end).to_array();
    let mut cells = vec![BlockPosition::from(cell)];

    let delta = end - start;
    let length = delta.length();
    if length < SEGMENT_TOLERANCE {
        return cells;
    }
    let direction = (delta / length).to_array();
    let origin = start.to_array();

    let mut step = [0i32; 3];
    let mut t_delta = [f64::INFINITY; 3];
    let mut t_max = [f64::INFINITY; 3];
    for axis in 0..3 {
        let d = direction[axis];
        if d > 1e-12 {
            step[axis] = 1;
            t_delta[axis] = 1.0 / d;
            t_max[axis] = (cell[axis] as f64 + 1.0 - origin[axis]) / d;
        } else if d < -1e-12 {
            step[axis] = -1;
            t_delta[axis] = -1.0 / d;
            t_max[axis] = (origin[axis] - cell[axis] as f64) / -d;
        }
    }

    let steps: i32 = (0..3).map(|a| (last[a] - cell[a]).abs()).sum();
    for _ in 0..steps {
        if cell == last {
            break;
        }
        let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
            0
        } else if t_max[1] <= t_max[2] {
            1
        } else {
            2
        };
        if t_max[axis] > length {
            break;
        }
        cell[axis] += step[axis];
        t_max[axis] += t_delta[axis];
        cells.push(BlockPosition::from(cell));
    }
    cells
}

impl TryFrom<Vec<Vec<Vec3>>> for Line3 {
    type Error = ArchitectError;

    fn try_from(value: Vec<Vec<Vec3>>) -> Result<Self> {
        let parts = value
            .into_iter()
            .map(Line3Part::from_points)
            .collect::<Result<Vec<_>>>()?;
        Ok(Line3::new(parts))
    }
}

impl From<Line3> for Vec<Vec<Vec3>> {
    fn from(value: Line3) -> Self {
        value.parts.iter().map(Line3Part::controls).collect()
    }
}
