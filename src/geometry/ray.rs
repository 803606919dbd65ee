//! Half-lines and ray/triangle intersection.

use super::Vec3;

/// Determinants below this are treated as a ray parallel to the triangle.
pub const PARALLEL_EPSILON: f64 = 1e-6;

/// A ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray pointing straight up (+Y) from `origin`.
    pub fn up(origin: Vec3) -> Self {
        Self::new(origin, Vec3::Y)
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Möller–Trumbore intersection. Returns the ray parameter of a strictly
    /// forward hit, `None` when the ray misses or runs parallel to the triangle.
    pub fn triangle_hit(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f64> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);

        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        (t > PARALLEL_EPSILON).then_some(t)
    }

    pub fn intersects_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> bool {
        self.triangle_hit(v0, v1, v2).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_triangle(y: f64) -> [Vec3; 3] {
        [
            Vec3::new(0.0, y, 0.0),
            Vec3::new(2.0, y, 0.0),
            Vec3::new(0.0, y, 2.0),
        ]
    }

    #[test]
    fn test_hits_triangle_above() {
        let [a, b, c] = floor_triangle(3.0);
        let ray = Ray::up(Vec3::new(0.5, 0.0, 0.5));
        let t = ray.triangle_hit(a, b, c).unwrap();
        assert!((t - 3.0).abs() < 1e-9);
        assert!(ray.at(t).abs_diff_eq(Vec3::new(0.5, 3.0, 0.5), 1e-9));
    }

    #[test]
    fn test_ignores_triangle_behind() {
        let [a, b, c] = floor_triangle(-1.0);
        assert!(!Ray::up(Vec3::new(0.5, 0.0, 0.5)).intersects_triangle(a, b, c));
    }

    #[test]
    fn test_misses_outside_barycentric_range() {
        let [a, b, c] = floor_triangle(3.0);
        assert!(!Ray::up(Vec3::new(1.5, 0.0, 1.5)).intersects_triangle(a, b, c));
    }

    #[test]
    fn test_parallel_ray_is_no_hit() {
        let wall = [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 5.0, 1.0),
            Vec3::new(5.0, 0.0, 1.0),
        ];
        let ray = Ray::up(Vec3::new(1.0, -1.0, 1.0));
        assert!(!ray.intersects_triangle(wall[0], wall[1], wall[2]));
    }

    #[test]
    fn test_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(ray.direction(), Vec3::Y);
    }
}
