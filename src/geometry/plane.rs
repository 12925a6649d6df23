// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plane representation and point classification

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Plane in constant-normal form: `normal . x = d`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub d: f64,
}

impl Plane {
    pub fn new(normal: Vector3<f64>, d: f64) -> Self {
        Self { normal, d }
    }

    /// Plane through three points, with the normal following the winding
    /// `a -> b -> c` (counter-clockwise seen from the front side).
    ///
    /// A degenerate (collinear) triple yields a zero normal with `d = 0`.
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Self {
        let normal = (b - a).cross(&(c - a));
        let length = normal.norm();

        if length < 1e-12 {
            return Self {
                normal: Vector3::zeros(),
                d: 0.0,
            };
        }

        let normal = normal / length;
        Self {
            normal,
            d: normal.dot(&a.coords),
        }
    }

    /// Signed distance from the plane; positive on the normal side
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.d
    }

    /// True if `point` lies strictly on the normal side of the plane
    pub fn is_point_over(&self, point: &Point3<f64>) -> bool {
        self.distance_to(point) > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_points() {
        let plane = Plane::from_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );

        assert_relative_eq!(plane.normal.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(plane.d, 0.0, epsilon = 1e-12);
        assert!(plane.is_point_over(&Point3::new(0.0, 0.0, 1.0)));
        assert!(!plane.is_point_over(&Point3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_degenerate_points() {
        let plane = Plane::from_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 1.0),
            &Point3::new(2.0, 2.0, 2.0),
        );

        assert_eq!(plane.normal, Vector3::zeros());
    }

    #[test]
    fn test_distance() {
        let plane = Plane::new(Vector3::new(0.0, 0.0, 1.0), 2.0);

        assert_relative_eq!(plane.distance_to(&Point3::new(5.0, 5.0, 3.0)), 1.0);
        assert_relative_eq!(plane.distance_to(&Point3::new(5.0, 5.0, 0.0)), -2.0);
    }
}
