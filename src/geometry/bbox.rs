// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use super::Plane;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Degenerate box containing a single point
    pub fn from_point(point: &Point3<f64>) -> Self {
        Self {
            min: *point,
            max: *point,
        }
    }

    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);

        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Smallest box containing both operands
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Axis (0 = X, 1 = Y, 2 = Z) with the greatest extent
    pub fn longest_axis(&self) -> usize {
        let size = self.size();

        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    /// Box with both corners scaled component-wise. Scale factors must be
    /// positive, otherwise min and max would swap.
    pub fn scaled(&self, scale: &Vector3<f64>) -> BoundingBox {
        BoundingBox {
            min: Point3::new(
                self.min.x * scale.x,
                self.min.y * scale.y,
                self.min.z * scale.z,
            ),
            max: Point3::new(
                self.max.x * scale.x,
                self.max.y * scale.y,
                self.max.z * scale.z,
            ),
        }
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Slab-clip test against the segment from `begin` to `end`
    pub fn intersects_segment(&self, begin: &Point3<f64>, end: &Point3<f64>) -> bool {
        let dir = end - begin;
        self.clip_line(begin, &dir, 0.0, 1.0)
    }

    /// Slab test against the ray starting at `origin` along `dir`
    pub fn intersects_ray(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> bool {
        self.clip_line(origin, dir, 0.0, f64::INFINITY)
    }

    fn clip_line(&self, from: &Point3<f64>, dir: &Vector3<f64>, t_min: f64, t_max: f64) -> bool {
        let mut t_min = t_min;
        let mut t_max = t_max;

        for axis in 0..3 {
            let d = dir[axis];
            if d.abs() < f64::EPSILON {
                // Parallel to this slab; reject if outside it
                if from[axis] < self.min[axis] || from[axis] > self.max[axis] {
                    return false;
                }
            } else {
                let inv = 1.0 / d;
                let mut t0 = (self.min[axis] - from[axis]) * inv;
                let mut t1 = (self.max[axis] - from[axis]) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return false;
                }
            }
        }

        true
    }

    /// Test whether the box touches the convex region bounded by `planes`.
    /// `points` are the region's corner vertices, used to reject boxes that
    /// lie entirely beyond the hull along one of the box axes.
    pub fn intersects_convex_shape(&self, planes: &[Plane], points: &[Point3<f64>]) -> bool {
        let half = self.size() * 0.5;
        let center = self.center();

        for plane in planes {
            // Box corner least far along the plane normal; if even that corner
            // is over the plane, the whole box is outside
            let support = Point3::new(
                center.x + if plane.normal.x > 0.0 { -half.x } else { half.x },
                center.y + if plane.normal.y > 0.0 { -half.y } else { half.y },
                center.z + if plane.normal.z > 0.0 { -half.z } else { half.z },
            );
            if plane.is_point_over(&support) {
                return false;
            }
        }

        for axis in 0..3 {
            let mut all_above = true;
            let mut all_below = true;
            for point in points {
                if point[axis] <= self.max[axis] {
                    all_above = false;
                }
                if point[axis] >= self.min[axis] {
                    all_below = false;
                }
            }
            if all_above || all_below {
                return false;
            }
        }

        true
    }

    /// Test whether the box lies entirely inside the convex region
    pub fn inside_convex_shape(&self, planes: &[Plane]) -> bool {
        for plane in planes {
            // Box corner farthest along the plane normal
            let support = Point3::new(
                if plane.normal.x > 0.0 { self.max.x } else { self.min.x },
                if plane.normal.y > 0.0 { self.max.y } else { self.min.y },
                if plane.normal.z > 0.0 { self.max.z } else { self.min.z },
            );
            if plane.is_point_over(&support) {
                return false;
            }
        }

        true
    }
}
