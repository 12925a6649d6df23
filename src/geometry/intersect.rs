// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-triangle intersection and closest-point tests
//! Segment and ray tests cross the supporting plane, then verify containment
//! with projected barycentric coordinates

use super::Plane;
use nalgebra::{Point3, Vector3};

/// Intersection point of the segment `begin..end` with a triangle, if any
pub fn triangle_intersects_segment(
    triangle: &[Point3<f64>; 3],
    begin: &Point3<f64>,
    end: &Point3<f64>,
) -> Option<Point3<f64>> {
    let plane = Plane::from_points(&triangle[0], &triangle[1], &triangle[2]);
    if plane.normal == Vector3::zeros() {
        return None; // Degenerate triangle
    }

    let begin_dist = plane.distance_to(begin);
    let end_dist = plane.distance_to(end);

    // Both endpoints on the same side
    if begin_dist * end_dist > 0.0 {
        return None;
    }

    let denom = begin_dist - end_dist;
    if denom.abs() < 1e-12 {
        return None; // Segment lies in the plane
    }

    let t = begin_dist / denom;
    let point = begin + (end - begin) * t;

    if point_in_triangle(&point, triangle, &plane.normal) {
        Some(point)
    } else {
        None
    }
}

/// Intersection point of the ray `origin + t * dir` (t >= 0) with a triangle
pub fn triangle_intersects_ray(
    triangle: &[Point3<f64>; 3],
    origin: &Point3<f64>,
    dir: &Vector3<f64>,
) -> Option<Point3<f64>> {
    let plane = Plane::from_points(&triangle[0], &triangle[1], &triangle[2]);
    if plane.normal == Vector3::zeros() {
        return None;
    }

    let denom = plane.normal.dot(dir);
    if denom.abs() < 1e-12 {
        return None; // Ray parallel to the plane
    }

    let t = -plane.distance_to(origin) / denom;
    if t < 0.0 {
        return None; // Plane behind the ray origin
    }

    let point = origin + dir * t;

    if point_in_triangle(&point, triangle, &plane.normal) {
        Some(point)
    } else {
        None
    }
}

/// Test if a point on the triangle's plane lies inside the triangle,
/// projected to 2D along the dominant normal axis
fn point_in_triangle(
    point: &Point3<f64>,
    triangle: &[Point3<f64>; 3],
    normal: &Vector3<f64>,
) -> bool {
    let abs_normal = normal.map(|x| x.abs());
    let max_axis = if abs_normal.x > abs_normal.y && abs_normal.x > abs_normal.z {
        0 // Project to YZ plane
    } else if abs_normal.y > abs_normal.z {
        1 // Project to XZ plane
    } else {
        2 // Project to XY plane
    };

    let get_2d = |p: &Point3<f64>| -> (f64, f64) {
        match max_axis {
            0 => (p.y, p.z),
            1 => (p.x, p.z),
            _ => (p.x, p.y),
        }
    };

    let (px, py) = get_2d(point);
    let (v0x, v0y) = get_2d(&triangle[0]);
    let (v1x, v1y) = get_2d(&triangle[1]);
    let (v2x, v2y) = get_2d(&triangle[2]);

    // Barycentric coordinates test
    let denom = (v1y - v2y) * (v0x - v2x) + (v2x - v1x) * (v0y - v2y);
    if denom.abs() < 1e-12 {
        return false; // Degenerate projection
    }

    let a = ((v1y - v2y) * (px - v2x) + (v2x - v1x) * (py - v2y)) / denom;
    let b = ((v2y - v0y) * (px - v2x) + (v0x - v2x) * (py - v2y)) / denom;
    let c = 1.0 - a - b;

    const EPS: f64 = 1e-10;
    a >= -EPS && b >= -EPS && c >= -EPS
}

/// Closest point on a triangle to `point`, by walking the Voronoi regions
/// of the triangle's vertices, edges, and face
pub fn triangle_closest_point(triangle: &[Point3<f64>; 3], point: &Point3<f64>) -> Point3<f64> {
    let [a, b, c] = triangle;

    let ab = b - a;
    let ac = c - a;
    let ap = point - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a; // Vertex region A
    }

    let bp = point - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b; // Vertex region B
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        // Edge region AB
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = point - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c; // Vertex region C
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        // Edge region AC
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        // Edge region BC
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    // Face region
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> [Point3<f64>; 3] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_segment_hit() {
        let tri = unit_triangle();
        let hit = triangle_intersects_segment(
            &tri,
            &Point3::new(0.2, 0.2, 1.0),
            &Point3::new(0.2, 0.2, -1.0),
        );

        let point = hit.expect("segment should cross the triangle");
        assert_relative_eq!(point.x, 0.2, epsilon = 1e-12);
        assert_relative_eq!(point.y, 0.2, epsilon = 1e-12);
        assert_relative_eq!(point.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_segment_miss() {
        let tri = unit_triangle();

        // Same side of the plane
        assert!(triangle_intersects_segment(
            &tri,
            &Point3::new(0.2, 0.2, 1.0),
            &Point3::new(0.2, 0.2, 2.0)
        )
        .is_none());

        // Crosses the plane outside the triangle
        assert!(triangle_intersects_segment(
            &tri,
            &Point3::new(0.9, 0.9, 1.0),
            &Point3::new(0.9, 0.9, -1.0)
        )
        .is_none());
    }

    #[test]
    fn test_ray_hit_and_miss() {
        let tri = unit_triangle();

        let hit = triangle_intersects_ray(
            &tri,
            &Point3::new(0.2, 0.2, 5.0),
            &Vector3::new(0.0, 0.0, -1.0),
        );
        assert!(hit.is_some());

        // Triangle behind the origin
        assert!(triangle_intersects_ray(
            &tri,
            &Point3::new(0.2, 0.2, 5.0),
            &Vector3::new(0.0, 0.0, 1.0)
        )
        .is_none());
    }

    #[test]
    fn test_closest_point_regions() {
        let tri = unit_triangle();

        // Above the interior: projects straight down
        let p = triangle_closest_point(&tri, &Point3::new(0.25, 0.25, 2.0));
        assert_relative_eq!(p.x, 0.25, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.25, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);

        // Beyond vertex A
        let p = triangle_closest_point(&tri, &Point3::new(-1.0, -1.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);

        // Beyond edge AB
        let p = triangle_closest_point(&tri, &Point3::new(0.5, -1.0, 0.0));
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);

        // Beyond the hypotenuse
        let p = triangle_closest_point(&tri, &Point3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.5, epsilon = 1e-12);
    }
}
