// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Iterative BVH traversal and the four spatial queries
//!
//! All queries share one explicit-stack, depth-first walk over the node
//! arena. Each stack frame is a `{node, phase}` pair; the phase advances
//! `TestAabb -> VisitLeft -> VisitRight -> Done`, with leaves tested during
//! `TestAabb` and never descended into. The stack is allocated per call and
//! sized to the tree depth recorded at build time, so traversal never grows
//! a native call stack regardless of mesh size.

use super::intersect;
use super::mesh::TriangleMesh;
use super::Plane;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Result of a segment or ray intersection query
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SurfaceHit {
    /// Intersection point on the mesh surface
    pub point: Point3<f64>,
    /// Normal of the face that was hit
    pub normal: Vector3<f64>,
    /// Surface index of the face that was hit
    pub surface_index: u32,
    /// Index of the face that was hit
    pub face_index: usize,
}

/// Result of a closest-point query
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SurfacePoint {
    /// Nearest point on the mesh surface
    pub point: Point3<f64>,
    /// Normal of the face the point lies on
    pub normal: Vector3<f64>,
}

/// Visit state of one traversal stack frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    TestAabb,
    VisitLeft,
    VisitRight,
    Done,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    phase: Phase,
}

/// Fresh traversal stack with the root frame at level 0
fn traversal_stack(mesh: &TriangleMesh) -> Vec<Frame> {
    vec![
        Frame {
            node: mesh.nodes.len() - 1,
            phase: Phase::TestAabb,
        };
        mesh.max_depth
    ]
}

pub(crate) fn intersect_segment(
    mesh: &TriangleMesh,
    begin: &Point3<f64>,
    end: &Point3<f64>,
    auto_flip_normal: bool,
) -> Option<SurfaceHit> {
    if !mesh.valid {
        return None;
    }

    let rel = end - begin;
    let mut stack = traversal_stack(mesh);
    let mut level = 0usize;

    let mut best_d = f64::INFINITY;
    let mut best: Option<SurfaceHit> = None;

    loop {
        let frame = stack[level];
        let node = &mesh.nodes[frame.node];

        match frame.phase {
            Phase::TestAabb => {
                if !node.aabb.intersects_segment(begin, end) {
                    stack[level].phase = Phase::Done;
                } else if node.is_leaf() {
                    let face = &mesh.triangles[node.face_index as usize];
                    let corners = mesh.face_positions(face);

                    if let Some(point) =
                        intersect::triangle_intersects_segment(&corners, begin, end)
                    {
                        // Keep the hit closest to `begin` along the travel
                        // direction
                        let d = rel.dot(&(point - begin));
                        if d < best_d {
                            best_d = d;
                            best = Some(SurfaceHit {
                                point,
                                normal: face.normal,
                                surface_index: face.surface_index,
                                face_index: node.face_index as usize,
                            });
                        }
                    }
                    stack[level].phase = Phase::Done;
                } else {
                    stack[level].phase = Phase::VisitLeft;
                }
            }
            Phase::VisitLeft => {
                stack[level].phase = Phase::VisitRight;
                level += 1;
                stack[level] = Frame {
                    node: node.left as usize,
                    phase: Phase::TestAabb,
                };
            }
            Phase::VisitRight => {
                stack[level].phase = Phase::Done;
                level += 1;
                stack[level] = Frame {
                    node: node.right as usize,
                    phase: Phase::TestAabb,
                };
            }
            Phase::Done => {
                if level == 0 {
                    break;
                }
                level -= 1;
            }
        }
    }

    let mut hit = best?;
    if auto_flip_normal && hit.normal.dot(&rel) > 0.0 {
        hit.normal = -hit.normal;
    }
    Some(hit)
}

pub(crate) fn intersect_ray(
    mesh: &TriangleMesh,
    begin: &Point3<f64>,
    dir: &Vector3<f64>,
    auto_flip_normal: bool,
) -> Option<SurfaceHit> {
    if !mesh.valid {
        return None;
    }

    let mut stack = traversal_stack(mesh);
    let mut level = 0usize;

    let mut best_d = f64::INFINITY;
    let mut best: Option<SurfaceHit> = None;

    loop {
        let frame = stack[level];
        let node = &mesh.nodes[frame.node];

        match frame.phase {
            Phase::TestAabb => {
                if !node.aabb.intersects_ray(begin, dir) {
                    stack[level].phase = Phase::Done;
                } else if node.is_leaf() {
                    let face = &mesh.triangles[node.face_index as usize];
                    let corners = mesh.face_positions(face);

                    if let Some(point) = intersect::triangle_intersects_ray(&corners, begin, dir) {
                        let d = dir.dot(&(point - begin));
                        if d < best_d {
                            best_d = d;
                            best = Some(SurfaceHit {
                                point,
                                normal: face.normal,
                                surface_index: face.surface_index,
                                face_index: node.face_index as usize,
                            });
                        }
                    }
                    stack[level].phase = Phase::Done;
                } else {
                    stack[level].phase = Phase::VisitLeft;
                }
            }
            Phase::VisitLeft => {
                stack[level].phase = Phase::VisitRight;
                level += 1;
                stack[level] = Frame {
                    node: node.left as usize,
                    phase: Phase::TestAabb,
                };
            }
            Phase::VisitRight => {
                stack[level].phase = Phase::Done;
                level += 1;
                stack[level] = Frame {
                    node: node.right as usize,
                    phase: Phase::TestAabb,
                };
            }
            Phase::Done => {
                if level == 0 {
                    break;
                }
                level -= 1;
            }
        }
    }

    let mut hit = best?;
    if auto_flip_normal && hit.normal.dot(dir) > 0.0 {
        hit.normal = -hit.normal;
    }
    Some(hit)
}

pub(crate) fn closest_point(
    mesh: &TriangleMesh,
    point: &Point3<f64>,
    max_distance: f64,
    auto_flip_normal: bool,
) -> Option<SurfacePoint> {
    if !mesh.valid {
        return None;
    }

    let max_sq = max_distance * max_distance;
    let mut stack = traversal_stack(mesh);
    let mut level = 0usize;

    let mut best_sq = max_sq;
    let mut best: Option<(Point3<f64>, usize)> = None;

    loop {
        let frame = stack[level];
        let node = &mesh.nodes[frame.node];

        match frame.phase {
            Phase::TestAabb => {
                // The bound here is on the running best, not the node's box
                if best_sq > max_sq {
                    stack[level].phase = Phase::Done;
                } else if node.is_leaf() {
                    let face = &mesh.triangles[node.face_index as usize];
                    let corners = mesh.face_positions(face);

                    let candidate = intersect::triangle_closest_point(&corners, point);
                    let d_sq = (candidate - point).norm_squared();
                    if d_sq < best_sq {
                        best_sq = d_sq;
                        best = Some((candidate, node.face_index as usize));
                    }
                    stack[level].phase = Phase::Done;
                } else {
                    stack[level].phase = Phase::VisitLeft;
                }
            }
            Phase::VisitLeft => {
                stack[level].phase = Phase::VisitRight;
                level += 1;
                stack[level] = Frame {
                    node: node.left as usize,
                    phase: Phase::TestAabb,
                };
            }
            Phase::VisitRight => {
                stack[level].phase = Phase::Done;
                level += 1;
                stack[level] = Frame {
                    node: node.right as usize,
                    phase: Phase::TestAabb,
                };
            }
            Phase::Done => {
                if level == 0 {
                    break;
                }
                level -= 1;
            }
        }
    }

    let (nearest, face_index) = best?;
    let mut normal = mesh.triangles[face_index].normal;
    if auto_flip_normal && normal.dot(&(*point - nearest)) < 0.0 {
        normal = -normal;
    }
    Some(SurfacePoint {
        point: nearest,
        normal,
    })
}

pub(crate) fn inside_convex_shape(
    mesh: &TriangleMesh,
    planes: &[Plane],
    points: &[Point3<f64>],
    scale: &Vector3<f64>,
) -> bool {
    if !mesh.valid {
        return false;
    }

    let mut stack = traversal_stack(mesh);
    let mut level = 0usize;

    loop {
        let frame = stack[level];
        let node = &mesh.nodes[frame.node];

        match frame.phase {
            Phase::TestAabb => {
                let scaled = node.aabb.scaled(scale);

                if !scaled.intersects_convex_shape(planes, points) {
                    // Everything under this box is outside the region, so
                    // the whole query fails, not just this subtree
                    return false;
                }

                if scaled.inside_convex_shape(planes) {
                    // Subtree trivially satisfied
                    stack[level].phase = Phase::Done;
                } else if node.is_leaf() {
                    let face = &mesh.triangles[node.face_index as usize];
                    for &index in &face.indices {
                        let vertex = &mesh.vertices[index];
                        let scaled_vertex = Point3::new(
                            vertex.x * scale.x,
                            vertex.y * scale.y,
                            vertex.z * scale.z,
                        );
                        for plane in planes {
                            if plane.is_point_over(&scaled_vertex) {
                                return false;
                            }
                        }
                    }
                    stack[level].phase = Phase::Done;
                } else {
                    stack[level].phase = Phase::VisitLeft;
                }
            }
            Phase::VisitLeft => {
                stack[level].phase = Phase::VisitRight;
                level += 1;
                stack[level] = Frame {
                    node: node.left as usize,
                    phase: Phase::TestAabb,
                };
            }
            Phase::VisitRight => {
                stack[level].phase = Phase::Done;
                level += 1;
                stack[level] = Frame {
                    node: node.right as usize,
                    phase: Phase::TestAabb,
                };
            }
            Phase::Done => {
                if level == 0 {
                    break;
                }
                level -= 1;
            }
        }
    }

    true
}
