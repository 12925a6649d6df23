// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle mesh with BVH-accelerated spatial queries
//!
//! A mesh is built once from a flat triangle soup and is immutable
//! afterwards. Ingest snaps vertices to a small grid to merge
//! near-duplicates, records one face normal and surface index per triangle,
//! and builds the BVH over the per-face bounding boxes.

use super::bvh::{self, BvhNode};
use super::query;
use super::{BoundingBox, Plane, SurfaceHit, SurfacePoint};
use crate::error::{BuildError, Result};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Grid resolution used to merge near-duplicate vertices during ingest
const SNAP_EPSILON: f64 = 1e-4;

/// Triangle defined by three vertex indices, a face normal, and a surface index
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Triangle {
    /// Indices into the mesh's vertex table
    pub indices: [usize; 3],
    /// Face normal, computed from the unsnapped source triangle
    pub normal: Vector3<f64>,
    /// Caller-supplied surface tag, 0 when none was given
    pub surface_index: u32,
}

/// Triangular mesh with an immutable BVH over its faces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub(crate) vertices: Vec<Point3<f64>>,
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) nodes: Vec<BvhNode>,
    pub(crate) max_depth: usize,
    pub(crate) valid: bool,
}

impl TriangleMesh {
    /// Empty, invalid mesh; every query on it reports "no result"
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            nodes: Vec::new(),
            max_depth: 0,
            valid: false,
        }
    }

    /// Build a mesh from a flat triangle soup.
    ///
    /// `positions` holds three corners per face and must be a non-zero
    /// multiple of 3 long. `surface_indices` is either empty or one entry
    /// per face.
    pub fn build(positions: &[Point3<f64>], surface_indices: &[u32]) -> Result<Self> {
        if positions.is_empty() {
            return Err(BuildError::EmptyMesh);
        }
        if positions.len() % 3 != 0 {
            return Err(BuildError::IncompleteFace(positions.len()));
        }

        let face_count = positions.len() / 3;
        if !surface_indices.is_empty() && surface_indices.len() != face_count {
            return Err(BuildError::SurfaceCountMismatch {
                surfaces: surface_indices.len(),
                faces: face_count,
            });
        }

        let mut vertices: Vec<Point3<f64>> = Vec::new();
        let mut triangles: Vec<Triangle> = Vec::with_capacity(face_count);
        let mut nodes: Vec<BvhNode> = Vec::with_capacity(2 * face_count - 1);
        let mut dedup: AHashMap<[i64; 3], usize> = AHashMap::with_capacity(positions.len());

        for (face, corners) in positions.chunks_exact(3).enumerate() {
            // The normal comes from the unsnapped source triangle
            let plane = Plane::from_points(&corners[0], &corners[1], &corners[2]);

            let mut indices = [0usize; 3];
            let mut aabb = BoundingBox::empty();

            for (corner, position) in corners.iter().enumerate() {
                let key = snap_key(position);
                let index = match dedup.get(&key) {
                    Some(&existing) => existing,
                    None => {
                        let index = vertices.len();
                        vertices.push(snapped_position(&key));
                        dedup.insert(key, index);
                        index
                    }
                };
                indices[corner] = index;

                let snapped = vertices[index];
                if corner == 0 {
                    aabb = BoundingBox::from_point(&snapped);
                } else {
                    aabb.expand_to_include(&snapped);
                }
            }

            triangles.push(Triangle {
                indices,
                normal: plane.normal,
                surface_index: surface_indices.get(face).copied().unwrap_or(0),
            });
            nodes.push(BvhNode::leaf(aabb, face));
        }

        let max_depth = bvh::build(&mut nodes, face_count);

        Ok(Self {
            vertices,
            triangles,
            nodes,
            max_depth,
            valid: true,
        })
    }

    /// True once construction has succeeded
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Unique vertex table, in first-insertion order
    pub fn get_vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Flattened triangle index list, three entries per face
    pub fn get_indices(&self) -> Vec<usize> {
        self.triangles
            .iter()
            .flat_map(|triangle| triangle.indices)
            .collect()
    }

    /// Faces expanded back to corner positions
    pub fn get_faces(&self) -> Vec<[Point3<f64>; 3]> {
        self.triangles
            .iter()
            .map(|triangle| self.face_positions(triangle))
            .collect()
    }

    /// Surface index of one face
    pub fn surface_index(&self, face: usize) -> Option<u32> {
        self.triangles.get(face).map(|t| t.surface_index)
    }

    /// Triangle table
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// BVH node arena; the root is the last element
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Maximum BVH depth in levels, recorded at build time
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Bounding box of the whole mesh (empty for an invalid mesh)
    pub fn bounding_box(&self) -> BoundingBox {
        if self.valid {
            self.nodes[self.nodes.len() - 1].aabb
        } else {
            BoundingBox::empty()
        }
    }

    pub(crate) fn face_positions(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        [
            self.vertices[triangle.indices[0]],
            self.vertices[triangle.indices[1]],
            self.vertices[triangle.indices[2]],
        ]
    }

    /// Closest intersection of the segment `begin..end` with the mesh
    /// surface. With `auto_flip_normal`, the reported normal is flipped to
    /// face back along the direction of travel.
    pub fn intersect_segment(
        &self,
        begin: &Point3<f64>,
        end: &Point3<f64>,
        auto_flip_normal: bool,
    ) -> Option<SurfaceHit> {
        query::intersect_segment(self, begin, end, auto_flip_normal)
    }

    /// Closest intersection of an unbounded ray with the mesh surface
    pub fn intersect_ray(
        &self,
        begin: &Point3<f64>,
        dir: &Vector3<f64>,
        auto_flip_normal: bool,
    ) -> Option<SurfaceHit> {
        query::intersect_ray(self, begin, dir, auto_flip_normal)
    }

    /// Nearest point on the mesh surface within `max_distance` of `point`.
    /// With `auto_flip_normal`, the reported normal points toward the side
    /// the query point is on.
    pub fn closest_point(
        &self,
        point: &Point3<f64>,
        max_distance: f64,
        auto_flip_normal: bool,
    ) -> Option<SurfacePoint> {
        query::closest_point(self, point, max_distance, auto_flip_normal)
    }

    /// Test whether every mesh vertex, scaled component-wise by `scale`,
    /// lies inside the convex region bounded by `planes`. `points` are the
    /// region's corner vertices.
    pub fn inside_convex_shape(
        &self,
        planes: &[Plane],
        points: &[Point3<f64>],
        scale: &Vector3<f64>,
    ) -> bool {
        query::inside_convex_shape(self, planes, points, scale)
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Grid cell of a position under the snap epsilon
fn snap_key(position: &Point3<f64>) -> [i64; 3] {
    [
        (position.x / SNAP_EPSILON).round() as i64,
        (position.y / SNAP_EPSILON).round() as i64,
        (position.z / SNAP_EPSILON).round() as i64,
    ]
}

/// Representative position of a grid cell
fn snapped_position(key: &[i64; 3]) -> Point3<f64> {
    Point3::new(
        key[0] as f64 * SNAP_EPSILON,
        key[1] as f64 * SNAP_EPSILON,
        key[2] as f64 * SNAP_EPSILON,
    )
}
