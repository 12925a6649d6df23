// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Spatial
//!
//! A static spatial-query engine over triangle soups. Feed it a flat list of
//! triangle positions (plus optional per-face surface indices), build a
//! bounding-volume hierarchy once, then run segment, ray, closest-point, and
//! convex containment queries against the immutable mesh.

pub mod error;
pub mod geometry;

pub use error::{BuildError, Result};
pub use geometry::{
    BoundingBox, BvhNode, Plane, SurfaceHit, SurfacePoint, Triangle, TriangleMesh,
};

use nalgebra::Point3;

/// Build a queryable mesh from a flat triangle soup
pub fn build(positions: &[Point3<f64>], surface_indices: &[u32]) -> Result<TriangleMesh> {
    TriangleMesh::build(positions, surface_indices)
}
