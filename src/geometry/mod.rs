// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - triangle mesh, BVH, and primitive intersection tests

mod bbox;
mod bvh;
mod intersect;
mod mesh;
mod plane;
mod query;

pub use bbox::BoundingBox;
pub use bvh::BvhNode;
pub use mesh::{Triangle, TriangleMesh};
pub use plane::Plane;
pub use query::{SurfaceHit, SurfacePoint};

pub use intersect::{
    triangle_closest_point, triangle_intersects_ray, triangle_intersects_segment,
};
