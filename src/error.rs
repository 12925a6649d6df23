// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh construction

use thiserror::Error;

/// Errors that can occur while building a triangle mesh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No positions were supplied.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// The position count does not form whole triangles.
    #[error("position count {0} is not a multiple of 3")]
    IncompleteFace(usize),

    /// A surface-index array was supplied but its length does not match.
    #[error("surface index count {surfaces} does not match face count {faces}")]
    SurfaceCountMismatch {
        surfaces: usize,
        faces: usize,
    },
}

/// Result type for mesh construction.
pub type Result<T> = std::result::Result<T, BuildError>;
