/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports geometry primitives, kernels, and helper functions used across the implicit_rbf crates.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the `implicit_rbf` crate
//!
//! Value types for 3D points and axis aligned bounding boxes, plus the radial
//! basis kernels used to assemble variational implicit functions.
mod bounding_box;
mod point;
mod rbf_kernels;
mod traits;
mod utils;

/// Implemented kernels for use in the `implicit_rbf` crate.
pub mod kernels {
    pub use super::rbf_kernels::*;
}

pub use {
    bounding_box::{BoundingBox, BoundingBoxError},
    point::Point3,
    traits::KernelFunction,
    utils::{KernelType, basis_value, cubed, kernel_phi, squared},
};
