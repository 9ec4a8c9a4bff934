// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Utility functions

pub mod math;

pub use math::{approx_eq, newell_normal, triangle_area};
