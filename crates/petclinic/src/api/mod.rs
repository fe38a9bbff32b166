//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! HTTP API for the clinic
//!
//! This module provides the resource routes, the health probe and the
//! middleware stack wrapped around them.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod responses;
pub mod server;

// Re-export main types for convenience
pub use error::ApiError;
pub use responses::*;
pub use server::{AppState, ClinicApi};
