//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Clinic service core
//!
//! The manager owns the store and its lifecycle; the operations hold the
//! per-entity list, create, retrieve, update and delete logic the HTTP
//! handlers call into.

pub mod manager;
pub mod operations;
pub mod state;

pub use manager::ClinicManager;
pub use operations::{ClinicOperations, NestedPayload};
pub use state::ClinicState;
