//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Veterinary clinic record keeping
//!
//! This crate provides a REST service over owners, their pets, the visits
//! of those pets, the vets and the lookup tables of pet types and
//! specialties. Records live in memory or in a SQLite database.

pub mod api;
pub mod auth;
pub mod clinic;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod populate;
pub mod serialize;
pub mod storage;
pub mod validation;

// Re-export main types
pub use api::ClinicApi;
pub use auth::{AccessClaims, TokenManager};
pub use clinic::{ClinicManager, ClinicOperations, ClinicState};
pub use config::ClinicConfig;
pub use error::{ClinicError, ClinicResult};
pub use model::{EntityId, EntityKind, Owner, Pet, PetType, Specialty, Vet, Visit};
pub use storage::{ClinicStore, MemoryStore, SqliteStore, StorageError, StorageStats};
pub use validation::FieldErrors;

/// Service version
pub const PETCLINIC_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name
pub const PETCLINIC_NAME: &str = "petclinic";
