//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Shared lookup tables: pet types and specialties
//!
//! Both are a unique name behind an id. Records referencing them keep
//! existing when they go away; the reference is cleared instead.

use serde::{Deserialize, Serialize};

use super::EntityId;

/// Kind of animal, referenced by pets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetType {
    pub id: EntityId,
    pub name: String,
}

impl PetType {
    pub const NAME_MAX_LEN: usize = 32;
}

/// Veterinary specialty, referenced by vets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: EntityId,
    pub name: String,
}

impl Specialty {
    pub const NAME_MAX_LEN: usize = 30;
}

/// Validated lookup entry awaiting an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEntry {
    pub name: String,
}

impl NamedEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn into_pet_type(self, id: EntityId) -> PetType {
        PetType {
            id,
            name: self.name,
        }
    }

    pub fn into_specialty(self, id: EntityId) -> Specialty {
        Specialty {
            id,
            name: self.name,
        }
    }
}
