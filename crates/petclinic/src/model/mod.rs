//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Entity schema for the clinic
//!
//! This module defines the six record types kept by the clinic, the
//! relationships between them and the per-kind capabilities that the
//! resource handlers consult.

pub mod contact;
pub mod lookup;
pub mod owner;
pub mod pet;
pub mod vet;
pub mod visit;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use contact::Contact;
pub use lookup::{NamedEntry, PetType, Specialty};
pub use owner::{NewOwner, Owner, OwnerFilter};
pub use pet::{NewPet, Pet};
pub use vet::{NewVet, Vet, VetFilter};
pub use visit::{NewVisit, Visit};

/// Persistent numeric identity assigned at creation
pub type EntityId = i64;

/// Entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Owner,
    Pet,
    PetType,
    Vet,
    Specialty,
    Visit,
}

impl EntityKind {
    /// All entity kinds, parents before children
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Owner,
        EntityKind::PetType,
        EntityKind::Specialty,
        EntityKind::Vet,
        EntityKind::Pet,
        EntityKind::Visit,
    ];

    /// Lower-case name used in validation messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Owner => "owner",
            EntityKind::Pet => "pet",
            EntityKind::PetType => "pet type",
            EntityKind::Vet => "vet",
            EntityKind::Specialty => "specialty",
            EntityKind::Visit => "visit",
        }
    }

    /// Relational table holding records of this kind
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Owner => "owners",
            EntityKind::Pet => "pets",
            EntityKind::PetType => "pet_types",
            EntityKind::Vet => "vets",
            EntityKind::Specialty => "specialties",
            EntityKind::Visit => "visits",
        }
    }

    /// Whether records of this kind may be deleted through the API.
    ///
    /// Pet types and specialties are shared lookup tables; the API refuses
    /// to delete them even though the store knows how to.
    pub fn supports_delete(&self) -> bool {
        !matches!(self, EntityKind::PetType | EntityKind::Specialty)
    }

    /// The single unique field of this kind, if any
    pub fn unique_field(&self) -> Option<&'static str> {
        match self {
            EntityKind::Owner | EntityKind::Vet => Some("email"),
            EntityKind::PetType | EntityKind::Specialty => Some("name"),
            EntityKind::Pet | EntityKind::Visit => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_capability() {
        assert!(EntityKind::Owner.supports_delete());
        assert!(EntityKind::Pet.supports_delete());
        assert!(EntityKind::Vet.supports_delete());
        assert!(EntityKind::Visit.supports_delete());
        assert!(!EntityKind::PetType.supports_delete());
        assert!(!EntityKind::Specialty.supports_delete());
    }

    #[test]
    fn test_unique_fields() {
        assert_eq!(EntityKind::Owner.unique_field(), Some("email"));
        assert_eq!(EntityKind::Specialty.unique_field(), Some("name"));
        assert_eq!(EntityKind::Visit.unique_field(), None);
        assert_eq!(EntityKind::PetType.to_string(), "pet type");
    }
}
