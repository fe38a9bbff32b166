//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Storage backends for the clinic
//!
//! This module provides the storage abstraction and its implementations.
//! Every backend enforces the same integrity rules:
//!
//! - ids are assigned on insert, ascending, and never reused
//! - owner and vet emails, pet type and specialty names are unique
//! - deleting an owner deletes its pets, deleting a pet deletes its visits
//! - deleting a pet type or specialty clears the references to it
//!
//! Listings are returned in ascending id order.

pub mod error;
pub mod memory;
pub mod sqlite;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClinicResult;
use crate::model::{
    EntityId, EntityKind, NamedEntry, NewOwner, NewPet, NewVet, NewVisit, Owner, OwnerFilter,
    Pet, PetType, Specialty, Vet, VetFilter, Visit,
};

/// Storage backend trait
#[async_trait]
pub trait ClinicStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;

    async fn list_owners(&self, filter: &OwnerFilter) -> ClinicResult<Vec<Owner>>;
    async fn get_owner(&self, id: EntityId) -> ClinicResult<Option<Owner>>;
    async fn insert_owner(&self, owner: NewOwner) -> ClinicResult<Owner>;
    /// Replace a stored owner. Fails with not found when it is gone.
    async fn update_owner(&self, owner: Owner) -> ClinicResult<Owner>;
    /// Delete an owner with its pets and their visits
    async fn delete_owner(&self, id: EntityId) -> ClinicResult<bool>;

    async fn list_vets(&self, filter: &VetFilter) -> ClinicResult<Vec<Vet>>;
    async fn get_vet(&self, id: EntityId) -> ClinicResult<Option<Vet>>;
    async fn insert_vet(&self, vet: NewVet) -> ClinicResult<Vet>;
    async fn update_vet(&self, vet: Vet) -> ClinicResult<Vet>;
    async fn delete_vet(&self, id: EntityId) -> ClinicResult<bool>;

    async fn list_pet_types(&self) -> ClinicResult<Vec<PetType>>;
    async fn get_pet_type(&self, id: EntityId) -> ClinicResult<Option<PetType>>;
    async fn insert_pet_type(&self, entry: NamedEntry) -> ClinicResult<PetType>;
    async fn update_pet_type(&self, pet_type: PetType) -> ClinicResult<PetType>;
    /// Delete a pet type, clearing it on every pet
    async fn delete_pet_type(&self, id: EntityId) -> ClinicResult<bool>;

    async fn list_specialties(&self) -> ClinicResult<Vec<Specialty>>;
    async fn get_specialty(&self, id: EntityId) -> ClinicResult<Option<Specialty>>;
    async fn insert_specialty(&self, entry: NamedEntry) -> ClinicResult<Specialty>;
    async fn update_specialty(&self, specialty: Specialty) -> ClinicResult<Specialty>;
    /// Delete a specialty, clearing it on every vet
    async fn delete_specialty(&self, id: EntityId) -> ClinicResult<bool>;

    /// List pets, optionally only those of one owner
    async fn list_pets(&self, owner: Option<EntityId>) -> ClinicResult<Vec<Pet>>;
    async fn get_pet(&self, id: EntityId) -> ClinicResult<Option<Pet>>;
    /// Insert a batch of pets. Either all are stored or none is.
    async fn insert_pets(&self, pets: Vec<NewPet>) -> ClinicResult<Vec<Pet>>;
    async fn update_pet(&self, pet: Pet) -> ClinicResult<Pet>;
    /// Delete a pet with its visits
    async fn delete_pet(&self, id: EntityId) -> ClinicResult<bool>;

    /// List visits, optionally only those of one pet
    async fn list_visits(&self, pet: Option<EntityId>) -> ClinicResult<Vec<Visit>>;
    async fn get_visit(&self, id: EntityId) -> ClinicResult<Option<Visit>>;
    /// Insert a batch of visits. Either all are stored or none is.
    async fn insert_visits(&self, visits: Vec<NewVisit>) -> ClinicResult<Vec<Visit>>;
    async fn update_visit(&self, visit: Visit) -> ClinicResult<Visit>;
    async fn delete_visit(&self, id: EntityId) -> ClinicResult<bool>;

    /// Whether a record of `kind` with this id exists
    async fn exists(&self, kind: EntityKind, id: EntityId) -> ClinicResult<bool>;

    /// Whether another record of `kind` already holds `value` in its unique field
    async fn is_taken(
        &self,
        kind: EntityKind,
        value: &str,
        exclude: Option<EntityId>,
    ) -> ClinicResult<bool>;

    /// Health check
    async fn health_check(&self) -> ClinicResult<bool>;

    /// Get storage statistics
    async fn get_stats(&self) -> ClinicResult<StorageStats>;

    /// Shutdown the storage backend
    async fn shutdown(&self) -> ClinicResult<()>;
}

/// Storage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    pub owners: u64,
    pub pets: u64,
    pub pet_types: u64,
    pub vets: u64,
    pub specialties: u64,
    pub visits: u64,
}

impl StorageStats {
    pub fn count(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Owner => self.owners,
            EntityKind::Pet => self.pets,
            EntityKind::PetType => self.pet_types,
            EntityKind::Vet => self.vets,
            EntityKind::Specialty => self.specialties,
            EntityKind::Visit => self.visits,
        }
    }

    pub fn total(&self) -> u64 {
        EntityKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }
}

// Re-export storage implementations
pub use error::StorageError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
