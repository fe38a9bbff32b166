//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! In-memory storage implementation

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ClinicError, ClinicResult};
use crate::model::{
    EntityId, EntityKind, NamedEntry, NewOwner, NewPet, NewVet, NewVisit, Owner, OwnerFilter,
    Pet, PetType, Specialty, Vet, VetFilter, Visit,
};
use crate::storage::{ClinicStore, StorageError, StorageStats};

/// All tables, guarded together so cascades and batches are atomic
#[derive(Debug, Default)]
struct Tables {
    owners: BTreeMap<EntityId, Owner>,
    pet_types: BTreeMap<EntityId, PetType>,
    specialties: BTreeMap<EntityId, Specialty>,
    vets: BTreeMap<EntityId, Vet>,
    pets: BTreeMap<EntityId, Pet>,
    visits: BTreeMap<EntityId, Visit>,

    /// Last id handed out per kind
    sequences: HashMap<EntityKind, EntityId>,
}

impl Tables {
    fn next_id(&mut self, kind: EntityKind) -> EntityId {
        let last = self.sequences.entry(kind).or_insert(0);
        *last += 1;
        *last
    }

    fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        match kind {
            EntityKind::Owner => self.owners.contains_key(&id),
            EntityKind::Pet => self.pets.contains_key(&id),
            EntityKind::PetType => self.pet_types.contains_key(&id),
            EntityKind::Vet => self.vets.contains_key(&id),
            EntityKind::Specialty => self.specialties.contains_key(&id),
            EntityKind::Visit => self.visits.contains_key(&id),
        }
    }

    /// Id of the record holding `value` in the unique field of `kind`
    fn unique_holder(&self, kind: EntityKind, value: &str) -> Option<EntityId> {
        match kind {
            EntityKind::Owner => self
                .owners
                .values()
                .find(|o| o.contact.email == value)
                .map(|o| o.id),
            EntityKind::Vet => self
                .vets
                .values()
                .find(|v| v.contact.email == value)
                .map(|v| v.id),
            EntityKind::PetType => self
                .pet_types
                .values()
                .find(|t| t.name == value)
                .map(|t| t.id),
            EntityKind::Specialty => self
                .specialties
                .values()
                .find(|s| s.name == value)
                .map(|s| s.id),
            EntityKind::Pet | EntityKind::Visit => None,
        }
    }

    fn is_taken(&self, kind: EntityKind, value: &str, exclude: Option<EntityId>) -> bool {
        self.unique_holder(kind, value)
            .is_some_and(|holder| Some(holder) != exclude)
    }

    fn ensure_unique(
        &self,
        kind: EntityKind,
        value: &str,
        exclude: Option<EntityId>,
    ) -> Result<(), StorageError> {
        if self.is_taken(kind, value, exclude) {
            return Err(StorageError::UniqueViolation { kind });
        }
        Ok(())
    }

    fn ensure_reference(
        &self,
        field: &str,
        kind: EntityKind,
        id: Option<EntityId>,
    ) -> Result<(), StorageError> {
        match id {
            Some(id) if !self.contains(kind, id) => Err(StorageError::MissingReference {
                field: field.to_string(),
                id,
            }),
            _ => Ok(()),
        }
    }

    fn ensure_pet(&self, pet: &NewPet) -> Result<(), StorageError> {
        self.ensure_reference("owner", EntityKind::Owner, Some(pet.owner))?;
        self.ensure_reference("pet_type", EntityKind::PetType, pet.pet_type)
    }

    fn remove_pet(&mut self, id: EntityId) -> bool {
        let removed = self.pets.remove(&id).is_some();
        if removed {
            self.visits.retain(|_, visit| visit.pet != id);
        }
        removed
    }
}

/// In-memory storage implementation
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create a new memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClinicStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_owners(&self, filter: &OwnerFilter) -> ClinicResult<Vec<Owner>> {
        let tables = self.tables.read().await;
        Ok(tables
            .owners
            .values()
            .filter(|owner| filter.matches(owner))
            .cloned()
            .collect())
    }

    async fn get_owner(&self, id: EntityId) -> ClinicResult<Option<Owner>> {
        Ok(self.tables.read().await.owners.get(&id).cloned())
    }

    async fn insert_owner(&self, owner: NewOwner) -> ClinicResult<Owner> {
        let mut tables = self.tables.write().await;
        tables.ensure_unique(EntityKind::Owner, &owner.contact.email, None)?;
        let owner = owner.into_owner(tables.next_id(EntityKind::Owner));
        tables.owners.insert(owner.id, owner.clone());
        Ok(owner)
    }

    async fn update_owner(&self, owner: Owner) -> ClinicResult<Owner> {
        let mut tables = self.tables.write().await;
        if !tables.owners.contains_key(&owner.id) {
            return Err(ClinicError::not_found(EntityKind::Owner, owner.id));
        }
        tables.ensure_unique(EntityKind::Owner, &owner.contact.email, Some(owner.id))?;
        tables.owners.insert(owner.id, owner.clone());
        Ok(owner)
    }

    async fn delete_owner(&self, id: EntityId) -> ClinicResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.owners.remove(&id).is_none() {
            return Ok(false);
        }
        let pets: Vec<EntityId> = tables
            .pets
            .values()
            .filter(|pet| pet.owner == id)
            .map(|pet| pet.id)
            .collect();
        for pet in pets {
            tables.remove_pet(pet);
        }
        Ok(true)
    }

    async fn list_vets(&self, filter: &VetFilter) -> ClinicResult<Vec<Vet>> {
        let tables = self.tables.read().await;
        Ok(tables
            .vets
            .values()
            .filter(|vet| filter.matches(vet))
            .cloned()
            .collect())
    }

    async fn get_vet(&self, id: EntityId) -> ClinicResult<Option<Vet>> {
        Ok(self.tables.read().await.vets.get(&id).cloned())
    }

    async fn insert_vet(&self, vet: NewVet) -> ClinicResult<Vet> {
        let mut tables = self.tables.write().await;
        tables.ensure_unique(EntityKind::Vet, &vet.contact.email, None)?;
        tables.ensure_reference("specialty", EntityKind::Specialty, vet.specialty)?;
        let vet = vet.into_vet(tables.next_id(EntityKind::Vet));
        tables.vets.insert(vet.id, vet.clone());
        Ok(vet)
    }

    async fn update_vet(&self, vet: Vet) -> ClinicResult<Vet> {
        let mut tables = self.tables.write().await;
        if !tables.vets.contains_key(&vet.id) {
            return Err(ClinicError::not_found(EntityKind::Vet, vet.id));
        }
        tables.ensure_unique(EntityKind::Vet, &vet.contact.email, Some(vet.id))?;
        tables.ensure_reference("specialty", EntityKind::Specialty, vet.specialty)?;
        tables.vets.insert(vet.id, vet.clone());
        Ok(vet)
    }

    async fn delete_vet(&self, id: EntityId) -> ClinicResult<bool> {
        Ok(self.tables.write().await.vets.remove(&id).is_some())
    }

    async fn list_pet_types(&self) -> ClinicResult<Vec<PetType>> {
        Ok(self.tables.read().await.pet_types.values().cloned().collect())
    }

    async fn get_pet_type(&self, id: EntityId) -> ClinicResult<Option<PetType>> {
        Ok(self.tables.read().await.pet_types.get(&id).cloned())
    }

    async fn insert_pet_type(&self, entry: NamedEntry) -> ClinicResult<PetType> {
        let mut tables = self.tables.write().await;
        tables.ensure_unique(EntityKind::PetType, &entry.name, None)?;
        let pet_type = entry.into_pet_type(tables.next_id(EntityKind::PetType));
        tables.pet_types.insert(pet_type.id, pet_type.clone());
        Ok(pet_type)
    }

    async fn update_pet_type(&self, pet_type: PetType) -> ClinicResult<PetType> {
        let mut tables = self.tables.write().await;
        if !tables.pet_types.contains_key(&pet_type.id) {
            return Err(ClinicError::not_found(EntityKind::PetType, pet_type.id));
        }
        tables.ensure_unique(EntityKind::PetType, &pet_type.name, Some(pet_type.id))?;
        tables.pet_types.insert(pet_type.id, pet_type.clone());
        Ok(pet_type)
    }

    async fn delete_pet_type(&self, id: EntityId) -> ClinicResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.pet_types.remove(&id).is_none() {
            return Ok(false);
        }
        for pet in tables.pets.values_mut() {
            if pet.pet_type == Some(id) {
                pet.pet_type = None;
            }
        }
        Ok(true)
    }

    async fn list_specialties(&self) -> ClinicResult<Vec<Specialty>> {
        Ok(self.tables.read().await.specialties.values().cloned().collect())
    }

    async fn get_specialty(&self, id: EntityId) -> ClinicResult<Option<Specialty>> {
        Ok(self.tables.read().await.specialties.get(&id).cloned())
    }

    async fn insert_specialty(&self, entry: NamedEntry) -> ClinicResult<Specialty> {
        let mut tables = self.tables.write().await;
        tables.ensure_unique(EntityKind::Specialty, &entry.name, None)?;
        let specialty = entry.into_specialty(tables.next_id(EntityKind::Specialty));
        tables.specialties.insert(specialty.id, specialty.clone());
        Ok(specialty)
    }

    async fn update_specialty(&self, specialty: Specialty) -> ClinicResult<Specialty> {
        let mut tables = self.tables.write().await;
        if !tables.specialties.contains_key(&specialty.id) {
            return Err(ClinicError::not_found(EntityKind::Specialty, specialty.id));
        }
        tables.ensure_unique(EntityKind::Specialty, &specialty.name, Some(specialty.id))?;
        tables.specialties.insert(specialty.id, specialty.clone());
        Ok(specialty)
    }

    async fn delete_specialty(&self, id: EntityId) -> ClinicResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.specialties.remove(&id).is_none() {
            return Ok(false);
        }
        for vet in tables.vets.values_mut() {
            if vet.specialty == Some(id) {
                vet.specialty = None;
            }
        }
        Ok(true)
    }

    async fn list_pets(&self, owner: Option<EntityId>) -> ClinicResult<Vec<Pet>> {
        let tables = self.tables.read().await;
        Ok(tables
            .pets
            .values()
            .filter(|pet| owner.map_or(true, |owner| pet.owner == owner))
            .cloned()
            .collect())
    }

    async fn get_pet(&self, id: EntityId) -> ClinicResult<Option<Pet>> {
        Ok(self.tables.read().await.pets.get(&id).cloned())
    }

    async fn insert_pets(&self, pets: Vec<NewPet>) -> ClinicResult<Vec<Pet>> {
        let mut tables = self.tables.write().await;
        for pet in &pets {
            tables.ensure_pet(pet)?;
        }
        let mut stored = Vec::with_capacity(pets.len());
        for pet in pets {
            let pet = pet.into_pet(tables.next_id(EntityKind::Pet));
            tables.pets.insert(pet.id, pet.clone());
            stored.push(pet);
        }
        Ok(stored)
    }

    async fn update_pet(&self, pet: Pet) -> ClinicResult<Pet> {
        let mut tables = self.tables.write().await;
        if !tables.pets.contains_key(&pet.id) {
            return Err(ClinicError::not_found(EntityKind::Pet, pet.id));
        }
        tables.ensure_reference("owner", EntityKind::Owner, Some(pet.owner))?;
        tables.ensure_reference("pet_type", EntityKind::PetType, pet.pet_type)?;
        tables.pets.insert(pet.id, pet.clone());
        Ok(pet)
    }

    async fn delete_pet(&self, id: EntityId) -> ClinicResult<bool> {
        Ok(self.tables.write().await.remove_pet(id))
    }

    async fn list_visits(&self, pet: Option<EntityId>) -> ClinicResult<Vec<Visit>> {
        let tables = self.tables.read().await;
        Ok(tables
            .visits
            .values()
            .filter(|visit| pet.map_or(true, |pet| visit.pet == pet))
            .cloned()
            .collect())
    }

    async fn get_visit(&self, id: EntityId) -> ClinicResult<Option<Visit>> {
        Ok(self.tables.read().await.visits.get(&id).cloned())
    }

    async fn insert_visits(&self, visits: Vec<NewVisit>) -> ClinicResult<Vec<Visit>> {
        let mut tables = self.tables.write().await;
        for visit in &visits {
            tables.ensure_reference("pet", EntityKind::Pet, Some(visit.pet))?;
        }
        let mut stored = Vec::with_capacity(visits.len());
        for visit in visits {
            let visit = visit.into_visit(tables.next_id(EntityKind::Visit));
            tables.visits.insert(visit.id, visit.clone());
            stored.push(visit);
        }
        Ok(stored)
    }

    async fn update_visit(&self, visit: Visit) -> ClinicResult<Visit> {
        let mut tables = self.tables.write().await;
        if !tables.visits.contains_key(&visit.id) {
            return Err(ClinicError::not_found(EntityKind::Visit, visit.id));
        }
        tables.ensure_reference("pet", EntityKind::Pet, Some(visit.pet))?;
        tables.visits.insert(visit.id, visit.clone());
        Ok(visit)
    }

    async fn delete_visit(&self, id: EntityId) -> ClinicResult<bool> {
        Ok(self.tables.write().await.visits.remove(&id).is_some())
    }

    async fn exists(&self, kind: EntityKind, id: EntityId) -> ClinicResult<bool> {
        Ok(self.tables.read().await.contains(kind, id))
    }

    async fn is_taken(
        &self,
        kind: EntityKind,
        value: &str,
        exclude: Option<EntityId>,
    ) -> ClinicResult<bool> {
        Ok(self.tables.read().await.is_taken(kind, value, exclude))
    }

    async fn health_check(&self) -> ClinicResult<bool> {
        Ok(true)
    }

    async fn get_stats(&self) -> ClinicResult<StorageStats> {
        let tables = self.tables.read().await;
        Ok(StorageStats {
            owners: tables.owners.len() as u64,
            pets: tables.pets.len() as u64,
            pet_types: tables.pet_types.len() as u64,
            vets: tables.vets.len() as u64,
            specialties: tables.specialties.len() as u64,
            visits: tables.visits.len() as u64,
        })
    }

    async fn shutdown(&self) -> ClinicResult<()> {
        Ok(())
    }
}
