//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Resource operations
//!
//! Every write follows the same path: read fields from the raw body,
//! run the store-backed checks, reject with every collected error or
//! persist and return the stored representation. Lookups of the target
//! record come first, so an unknown id wins over a bad body.

use chrono::{SubsecRound, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ClinicError, ClinicResult};
use crate::metrics::{EntityEvent, MetricsCollector};
use crate::model::{
    EntityId, EntityKind, Owner, OwnerFilter, Pet, PetType, Specialty, Vet, VetFilter, Visit,
};
use crate::serialize::{
    NamedPayload, OwnerPayload, OwnerRepr, PetPayload, PetRepr, RelatedRecords, VetPayload,
    VisitPayload,
};
use crate::storage::ClinicStore;
use crate::validation::{EntityValidator, FieldErrors, FieldReader, WriteMode};

/// Body of a nested create: one object or a list of objects
#[derive(Debug, Clone, Copy)]
pub enum NestedPayload<'a> {
    Single(&'a Value),
    Many(&'a [Value]),
}

impl<'a> NestedPayload<'a> {
    pub fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => NestedPayload::Many(items),
            other => NestedPayload::Single(other),
        }
    }

    pub fn items(&self) -> &'a [Value] {
        match self {
            NestedPayload::Single(value) => std::slice::from_ref(*value),
            NestedPayload::Many(items) => items,
        }
    }
}

/// Resource operations handler
#[derive(Clone)]
pub struct ClinicOperations {
    store: Arc<dyn ClinicStore>,
    validator: EntityValidator,
    metrics: MetricsCollector,
}

impl ClinicOperations {
    /// Create a new operations handler
    pub fn new(store: Arc<dyn ClinicStore>, metrics: MetricsCollector) -> Self {
        Self {
            validator: EntityValidator::new(store.clone()),
            store,
            metrics,
        }
    }

    fn reject(&self, kind: EntityKind, errors: FieldErrors) -> ClinicResult<()> {
        if errors.is_empty() {
            return Ok(());
        }
        debug!(entity = %kind, errors = %errors, "Rejected write");
        self.metrics.record_validation_failure(kind, errors.len());
        Err(ClinicError::Validation(errors))
    }

    fn reject_batch(
        &self,
        kind: EntityKind,
        batch: NestedPayload<'_>,
        reports: Vec<FieldErrors>,
    ) -> ClinicResult<()> {
        if reports.iter().all(FieldErrors::is_empty) {
            return Ok(());
        }
        let fields = reports.iter().map(FieldErrors::len).sum();
        debug!(entity = %kind, items = reports.len(), "Rejected batch write");
        self.metrics.record_validation_failure(kind, fields);
        match batch {
            NestedPayload::Single(_) => Err(ClinicError::Validation(
                reports.into_iter().next().unwrap_or_default(),
            )),
            NestedPayload::Many(_) => Err(ClinicError::BatchValidation(reports)),
        }
    }

    fn record(&self, kind: EntityKind, event: EntityEvent, count: usize) {
        self.metrics.record_entity_event(kind, event, count);
    }

    async fn visits_of(&self, pets: &[Pet]) -> ClinicResult<Vec<Visit>> {
        let mut visits = Vec::new();
        for pet in pets {
            visits.extend(self.store.list_visits(Some(pet.id)).await?);
        }
        Ok(visits)
    }

    async fn owner_repr(&self, owner: Owner) -> ClinicResult<OwnerRepr> {
        let pets = self.store.list_pets(Some(owner.id)).await?;
        let visits = self.visits_of(&pets).await?;
        Ok(RelatedRecords::new(pets, visits).owner(owner))
    }

    async fn pet_repr(&self, pet: Pet) -> ClinicResult<PetRepr> {
        let visits = self.store.list_visits(Some(pet.id)).await?;
        Ok(PetRepr::new(pet, visits))
    }

    async fn find_owner(&self, id: EntityId) -> ClinicResult<Owner> {
        self.store
            .get_owner(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(EntityKind::Owner, id))
    }

    async fn find_vet(&self, id: EntityId) -> ClinicResult<Vet> {
        self.store
            .get_vet(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(EntityKind::Vet, id))
    }

    async fn find_pet_type(&self, id: EntityId) -> ClinicResult<PetType> {
        self.store
            .get_pet_type(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(EntityKind::PetType, id))
    }

    async fn find_specialty(&self, id: EntityId) -> ClinicResult<Specialty> {
        self.store
            .get_specialty(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(EntityKind::Specialty, id))
    }

    async fn find_pet(&self, id: EntityId) -> ClinicResult<Pet> {
        self.store
            .get_pet(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(EntityKind::Pet, id))
    }

    async fn find_visit(&self, id: EntityId) -> ClinicResult<Visit> {
        self.store
            .get_visit(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(EntityKind::Visit, id))
    }

    // Owners

    pub async fn list_owners(&self, filter: &OwnerFilter) -> ClinicResult<Vec<OwnerRepr>> {
        let owners = self.store.list_owners(filter).await?;
        let pets = self.store.list_pets(None).await?;
        let visits = self.store.list_visits(None).await?;
        let mut related = RelatedRecords::new(pets, visits);
        Ok(owners.into_iter().map(|owner| related.owner(owner)).collect())
    }

    pub async fn create_owner(&self, body: &Value) -> ClinicResult<OwnerRepr> {
        let mut reader = FieldReader::new(body, WriteMode::Create);
        let payload = OwnerPayload::read(&mut reader);
        let mut errors = reader.finish();
        payload.validate(&self.validator, None, &mut errors).await?;
        self.reject(EntityKind::Owner, errors)?;

        let owner = self.store.insert_owner(payload.into_new()?).await?;
        self.record(EntityKind::Owner, EntityEvent::Created, 1);
        info!(owner_id = owner.id, "Created owner");
        Ok(RelatedRecords::default().owner(owner))
    }

    pub async fn get_owner(&self, id: EntityId) -> ClinicResult<OwnerRepr> {
        let owner = self.find_owner(id).await?;
        self.owner_repr(owner).await
    }

    pub async fn update_owner(&self, id: EntityId, body: &Value) -> ClinicResult<OwnerRepr> {
        let mut owner = self.find_owner(id).await?;

        let mut reader = FieldReader::new(body, WriteMode::Update);
        let payload = OwnerPayload::read(&mut reader);
        let mut errors = reader.finish();
        payload.validate(&self.validator, Some(id), &mut errors).await?;
        self.reject(EntityKind::Owner, errors)?;

        payload.apply(&mut owner);
        let owner = self.store.update_owner(owner).await?;
        self.record(EntityKind::Owner, EntityEvent::Updated, 1);
        info!(owner_id = id, "Updated owner");
        self.owner_repr(owner).await
    }

    // Vets

    pub async fn list_vets(&self, filter: &VetFilter) -> ClinicResult<Vec<Vet>> {
        self.store.list_vets(filter).await
    }

    pub async fn create_vet(&self, body: &Value) -> ClinicResult<Vet> {
        let mut reader = FieldReader::new(body, WriteMode::Create);
        let payload = VetPayload::read(&mut reader);
        let mut errors = reader.finish();
        payload.validate(&self.validator, None, &mut errors).await?;
        self.reject(EntityKind::Vet, errors)?;

        let vet = self.store.insert_vet(payload.into_new()?).await?;
        self.record(EntityKind::Vet, EntityEvent::Created, 1);
        info!(vet_id = vet.id, "Created vet");
        Ok(vet)
    }

    pub async fn get_vet(&self, id: EntityId) -> ClinicResult<Vet> {
        self.find_vet(id).await
    }

    pub async fn update_vet(&self, id: EntityId, body: &Value) -> ClinicResult<Vet> {
        let mut vet = self.find_vet(id).await?;

        let mut reader = FieldReader::new(body, WriteMode::Update);
        let payload = VetPayload::read(&mut reader);
        let mut errors = reader.finish();
        payload.validate(&self.validator, Some(id), &mut errors).await?;
        self.reject(EntityKind::Vet, errors)?;

        payload.apply(&mut vet);
        let vet = self.store.update_vet(vet).await?;
        self.record(EntityKind::Vet, EntityEvent::Updated, 1);
        info!(vet_id = id, "Updated vet");
        Ok(vet)
    }

    // Pet types

    pub async fn list_pet_types(&self) -> ClinicResult<Vec<PetType>> {
        self.store.list_pet_types().await
    }

    pub async fn create_pet_type(&self, body: &Value) -> ClinicResult<PetType> {
        let mut reader = FieldReader::new(body, WriteMode::Create);
        let payload = NamedPayload::read(&mut reader, EntityKind::PetType);
        let mut errors = reader.finish();
        payload.validate(&self.validator, None, &mut errors).await?;
        self.reject(EntityKind::PetType, errors)?;

        let pet_type = self.store.insert_pet_type(payload.into_entry()?).await?;
        self.record(EntityKind::PetType, EntityEvent::Created, 1);
        info!(pet_type_id = pet_type.id, name = %pet_type.name, "Created pet type");
        Ok(pet_type)
    }

    pub async fn get_pet_type(&self, id: EntityId) -> ClinicResult<PetType> {
        self.find_pet_type(id).await
    }

    pub async fn update_pet_type(&self, id: EntityId, body: &Value) -> ClinicResult<PetType> {
        let mut pet_type = self.find_pet_type(id).await?;

        let mut reader = FieldReader::new(body, WriteMode::Update);
        let payload = NamedPayload::read(&mut reader, EntityKind::PetType);
        let mut errors = reader.finish();
        payload.validate(&self.validator, Some(id), &mut errors).await?;
        self.reject(EntityKind::PetType, errors)?;

        payload.apply(&mut pet_type.name);
        let pet_type = self.store.update_pet_type(pet_type).await?;
        self.record(EntityKind::PetType, EntityEvent::Updated, 1);
        Ok(pet_type)
    }

    // Specialties

    pub async fn list_specialties(&self) -> ClinicResult<Vec<Specialty>> {
        self.store.list_specialties().await
    }

    pub async fn create_specialty(&self, body: &Value) -> ClinicResult<Specialty> {
        let mut reader = FieldReader::new(body, WriteMode::Create);
        let payload = NamedPayload::read(&mut reader, EntityKind::Specialty);
        let mut errors = reader.finish();
        payload.validate(&self.validator, None, &mut errors).await?;
        self.reject(EntityKind::Specialty, errors)?;

        let specialty = self.store.insert_specialty(payload.into_entry()?).await?;
        self.record(EntityKind::Specialty, EntityEvent::Created, 1);
        info!(specialty_id = specialty.id, name = %specialty.name, "Created specialty");
        Ok(specialty)
    }

    pub async fn get_specialty(&self, id: EntityId) -> ClinicResult<Specialty> {
        self.find_specialty(id).await
    }

    pub async fn update_specialty(&self, id: EntityId, body: &Value) -> ClinicResult<Specialty> {
        let mut specialty = self.find_specialty(id).await?;

        let mut reader = FieldReader::new(body, WriteMode::Update);
        let payload = NamedPayload::read(&mut reader, EntityKind::Specialty);
        let mut errors = reader.finish();
        payload.validate(&self.validator, Some(id), &mut errors).await?;
        self.reject(EntityKind::Specialty, errors)?;

        payload.apply(&mut specialty.name);
        let specialty = self.store.update_specialty(specialty).await?;
        self.record(EntityKind::Specialty, EntityEvent::Updated, 1);
        Ok(specialty)
    }

    // Pets

    pub async fn get_pet(&self, id: EntityId) -> ClinicResult<PetRepr> {
        let pet = self.find_pet(id).await?;
        self.pet_repr(pet).await
    }

    pub async fn update_pet(&self, id: EntityId, body: &Value) -> ClinicResult<PetRepr> {
        let mut pet = self.find_pet(id).await?;

        let mut reader = FieldReader::new(body, WriteMode::Update);
        let payload = PetPayload::read(&mut reader);
        let mut errors = reader.finish();
        payload.validate(&self.validator, &mut errors).await?;
        self.reject(EntityKind::Pet, errors)?;

        payload.apply(&mut pet);
        let pet = self.store.update_pet(pet).await?;
        self.record(EntityKind::Pet, EntityEvent::Updated, 1);
        info!(pet_id = id, "Updated pet");
        self.pet_repr(pet).await
    }

    /// Pets of one owner. An unknown owner simply has none.
    pub async fn list_owner_pets(&self, owner: EntityId) -> ClinicResult<Vec<PetRepr>> {
        let pets = self.store.list_pets(Some(owner)).await?;
        let visits = self.visits_of(&pets).await?;
        let mut related = RelatedRecords::new(Vec::new(), visits);
        Ok(pets.into_iter().map(|pet| related.pet(pet)).collect())
    }

    /// Create one or many pets for `owner`, all or none
    pub async fn create_owner_pets(
        &self,
        owner: EntityId,
        body: &Value,
    ) -> ClinicResult<Vec<PetRepr>> {
        let batch = NestedPayload::from_value(body);
        let mut payloads = Vec::with_capacity(batch.items().len());
        let mut reports = Vec::with_capacity(batch.items().len());

        for item in batch.items() {
            let mut reader = FieldReader::new(item, WriteMode::Create);
            let payload = PetPayload::read_for_owner(&mut reader, owner);
            let mut errors = reader.finish();
            payload.validate(&self.validator, &mut errors).await?;
            payloads.push(payload);
            reports.push(errors);
        }
        self.reject_batch(EntityKind::Pet, batch, reports)?;

        let pets = payloads
            .into_iter()
            .map(PetPayload::into_new)
            .collect::<ClinicResult<Vec<_>>>()?;
        let stored = self.store.insert_pets(pets).await?;
        self.record(EntityKind::Pet, EntityEvent::Created, stored.len());
        info!(owner_id = owner, count = stored.len(), "Created pets");
        Ok(stored
            .into_iter()
            .map(|pet| PetRepr::new(pet, Vec::new()))
            .collect())
    }

    // Visits

    pub async fn get_visit(&self, id: EntityId) -> ClinicResult<Visit> {
        self.find_visit(id).await
    }

    pub async fn update_visit(&self, id: EntityId, body: &Value) -> ClinicResult<Visit> {
        let mut visit = self.find_visit(id).await?;

        let mut reader = FieldReader::new(body, WriteMode::Update);
        let payload = VisitPayload::read(&mut reader);
        let mut errors = reader.finish();
        payload.validate(&self.validator, &mut errors).await?;
        self.reject(EntityKind::Visit, errors)?;

        payload.apply(&mut visit);
        let visit = self.store.update_visit(visit).await?;
        self.record(EntityKind::Visit, EntityEvent::Updated, 1);
        info!(visit_id = id, "Updated visit");
        Ok(visit)
    }

    /// Visits of one pet. An unknown pet simply has none.
    pub async fn list_pet_visits(&self, pet: EntityId) -> ClinicResult<Vec<Visit>> {
        self.store.list_visits(Some(pet)).await
    }

    /// Create one or many visits for `pet`, all or none
    pub async fn create_pet_visits(&self, pet: EntityId, body: &Value) -> ClinicResult<Vec<Visit>> {
        let batch = NestedPayload::from_value(body);
        let mut payloads = Vec::with_capacity(batch.items().len());
        let mut reports = Vec::with_capacity(batch.items().len());

        for item in batch.items() {
            let mut reader = FieldReader::new(item, WriteMode::Create);
            let payload = VisitPayload::read_for_pet(&mut reader, pet);
            let mut errors = reader.finish();
            payload.validate(&self.validator, &mut errors).await?;
            payloads.push(payload);
            reports.push(errors);
        }
        self.reject_batch(EntityKind::Visit, batch, reports)?;

        let now = Utc::now().trunc_subsecs(6);
        let visits = payloads
            .into_iter()
            .map(|payload| payload.into_new(now))
            .collect::<ClinicResult<Vec<_>>>()?;
        let stored = self.store.insert_visits(visits).await?;
        self.record(EntityKind::Visit, EntityEvent::Created, stored.len());
        info!(pet_id = pet, count = stored.len(), "Created visits");
        Ok(stored)
    }

    // Deletes

    /// Delete one record. Pet types and specialties are refused.
    pub async fn delete(&self, kind: EntityKind, id: EntityId) -> ClinicResult<()> {
        let removed = match kind {
            EntityKind::Owner => self.store.delete_owner(id).await?,
            EntityKind::Pet => self.store.delete_pet(id).await?,
            EntityKind::Vet => self.store.delete_vet(id).await?,
            EntityKind::Visit => self.store.delete_visit(id).await?,
            EntityKind::PetType | EntityKind::Specialty => {
                return Err(ClinicError::MethodNotAllowed { kind })
            }
        };
        if !removed {
            return Err(ClinicError::not_found(kind, id));
        }
        self.record(kind, EntityEvent::Deleted, 1);
        info!(entity = %kind, id, "Deleted record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn operations() -> ClinicOperations {
        ClinicOperations::new(Arc::new(MemoryStore::new()), MetricsCollector::new(false))
    }

    fn owner_body(email: &str, state: &str) -> Value {
        json!({
            "email": email,
            "first_name": "Betty",
            "last_name": "Davis",
            "street_address": "638 Cardinal Ave.",
            "city": "Sun Prairie",
            "state": state,
            "telephone": "6085551749",
        })
    }

    #[tokio::test]
    async fn test_duplicate_email_names_field() {
        let ops = operations();
        ops.create_owner(&owner_body("betty@example.com", "WI"))
            .await
            .unwrap();

        match ops.create_owner(&owner_body("betty@example.com", "CA")).await {
            Err(ClinicError::Validation(errors)) => assert_eq!(
                errors.get("email").unwrap(),
                ["owner with this email already exists.".to_string()]
            ),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_keeps_own_email() {
        let ops = operations();
        let owner = ops
            .create_owner(&owner_body("betty@example.com", "WI"))
            .await
            .unwrap();

        let updated = ops
            .update_owner(owner.id, &json!({"email": "betty@example.com", "city": "Madison"}))
            .await
            .unwrap();
        assert_eq!(updated.contact.city, "Madison");
        assert_eq!(updated.contact.first_name, "Betty");
    }

    #[tokio::test]
    async fn test_unknown_id_beats_bad_body() {
        let ops = operations();
        let result = ops.update_owner(12, &json!({"email": "nope"})).await;
        assert!(matches!(result, Err(ClinicError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_nested_pet_create_list_payload() {
        let ops = operations();
        let owner = ops
            .create_owner(&owner_body("betty@example.com", "WI"))
            .await
            .unwrap();

        let pets = ops
            .create_owner_pets(
                owner.id,
                &json!([
                    {"name": "Basil", "birth_date": "2012-08-06", "owner": 999},
                    {"name": "Lucky", "birth_date": "2011-08-06"},
                ]),
            )
            .await
            .unwrap();
        assert_eq!(pets.len(), 2);
        assert!(pets.iter().all(|pet| pet.owner == owner.id));

        let fetched = ops.get_owner(owner.id).await.unwrap();
        assert_eq!(fetched.pets.len(), 2);
    }

    #[tokio::test]
    async fn test_nested_create_reports_per_item() {
        let ops = operations();
        let owner = ops
            .create_owner(&owner_body("betty@example.com", "WI"))
            .await
            .unwrap();

        let result = ops
            .create_owner_pets(
                owner.id,
                &json!([
                    {"name": "Basil", "birth_date": "2012-08-06"},
                    {"name": "Lucky", "birth_date": "someday"},
                ]),
            )
            .await;
        match result {
            Err(ClinicError::BatchValidation(reports)) => {
                assert_eq!(reports.len(), 2);
                assert!(reports[0].is_empty());
                assert!(reports[1].has("birth_date"));
            }
            other => panic!("expected a batch validation error, got {:?}", other),
        }
        assert!(ops.list_owner_pets(owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nested_create_for_unknown_parent() {
        let ops = operations();
        let result = ops
            .create_pet_visits(5, &json!({"description": "checkup"}))
            .await;
        match result {
            Err(ClinicError::Validation(errors)) => assert_eq!(
                errors.get("pet").unwrap()[0],
                "Invalid pk \"5\" - object does not exist."
            ),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_deletes_refused() {
        let ops = operations();
        let pet_type = ops.create_pet_type(&json!({"name": "dog"})).await.unwrap();
        assert!(matches!(
            ops.delete(EntityKind::PetType, pet_type.id).await,
            Err(ClinicError::MethodNotAllowed { .. })
        ));
        assert!(matches!(
            ops.delete(EntityKind::Specialty, 1).await,
            Err(ClinicError::MethodNotAllowed { .. })
        ));
        assert_eq!(ops.list_pet_types().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let ops = operations();
        assert!(matches!(
            ops.delete(EntityKind::Visit, 3).await,
            Err(ClinicError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_visit_defaults_to_now() {
        let ops = operations();
        let owner = ops
            .create_owner(&owner_body("betty@example.com", "WI"))
            .await
            .unwrap();
        let pet = ops
            .create_owner_pets(owner.id, &json!({"name": "Basil", "birth_date": "2012-08-06"}))
            .await
            .unwrap()
            .remove(0);

        let before = Utc::now().trunc_subsecs(6);
        let visit = ops
            .create_pet_visits(pet.id, &json!({"description": "neutered"}))
            .await
            .unwrap()
            .remove(0);
        assert!(visit.visit_date >= before);
        assert_eq!(visit.visit_date.timestamp_subsec_nanos() % 1000, 0);

        let pet = ops.get_pet(pet.id).await.unwrap();
        assert_eq!(pet.visits, vec![visit]);
    }
}
