//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Request payloads
//!
//! Each payload holds the fields a request supplied, already type- and
//! length-checked by [`FieldReader`]. A field the request left out stays
//! `None`; on update that means "keep the stored value".

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{ClinicError, ClinicResult};
use crate::model::{
    Contact, EntityId, EntityKind, NamedEntry, NewOwner, NewPet, NewVet, NewVisit, Owner, Pet,
    PetType, Specialty, Vet, Visit,
};
use crate::validation::{EntityValidator, FieldErrors, FieldReader, TextRule};

fn required<T>(value: Option<T>, field: &str) -> ClinicResult<T> {
    value.ok_or_else(|| ClinicError::internal(&format!("{} missing from a validated payload", field)))
}

fn assign<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Contact fields shared by owners and vets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPayload {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub telephone: Option<String>,
}

impl ContactPayload {
    pub fn read(reader: &mut FieldReader<'_>) -> Self {
        Self {
            email: reader.email("email", Contact::EMAIL_MAX_LEN),
            first_name: reader.text("first_name", TextRule::required(Contact::NAME_MAX_LEN)),
            last_name: reader.text("last_name", TextRule::required(Contact::NAME_MAX_LEN)),
            street_address: reader.text(
                "street_address",
                TextRule::optional(Contact::STREET_ADDRESS_MAX_LEN),
            ),
            city: reader.text("city", TextRule::optional(Contact::CITY_MAX_LEN)),
            state: reader.text("state", TextRule::optional(Contact::STATE_MAX_LEN)),
            telephone: reader.text("telephone", TextRule::optional(Contact::TELEPHONE_MAX_LEN)),
        }
    }

    fn into_contact(self) -> ClinicResult<Contact> {
        Ok(Contact {
            email: required(self.email, "email")?,
            first_name: required(self.first_name, "first_name")?,
            last_name: required(self.last_name, "last_name")?,
            street_address: self.street_address.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            telephone: self.telephone.unwrap_or_default(),
        })
    }

    fn apply(self, contact: &mut Contact) {
        assign(&mut contact.email, self.email);
        assign(&mut contact.first_name, self.first_name);
        assign(&mut contact.last_name, self.last_name);
        assign(&mut contact.street_address, self.street_address);
        assign(&mut contact.city, self.city);
        assign(&mut contact.state, self.state);
        assign(&mut contact.telephone, self.telephone);
    }
}

/// Owner write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerPayload {
    pub contact: ContactPayload,
}

impl OwnerPayload {
    pub fn read(reader: &mut FieldReader<'_>) -> Self {
        Self {
            contact: ContactPayload::read(reader),
        }
    }

    pub async fn validate(
        &self,
        validator: &EntityValidator,
        current: Option<EntityId>,
        errors: &mut FieldErrors,
    ) -> ClinicResult<()> {
        validator
            .check_unique(EntityKind::Owner, self.contact.email.as_deref(), current, errors)
            .await
    }

    pub fn into_new(self) -> ClinicResult<NewOwner> {
        Ok(NewOwner {
            contact: self.contact.into_contact()?,
        })
    }

    pub fn apply(self, owner: &mut Owner) {
        self.contact.apply(&mut owner.contact);
    }
}

/// Vet write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VetPayload {
    pub contact: ContactPayload,
    /// `Some(None)` clears the specialty
    pub specialty: Option<Option<EntityId>>,
}

impl VetPayload {
    pub fn read(reader: &mut FieldReader<'_>) -> Self {
        Self {
            contact: ContactPayload::read(reader),
            specialty: reader.reference("specialty", false, true),
        }
    }

    pub async fn validate(
        &self,
        validator: &EntityValidator,
        current: Option<EntityId>,
        errors: &mut FieldErrors,
    ) -> ClinicResult<()> {
        validator
            .check_unique(EntityKind::Vet, self.contact.email.as_deref(), current, errors)
            .await?;
        validator
            .check_reference("specialty", EntityKind::Specialty, self.specialty.flatten(), errors)
            .await
    }

    pub fn into_new(self) -> ClinicResult<NewVet> {
        Ok(NewVet {
            contact: self.contact.into_contact()?,
            specialty: self.specialty.flatten(),
        })
    }

    pub fn apply(self, vet: &mut Vet) {
        self.contact.apply(&mut vet.contact);
        assign(&mut vet.specialty, self.specialty);
    }
}

/// Pet type or specialty write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPayload {
    kind: EntityKind,
    pub name: Option<String>,
}

impl NamedPayload {
    pub fn read(reader: &mut FieldReader<'_>, kind: EntityKind) -> Self {
        let max_len = match kind {
            EntityKind::Specialty => Specialty::NAME_MAX_LEN,
            _ => PetType::NAME_MAX_LEN,
        };
        Self {
            kind,
            name: reader.text("name", TextRule::required(max_len)),
        }
    }

    pub async fn validate(
        &self,
        validator: &EntityValidator,
        current: Option<EntityId>,
        errors: &mut FieldErrors,
    ) -> ClinicResult<()> {
        validator
            .check_unique(self.kind, self.name.as_deref(), current, errors)
            .await
    }

    pub fn into_entry(self) -> ClinicResult<NamedEntry> {
        Ok(NamedEntry::new(required(self.name, "name")?))
    }

    pub fn apply(self, name: &mut String) {
        assign(name, self.name);
    }
}

/// Pet write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetPayload {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub owner: Option<EntityId>,
    /// `Some(None)` clears the pet type
    pub pet_type: Option<Option<EntityId>>,
}

impl PetPayload {
    pub fn read(reader: &mut FieldReader<'_>) -> Self {
        let mut payload = Self::read_fields(reader);
        payload.owner = reader.reference("owner", true, false).flatten();
        payload
    }

    /// Read a pet created under `owner`. Any `owner` in the body is ignored.
    pub fn read_for_owner(reader: &mut FieldReader<'_>, owner: EntityId) -> Self {
        let mut payload = Self::read_fields(reader);
        payload.owner = Some(owner);
        payload
    }

    fn read_fields(reader: &mut FieldReader<'_>) -> Self {
        Self {
            name: reader.text("name", TextRule::required(Pet::NAME_MAX_LEN)),
            birth_date: reader.date("birth_date", true),
            owner: None,
            pet_type: reader.reference("pet_type", false, true),
        }
    }

    pub async fn validate(
        &self,
        validator: &EntityValidator,
        errors: &mut FieldErrors,
    ) -> ClinicResult<()> {
        validator
            .check_reference("owner", EntityKind::Owner, self.owner, errors)
            .await?;
        validator
            .check_reference("pet_type", EntityKind::PetType, self.pet_type.flatten(), errors)
            .await
    }

    pub fn into_new(self) -> ClinicResult<NewPet> {
        Ok(NewPet {
            name: required(self.name, "name")?,
            birth_date: required(self.birth_date, "birth_date")?,
            owner: required(self.owner, "owner")?,
            pet_type: self.pet_type.flatten(),
        })
    }

    pub fn apply(self, pet: &mut Pet) {
        assign(&mut pet.name, self.name);
        assign(&mut pet.birth_date, self.birth_date);
        assign(&mut pet.owner, self.owner);
        assign(&mut pet.pet_type, self.pet_type);
    }
}

/// Visit write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitPayload {
    pub visit_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub pet: Option<EntityId>,
}

impl VisitPayload {
    pub fn read(reader: &mut FieldReader<'_>) -> Self {
        let mut payload = Self::read_fields(reader);
        payload.pet = reader.reference("pet", true, false).flatten();
        payload
    }

    /// Read a visit created under `pet`. Any `pet` in the body is ignored.
    pub fn read_for_pet(reader: &mut FieldReader<'_>, pet: EntityId) -> Self {
        let mut payload = Self::read_fields(reader);
        payload.pet = Some(pet);
        payload
    }

    fn read_fields(reader: &mut FieldReader<'_>) -> Self {
        Self {
            visit_date: reader.datetime("visit_date", false),
            description: reader.text(
                "description",
                TextRule::required(Visit::DESCRIPTION_MAX_LEN),
            ),
            pet: None,
        }
    }

    pub async fn validate(
        &self,
        validator: &EntityValidator,
        errors: &mut FieldErrors,
    ) -> ClinicResult<()> {
        validator
            .check_reference("pet", EntityKind::Pet, self.pet, errors)
            .await
    }

    /// `now` stands in for a missing visit date
    pub fn into_new(self, now: DateTime<Utc>) -> ClinicResult<NewVisit> {
        Ok(NewVisit {
            visit_date: self.visit_date.unwrap_or(now),
            description: required(self.description, "description")?,
            pet: required(self.pet, "pet")?,
        })
    }

    pub fn apply(self, visit: &mut Visit) {
        assign(&mut visit.visit_date, self.visit_date);
        assign(&mut visit.description, self.description);
        assign(&mut visit.pet, self.pet);
    }
}
