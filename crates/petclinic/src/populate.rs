//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Sample data for development work
//!
//! The populator wipes the store and fills it with the standard lookup
//! tables plus randomly generated vets, owners, pets and visits. All
//! randomness comes from the generator handed in, so a fixed seed gives
//! the same data every run.

use chrono::{Duration, NaiveDate, SubsecRound, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use crate::error::{ClinicError, ClinicResult};
use crate::model::{
    Contact, EntityId, NamedEntry, NewOwner, NewPet, NewVet, NewVisit, OwnerFilter, VetFilter,
};
use crate::storage::ClinicStore;

/// Standard pet types. Duplicates are created once.
pub const PET_TYPES: [&str; 16] = [
    "bird", "cat", "dog", "fish", "hamster", "horse", "iguana", "lizard", "mouse", "pig",
    "rabbit", "rat", "snake", "snake", "tortoise", "turtle",
];

/// Standard specialties
pub const SPECIALTIES: [&str; 7] = [
    "dentistry",
    "dermatology",
    "emergency",
    "imaging",
    "radiology",
    "surgery",
    "vision",
];

const FIRST_NAMES: &[&str] = &[
    "Alex", "Betty", "Carlos", "Dana", "Eduardo", "Fatima", "George", "Harold", "Imani",
    "Jean", "Kenji", "Linda", "Maria", "Nadia", "Omar", "Peter", "Quinn", "Rafael", "Sharon",
    "Tomas", "Uma", "Victor", "Wendy", "Yusuf",
];

const LAST_NAMES: &[&str] = &[
    "Black", "Carter", "Coleman", "Davis", "Douglas", "Escobito", "Estaban", "Franklin",
    "Jenkins", "Leary", "McTavish", "Nakamura", "Okafor", "Ortega", "Rodriquez", "Schroeder",
    "Stevens", "Wu",
];

const STREETS: &[&str] = &[
    "Cardinal Ave.", "Commerce St.", "Lake St.", "Main St.", "Maple St.", "Oak Dr.",
    "Pine Rd.", "Seminole Trl.", "Washington Blvd.", "Willow Way",
];

const PLACES: &[(&str, &str)] = &[
    ("Austin", "TX"),
    ("Boise", "ID"),
    ("Denver", "CO"),
    ("Madison", "WI"),
    ("McFarland", "WI"),
    ("Monona", "WI"),
    ("Portland", "OR"),
    ("Sacramento", "CA"),
    ("San Diego", "CA"),
    ("Sun Prairie", "WI"),
    ("Tucson", "AZ"),
    ("Waunakee", "WI"),
];

const PET_NAMES: &[&str] = &[
    "Basil", "Biscuit", "Freddy", "George", "Iggy", "Jewel", "Leo", "Lucky", "Max", "Mulligan",
    "Pepper", "Rosy", "Samantha", "Sly", "Tiger",
];

const VISIT_REASONS: &[&str] = &[
    "annual checkup",
    "dental cleaning",
    "neutered",
    "rabies shot",
    "skin rash",
    "spayed",
    "x-ray",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.net", "example.org"];

/// How much data to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulateOptions {
    pub owners: usize,
    pub vets: usize,
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self {
            owners: 100,
            vets: 50,
        }
    }
}

/// Record counts written by a populate run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulateSummary {
    pub pet_types: usize,
    pub specialties: usize,
    pub vets: usize,
    pub owners: usize,
    pub pets: usize,
    pub visits: usize,
}

/// Sample data generator over a store
pub struct Populator<R: Rng> {
    store: Arc<dyn ClinicStore>,
    rng: R,
    contacts: usize,
}

impl<R: Rng> Populator<R> {
    pub fn new(store: Arc<dyn ClinicStore>, rng: R) -> Self {
        Self {
            store,
            rng,
            contacts: 0,
        }
    }

    /// Replace the store contents with fresh sample data
    pub async fn run(&mut self, options: PopulateOptions) -> ClinicResult<PopulateSummary> {
        info!(owners = options.owners, vets = options.vets, "Populating store");
        self.clear().await?;

        let mut summary = PopulateSummary::default();
        let pet_types = self.create_pet_types().await?;
        let specialties = self.create_specialties().await?;
        summary.pet_types = pet_types.len();
        summary.specialties = specialties.len();

        for _ in 0..options.vets {
            let specialty = specialties.choose(&mut self.rng).copied();
            let contact = self.contact();
            self.store.insert_vet(NewVet { contact, specialty }).await?;
            summary.vets += 1;
        }

        let today = Utc::now().date_naive();
        for _ in 0..options.owners {
            let contact = self.contact();
            let owner = self.store.insert_owner(NewOwner { contact }).await?;
            summary.owners += 1;

            let pets = (0..self.rng.gen_range(1..=3))
                .map(|_| self.pet(owner.id, &pet_types, today))
                .collect::<Vec<_>>();
            let pets = self.store.insert_pets(pets).await?;
            summary.pets += pets.len();

            let mut visits = Vec::new();
            for pet in &pets {
                for _ in 0..self.rng.gen_range(0..=2) {
                    visits.push(self.visit(pet.id, pet.birth_date, today));
                }
            }
            summary.visits += self.store.insert_visits(visits).await?.len();
        }

        info!(
            pet_types = summary.pet_types,
            specialties = summary.specialties,
            vets = summary.vets,
            owners = summary.owners,
            pets = summary.pets,
            visits = summary.visits,
            "Store populated"
        );
        Ok(summary)
    }

    /// Remove every record. Owner deletes cascade to pets and visits.
    async fn clear(&self) -> ClinicResult<()> {
        for owner in self.store.list_owners(&OwnerFilter::default()).await? {
            self.store.delete_owner(owner.id).await?;
        }
        for vet in self.store.list_vets(&VetFilter::default()).await? {
            self.store.delete_vet(vet.id).await?;
        }
        for pet_type in self.store.list_pet_types().await? {
            self.store.delete_pet_type(pet_type.id).await?;
        }
        for specialty in self.store.list_specialties().await? {
            self.store.delete_specialty(specialty.id).await?;
        }
        Ok(())
    }

    async fn create_pet_types(&self) -> ClinicResult<Vec<EntityId>> {
        let names: BTreeSet<&str> = PET_TYPES.into_iter().collect();
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            ids.push(self.store.insert_pet_type(NamedEntry::new(name)).await?.id);
        }
        Ok(ids)
    }

    async fn create_specialties(&self) -> ClinicResult<Vec<EntityId>> {
        let mut ids = Vec::with_capacity(SPECIALTIES.len());
        for name in SPECIALTIES {
            ids.push(self.store.insert_specialty(NamedEntry::new(name)).await?.id);
        }
        Ok(ids)
    }

    fn pick(&mut self, values: &[&'static str]) -> &'static str {
        values.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn contact(&mut self) -> Contact {
        // The running counter keeps emails unique across owners and vets
        self.contacts += 1;
        let first_name = self.pick(FIRST_NAMES);
        let last_name = self.pick(LAST_NAMES);
        let domain = self.pick(EMAIL_DOMAINS);
        let (city, state) = PLACES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(("Madison", "WI"));
        let street = self.pick(STREETS);

        Contact {
            email: format!(
                "{}.{}{}@{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                self.contacts,
                domain
            ),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            street_address: format!("{} {}", self.rng.gen_range(1..=9999), street),
            city: city.to_string(),
            state: state.to_string(),
            telephone: format!(
                "{:03}555{:04}",
                self.rng.gen_range(200..1000),
                self.rng.gen_range(0..10000)
            ),
        }
    }

    fn pet(&mut self, owner: EntityId, pet_types: &[EntityId], today: NaiveDate) -> NewPet {
        let age_days = self.rng.gen_range(30..=15 * 365);
        NewPet {
            name: self.pick(PET_NAMES).to_string(),
            birth_date: today - Duration::days(age_days),
            owner,
            pet_type: pet_types.choose(&mut self.rng).copied(),
        }
    }

    fn visit(&mut self, pet: EntityId, birth_date: NaiveDate, today: NaiveDate) -> NewVisit {
        let age_days = (today - birth_date).num_days().max(0);
        let visit_date = Utc::now() - Duration::days(self.rng.gen_range(0..=age_days));
        NewVisit {
            visit_date: visit_date.trunc_subsecs(6),
            description: self.pick(VISIT_REASONS).to_string(),
            pet,
        }
    }
}

/// Seed for a populate run without an explicit one
pub fn time_seed() -> ClinicResult<u64> {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .ok_or_else(|| ClinicError::internal("System clock out of range for a seed"))?;
    u64::try_from(nanos)
        .map_err(|e| ClinicError::internal(&format!("System clock before epoch: {}", e)))
}
