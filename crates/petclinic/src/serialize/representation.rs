//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Response bodies

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{Contact, EntityId, Owner, Pet, Visit};

/// Pet with its visits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetRepr {
    pub id: EntityId,
    pub name: String,
    pub pet_type: Option<EntityId>,
    pub visits: Vec<Visit>,
    pub birth_date: NaiveDate,
    pub owner: EntityId,
}

impl PetRepr {
    pub fn new(pet: Pet, visits: Vec<Visit>) -> Self {
        Self {
            id: pet.id,
            name: pet.name,
            pet_type: pet.pet_type,
            visits,
            birth_date: pet.birth_date,
            owner: pet.owner,
        }
    }
}

/// Owner with its pets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRepr {
    pub id: EntityId,
    #[serde(flatten)]
    pub contact: Contact,
    pub pets: Vec<PetRepr>,
}

/// Pets and visits grouped by parent, for assembling nested bodies
#[derive(Debug, Default)]
pub struct RelatedRecords {
    pets_by_owner: BTreeMap<EntityId, Vec<Pet>>,
    visits_by_pet: BTreeMap<EntityId, Vec<Visit>>,
}

impl RelatedRecords {
    /// Group records. Input order is kept within each group.
    pub fn new(pets: Vec<Pet>, visits: Vec<Visit>) -> Self {
        let mut related = Self::default();
        for pet in pets {
            related.pets_by_owner.entry(pet.owner).or_default().push(pet);
        }
        for visit in visits {
            related.visits_by_pet.entry(visit.pet).or_default().push(visit);
        }
        related
    }

    pub fn pet(&mut self, pet: Pet) -> PetRepr {
        let visits = self.visits_by_pet.remove(&pet.id).unwrap_or_default();
        PetRepr::new(pet, visits)
    }

    pub fn owner(&mut self, owner: Owner) -> OwnerRepr {
        let pets = self
            .pets_by_owner
            .remove(&owner.id)
            .unwrap_or_default()
            .into_iter()
            .map(|pet| self.pet(pet))
            .collect();
        OwnerRepr {
            id: owner.id,
            contact: owner.contact,
            pets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn owner(id: EntityId) -> Owner {
        Owner {
            id,
            contact: Contact {
                email: format!("owner{}@example.com", id),
                first_name: "George".to_string(),
                last_name: "Franklin".to_string(),
                street_address: "110 W. Liberty St.".to_string(),
                city: "Madison".to_string(),
                state: "WI".to_string(),
                telephone: "6085551023".to_string(),
            },
        }
    }

    fn pet(id: EntityId, owner: EntityId) -> Pet {
        Pet {
            id,
            name: format!("pet{}", id),
            birth_date: NaiveDate::from_ymd_opt(2010, 9, 7).unwrap(),
            owner,
            pet_type: Some(1),
        }
    }

    #[test]
    fn test_owner_embeds_pets_and_visits() {
        let visit = Visit {
            id: 5,
            visit_date: Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
            description: "rabies shot".to_string(),
            pet: 2,
        };
        let mut related = RelatedRecords::new(vec![pet(2, 1), pet(3, 2)], vec![visit]);

        let repr = related.owner(owner(1));
        let value = serde_json::to_value(&repr).unwrap();
        assert_eq!(value["email"], "owner1@example.com");
        assert_eq!(value["state"], "WI");
        assert_eq!(
            value["pets"],
            json!([{
                "id": 2,
                "name": "pet2",
                "pet_type": 1,
                "visits": [{
                    "id": 5,
                    "visit_date": "2024-03-04T10:00:00Z",
                    "description": "rabies shot",
                    "pet": 2,
                }],
                "birth_date": "2010-09-07",
                "owner": 1,
            }])
        );

        let other = related.owner(owner(2));
        assert_eq!(other.pets.len(), 1);
        assert!(other.pets[0].visits.is_empty());
    }

    #[test]
    fn test_owner_without_pets() {
        let mut related = RelatedRecords::default();
        let value = serde_json::to_value(related.owner(owner(7))).unwrap();
        assert_eq!(value["pets"], json!([]));
        assert!(value.get("full_name").is_none());
    }
}
