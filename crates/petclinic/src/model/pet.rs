//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Pet records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EntityId;

/// Pet. Belongs to exactly one owner and optionally one pet type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: EntityId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub owner: EntityId,
    pub pet_type: Option<EntityId>,
}

impl Pet {
    pub const NAME_MAX_LEN: usize = 30;

    /// Age as `today - birth_date` in whole days
    pub fn age_in_days(&self, today: NaiveDate) -> i64 {
        (today - self.birth_date).num_days()
    }
}

/// Validated pet awaiting an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub birth_date: NaiveDate,
    pub owner: EntityId,
    pub pet_type: Option<EntityId>,
}

impl NewPet {
    pub fn into_pet(self, id: EntityId) -> Pet {
        Pet {
            id,
            name: self.name,
            birth_date: self.birth_date,
            owner: self.owner,
            pet_type: self.pet_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_in_days() {
        let pet = Pet {
            id: 1,
            name: "fido".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
            owner: 1,
            pet_type: None,
        };
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(pet.age_in_days(today), 2);
        assert_eq!(pet.age_in_days(pet.birth_date), 0);
    }
}
