//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Vet records

use serde::{Deserialize, Serialize};

use super::{Contact, EntityId};

/// Veterinarian, optionally holding one specialty.
///
/// Deleting the referenced specialty clears `specialty` instead of removing
/// the vet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vet {
    pub id: EntityId,
    #[serde(flatten)]
    pub contact: Contact,
    pub specialty: Option<EntityId>,
}

impl Vet {
    pub fn full_name(&self) -> String {
        self.contact.full_name()
    }

    pub fn email(&self) -> &str {
        &self.contact.email
    }
}

/// Validated vet awaiting an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVet {
    pub contact: Contact,
    pub specialty: Option<EntityId>,
}

impl NewVet {
    pub fn into_vet(self, id: EntityId) -> Vet {
        Vet {
            id,
            contact: self.contact,
            specialty: self.specialty,
        }
    }
}

/// Vet list filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VetFilter {
    /// Exact match on `state`
    pub state: Option<String>,
}

impl VetFilter {
    pub fn matches(&self, vet: &Vet) -> bool {
        self.state
            .as_deref()
            .map_or(true, |state| vet.contact.state == state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vet(state: &str) -> Vet {
        Vet {
            id: 1,
            contact: Contact {
                email: "vet@example.com".to_string(),
                first_name: "First".to_string(),
                last_name: "Last".to_string(),
                street_address: "1234 Main St".to_string(),
                city: "San Jose".to_string(),
                state: state.to_string(),
                telephone: "408-555-1212".to_string(),
            },
            specialty: None,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(vet("CA").full_name(), "First Last");
    }

    #[test]
    fn test_state_filter_is_exact() {
        let filter = VetFilter {
            state: Some("TX".to_string()),
        };
        assert!(filter.matches(&vet("TX")));
        assert!(!filter.matches(&vet("tx")));
        assert!(!filter.matches(&vet("CA")));
        assert!(VetFilter::default().matches(&vet("CA")));
    }
}
