//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Owner records

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Contact, EntityId};

/// Pet owner. Owns zero or more pets, which are deleted with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: EntityId,
    #[serde(flatten)]
    pub contact: Contact,
}

impl Owner {
    pub fn full_name(&self) -> String {
        self.contact.full_name()
    }

    pub fn email(&self) -> &str {
        &self.contact.email
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.contact.email)
    }
}

/// Validated owner awaiting an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOwner {
    pub contact: Contact,
}

impl NewOwner {
    pub fn into_owner(self, id: EntityId) -> Owner {
        Owner {
            id,
            contact: self.contact,
        }
    }
}

/// Owner list filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OwnerFilter {
    /// Exact match on `state`
    pub state: Option<String>,
}

impl OwnerFilter {
    pub fn matches(&self, owner: &Owner) -> bool {
        self.state
            .as_deref()
            .map_or(true, |state| owner.contact.state == state)
    }
}
