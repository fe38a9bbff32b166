//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Visit records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntityId;

/// Visit of a pet to the clinic. Deleted with its pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: EntityId,
    pub visit_date: DateTime<Utc>,
    pub description: String,
    pub pet: EntityId,
}

impl Visit {
    pub const DESCRIPTION_MAX_LEN: usize = 1000;
}

/// Validated visit awaiting an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub visit_date: DateTime<Utc>,
    pub description: String,
    pub pet: EntityId,
}

impl NewVisit {
    pub fn into_visit(self, id: EntityId) -> Visit {
        Visit {
            id,
            visit_date: self.visit_date,
            description: self.description,
            pet: self.pet,
        }
    }
}
