//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Store-backed validation

use std::sync::Arc;

use super::error::{messages, FieldErrors};
use crate::error::ClinicResult;
use crate::model::{EntityId, EntityKind};
use crate::storage::ClinicStore;

/// Validator for rules that depend on stored records
#[derive(Clone)]
pub struct EntityValidator {
    store: Arc<dyn ClinicStore>,
}

impl EntityValidator {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Flag the unique field of `kind` when another record already holds `value`.
    ///
    /// `current` is the record being updated, which never conflicts with itself.
    pub async fn check_unique(
        &self,
        kind: EntityKind,
        value: Option<&str>,
        current: Option<EntityId>,
        errors: &mut FieldErrors,
    ) -> ClinicResult<()> {
        let (Some(field), Some(value)) = (kind.unique_field(), value) else {
            return Ok(());
        };
        if errors.has(field) {
            return Ok(());
        }
        if self.store.is_taken(kind, value, current).await? {
            errors.add(field, messages::unique(kind, field));
        }
        Ok(())
    }

    /// Flag `field` when it names a `target` record that does not exist
    pub async fn check_reference(
        &self,
        field: &str,
        target: EntityKind,
        id: Option<EntityId>,
        errors: &mut FieldErrors,
    ) -> ClinicResult<()> {
        let Some(id) = id else {
            return Ok(());
        };
        if errors.has(field) {
            return Ok(());
        }
        if !self.store.exists(target, id).await? {
            errors.add(field, messages::does_not_exist(&id.to_string()));
        }
        Ok(())
    }
}
