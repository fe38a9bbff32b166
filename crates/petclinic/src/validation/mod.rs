//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Request validation
//!
//! Field-level checks run on raw JSON bodies through [`FieldReader`];
//! checks that need the store (uniqueness, referenced records) run
//! afterwards through [`EntityValidator`]. Every failure is collected
//! so a single response reports all offending fields.

pub mod error;
pub mod rules;
pub mod validator;


pub use error::{messages, FieldErrors, ValidationError, NON_FIELD_ERRORS};
pub use rules::{is_valid_email, FieldReader, TextRule, WriteMode};
pub use self::validator::EntityValidator;
