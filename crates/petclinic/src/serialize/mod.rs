//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Wire representations
//!
//! `payload` turns request bodies into validated writes. `representation`
//! turns stored records into response bodies, embedding pets in their
//! owner and visits in their pet. References are bare ids throughout.

pub mod payload;
pub mod representation;

pub use payload::{ContactPayload, NamedPayload, OwnerPayload, PetPayload, VetPayload, VisitPayload};
pub use representation::{OwnerRepr, PetRepr, RelatedRecords};
