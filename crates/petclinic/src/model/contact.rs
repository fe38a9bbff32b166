//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Contact details shared by owners and vets

use serde::{Deserialize, Serialize};

/// Person contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique, well-formed email address
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub telephone: String,
}

impl Contact {
    pub const EMAIL_MAX_LEN: usize = 254;
    pub const NAME_MAX_LEN: usize = 50;
    pub const STREET_ADDRESS_MAX_LEN: usize = 255;
    pub const CITY_MAX_LEN: usize = 50;
    pub const STATE_MAX_LEN: usize = 50;
    pub const TELEPHONE_MAX_LEN: usize = 100;

    /// First and last name joined by a space
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
