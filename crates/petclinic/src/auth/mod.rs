//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Bearer token authentication
//!
//! Tokens are HS256 JWTs carrying [`AccessClaims`]. The API only checks
//! them; minting is left to the `token` CLI command.

pub mod claims;
pub mod manager;

pub use claims::{AccessClaims, ACCESS_TOKEN_TYPE};
pub use manager::TokenManager;
