//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Clinic service state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StorageStats;

/// Clinic service state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicState {
    /// Whether the service finished initialization
    pub initialized: bool,

    /// Outcome of the last health check
    pub healthy: bool,

    /// Last health check timestamp
    pub last_health_check: DateTime<Utc>,

    /// Record counts from the last refresh
    pub stats: StorageStats,
}

impl ClinicState {
    pub fn new() -> Self {
        Self {
            initialized: false,
            healthy: false,
            last_health_check: Utc::now(),
            stats: StorageStats::default(),
        }
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub fn update_health(&mut self, healthy: bool) {
        self.healthy = healthy;
        self.last_health_check = Utc::now();
    }
}

impl Default for ClinicState {
    fn default() -> Self {
        Self::new()
    }
}
