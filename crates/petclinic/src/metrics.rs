//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Metrics for the clinic service
//!
//! Everything goes through the `metrics` facade and costs nothing until a
//! recorder is installed by the embedding process.

use metrics::{counter, gauge, histogram};

use crate::model::EntityKind;
use crate::storage::StorageStats;

/// Entity change recorded by the resource operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityEvent {
    Created,
    Updated,
    Deleted,
}

impl EntityEvent {
    fn as_str(&self) -> &'static str {
        match self {
            EntityEvent::Created => "created",
            EntityEvent::Updated => "updated",
            EntityEvent::Deleted => "deleted",
        }
    }
}

/// Metrics collector for the clinic
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    enabled: bool,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record an entity change
    pub fn record_entity_event(&self, kind: EntityKind, event: EntityEvent, count: usize) {
        if !self.enabled {
            return;
        }
        counter!("petclinic.entities.changes", count as u64,
            "entity" => kind.table(),
            "event" => event.as_str()
        );
    }

    /// Record a rejected write
    pub fn record_validation_failure(&self, kind: EntityKind, field_count: usize) {
        if !self.enabled {
            return;
        }
        counter!("petclinic.validations.failed", 1, "entity" => kind.table());
        counter!("petclinic.validations.fields", field_count as u64, "entity" => kind.table());
    }

    /// Record API request
    pub fn record_api_request(&self, route: &str, method: &str, status_code: u16, duration_ms: f64) {
        if !self.enabled {
            return;
        }
        counter!("petclinic.api.requests", 1,
            "route" => route.to_string(),
            "method" => method.to_string(),
            "status_code" => status_code.to_string()
        );
        histogram!("petclinic.api.response_time_ms", duration_ms,
            "route" => route.to_string()
        );
    }

    /// Record rejected credentials
    pub fn record_auth_failure(&self, reason: &'static str) {
        if !self.enabled {
            return;
        }
        counter!("petclinic.auth.failures", 1, "reason" => reason);
    }

    /// Publish record counts
    pub fn update_storage_stats(&self, stats: &StorageStats) {
        if !self.enabled {
            return;
        }
        for kind in EntityKind::ALL {
            gauge!("petclinic.storage.records", stats.count(kind) as f64, "entity" => kind.table());
        }
    }

    /// Record health check
    pub fn record_health_check(&self, healthy: bool) {
        if !self.enabled {
            return;
        }
        if healthy {
            counter!("petclinic.health.checks", 1);
        } else {
            counter!("petclinic.health.checks_failed", 1);
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(true)
    }
}
