//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Clinic manager
//!
//! This module provides the manager coordinating the storage backend, the
//! resource operations and the service lifecycle.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::operations::ClinicOperations;
use super::state::ClinicState;
use crate::config::{ClinicConfig, StorageBackendType};
use crate::error::{ClinicError, ClinicResult};
use crate::metrics::MetricsCollector;
use crate::storage::{ClinicStore, MemoryStore, SqliteStore, StorageStats};

/// Clinic manager
pub struct ClinicManager {
    /// Configuration
    config: ClinicConfig,

    /// Storage backend
    store: Arc<dyn ClinicStore>,

    /// Service state
    state: Arc<RwLock<ClinicState>>,

    /// Resource operations
    operations: ClinicOperations,

    /// Metrics collector
    metrics: MetricsCollector,
}

impl ClinicManager {
    /// Create a manager backed by an in-memory store
    pub fn new(config: ClinicConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Create a manager over an existing store
    pub fn with_store(config: ClinicConfig, store: Arc<dyn ClinicStore>) -> Self {
        let metrics = MetricsCollector::new(config.monitoring.enable_metrics);
        let operations = ClinicOperations::new(store.clone(), metrics.clone());
        Self {
            config,
            store,
            state: Arc::new(RwLock::new(ClinicState::new())),
            operations,
            metrics,
        }
    }

    /// Create storage backend based on configuration
    async fn create_store(config: &ClinicConfig) -> ClinicResult<Arc<dyn ClinicStore>> {
        match config.storage.backend {
            StorageBackendType::Memory => Ok(Arc::new(MemoryStore::new())),
            StorageBackendType::Sqlite => {
                Ok(Arc::new(SqliteStore::new(&config.storage.sqlite).await?))
            }
        }
    }

    /// Create a manager with the configured storage backend
    pub async fn new_with_storage(config: ClinicConfig) -> ClinicResult<Self> {
        let store = Self::create_store(&config).await?;
        Ok(Self::with_store(config, store))
    }

    /// Validate configuration and probe the store
    pub async fn initialize(&self) -> ClinicResult<()> {
        self.config.validate().map_err(|e| ClinicError::config(&e))?;

        let healthy = self.store.health_check().await?;
        {
            let mut state = self.state.write().await;
            state.mark_initialized();
            state.update_health(healthy);
        }

        if let Err(e) = self.refresh_stats().await {
            warn!("Failed to collect storage statistics: {}", e);
        }

        info!(
            backend = self.store.backend_name(),
            healthy,
            metrics = self.metrics.is_enabled(),
            "Clinic initialized"
        );
        Ok(())
    }

    /// Probe the store, recording the outcome
    pub async fn health_check(&self) -> bool {
        let healthy = match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!("Storage health check failed: {}", e);
                false
            }
        };
        self.state.write().await.update_health(healthy);
        self.metrics.record_health_check(healthy);
        healthy
    }

    /// Refresh record counts
    pub async fn refresh_stats(&self) -> ClinicResult<StorageStats> {
        let stats = self.store.get_stats().await?;
        self.metrics.update_storage_stats(&stats);
        self.state.write().await.stats = stats.clone();
        Ok(stats)
    }

    pub async fn get_state(&self) -> ClinicState {
        self.state.read().await.clone()
    }

    /// Release the store
    pub async fn shutdown(&self) -> ClinicResult<()> {
        info!("Shutting down clinic");
        self.store.shutdown().await
    }

    pub fn operations(&self) -> &ClinicOperations {
        &self.operations
    }

    pub fn store(&self) -> Arc<dyn ClinicStore> {
        self.store.clone()
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manager_initialization() {
        let manager = ClinicManager::new(ClinicConfig::default());
        manager.initialize().await.unwrap();

        let state = manager.get_state().await;
        assert!(state.initialized);
        assert!(state.healthy);
        assert_eq!(state.stats.total(), 0);
        assert_eq!(manager.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_invalid_config_fails_initialization() {
        let mut config = ClinicConfig::default();
        config.api.port = 0;
        let manager = ClinicManager::new(config);
        assert!(matches!(
            manager.initialize().await,
            Err(ClinicError::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_sqlite_backend_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClinicConfig::default();
        config.storage.backend = StorageBackendType::Sqlite;
        config.storage.sqlite.database_path = dir.path().join("clinic.db");

        let manager = ClinicManager::new_with_storage(config).await.unwrap();
        manager.initialize().await.unwrap();
        assert_eq!(manager.backend_name(), "sqlite");
        assert!(manager.health_check().await);
        manager.shutdown().await.unwrap();
    }
}
