//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! API server implementation
//!
//! This module contains the shared handler state and router setup.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::endpoints::*;
use super::middleware::{auth_middleware, metrics_middleware, request_id_middleware};
use crate::auth::TokenManager;
use crate::clinic::{ClinicManager, ClinicOperations};
use crate::config::ApiConfig;
use crate::error::ClinicResult;
use crate::metrics::MetricsCollector;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Clinic manager
    pub clinic: Arc<ClinicManager>,

    /// Token verifier, absent when authentication is disabled
    pub tokens: Option<Arc<TokenManager>>,
}

impl AppState {
    pub fn operations(&self) -> &ClinicOperations {
        self.clinic.operations()
    }

    pub fn metrics(&self) -> &MetricsCollector {
        self.clinic.metrics()
    }
}

/// API server for the clinic
pub struct ClinicApi {
    state: AppState,
    router: Router,
}

impl ClinicApi {
    /// Create a new API server
    pub fn new(clinic: Arc<ClinicManager>) -> ClinicResult<Self> {
        let config = clinic.config();

        let tokens = if config.security.enable_auth {
            Some(Arc::new(TokenManager::new(&config.security)?))
        } else {
            warn!("Authentication is disabled, resource routes are open");
            None
        };

        let api_config = config.api.clone();
        let state = AppState { clinic, tokens };
        let router = Self::create_router(state.clone(), &api_config);

        Ok(Self { state, router })
    }

    /// Resource routes, all behind the bearer check
    fn resource_routes(state: AppState) -> Router<AppState> {
        Router::new()
            .route("/owners/", get(list_owners).post(create_owner))
            .route(
                "/owners/{id}",
                get(get_owner).put(update_owner).delete(delete_owner),
            )
            .route(
                "/owners/{id}/pets",
                get(list_owner_pets).post(create_owner_pets),
            )
            .route("/vets/", get(list_vets).post(create_vet))
            .route(
                "/vets/{id}",
                get(get_vet).put(update_vet).delete(delete_vet),
            )
            .route("/specialties/", get(list_specialties).post(create_specialty))
            .route(
                "/specialties/{id}",
                get(get_specialty)
                    .put(update_specialty)
                    .delete(delete_specialty),
            )
            .route("/pet_types/", get(list_pet_types).post(create_pet_type))
            .route(
                "/pet_types/{id}",
                get(get_pet_type).put(update_pet_type).delete(delete_pet_type),
            )
            .route(
                "/pets/{id}",
                get(get_pet).put(update_pet).delete(delete_pet),
            )
            .route(
                "/pets/{id}/visits",
                get(list_pet_visits).post(create_pet_visits),
            )
            .route(
                "/visits/{id}",
                get(get_visit).put(update_visit).delete(delete_visit),
            )
            .route_layer(from_fn_with_state(state, auth_middleware))
    }

    /// Create the router with all endpoints
    fn create_router(state: AppState, api: &ApiConfig) -> Router {
        // route_layer above only covers routes registered before it
        let routes = Self::resource_routes(state.clone())
            .route("/health", get(health_check))
            .with_state(state.clone());

        let router = match api.normalized_base_path() {
            Some(base_path) => Router::new().nest(&base_path, routes),
            None => routes,
        };

        let router = router
            .layer(from_fn_with_state(state, metrics_middleware))
            .layer(from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(api.max_request_size));

        match Self::cors_layer(api) {
            Some(cors) => router.layer(cors),
            None => router,
        }
    }

    fn cors_layer(api: &ApiConfig) -> Option<CorsLayer> {
        if !api.enable_cors {
            return None;
        }
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if api.cors_origins.iter().any(|origin| origin == "*") {
            return Some(layer.allow_origin(Any));
        }

        let origins: Vec<HeaderValue> = api
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        Some(layer.allow_origin(AllowOrigin::list(origins)))
    }

    /// Get the router
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get the handler state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClinicConfig;

    #[tokio::test]
    async fn test_api_creation() {
        let clinic = Arc::new(ClinicManager::new(ClinicConfig::default()));
        let api = ClinicApi::new(clinic).unwrap();

        assert!(api.state().tokens.is_some());
        let _router = api.router();
    }

    #[tokio::test]
    async fn test_auth_disabled_has_no_verifier() {
        let mut config = ClinicConfig::default();
        config.security.enable_auth = false;
        config.api.enable_cors = false;
        let api = ClinicApi::new(Arc::new(ClinicManager::new(config))).unwrap();

        assert!(api.state().tokens.is_none());
    }

    #[test]
    fn test_cors_origins() {
        let mut api = ApiConfig::default();
        assert!(ClinicApi::cors_layer(&api).is_some());

        api.cors_origins = vec!["https://clinic.example.org".to_string()];
        assert!(ClinicApi::cors_layer(&api).is_some());

        api.enable_cors = false;
        assert!(ClinicApi::cors_layer(&api).is_none());
    }
}
