//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! API endpoint handlers
//!
//! Handlers take raw JSON bodies. Field reading and validation belong to
//! the clinic operations so error maps name fields exactly as sent.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use super::{error::ApiError, responses::HealthResponse, server::AppState};
use crate::model::{EntityId, EntityKind, OwnerFilter, PetType, Specialty, Vet, VetFilter, Visit};
use crate::serialize::{OwnerRepr, PetRepr};

type Created<T> = (StatusCode, Json<T>);

/// Record id from a path segment. Anything non-numeric names no record.
pub fn parse_id(raw: &str) -> Result<EntityId, ApiError> {
    raw.parse::<EntityId>().map_err(|_| ApiError::NotFound)
}

fn read_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection @ JsonRejection::MissingJsonContentType(_)) => Err(ApiError::rejected(
            rejection.status(),
            &rejection.body_text(),
        )),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => Err(
            ApiError::rejected(rejection.status(), &rejection.body_text()),
        ),
        Err(rejection) => Err(ApiError::malformed(&rejection.body_text())),
    }
}

async fn delete_record(state: &AppState, kind: EntityKind, raw_id: &str) -> Result<StatusCode, ApiError> {
    // Refused before the id is even looked at
    if !kind.supports_delete() {
        return Err(ApiError::MethodNotAllowed);
    }
    let id = parse_id(raw_id)?;
    state.operations().delete(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let healthy = state.clinic.health_check().await;

    Json(HealthResponse {
        status: if healthy {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        timestamp: chrono::Utc::now(),
        storage: state.clinic.backend_name().to_string(),
    })
}

// Owners

pub async fn list_owners(
    State(state): State<AppState>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<OwnerRepr>>, ApiError> {
    Ok(Json(state.operations().list_owners(&filter).await?))
}

pub async fn create_owner(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Created<OwnerRepr>, ApiError> {
    let body = read_body(body)?;
    let owner = state.operations().create_owner(&body).await?;
    Ok((StatusCode::CREATED, Json(owner)))
}

pub async fn get_owner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OwnerRepr>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.operations().get_owner(id).await?))
}

pub async fn update_owner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OwnerRepr>, ApiError> {
    let id = parse_id(&id)?;
    let body = read_body(body)?;
    Ok(Json(state.operations().update_owner(id, &body).await?))
}

pub async fn delete_owner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_record(&state, EntityKind::Owner, &id).await
}

/// Pets of an owner. Unknown owners have an empty list.
pub async fn list_owner_pets(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PetRepr>>, ApiError> {
    let Ok(owner) = id.parse::<EntityId>() else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.operations().list_owner_pets(owner).await?))
}

pub async fn create_owner_pets(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Created<Vec<PetRepr>>, ApiError> {
    let owner = parse_id(&id)?;
    let body = read_body(body)?;
    let pets = state.operations().create_owner_pets(owner, &body).await?;
    Ok((StatusCode::CREATED, Json(pets)))
}

// Vets

pub async fn list_vets(
    State(state): State<AppState>,
    Query(filter): Query<VetFilter>,
) -> Result<Json<Vec<Vet>>, ApiError> {
    Ok(Json(state.operations().list_vets(&filter).await?))
}

pub async fn create_vet(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Created<Vet>, ApiError> {
    let body = read_body(body)?;
    let vet = state.operations().create_vet(&body).await?;
    Ok((StatusCode::CREATED, Json(vet)))
}

pub async fn get_vet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vet>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.operations().get_vet(id).await?))
}

pub async fn update_vet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vet>, ApiError> {
    let id = parse_id(&id)?;
    let body = read_body(body)?;
    Ok(Json(state.operations().update_vet(id, &body).await?))
}

pub async fn delete_vet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_record(&state, EntityKind::Vet, &id).await
}

// Specialties

pub async fn list_specialties(
    State(state): State<AppState>,
) -> Result<Json<Vec<Specialty>>, ApiError> {
    Ok(Json(state.operations().list_specialties().await?))
}

pub async fn create_specialty(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Created<Specialty>, ApiError> {
    let body = read_body(body)?;
    let specialty = state.operations().create_specialty(&body).await?;
    Ok((StatusCode::CREATED, Json(specialty)))
}

pub async fn get_specialty(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Specialty>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.operations().get_specialty(id).await?))
}

pub async fn update_specialty(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Specialty>, ApiError> {
    let id = parse_id(&id)?;
    let body = read_body(body)?;
    Ok(Json(state.operations().update_specialty(id, &body).await?))
}

pub async fn delete_specialty(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_record(&state, EntityKind::Specialty, &id).await
}

// Pet types

pub async fn list_pet_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<PetType>>, ApiError> {
    Ok(Json(state.operations().list_pet_types().await?))
}

pub async fn create_pet_type(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Created<PetType>, ApiError> {
    let body = read_body(body)?;
    let pet_type = state.operations().create_pet_type(&body).await?;
    Ok((StatusCode::CREATED, Json(pet_type)))
}

pub async fn get_pet_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PetType>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.operations().get_pet_type(id).await?))
}

pub async fn update_pet_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PetType>, ApiError> {
    let id = parse_id(&id)?;
    let body = read_body(body)?;
    Ok(Json(state.operations().update_pet_type(id, &body).await?))
}

pub async fn delete_pet_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_record(&state, EntityKind::PetType, &id).await
}

// Pets

pub async fn get_pet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PetRepr>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.operations().get_pet(id).await?))
}

pub async fn update_pet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PetRepr>, ApiError> {
    let id = parse_id(&id)?;
    let body = read_body(body)?;
    Ok(Json(state.operations().update_pet(id, &body).await?))
}

pub async fn delete_pet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_record(&state, EntityKind::Pet, &id).await
}

/// Visits of a pet. Unknown pets have an empty list.
pub async fn list_pet_visits(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Visit>>, ApiError> {
    let Ok(pet) = id.parse::<EntityId>() else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.operations().list_pet_visits(pet).await?))
}

pub async fn create_pet_visits(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Created<Vec<Visit>>, ApiError> {
    let pet = parse_id(&id)?;
    let body = read_body(body)?;
    let visits = state.operations().create_pet_visits(pet, &body).await?;
    Ok((StatusCode::CREATED, Json(visits)))
}

// Visits

pub async fn get_visit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Visit>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.operations().get_visit(id).await?))
}

pub async fn update_visit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Visit>, ApiError> {
    let id = parse_id(&id)?;
    let body = read_body(body)?;
    Ok(Json(state.operations().update_visit(id, &body).await?))
}

pub async fn delete_visit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_record(&state, EntityKind::Visit, &id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::NotFound)));
        assert!(matches!(parse_id(""), Err(ApiError::NotFound)));
    }
}
