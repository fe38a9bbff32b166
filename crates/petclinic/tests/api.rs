//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! HTTP contract tests
//!
//! These drive the full router, middleware included, against an
//! in-memory store with real bearer tokens.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use petclinic::{ClinicApi, ClinicConfig, ClinicManager, TokenManager};
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    token: String,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(ClinicConfig::default())
    }

    fn with_config(config: ClinicConfig) -> Self {
        let token = TokenManager::new(&config.security)
            .unwrap()
            .issue("frontdesk")
            .unwrap();
        let manager = Arc::new(ClinicManager::new(config));
        let router = ClinicApi::new(manager).unwrap().router();
        Self { router, token }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        self.dispatch(request, body).await
    }

    async fn dispatch(
        &self,
        mut request: axum::http::request::Builder,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    async fn create_owner(&self, email: &str, state: &str) -> Value {
        let (status, owner) = self.post("/api/owners/", owner_body(email, state)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", owner);
        owner
    }
}

fn owner_body(email: &str, state: &str) -> Value {
    json!({
        "email": email,
        "first_name": "George",
        "last_name": "Franklin",
        "street_address": "110 W. Liberty St.",
        "city": "Madison",
        "state": state,
        "telephone": "6085551023",
    })
}

fn not_found() -> Value {
    json!({"detail": "Not found."})
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new();
    let request = Request::builder().uri("/api/health");
    let response = app
        .router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let (_, body) = app.dispatch(Request::builder().uri("/api/health"), None).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_missing_credentials() {
    let app = TestApp::new();
    let (status, body) = app
        .dispatch(Request::builder().uri("/api/owners/"), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"detail": "Authentication credentials were not provided."})
    );
}

#[tokio::test]
async fn test_invalid_token() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api/owners/")
        .header(header::AUTHORIZATION, "Bearer not.a.token");
    let (status, body) = app.dispatch(request, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"detail": "Given token not valid for any token type"})
    );
}

#[tokio::test]
async fn test_create_then_retrieve_round_trip() {
    let app = TestApp::new();
    let owner = app.create_owner("george@example.com", "WI").await;
    assert_eq!(owner["pets"], json!([]));

    let (status, fetched) = app.get(&format!("/api/owners/{}", owner["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, owner);
}

#[tokio::test]
async fn test_duplicate_owner_email() {
    let app = TestApp::new();
    app.create_owner("george@example.com", "WI").await;

    let (status, body) = app
        .post("/api/owners/", owner_body("george@example.com", "TX"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"email": ["owner with this email already exists."]})
    );
}

#[tokio::test]
async fn test_invalid_owner_email() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/owners/", owner_body("not-an-email", "WI"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"email": ["Enter a valid email address."]}));
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let app = TestApp::new();
    for uri in [
        "/api/owners/99",
        "/api/vets/99",
        "/api/pets/99",
        "/api/visits/99",
        "/api/pet_types/99",
        "/api/specialties/99",
        "/api/owners/abc",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body, not_found(), "{}", uri);
    }

    let (status, body) = app.delete("/api/owners/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, not_found());
}

#[tokio::test]
async fn test_lookup_deletes_refused() {
    let app = TestApp::new();
    let (_, specialty) = app.post("/api/specialties/", json!({"name": "surgery"})).await;

    for uri in [
        format!("/api/specialties/{}", specialty["id"]),
        "/api/specialties/999".to_string(),
        "/api/specialties/abc".to_string(),
        "/api/pet_types/1".to_string(),
    ] {
        let (status, body) = app.delete(&uri).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", uri);
        assert_eq!(body, json!({"message": "Unsupported operation"}));
    }

    let (_, specialties) = app.get("/api/specialties/").await;
    assert_eq!(specialties.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_owner_state_filter() {
    let app = TestApp::new();
    app.create_owner("ca@example.com", "CA").await;
    let texan = app.create_owner("tx@example.com", "TX").await;

    let (status, owners) = app.get("/api/owners/?state=TX").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(owners, json!([texan]));

    let (_, owners) = app.get("/api/owners/").await;
    assert_eq!(owners.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_vet_state_filter() {
    let app = TestApp::new();
    let mut vets = Vec::new();
    for (email, state) in [("tx1@example.com", "TX"), ("ca@example.com", "CA"), ("tx2@example.com", "TX")] {
        let (status, vet) = app.post("/api/vets/", owner_body(email, state)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", vet);
        vets.push(vet);
    }

    let (status, texans) = app.get("/api/vets/?state=TX").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(texans, json!([vets[0], vets[2]]));

    let (_, californians) = app.get("/api/vets/?state=CA").await;
    assert_eq!(californians, json!([vets[1]]));

    let (_, all) = app.get("/api/vets/").await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_partial_update() {
    let app = TestApp::new();
    let owner = app.create_owner("george@example.com", "WI").await;

    let (status, updated) = app
        .put(
            &format!("/api/owners/{}", owner["id"]),
            json!({"telephone": "6085550000"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["telephone"], "6085550000");

    let mut expected = owner.clone();
    expected["telephone"] = json!("6085550000");
    assert_eq!(updated, expected);
}

#[tokio::test]
async fn test_nested_pet_create() {
    let app = TestApp::new();
    let owner = app.create_owner("george@example.com", "WI").await;
    let (_, dog) = app.post("/api/pet_types/", json!({"name": "dog"})).await;
    let uri = format!("/api/owners/{}/pets", owner["id"]);

    let (status, pets) = app
        .post(
            &uri,
            json!([
                {"name": "Leo", "birth_date": "2010-09-07", "pet_type": dog["id"]},
                {"name": "Basil", "birth_date": "2012-08-06"},
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let pets = pets.as_array().unwrap();
    assert_eq!(pets.len(), 2);
    for pet in pets {
        assert_eq!(pet["owner"], owner["id"]);
        assert_eq!(pet["visits"], json!([]));
    }
    assert_eq!(pets[0]["pet_type"], dog["id"]);
    assert_eq!(pets[1]["pet_type"], Value::Null);

    let (_, listed) = app.get(&uri).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let (_, unknown) = app.get("/api/owners/404/pets").await;
    assert_eq!(unknown, json!([]));
}

#[tokio::test]
async fn test_nested_list_errors_per_item() {
    let app = TestApp::new();
    let owner = app.create_owner("george@example.com", "WI").await;
    let uri = format!("/api/owners/{}/pets", owner["id"]);

    let (status, body) = app
        .post(
            &uri,
            json!([
                {"name": "Leo", "birth_date": "2010-09-07"},
                {"name": "", "birth_date": "2012-08-06"},
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!([{}, {"name": ["This field may not be blank."]}])
    );

    let (_, listed) = app.get(&uri).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_owner_delete_cascades() {
    let app = TestApp::new();
    let owner = app.create_owner("george@example.com", "WI").await;
    let (_, pets) = app
        .post(
            &format!("/api/owners/{}/pets", owner["id"]),
            json!({"name": "Leo", "birth_date": "2010-09-07"}),
        )
        .await;
    let pet_id = pets[0]["id"].clone();
    let (status, visits) = app
        .post(
            &format!("/api/pets/{}/visits", pet_id),
            json!({"visit_date": "2024-03-04T10:00:00Z", "description": "rabies shot"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(visits[0]["visit_date"], "2024-03-04T10:00:00Z");
    let visit_id = visits[0]["id"].clone();

    let (_, fetched) = app.get(&format!("/api/owners/{}", owner["id"])).await;
    assert_eq!(fetched["pets"][0]["visits"][0]["description"], "rabies shot");

    let (status, body) = app.delete(&format!("/api/owners/{}", owner["id"])).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.get(&format!("/api/pets/{}", pet_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/api/visits/{}", visit_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_visit_datetime_format() {
    let app = TestApp::new();
    let owner = app.create_owner("george@example.com", "WI").await;
    let (_, pets) = app
        .post(
            &format!("/api/owners/{}/pets", owner["id"]),
            json!({"name": "Leo", "birth_date": "2010-09-07"}),
        )
        .await;

    let (status, body) = app
        .post(
            &format!("/api/pets/{}/visits", pets[0]["id"]),
            json!({"visit_date": "yesterday", "description": "checkup"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["visit_date"].is_array());
}

#[tokio::test]
async fn test_vet_specialty_reference() {
    let app = TestApp::new();
    let mut body = owner_body("vet@example.com", "WI");
    body["specialty"] = json!(77);

    let (status, errors) = app.post("/api/vets/", body.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        errors,
        json!({"specialty": ["Invalid pk \"77\" - object does not exist."]})
    );

    let (_, specialty) = app.post("/api/specialties/", json!({"name": "dentistry"})).await;
    body["specialty"] = specialty["id"].clone();
    let (status, vet) = app.post("/api/vets/", body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(vet["specialty"], specialty["id"]);
}

#[tokio::test]
async fn test_malformed_bodies() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/owners/")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
        .header(header::CONTENT_TYPE, "application/json");
    let response = app
        .router
        .clone()
        .oneshot(request.body(Body::from("{not json")).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/api/owners/", json!(["a", "b"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"non_field_errors": ["Invalid data. Expected a dictionary, but got list."]})
    );
}

#[tokio::test]
async fn test_root_mount_without_auth() {
    let mut config = ClinicConfig::default();
    config.api.base_path = String::new();
    config.security.enable_auth = false;
    let app = TestApp::with_config(config);

    let (status, _) = app
        .dispatch(
            Request::builder()
                .method(Method::POST)
                .uri("/pet_types/"),
            Some(json!({"name": "hamster"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, pet_types) = app.dispatch(Request::builder().uri("/pet_types/"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pet_types[0]["name"], "hamster");
}
