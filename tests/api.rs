//! HTTP-level tests for the warehouse API.
//!
//! Covers the access verifier (401 / 403 paths), ownership scoping,
//! register/login, and the CRUD pass-through routes against the in-memory
//! document store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

use warehouse_api::repos::{
    DeleteResult, Document, DocumentStore, InsertOneResult, MemoryDocumentStore, StoreError,
    StoreResult, UpdateOptions, UpdateResult,
};
use warehouse_api::services::auth::AccessJwt;
use warehouse_api::state::AppState;

const SECRET: &str = "integration-test-secret";

// -- Helpers ------------------------------------------------------------------

fn test_state() -> (AppState, MemoryDocumentStore) {
    let store = MemoryDocumentStore::new();
    let auth = Arc::new(AccessJwt::new(SECRET.as_bytes(), 86_400, 0));
    (AppState::new(Arc::new(store.clone()), auth), store)
}

fn test_app() -> (axum::Router, AppState, MemoryDocumentStore) {
    let (state, store) = test_state();
    (warehouse_api::router(state.clone()), state, store)
}

fn token_for(state: &AppState, email: &str) -> String {
    let claims = json!({ "email": email }).as_object().cloned().unwrap();
    state.auth.issue(claims).unwrap()
}

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(
    method: Method,
    uri: &str,
    body: Value,
    authorization: Option<&str>,
) -> Request<Body> {
    raw_request(method, uri, &body.to_string(), authorization)
}

/// `application/json` request with a body that need not be valid JSON.
fn raw_request(
    method: Method,
    uri: &str,
    body: &str,
    authorization: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

/// Bad input must come back as `400 {"message": <reason>}` and nothing else.
fn assert_bad_request(status: StatusCode, body: &Value, mentions: &str) {
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    let object = body.as_object().expect("JSON object body");
    assert_eq!(object.len(), 1, "{body}");
    let message = object["message"].as_str().expect("string message");
    assert!(message.contains(mentions), "{message}");
}

/// Store whose every call fails like an unreachable database.
struct UnreachableStore;

#[async_trait]
impl DocumentStore for UnreachableStore {
    fn backend_name(&self) -> &'static str {
        "unreachable"
    }

    async fn find(&self, _: &str, _: &Document) -> StoreResult<Vec<Document>> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn find_one(&self, _: &str, _: &Document) -> StoreResult<Option<Document>> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn insert_one(&self, _: &str, _: Document) -> StoreResult<InsertOneResult> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn update_one(
        &self,
        _: &str,
        _: &Document,
        _: Document,
        _: UpdateOptions,
    ) -> StoreResult<UpdateResult> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn delete_one(&self, _: &str, _: &Document) -> StoreResult<DeleteResult> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }
}

// -- Root ---------------------------------------------------------------------

#[tokio::test]
async fn root_reports_server_running() {
    let (app, _, _) = test_app();
    let (status, body) = send(app, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Warehouse Server is running"));
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _, _) = test_app();
    let (status, body) = send(app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

// -- Access verifier ----------------------------------------------------------

#[tokio::test]
async fn missing_authorization_is_401() {
    let (app, _, _) = test_app();
    for uri in ["/add?email=a@x.com", "/orders?email=a@x.com"] {
        let (status, body) = send(app.clone(), get(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body, json!({"message": "Unauthorized Access"}));
    }
}

#[tokio::test]
async fn garbage_token_is_403() {
    let (app, _, _) = test_app();
    let (status, body) = send(app, get("/add?email=a@x.com", Some("Bearer garbage"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"message": "Access Forbidden"}));
}

#[tokio::test]
async fn expired_token_is_403() {
    let (app, _, _) = test_app();
    let past = chrono::Utc::now().timestamp() - 3_600;
    let token = jsonwebtoken::encode(
        &Header::default(),
        &json!({"email": "a@x.com", "iat": past - 86_400, "exp": past}),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) = send(
        app,
        get("/add?email=a@x.com", Some(&format!("Bearer {token}"))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"message": "Access Forbidden"}));
}

#[tokio::test]
async fn token_signed_with_another_secret_is_403() {
    let (app, _, _) = test_app();
    let foreign = AccessJwt::new(b"not-our-secret", 86_400, 0);
    let token = foreign.issue(doc(json!({"email": "a@x.com"}))).unwrap();

    let (status, _) = send(
        app,
        get("/add?email=a@x.com", Some(&format!("Bearer {token}"))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn non_bearer_scheme_is_403_even_with_valid_token() {
    let (app, state, _) = test_app();
    let token = token_for(&state, "a@x.com");

    for value in [format!("Basic {token}"), token.clone(), format!("Bearer {token} x")] {
        let (status, body) = send(app.clone(), get("/add?email=a@x.com", Some(&value))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{value}");
        assert_eq!(body, json!({"message": "Access Forbidden"}));
    }
}

#[tokio::test]
async fn same_token_verifies_repeatedly() {
    let (app, state, _) = test_app();
    let bearer = format!("Bearer {}", token_for(&state, "a@x.com"));

    for _ in 0..3 {
        let (status, _) = send(app.clone(), get("/add?email=a@x.com", Some(&bearer))).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn public_routes_ignore_bad_credentials() {
    let (app, _, _) = test_app();
    let (status, _) = send(app, get("/inventory", Some("Bearer garbage"))).await;
    assert_eq!(status, StatusCode::OK);
}

// -- Ownership scoping --------------------------------------------------------

#[tokio::test]
async fn other_users_email_is_forbidden_access() {
    let (app, state, _) = test_app();
    let bearer = format!("Bearer {}", token_for(&state, "a@x.com"));

    let (status, body) = send(app, get("/add?email=b@x.com", Some(&bearer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"message": "Forbidden Access"}));
}

#[tokio::test]
async fn missing_email_query_is_forbidden_access() {
    let (app, state, _) = test_app();
    let bearer = format!("Bearer {}", token_for(&state, "a@x.com"));

    let (status, body) = send(app, get("/orders", Some(&bearer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"message": "Forbidden Access"}));
}

#[tokio::test]
async fn own_email_lists_only_own_items() {
    let (app, state, store) = test_app();
    store
        .insert_one("add", doc(json!({"email": "a@x.com", "name": "drill"})))
        .await
        .unwrap();
    store
        .insert_one("add", doc(json!({"email": "b@x.com", "name": "saw"})))
        .await
        .unwrap();

    let bearer = format!("Bearer {}", token_for(&state, "a@x.com"));
    let (status, body) = send(app, get("/add?email=a@x.com", Some(&bearer))).await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "drill");
}

#[tokio::test]
async fn created_orders_belong_to_the_token_owner() {
    let (app, state, _) = test_app();
    let bearer = format!("Bearer {}", token_for(&state, "a@x.com"));

    let (status, body) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/orders",
            json!({"item": "drill", "email": "someone-else@x.com"}),
            Some(&bearer),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["acknowledged"], true);

    let (status, body) = send(app, get("/orders?email=a@x.com", Some(&bearer))).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["email"], "a@x.com");
    assert_eq!(orders[0]["item"], "drill");
}

// -- Register / login ---------------------------------------------------------

#[tokio::test]
async fn register_then_login_issues_a_working_token() {
    let (app, state, _) = test_app();
    let creds = json!({"email": "u@test.com", "password": "hunter22"});

    let (status, body) = send(
        app.clone(),
        json_request(Method::POST, "/register", creds.clone(), None),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"email": "u@test.com"}));

    let (status, body) = send(
        app.clone(),
        json_request(Method::POST, "/login", creds, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["accessToken"].as_str().unwrap().to_string();

    let claims = state.auth.verify(&token).unwrap();
    assert_eq!(claims.email(), Some("u@test.com"));

    let (status, body) = send(
        app,
        get("/add?email=u@test.com", Some(&format!("Bearer {token}"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email() {
    let (app, _, _) = test_app();
    send(
        app.clone(),
        json_request(
            Method::POST,
            "/register",
            json!({"email": "u@test.com", "password": "right"}),
            None,
        ),
    )
    .await;

    for creds in [
        json!({"email": "u@test.com", "password": "wrong"}),
        json!({"email": "ghost@test.com", "password": "right"}),
    ] {
        let (status, body) =
            send(app.clone(), json_request(Method::POST, "/login", creds, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Invalid email or password"}));
    }
}

#[tokio::test]
async fn login_does_not_trust_bare_claims() {
    let (app, _, _) = test_app();
    let (status, body) = send(
        app,
        json_request(Method::POST, "/login", json!({"email": "u@test.com"}), None),
    )
    .await;
    assert_bad_request(status, &body, "missing field `password`");
}

/// Lookups miss; writes go to the inner store. Forces `/register` onto the
/// store's own uniqueness check.
struct BlindLookupStore(MemoryDocumentStore);

#[async_trait]
impl DocumentStore for BlindLookupStore {
    fn backend_name(&self) -> &'static str {
        "blind-lookup"
    }

    async fn find(&self, collection: &str, filter: &Document) -> StoreResult<Vec<Document>> {
        self.0.find(collection, filter).await
    }

    async fn find_one(&self, _: &str, _: &Document) -> StoreResult<Option<Document>> {
        Ok(None)
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> StoreResult<InsertOneResult> {
        self.0.insert_one(collection, doc).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Document,
        patch: Document,
        options: UpdateOptions,
    ) -> StoreResult<UpdateResult> {
        self.0.update_one(collection, filter, patch, options).await
    }

    async fn delete_one(&self, collection: &str, filter: &Document) -> StoreResult<DeleteResult> {
        self.0.delete_one(collection, filter).await
    }
}

#[tokio::test]
async fn store_level_email_conflict_reads_as_already_registered() {
    let inner = MemoryDocumentStore::new();
    let auth = Arc::new(AccessJwt::new(SECRET.as_bytes(), 86_400, 0));
    let state = AppState::new(Arc::new(BlindLookupStore(inner.clone())), auth);
    let app = warehouse_api::router(state);

    let creds = json!({"email": "u@test.com", "password": "pw"});
    let (status, _) = send(
        app.clone(),
        json_request(Method::POST, "/register", creds.clone(), None),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, json_request(Method::POST, "/register", creds, None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"message": "Email already registered"}));
    assert_eq!(inner.find("users", &Document::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_registrations_create_one_account() {
    let (app, _, store) = test_app();
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8 {
        let app = app.clone();
        tasks.spawn(async move {
            let creds = json!({"email": "race@test.com", "password": format!("pw-{i}")});
            send(app, json_request(Method::POST, "/register", creds, None)).await
        });
    }

    let mut created = 0;
    while let Some(joined) = tasks.join_next().await {
        let (status, body) = joined.unwrap();
        if status == StatusCode::CREATED {
            created += 1;
        } else {
            assert_eq!(status, StatusCode::CONFLICT);
            assert_eq!(body, json!({"message": "Email already registered"}));
        }
    }

    assert_eq!(created, 1);
    assert_eq!(store.find("users", &Document::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn mixed_case_emails_reach_the_same_items() {
    let (app, _, _) = test_app();
    let creds = json!({"email": "Mixed@X.com", "password": "pw"});
    send(
        app.clone(),
        json_request(Method::POST, "/register", creds.clone(), None),
    )
    .await;
    let (_, body) = send(app.clone(), json_request(Method::POST, "/login", creds, None)).await;
    let bearer = format!("Bearer {}", body["accessToken"].as_str().unwrap());

    let (status, _) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/add",
            json!({"email": "Mixed@X.com", "name": "crate"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, get("/add?email=MIXED@x.com", Some(&bearer))).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["email"], "mixed@x.com");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (app, _, _) = test_app();
    let creds = json!({"email": "u@test.com", "password": "pw"});

    let (status, _) = send(
        app.clone(),
        json_request(Method::POST, "/register", creds.clone(), None),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/register",
            json!({"email": "U@TEST.com", "password": "other"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"message": "Email already registered"}));
}

#[tokio::test]
async fn register_validates_input() {
    let (app, _, _) = test_app();
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/register",
            json!({"email": "u@test.com", "password": ""}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "password is required"}));
}

// -- Inventory / reports / my items -------------------------------------------

#[tokio::test]
async fn inventory_list_and_lookup() {
    let (app, _, store) = test_app();
    store
        .insert_one("items", doc(json!({"_id": "i-1", "name": "hammer", "quantity": 4})))
        .await
        .unwrap();

    let (status, body) = send(app.clone(), get("/inventory", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(app.clone(), get("/inventory/i-1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "hammer");

    let (status, body) = send(app, get("/inventory/missing", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn quantity_update_sets_existing_item() {
    let (app, _, store) = test_app();
    store
        .insert_one("items", doc(json!({"_id": "i-1", "name": "hammer", "quantity": 4})))
        .await
        .unwrap();

    let (status, body) = send(
        app,
        json_request(Method::PUT, "/inventory/i-1", json!({"updatedQtty": "3"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "acknowledged": true,
            "matchedCount": 1,
            "modifiedCount": 1,
            "upsertedCount": 0,
            "upsertedId": null
        })
    );

    let item = store
        .find_one("items", &warehouse_api::repos::id_filter("i-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item["quantity"], 3);
    assert_eq!(item["name"], "hammer");
}

#[tokio::test]
async fn quantity_update_upserts_missing_item() {
    let (app, _, store) = test_app();

    let (status, body) = send(
        app,
        json_request(Method::PUT, "/inventory/i-7", json!({"updatedQtty": 7}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upsertedId"], "i-7");

    let item = store
        .find_one("items", &warehouse_api::repos::id_filter("i-7"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(Value::Object(item), json!({"_id": "i-7", "quantity": 7}));
}

#[tokio::test]
async fn non_numeric_quantity_is_400() {
    let (app, _, _) = test_app();
    let (status, body) = send(
        app,
        json_request(Method::PUT, "/inventory/i-1", json!({"updatedQtty": "lots"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "updatedQtty must be an integer"}));
}

#[tokio::test]
async fn reports_are_listed() {
    let (app, _, store) = test_app();
    store
        .insert_one("report", doc(json!({"month": "2026-09", "delivered": 12})))
        .await
        .unwrap();

    let (status, body) = send(app, get("/report", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["delivered"], 12);
}

#[tokio::test]
async fn add_then_delete_my_item() {
    let (app, _, store) = test_app();

    let (status, body) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/add",
            json!({"email": "a@x.com", "name": "ladder"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["acknowledged"], true);
    let id = body["insertedId"].as_str().unwrap().to_string();

    let (status, body) = send(
        app.clone(),
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/add/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"acknowledged": true, "deletedCount": 1}));

    assert!(store.find("add", &Document::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_json_400() {
    let (app, state, _) = test_app();
    let bearer = format!("Bearer {}", token_for(&state, "a@x.com"));

    let cases = [
        raw_request(Method::POST, "/add", "{not json", None),
        raw_request(Method::POST, "/register", "{\"email\": ", None),
        raw_request(Method::POST, "/orders", "[1, 2", Some(&bearer)),
    ];
    for request in cases {
        let (status, body) = send(app.clone(), request).await;
        assert_bad_request(status, &body, "JSON");
    }
}

#[tokio::test]
async fn quantity_update_without_field_is_400() {
    let (app, _, store) = test_app();
    let (status, body) = send(
        app,
        json_request(Method::PUT, "/inventory/x", json!({}), None),
    )
    .await;
    assert_bad_request(status, &body, "missing field `updatedQtty`");
    assert!(store.find("items", &Document::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_content_type_is_400() {
    let (app, _, _) = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .body(Body::from(r#"{"email":"u@test.com","password":"pw"}"#))
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_bad_request(status, &body, "Content-Type");
}

#[tokio::test]
async fn malformed_query_is_400() {
    let (app, state, _) = test_app();
    let bearer = format!("Bearer {}", token_for(&state, "a@x.com"));

    let (status, body) = send(
        app,
        get("/orders?email=a@x.com&email=b@x.com", Some(&bearer)),
    )
    .await;
    assert_bad_request(status, &body, "email");
}

#[tokio::test]
async fn non_object_bodies_are_rejected() {
    let (app, _, _) = test_app();
    let (status, body) = send(app, json_request(Method::POST, "/add", json!([1, 2]), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "request body must be a JSON object"}));
}

// -- Upstream failures --------------------------------------------------------

#[tokio::test]
async fn store_failures_are_500() {
    let auth = Arc::new(AccessJwt::new(SECRET.as_bytes(), 86_400, 0));
    let state = AppState::new(Arc::new(UnreachableStore), auth);
    let app = warehouse_api::router(state.clone());
    let bearer = format!("Bearer {}", token_for(&state, "a@x.com"));

    let requests = [
        get("/inventory", None),
        get("/report", None),
        get("/add?email=a@x.com", Some(&bearer)),
        json_request(Method::POST, "/add", json!({"name": "x"}), None),
    ];

    for request in requests {
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Internal Server Error"}));
    }
}
