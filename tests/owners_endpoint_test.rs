use account_owner::api::{self, AppState};
use account_owner::db::{init_db, RepositoryWrapper};
use account_owner::domain::{Account, OwnerId, ACCOUNT_TYPE_DOMESTIC, ACCOUNT_TYPE_INTERNATIONAL};
use axum::http::{header, HeaderMap, StatusCode};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::str::FromStr;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    pool: SqlitePool,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path, 2).await.expect("init_db failed");
    let app = api::create_router(AppState::new(pool.clone()));

    TestApp {
        app,
        pool,
        _temp: temp_dir,
    }
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<&str>) -> TestResponse {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    let body = match body {
        Some(raw) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            axum::body::Body::from(raw.to_string())
        }
        None => axum::body::Body::empty(),
    };

    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

fn jane() -> String {
    json!({"name": "Jane Doe", "address": "1 Main St", "dateOfBirth": "1990-01-01"}).to_string()
}

async fn create(app: &axum::Router, body: &str) -> OwnerId {
    let resp = send(app, "POST", "/owners", Some(body)).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    OwnerId::from_str(resp.json()["id"].as_str().unwrap()).unwrap()
}

async fn seed_accounts(pool: &SqlitePool, owner_id: OwnerId, types: &[&str]) {
    let repo = RepositoryWrapper::new(pool.clone());
    for account_type in types {
        repo.account()
            .create(Account::new(owner_id, *account_type).unwrap());
    }
    repo.save().await.unwrap();
}

#[tokio::test]
async fn test_create_returns_created_with_location() {
    let t = setup_test_app().await;

    let resp = send(&t.app, "POST", "/owners", Some(&jane())).await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let json = resp.json();
    let id = json["id"].as_str().unwrap();
    assert!(OwnerId::from_str(id).is_ok());
    assert_eq!(json["name"], "Jane Doe");
    assert_eq!(json["address"], "1 Main St");
    assert_eq!(json["dateOfBirth"], "1990-01-01");

    let location = resp.headers.get(header::LOCATION).unwrap().to_str().unwrap();
    assert_eq!(location, format!("/owners/{}", id));

    let fetched = send(&t.app, "GET", location, None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json(), json);
}

#[tokio::test]
async fn test_create_ignores_client_supplied_id() {
    let t = setup_test_app().await;
    let body = json!({
        "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
        "name": "Jane Doe",
        "address": "1 Main St",
        "dateOfBirth": "1990-01-01"
    })
    .to_string();

    let id = create(&t.app, &body).await;
    assert_ne!(id.to_string(), "6f9619ff-8b86-d011-b42d-00cf4fc964ff");
}

#[tokio::test]
async fn test_create_null_body_is_bad_request() {
    let t = setup_test_app().await;

    let resp = send(&t.app, "POST", "/owners", Some("null")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["message"], "Owner object is null");

    let resp = send(&t.app, "POST", "/owners", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["message"], "Owner object is null");

    // empty body with a JSON content type
    let resp = send(&t.app, "POST", "/owners", Some("")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["statusCode"], 400);
    assert_eq!(resp.json()["message"], "Owner object is null");
}

#[tokio::test]
async fn test_create_invalid_payload_is_bad_request() {
    let t = setup_test_app().await;

    let cases = [
        json!({"address": "1 Main St", "dateOfBirth": "1990-01-01"}).to_string(),
        json!({"name": "Jane", "address": "1 Main St"}).to_string(),
        json!({"name": "n".repeat(61), "address": "1 Main St", "dateOfBirth": "1990-01-01"})
            .to_string(),
        json!({"name": "Jane", "address": "a".repeat(101), "dateOfBirth": "1990-01-01"})
            .to_string(),
        json!({"name": "Jane", "address": "1 Main St", "dateOfBirth": "not a date"}).to_string(),
        "{\"name\": ".to_string(),
    ];

    for body in &cases {
        let resp = send(&t.app, "POST", "/owners", Some(body)).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "body: {}", body);
        let message = resp.json()["message"].as_str().unwrap().to_string();
        assert!(message.starts_with("Invalid model object"), "got {}", message);
    }

    let list = send(&t.app, "GET", "/owners", None).await;
    assert_eq!(list.json(), json!([]));
}

#[tokio::test]
async fn test_get_all_owners_sorted_by_name() {
    let t = setup_test_app().await;
    create(
        &t.app,
        &json!({"name": "Zed", "address": "2 Side St", "dateOfBirth": "1980-05-05"}).to_string(),
    )
    .await;
    create(&t.app, &jane()).await;

    let resp = send(&t.app, "GET", "/owners", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let names: Vec<String> = resp
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Jane Doe", "Zed"]);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let t = setup_test_app().await;
    let missing = OwnerId::new_v4();

    let resp = send(&t.app, "GET", &format!("/owners/{}", missing), None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.body.is_empty());

    let resp = send(&t.app, "GET", &format!("/owners/{}/account", missing), None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = send(&t.app, "PUT", &format!("/owners/{}", missing), Some(&jane())).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = send(&t.app, "DELETE", &format!("/owners/{}", missing), None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let t = setup_test_app().await;

    let resp = send(&t.app, "GET", "/owners/not-a-uuid", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let json = resp.json();
    assert_eq!(json["statusCode"], 400);
    assert!(json["message"].is_string());

    let resp = send(&t.app, "PUT", "/owners/not-a-uuid", Some(&jane())).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["statusCode"], 400);

    let resp = send(&t.app, "DELETE", "/owners/not-a-uuid", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["statusCode"], 400);
}

#[tokio::test]
async fn test_update_replaces_fields_and_keeps_id() {
    let t = setup_test_app().await;
    let id = create(&t.app, &jane()).await;

    let update = json!({"name": "Jane Roe", "address": "9 Elm St", "dateOfBirth": "1991-02-03"})
        .to_string();
    let resp = send(&t.app, "PUT", &format!("/owners/{}", id), Some(&update)).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);
    assert!(resp.body.is_empty());

    let fetched = send(&t.app, "GET", &format!("/owners/{}", id), None).await.json();
    assert_eq!(fetched["id"], id.to_string());
    assert_eq!(fetched["name"], "Jane Roe");
    assert_eq!(fetched["address"], "9 Elm St");
    assert_eq!(fetched["dateOfBirth"], "1991-02-03");
}

#[tokio::test]
async fn test_update_validates_before_lookup() {
    let t = setup_test_app().await;
    let id = create(&t.app, &jane()).await;

    let resp = send(&t.app, "PUT", &format!("/owners/{}", id), Some("null")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    // invalid payloads win over missing ids
    let missing = OwnerId::new_v4();
    let resp = send(&t.app, "PUT", &format!("/owners/{}", missing), Some("{}")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let fetched = send(&t.app, "GET", &format!("/owners/{}", id), None).await.json();
    assert_eq!(fetched["name"], "Jane Doe");
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let t = setup_test_app().await;
    let id = create(&t.app, &jane()).await;

    let resp = send(&t.app, "DELETE", &format!("/owners/{}", id), None).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    let resp = send(&t.app, "GET", &format!("/owners/{}", id), None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = send(&t.app, "DELETE", &format!("/owners/{}", id), None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_owner_with_accounts_fails_and_keeps_owner() {
    let t = setup_test_app().await;
    let id = create(&t.app, &jane()).await;
    seed_accounts(&t.pool, id, &[ACCOUNT_TYPE_DOMESTIC]).await;

    let resp = send(&t.app, "DELETE", &format!("/owners/{}", id), None).await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.json()["statusCode"], 500);

    let resp = send(&t.app, "GET", &format!("/owners/{}", id), None).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_details_returns_only_own_accounts() {
    let t = setup_test_app().await;
    let jane_id = create(&t.app, &jane()).await;
    let other_id = create(
        &t.app,
        &json!({"name": "Other", "address": "3 Oak St", "dateOfBirth": "1970-07-07"}).to_string(),
    )
    .await;

    seed_accounts(
        &t.pool,
        jane_id,
        &[ACCOUNT_TYPE_DOMESTIC, ACCOUNT_TYPE_INTERNATIONAL, ACCOUNT_TYPE_DOMESTIC],
    )
    .await;
    seed_accounts(&t.pool, other_id, &[ACCOUNT_TYPE_DOMESTIC]).await;

    let resp = send(&t.app, "GET", &format!("/owners/{}/account", jane_id), None).await;
    assert_eq!(resp.status, StatusCode::OK);

    let json = resp.json();
    assert_eq!(json["id"], jane_id.to_string());
    assert_eq!(json["name"], "Jane Doe");
    let accounts = json["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 3);
    for account in accounts {
        assert_eq!(account["ownerId"], jane_id.to_string());
    }
}

#[tokio::test]
async fn test_details_for_owner_without_accounts() {
    let t = setup_test_app().await;
    let id = create(&t.app, &jane()).await;

    let resp = send(&t.app, "GET", &format!("/owners/{}/account", id), None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["accounts"], json!([]));
}
