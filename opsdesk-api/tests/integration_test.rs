/// End-to-end API tests against a live database
///
/// These verify the full request → store → response path: registration and
/// login, the whoami route, and the asset lifecycle including the
/// partial-update merge semantics.
///
/// They need `TEST_DATABASE_URL` pointing at a PostgreSQL instance the
/// suite may write to; each test skips itself when the variable is unset.

mod common;

use axum::http::StatusCode;
use chrono::DateTime;
use common::{body_json, register_user, request, send, TestContext};
use serde_json::json;
use uuid::Uuid;

macro_rules! require_db {
    () => {
        match TestContext::new().await {
            Some(ctx) => ctx,
            None => {
                eprintln!("TEST_DATABASE_URL not set; skipping");
                return;
            }
        }
    };
}

#[tokio::test]
async fn test_register_stores_hash_not_plaintext() {
    let ctx = require_db!();

    let password = "S3cure-enough-password";
    let (email, _token) = register_user(&ctx.app, password).await;

    let (stored_hash,): (String,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&ctx.db)
            .await
            .unwrap();

    assert_ne!(stored_hash, password);
    assert!(stored_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let ctx = require_db!();

    let (email, _token) = register_user(&ctx.app, "S3cure-enough-password").await;

    // Same email again, different case: still a conflict
    let response = send(
        &ctx.app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Someone Else",
                "email": email.to_uppercase(),
                "password": "another-long-password",
            })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_login_succeeds_and_failures_are_indistinguishable() {
    let ctx = require_db!();

    let password = "S3cure-enough-password";
    let (email, _token) = register_user(&ctx.app, password).await;

    // Correct password
    let response = send(
        &ctx.app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["token"].is_string());

    // Wrong password
    let wrong_password = send(
        &ctx.app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": "wrong-password" })),
        ),
    )
    .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password_body = body_json(wrong_password).await;

    // Unknown email
    let unknown_email = send(
        &ctx.app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({
                "email": format!("nobody-{}@example.com", Uuid::new_v4()),
                "password": password,
            })),
        ),
    )
    .await;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_email_body = body_json(unknown_email).await;

    // Neither status nor body may leak which check failed
    assert_eq!(wrong_password_body, unknown_email_body);
    assert_eq!(wrong_password_body["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_whoami_returns_caller_without_hash() {
    let ctx = require_db!();

    let (email, token) = register_user(&ctx.app, "S3cure-enough-password").await;

    let response = send(&ctx.app, request("GET", "/api/auth/", Some(&token), None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"].as_str().unwrap(), email);
    assert_eq!(body["name"], "Test User");
    assert_eq!(body["role"], "user");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_create_asset_minimal_body_gets_defaults() {
    let ctx = require_db!();

    let (_email, token) = register_user(&ctx.app, "S3cure-enough-password").await;

    let response = send(
        &ctx.app,
        request(
            "POST",
            "/api/assets",
            Some(&token),
            Some(json!({
                "name": "core-sw-01",
                "ip_address": "10.0.0.2",
                "type": "switch",
            })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let asset = body_json(response).await;

    assert!(asset["id"].is_string());
    assert_eq!(asset["status"], "active");
    assert_eq!(asset["tags"], json!([]));
    assert!(asset["password"].is_null());
    assert!(asset["department"].is_null());
    assert!(asset["last_updated"].is_string());

    // created_by is the caller embedded in the token
    let whoami = body_json(
        send(&ctx.app, request("GET", "/api/auth/", Some(&token), None)).await,
    )
    .await;
    assert_eq!(asset["created_by"], whoami["id"]);
}

#[tokio::test]
async fn test_partial_update_merges_and_refreshes_last_updated() {
    let ctx = require_db!();

    let (_email, token) = register_user(&ctx.app, "S3cure-enough-password").await;

    let created = body_json(
        send(
            &ctx.app,
            request(
                "POST",
                "/api/assets",
                Some(&token),
                Some(json!({
                    "name": "db-host-01",
                    "ip_address": "10.0.0.7",
                    "type": "server",
                    "location": "rack 4",
                    "username": "root",
                    "password": "initial-secret",
                })),
            ),
        )
        .await,
    )
    .await;
    let id = created["id"].as_str().unwrap();
    let created_at = DateTime::parse_from_rfc3339(created["last_updated"].as_str().unwrap()).unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    // Touch only status and notes; password key is absent
    let updated = body_json(
        send(
            &ctx.app,
            request(
                "PUT",
                &format!("/api/assets/{id}"),
                Some(&token),
                Some(json!({ "status": "maintenance", "notes": "planned window" })),
            ),
        )
        .await,
    )
    .await;

    assert_eq!(updated["status"], "maintenance");
    assert_eq!(updated["notes"], "planned window");
    // Untouched fields keep their stored values
    assert_eq!(updated["name"], "db-host-01");
    assert_eq!(updated["location"], "rack 4");
    assert_eq!(updated["username"], "root");
    assert_eq!(updated["password"], "initial-secret");

    let updated_at = DateTime::parse_from_rfc3339(updated["last_updated"].as_str().unwrap()).unwrap();
    assert!(updated_at > created_at, "last_updated must move forward");
}

#[tokio::test]
async fn test_update_password_explicit_empty_string_clears() {
    let ctx = require_db!();

    let (_email, token) = register_user(&ctx.app, "S3cure-enough-password").await;

    let created = body_json(
        send(
            &ctx.app,
            request(
                "POST",
                "/api/assets",
                Some(&token),
                Some(json!({
                    "name": "edge-fw-01",
                    "ip_address": "10.0.0.1",
                    "type": "firewall",
                    "password": "device-secret",
                })),
            ),
        )
        .await,
    )
    .await;
    let id = created["id"].as_str().unwrap();

    // Omitting the key leaves the credential alone
    let untouched = body_json(
        send(
            &ctx.app,
            request(
                "PUT",
                &format!("/api/assets/{id}"),
                Some(&token),
                Some(json!({ "notes": "audited" })),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(untouched["password"], "device-secret");

    // An explicit empty string clears it
    let cleared = body_json(
        send(
            &ctx.app,
            request(
                "PUT",
                &format!("/api/assets/{id}"),
                Some(&token),
                Some(json!({ "password": "" })),
            ),
        )
        .await,
    )
    .await;
    assert!(cleared["password"].is_null());
}

#[tokio::test]
async fn test_update_and_delete_unknown_id_not_found() {
    let ctx = require_db!();

    let (_email, token) = register_user(&ctx.app, "S3cure-enough-password").await;
    let missing = Uuid::new_v4();

    let update = send(
        &ctx.app,
        request(
            "PUT",
            &format!("/api/assets/{missing}"),
            Some(&token),
            Some(json!({ "name": "ghost" })),
        ),
    )
    .await;
    assert_eq!(update.status(), StatusCode::NOT_FOUND);

    let delete = send(
        &ctx.app,
        request("DELETE", &format!("/api/assets/{missing}"), Some(&token), None),
    )
    .await;
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_removes_asset_from_listing() {
    let ctx = require_db!();

    let (_email, token) = register_user(&ctx.app, "S3cure-enough-password").await;

    let created = body_json(
        send(
            &ctx.app,
            request(
                "POST",
                "/api/assets",
                Some(&token),
                Some(json!({
                    "name": "voip-gw-01",
                    "ip_address": "10.0.0.9",
                    "type": "gateway",
                })),
            ),
        )
        .await,
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let delete = send(
        &ctx.app,
        request("DELETE", &format!("/api/assets/{id}"), Some(&token), None),
    )
    .await;
    assert_eq!(delete.status(), StatusCode::OK);
    let body = body_json(delete).await;
    assert_eq!(body["message"], "Asset removed");

    let listing = body_json(
        send(&ctx.app, request("GET", "/api/assets", Some(&token), None)).await,
    )
    .await;
    let ids: Vec<&str> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert!(!ids.contains(&id.as_str()));
}

#[tokio::test]
async fn test_listing_orders_by_last_updated_descending() {
    let ctx = require_db!();

    let (_email, token) = register_user(&ctx.app, "S3cure-enough-password").await;

    let create = |name: &str| {
        json!({
            "name": name,
            "ip_address": "10.0.1.1",
            "type": "server",
        })
    };

    let first = body_json(
        send(
            &ctx.app,
            request("POST", "/api/assets", Some(&token), Some(create("order-a"))),
        )
        .await,
    )
    .await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let second = body_json(
        send(
            &ctx.app,
            request("POST", "/api/assets", Some(&token), Some(create("order-b"))),
        )
        .await,
    )
    .await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    // Touch the first asset so it becomes the most recently updated
    send(
        &ctx.app,
        request(
            "PUT",
            &format!("/api/assets/{}", first["id"].as_str().unwrap()),
            Some(&token),
            Some(json!({ "notes": "touched" })),
        ),
    )
    .await;

    let listing = body_json(
        send(&ctx.app, request("GET", "/api/assets", Some(&token), None)).await,
    )
    .await;
    let ids: Vec<&str> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();

    let first_pos = ids.iter().position(|id| *id == first["id"].as_str().unwrap());
    let second_pos = ids
        .iter()
        .position(|id| *id == second["id"].as_str().unwrap());

    assert!(
        first_pos.unwrap() < second_pos.unwrap(),
        "most recently updated asset must come first"
    );
}

#[tokio::test]
async fn test_listing_expands_creator_without_hash() {
    let ctx = require_db!();

    let (email, token) = register_user(&ctx.app, "S3cure-enough-password").await;

    let created = body_json(
        send(
            &ctx.app,
            request(
                "POST",
                "/api/assets",
                Some(&token),
                Some(json!({
                    "name": "expand-probe",
                    "ip_address": "10.0.2.1",
                    "type": "server",
                })),
            ),
        )
        .await,
    )
    .await;

    let listing = body_json(
        send(
            &ctx.app,
            request("GET", "/api/assets?expand=created_by", Some(&token), None),
        )
        .await,
    )
    .await;

    let entry = listing
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["id"] == created["id"])
        .expect("created asset should be listed");

    assert_eq!(entry["creator"]["name"], "Test User");
    assert_eq!(entry["creator"]["email"].as_str().unwrap(), email);
    assert!(entry["creator"].get("password_hash").is_none());
    assert!(entry["creator"].get("id").is_none());
}
