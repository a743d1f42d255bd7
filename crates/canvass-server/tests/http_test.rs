//! Router tests for the security-check endpoint, backed by in-memory
//! SurrealDB.

use std::sync::Arc;

use axum::Router;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use canvass_access::{AccessConfig, AccessDecisionService};
use canvass_core::models::identity::{CreateIdentity, IdentityStatus};
use canvass_core::repository::{AuditLogRepository, DeviceStateRepository, IdentityRepository};
use canvass_db::repository::{
    SurrealAuditLogRepository, SurrealDeviceStateRepository, SurrealIdentityRepository,
};
use canvass_server::{CheckResponse, app, cors_layer};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tower::ServiceExt;

async fn setup() -> (Router, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    canvass_db::run_migrations(&db).await.unwrap();

    let identities = SurrealIdentityRepository::new(db.clone());
    for (id, role) in [("adm", "admin"), ("mon", "monitor"), ("vot", "voter")] {
        identities
            .create(CreateIdentity {
                id: id.into(),
                display_name: id.into(),
                role: role.into(),
                status: IdentityStatus::Active,
            })
            .await
            .unwrap();
    }

    let service = AccessDecisionService::new(
        identities,
        SurrealDeviceStateRepository::new(db.clone()),
        SurrealAuditLogRepository::new(db.clone()),
        AccessConfig {
            rate_limit: 2,
            ..AccessConfig::default()
        },
    );
    (app(Arc::new(service), cors_layer(None)), db)
}

async fn post(router: &Router, body: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .uri("/v1/security-check")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn check(identity_id: &str, action: &str, resource_type: &str) -> String {
    serde_json::json!({
        "identity_id": identity_id,
        "action": action,
        "resource_type": resource_type,
        "resource_id": "rec-9",
        "payload": {"note": "door knock"}
    })
    .to_string()
}

#[tokio::test]
async fn allowed_request_returns_200_with_role() {
    let (router, _db) = setup().await;

    let (status, body) = post(&router, &check("vot", "INSERT", "issues")).await;
    assert_eq!(status, StatusCode::OK);
    let resp: CheckResponse = serde_json::from_value(body).unwrap();
    assert!(resp.allowed);
    assert_eq!(resp.reason, "ok");
    assert_eq!(resp.role.as_deref(), Some("voter"));
    assert!(chrono::DateTime::parse_from_rfc3339(&resp.timestamp).is_ok());
}

#[tokio::test]
async fn policy_denial_returns_403_with_detail() {
    let (router, _db) = setup().await;

    let (status, body) = post(&router, &check("adm", "UPDATE", "salaries")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["allowed"], false);
    assert_eq!(body["reason"], "policy_denied");
    assert_eq!(body["detail"], "restricted_table_for_admin");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn gps_gate_follows_device_state() {
    let (router, db) = setup().await;

    let (status, body) = post(&router, &check("mon", "UPDATE", "voters")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "gps_inactive");

    SurrealDeviceStateRepository::new(db)
        .set_active("mon", true)
        .await
        .unwrap();
    let (status, _) = post(&router, &check("mon", "UPDATE", "voters")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rate_limit_returns_429() {
    let (router, _db) = setup().await;

    for _ in 0..3 {
        let (status, _) = post(&router, &check("adm", "DELETE", "voting_centers")).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = post(&router, &check("adm", "DELETE", "voting_centers")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["reason"], "rate_limit_exceeded");
}

#[tokio::test]
async fn unknown_identity_returns_403_and_is_audited() {
    let (router, db) = setup().await;

    let (status, body) = post(&router, &check("stranger", "READ", "voters")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "user_not_found");
    assert!(body.get("role").is_none());

    let entries = SurrealAuditLogRepository::new(db)
        .list_for_identity("stranger", 10)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].allowed);
    assert_eq!(entries[0].resource_id.as_deref(), Some("rec-9"));
    assert_eq!(entries[0].payload["note"], "door knock");
}

#[tokio::test]
async fn malformed_requests_fail_closed() {
    let (router, _db) = setup().await;

    for body in [
        check("adm", "PATCH", "voters"),
        r#"{"identity_id":"adm"}"#.to_string(),
        "not json".to_string(),
    ] {
        let (status, resp) = post(&router, &body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp["allowed"], false);
        assert_eq!(resp["reason"], "internal_error");
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let (router, _db) = setup().await;

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["status"], "ok");
}

#[tokio::test]
async fn preflight_is_answered_for_any_origin() {
    let (router, _db) = setup().await;

    let req = Request::builder()
        .uri("/v1/security-check")
        .method("OPTIONS")
        .header("origin", "https://field.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "apikey, content-type")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
