// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! End-to-end webhook tests against mocked restart and probe backends.

mod common;

use std::time::Duration;

use axum::http::StatusCode;

use novamart_core::ServiceName;
use novamart_rollback::probe::MockHealthProbe;

use common::{fixture, rollback_body, send};

#[tokio::test]
async fn rollback_succeeds_end_to_end() {
    let f = fixture(MockHealthProbe::always_healthy("v1.0")).await;

    let (status, body) = send(
        &f.router,
        "POST",
        "/rollback",
        Some(rollback_body("order-service", "v1.0")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["from_version"], "v1.1-bad");
    assert_eq!(body["to_version"], "v1.0");
    assert!(body["rollback_id"]
        .as_str()
        .unwrap()
        .starts_with("rb-"));
    assert_eq!(f.restarter.calls(), vec![ServiceName::Order]);

    let contents = tokio::fs::read_to_string(&f.env_path).await.unwrap();
    assert!(contents.contains("ORDER_SERVICE_VERSION=v1.0"));
    // Unrelated lines survive the rewrite.
    assert!(contents.contains("# workshop stack versions"));
    assert!(contents.contains("INVENTORY_SERVICE_VERSION=v1.0"));
}

#[tokio::test]
async fn unknown_target_version_is_400() {
    let f = fixture(MockHealthProbe::always_healthy("v1.0")).await;

    let (status, body) = send(
        &f.router,
        "POST",
        "/rollback",
        Some(rollback_body("order-service", "v7.0")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_kind"], "validation_error");
    assert!(f.restarter.calls().is_empty());
}

#[tokio::test]
async fn unknown_service_is_rejected_by_deserialization() {
    let f = fixture(MockHealthProbe::always_healthy("v1.0")).await;

    let (status, _) = send(
        &f.router,
        "POST",
        "/rollback",
        Some(rollback_body("billing-service", "v1.0")),
    )
    .await;

    // serde refuses the service name before the executor ever runs.
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(f.restarter.calls().is_empty());
}

#[tokio::test]
async fn repeated_rollback_is_idempotent() {
    let f = fixture(MockHealthProbe::always_healthy("v1.0")).await;

    let (first, _) = send(
        &f.router,
        "POST",
        "/rollback",
        Some(rollback_body("order-service", "v1.0")),
    )
    .await;
    let bytes_after_first = tokio::fs::read(&f.env_path).await.unwrap();
    let mtime_after_first = tokio::fs::metadata(&f.env_path)
        .await
        .unwrap()
        .modified()
        .unwrap();

    let (second, body) = send(
        &f.router,
        "POST",
        "/rollback",
        Some(rollback_body("order-service", "v1.0")),
    )
    .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("nothing to do"));
    // Only the first attempt restarted anything.
    assert_eq!(f.restarter.calls().len(), 1);

    // The repeat must leave the config file byte-for-byte untouched.
    let meta = tokio::fs::metadata(&f.env_path).await.unwrap();
    assert_eq!(tokio::fs::read(&f.env_path).await.unwrap(), bytes_after_first);
    assert_eq!(meta.modified().unwrap(), mtime_after_first);
}

#[tokio::test]
async fn concurrent_rollback_is_409() {
    let f = fixture(MockHealthProbe::always_healthy("v1.0")).await;
    f.restarter.delay(Duration::from_millis(150));

    let router = f.router.clone();
    let first = tokio::spawn(async move {
        send(
            &router,
            "POST",
            "/rollback",
            Some(rollback_body("order-service", "v1.0")),
        )
        .await
    });
    tokio::time::sleep(Duration::from_millis(30)).await;

    let (status, body) = send(
        &f.router,
        "POST",
        "/rollback",
        Some(rollback_body("order-service", "v1.0")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_kind"], "rollback_in_progress");

    let (first_status, first_body) = first.await.unwrap();
    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(first_body["success"], true);
}

#[tokio::test]
async fn verification_timeout_is_504_and_keeps_target() {
    let f = fixture(MockHealthProbe::always_down()).await;

    let (status, body) = send(
        &f.router,
        "POST",
        "/rollback",
        Some(rollback_body("order-service", "v1.0")),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error_kind"], "verification_timeout_error");

    // The env file stays at the target; nothing reverts automatically.
    let contents = tokio::fs::read_to_string(&f.env_path).await.unwrap();
    assert!(contents.contains("ORDER_SERVICE_VERSION=v1.0"));
}

#[tokio::test]
async fn status_reports_versions_and_history() {
    let f = fixture(MockHealthProbe::always_healthy("v1.0")).await;

    send(
        &f.router,
        "POST",
        "/rollback",
        Some(rollback_body("order-service", "v1.0")),
    )
    .await;

    let (status, body) = send(&f.router, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_versions"]["order-service"], "v1.0");
    assert_eq!(body["total_rollbacks"], 1);
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["success"], true);
    assert_eq!(history[0]["from_version"], "v1.1-bad");
}

#[tokio::test]
async fn ready_reflects_env_file_and_restarter() {
    let f = fixture(MockHealthProbe::always_healthy("v1.0")).await;

    let (status, body) = send(&f.router, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);

    f.restarter.set_unavailable();
    let (status, body) = send(&f.router, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["checks"]["restarter"], false);
}

#[tokio::test]
async fn index_lists_endpoints() {
    let f = fixture(MockHealthProbe::always_healthy("v1.0")).await;
    let (status, body) = send(&f.router, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "rollback-webhook");
}
