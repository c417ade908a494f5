// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared fixtures for webhook integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use novamart_core::version_store::EnvFileStore;
use novamart_core::ServiceName;
use novamart_rollback::config::Config;
use novamart_rollback::http::{router, AppState};
use novamart_rollback::monitor::MonitorSettings;
use novamart_rollback::probe::MockHealthProbe;
use novamart_rollback::restart::MockRestarter;
use novamart_rollback::{ExecutorSettings, RollbackExecutor};

pub struct Fixture {
    pub router: Router,
    pub restarter: Arc<MockRestarter>,
    pub env_path: PathBuf,
    _dir: TempDir,
}

pub fn fast_settings() -> ExecutorSettings {
    ExecutorSettings {
        restart_timeout: Duration::from_millis(300),
        verify_timeout: Duration::from_millis(300),
        verify_interval: Duration::from_millis(10),
        ..ExecutorSettings::default()
    }
}

/// Webhook wired against mocks, with the env file seeded at `v1.1-bad`.
pub async fn fixture(probe: MockHealthProbe) -> Fixture {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    tokio::fs::write(
        &env_path,
        "# workshop stack versions\nORDER_SERVICE_VERSION=v1.1-bad\nINVENTORY_SERVICE_VERSION=v1.0\n",
    )
    .await
    .unwrap();
    let compose_path = dir.path().join("docker-compose.yml");
    tokio::fs::write(&compose_path, "services: {}\n").await.unwrap();

    let restarter = MockRestarter::new();
    let executor = Arc::new(RollbackExecutor::new(
        EnvFileStore::new(env_path.clone()),
        restarter.clone(),
        Arc::new(probe),
        fast_settings(),
    ));

    let config = Config {
        listen_addr: SocketAddr::from(([0, 0, 0, 0], 0)),
        service_version: "v1.0".to_string(),
        environment: "test".to_string(),
        env_file: env_path.clone(),
        compose_file: compose_path,
        service_urls: HashMap::from([(
            ServiceName::Order,
            "http://localhost:8080".to_string(),
        )]),
        executor: fast_settings(),
        monitor_enabled: false,
        monitor: MonitorSettings::default(),
    };

    Fixture {
        router: router(Arc::new(AppState {
            config,
            executor,
            restarter: restarter.clone(),
        })),
        restarter,
        env_path,
        _dir: dir,
    }
}

pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            axum::body::Body::from(value.to_string())
        }
        None => axum::body::Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Rejections (bad payloads) answer with plain text, not JSON.
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

pub fn rollback_body(service: &str, target: &str) -> serde_json::Value {
    serde_json::json!({
        "service": service,
        "target_version": target,
        "reason": "manual test",
    })
}
