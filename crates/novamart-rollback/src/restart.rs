// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Service restart backends.
//!
//! The executor only needs "recreate this service with the current env file".
//! [`ComposeRestarter`] does that through Docker Compose; [`MockRestarter`]
//! stands in for tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use novamart_core::ServiceName;

/// Errors from restart operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RestartError {
    /// No usable compose binary on this host.
    #[error("no docker compose binary available")]
    ComposeUnavailable,

    /// The restart command could not be spawned.
    #[error("failed to run {command}: {source}")]
    Spawn {
        /// Command that failed to start.
        command: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The restart command exited non-zero.
    #[error("restart command exited with {code:?}: {stderr}")]
    CommandFailed {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
}

/// Abstract restart backend.
#[async_trait]
pub trait ServiceRestarter: Send + Sync + std::fmt::Debug {
    /// Short backend name used in logs.
    fn restarter_type(&self) -> &'static str;

    /// Recreate the service so it picks up the current env file.
    ///
    /// Returns a human-readable summary of what the backend did.
    async fn restart(&self, service: ServiceName) -> Result<String, RestartError>;

    /// Whether this backend can run on the current host.
    async fn is_available(&self) -> bool;
}

/// Restart backend driving Docker Compose.
///
/// Prefers the `docker compose` plugin and falls back to the standalone
/// `docker-compose` binary. The service is recreated with `up -d --no-deps`
/// so its dependencies stay untouched.
#[derive(Debug, Clone)]
pub struct ComposeRestarter {
    compose_file: PathBuf,
    env_file: PathBuf,
}

impl ComposeRestarter {
    /// Create a restarter for the given compose and env files.
    pub fn new(compose_file: PathBuf, env_file: PathBuf) -> Self {
        Self {
            compose_file,
            env_file,
        }
    }

    /// Resolve the compose command to use, if any.
    async fn compose_command(&self) -> Option<Vec<String>> {
        if run_probe("docker", &["compose", "version"]).await {
            return Some(vec!["docker".to_string(), "compose".to_string()]);
        }
        if run_probe("docker-compose", &["--version"]).await {
            return Some(vec!["docker-compose".to_string()]);
        }
        None
    }
}

async fn run_probe(program: &str, args: &[&str]) -> bool {
    match tokio::process::Command::new(program)
        .args(args)
        .output()
        .await
    {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

#[async_trait]
impl ServiceRestarter for ComposeRestarter {
    fn restarter_type(&self) -> &'static str {
        "docker-compose"
    }

    async fn restart(&self, service: ServiceName) -> Result<String, RestartError> {
        let mut command = self
            .compose_command()
            .await
            .ok_or(RestartError::ComposeUnavailable)?;
        let program = command.remove(0);

        let mut cmd = tokio::process::Command::new(&program);
        cmd.args(&command)
            .arg("-f")
            .arg(&self.compose_file)
            .arg("--env-file")
            .arg(&self.env_file)
            .args(["up", "-d", "--no-deps"])
            .arg(service.as_str());

        debug!(service = %service, program, "Running compose restart");
        let output = cmd.output().await.map_err(|source| RestartError::Spawn {
            command: program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(RestartError::CommandFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        info!(service = %service, "Compose recreated service");
        Ok(format!("recreated {service} via {program}"))
    }

    async fn is_available(&self) -> bool {
        self.compose_command().await.is_some()
    }
}

/// In-memory restart backend for tests.
#[derive(Debug, Default)]
pub struct MockRestarter {
    calls: Mutex<Vec<ServiceName>>,
    fail: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    unavailable: Mutex<bool>,
}

impl MockRestarter {
    /// Create a mock that succeeds instantly.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every restart fails with the given message.
    pub fn fail_with(self: &Arc<Self>, message: &str) {
        *lock(&self.fail) = Some(message.to_string());
    }

    /// Every restart sleeps before answering.
    pub fn delay(self: &Arc<Self>, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    /// Report the backend as unavailable.
    pub fn set_unavailable(self: &Arc<Self>) {
        *lock(&self.unavailable) = true;
    }

    /// Services restarted so far.
    pub fn calls(&self) -> Vec<ServiceName> {
        lock(&self.calls).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl ServiceRestarter for MockRestarter {
    fn restarter_type(&self) -> &'static str {
        "mock"
    }

    async fn restart(&self, service: ServiceName) -> Result<String, RestartError> {
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.calls).push(service);
        if let Some(message) = lock(&self.fail).clone() {
            return Err(RestartError::CommandFailed {
                code: Some(1),
                stderr: message,
            });
        }
        Ok(format!("mock restart of {service}"))
    }

    async fn is_available(&self) -> bool {
        !*lock(&self.unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let mock = MockRestarter::new();
        mock.restart(ServiceName::Order).await.unwrap();
        mock.restart(ServiceName::Payment).await.unwrap();
        assert_eq!(mock.calls(), vec![ServiceName::Order, ServiceName::Payment]);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockRestarter::new();
        mock.fail_with("boom");
        let err = mock.restart(ServiceName::Order).await.unwrap_err();
        assert!(matches!(err, RestartError::CommandFailed { .. }));
    }

    #[tokio::test]
    async fn test_mock_availability_knob() {
        let mock = MockRestarter::new();
        assert!(mock.is_available().await);
        mock.set_unavailable();
        assert!(!mock.is_available().await);
    }
}
