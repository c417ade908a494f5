// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flat `KEY=VALUE` version-state store.
//!
//! The env file is shared with docker compose and shell tooling, so two rules
//! hold for every write:
//!
//! 1. Unrelated lines (other keys, comments, blanks) keep their content and
//!    order.
//! 2. A concurrent reader never observes a partially written file: updates go
//!    to a temporary sibling which is renamed over the original.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Version store errors.
#[derive(Debug, Error)]
pub enum VersionStoreError {
    /// The env file does not exist.
    #[error("Environment file not found: {0}")]
    NotFound(PathBuf),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for version store operations.
pub type Result<T> = std::result::Result<T, VersionStoreError>;

/// Handle to a `KEY=VALUE` env file.
#[derive(Debug, Clone)]
pub struct EnvFileStore {
    path: PathBuf,
}

impl EnvFileStore {
    /// Create a store for the given file path. The file is not touched until
    /// the first read or write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the underlying file currently exists.
    pub async fn exists(&self) -> bool {
        tokio::fs::metadata(&self.path).await.is_ok()
    }

    /// Whether the underlying file can be opened for writing.
    ///
    /// Probes by opening in append mode; the file is not modified.
    pub async fn writable(&self) -> bool {
        tokio::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .is_ok()
    }

    /// Read the value for `key`, or `None` if the key is absent.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let contents = self.read_contents().await?;
        Ok(find_value(&contents, key))
    }

    /// Set `key` to `value`, replacing the first existing line for that key
    /// or appending one if absent. All other lines are preserved as-is.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let contents = self.read_contents().await?;
        let updated = rewrite(&contents, key, value);

        // Temp sibling + rename so readers only ever see a complete file.
        let mut tmp_name: OsString = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);

        tokio::fs::write(&tmp, updated).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(
            key = key,
            value = value,
            path = %self.path.display(),
            "Updated version state"
        );

        Ok(())
    }

    async fn read_contents(&self) -> Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VersionStoreError::NotFound(self.path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Find the value for `key` in env-file contents.
fn find_value(contents: &str, key: &str) -> Option<String> {
    for line in contents.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=')
            && k.trim() == key
        {
            return Some(v.trim().to_string());
        }
    }
    None
}

/// Rewrite env-file contents with `key` set to `value`.
///
/// Unrelated lines keep their exact bytes, including `\r\n` terminators and
/// a missing newline on the final line. The replaced line inherits the
/// terminator of the line it replaces.
fn rewrite(contents: &str, key: &str, value: &str) -> String {
    let mut out = String::with_capacity(contents.len() + key.len() + value.len() + 2);
    let mut replaced = false;

    for raw in contents.split_inclusive('\n') {
        let (line, terminator) = match raw.strip_suffix('\n') {
            Some(body) => match body.strip_suffix('\r') {
                Some(line) => (line, "\r\n"),
                None => (body, "\n"),
            },
            None => (raw, ""),
        };

        let trimmed = line.trim();
        let is_target = !replaced
            && !trimmed.starts_with('#')
            && trimmed
                .split_once('=')
                .is_some_and(|(k, _)| k.trim() == key);

        if is_target {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            replaced = true;
        } else {
            out.push_str(line);
        }
        out.push_str(terminator);
    }

    if !replaced {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }

    out
}
