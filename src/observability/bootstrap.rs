//! Best-effort startup diagnostics.
//!
//! # Responsibilities
//! - Append timestamped lines to `tmp/startup.log`
//! - Persist a snapshot of the hosting environment to `tmp/env-snapshot.json`
//! - Record panics that happen outside request handling
//!
//! Nothing in this module returns an error. Failed directory creation or
//! writes are dropped so logging can never take the process down.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::config::EnvSource;

pub const LOG_FILE: &str = "startup.log";
pub const SNAPSHOT_FILE: &str = "env-snapshot.json";

/// Variables captured into the environment snapshot.
pub const SNAPSHOT_VARS: [&str; 8] = [
    "NODE_ENV",
    "PORT",
    "PASSENGER_APP_PORT",
    "API_PORT",
    "FRONTEND_ORIGINS",
    "APP_URL",
    "PASSENGER_APP_ENV",
    "PASSENGER_APP_ROOT",
];

/// File logger usable before any other logging exists.
#[derive(Debug, Clone)]
pub struct BootstrapLogger {
    dir: PathBuf,
}

impl BootstrapLogger {
    /// Logger writing under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Logger writing under `<cwd>/tmp`.
    pub fn in_working_dir() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(cwd.join("tmp"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    /// Append `[<timestamp>] <message>` to the startup log.
    pub fn log(&self, message: impl AsRef<str>) {
        let line = format!("[{}] {}\n", timestamp(), message.as_ref());
        let _ = self.append(&line);
    }

    /// Overwrite the snapshot file with `snapshot` as pretty JSON.
    pub fn write_snapshot(&self, snapshot: &EnvSnapshot) {
        let _ = self.write_json(snapshot);
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())?;
        file.write_all(line.as_bytes())
    }

    fn write_json(&self, snapshot: &EnvSnapshot) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let body = serde_json::to_vec_pretty(snapshot)?;
        fs::write(self.snapshot_path(), body)
    }

    /// Route panics through the startup log, then to the previous hook.
    pub fn install_panic_hook(&self) {
        let logger = self.clone();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            logger.log(format!("panic: {info}"));
            previous(info);
        }));
    }
}

/// Values of [`SNAPSHOT_VARS`] at startup. Unset variables are recorded as
/// empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EnvSnapshot(BTreeMap<String, String>);

impl EnvSnapshot {
    pub fn capture(env: &impl EnvSource) -> Self {
        Self(
            SNAPSHOT_VARS
                .iter()
                .map(|key| (key.to_string(), env.var(key).unwrap_or_default()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The one-line `boot:` summary written before anything else.
    pub fn boot_line(&self) -> String {
        format!(
            "boot: NODE_ENV={} PORT={} PASSENGER_APP_PORT={} API_PORT={}",
            self.get("NODE_ENV").unwrap_or_default(),
            self.get("PORT").unwrap_or_default(),
            self.get("PASSENGER_APP_PORT").unwrap_or_default(),
            self.get("API_PORT").unwrap_or_default(),
        )
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
