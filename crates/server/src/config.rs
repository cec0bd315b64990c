use std::{fs, path::PathBuf, time::Duration};

use anyhow::Context;
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    /// JSON catalog to serve instead of the embedded mock data.
    pub catalog_path: Option<PathBuf>,
    pub simulated_latency_ms: u64,
    /// Origins allowed by CORS; empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            catalog_path: None,
            simulated_latency_ms: 0,
            allowed_origins: Vec::new(),
        }
    }
}

impl Settings {
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    catalog_path: Option<PathBuf>,
    simulated_latency_ms: Option<u64>,
    allowed_origins: Option<Vec<String>>,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let file = match fs::read_to_string(SETTINGS_FILE) {
        Ok(raw) => Some(raw),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
        Err(error) => {
            return Err(error).with_context(|| format!("failed to read {SETTINGS_FILE}"));
        }
    };
    resolve_settings(file.as_deref(), |name| std::env::var(name).ok())
}

/// Layers `file` (TOML) and then environment overrides over the defaults.
///
/// Both the bare and the `APP__`-prefixed variable names are read; the
/// prefixed one wins.
pub fn resolve_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        let file_cfg: FileSettings =
            toml::from_str(raw).with_context(|| format!("invalid {SETTINGS_FILE}"))?;
        if let Some(v) = file_cfg.bind_addr {
            settings.server_bind = v;
        }
        if let Some(v) = file_cfg.catalog_path {
            settings.catalog_path = Some(v);
        }
        if let Some(v) = file_cfg.simulated_latency_ms {
            settings.simulated_latency_ms = v;
        }
        if let Some(v) = file_cfg.allowed_origins {
            settings.allowed_origins = v;
        }
    }

    let lookup = |name: &str| env(&format!("APP__{name}")).or_else(|| env(name));

    if let Some(v) = lookup("BIND_ADDR").or_else(|| env("SERVER_BIND")) {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("CATALOG_PATH") {
        settings.catalog_path = (!v.trim().is_empty()).then(|| PathBuf::from(v));
    }
    if let Some(v) = lookup("SIMULATED_LATENCY_MS") {
        settings.simulated_latency_ms = v
            .trim()
            .parse()
            .with_context(|| format!("SIMULATED_LATENCY_MS must be an integer, got '{v}'"))?;
    }
    if let Some(v) = lookup("ALLOWED_ORIGINS") {
        settings.allowed_origins = v
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
    }

    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
