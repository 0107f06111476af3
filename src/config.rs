use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::DbError;

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_max_size() -> usize {
    16
}

/// Process configuration for a database pool.
///
/// Credentials live in a separate secret file (`credentials_file`) and are
/// merged into the pool configuration at construction time, never stored
/// alongside the rest of the config.
#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    /// Path to a JSON file holding `{"user": ..., "password": ...}`.
    pub credentials_file: PathBuf,
    #[serde(default)]
    pub pool: PoolSettings,
    /// Session timezone, applied to every pooled connection.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Pool sizing and timeout knobs.
///
/// `None` timeouts mean no ceiling; the underlying pool then applies its own
/// policy, mirroring the driver-delegation contract.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSettings {
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// Ceiling on waiting for (or establishing) a connection, in milliseconds.
    #[serde(default)]
    pub connection_timeout_ms: Option<u64>,
    /// How long an idle connection may sit before it is pruned. Pruning
    /// happens lazily, at acquisition time.
    #[serde(default)]
    pub idle_timeout_ms: Option<u64>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            max_size: default_max_size(),
            connection_timeout_ms: None,
            idle_timeout_ms: None,
        }
    }
}

impl PoolSettings {
    pub(crate) fn pool_config(&self) -> deadpool::managed::PoolConfig {
        let mut cfg = deadpool::managed::PoolConfig::new(self.max_size);
        // recycle is deadpool's ceiling on a single recycle operation, not an
        // idle bound; idle pruning is handled at acquisition time instead
        cfg.timeouts = deadpool::managed::Timeouts {
            wait: self.connection_timeout_ms.map(Duration::from_millis),
            create: self.connection_timeout_ms.map(Duration::from_millis),
            recycle: None,
        };
        cfg
    }

    pub(crate) fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_ms.map(Duration::from_millis)
    }
}

/// Database credentials, loaded from a secret file outside the main config.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

// Manual Debug so the password never lands in logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read credentials from a JSON file.
    ///
    /// # Errors
    /// Returns `DbError::ConfigError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, DbError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DbError::ConfigError(format!(
                "cannot read credentials file {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            DbError::ConfigError(format!(
                "cannot parse credentials file {}: {e}",
                path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_settings_defaults() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_size, 16);
        assert!(settings.connection_timeout_ms.is_none());
        assert!(settings.idle_timeout_ms.is_none());
    }

    #[test]
    fn pool_config_maps_timeouts() {
        let settings = PoolSettings {
            max_size: 4,
            connection_timeout_ms: Some(250),
            idle_timeout_ms: Some(1_000),
        };
        let cfg = settings.pool_config();
        assert_eq!(cfg.max_size, 4);
        assert_eq!(cfg.timeouts.wait, Some(Duration::from_millis(250)));
        assert_eq!(cfg.timeouts.create, Some(Duration::from_millis(250)));
        // the idle bound never lands on the recycle-operation ceiling
        assert_eq!(cfg.timeouts.recycle, None);
        assert_eq!(settings.idle_timeout(), Some(Duration::from_millis(1_000)));
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials {
            user: "app".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: DbConfig = serde_json::from_str(
            r#"{"host":"localhost","port":5432,"dbname":"app","credentials_file":"/tmp/creds.json"}"#,
        )
        .unwrap();
        assert_eq!(cfg.timezone, "UTC");
        assert_eq!(cfg.pool.max_size, 16);
    }
}
