//! Configuration structures for the bond reconciliation system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reconciliation configuration.
    pub reconcile: ReconcileConfig,
    /// Store configuration.
    pub store: StoreConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a JSON file. Missing sections take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BOND_*` environment variable overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("BOND_DB_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(bind) = lookup("BOND_BIND") {
            self.server.bind = bind;
        }
        if let Some(raw) = lookup("BOND_LOG_JSON") {
            self.server.log_json = match raw.as_str() {
                "1" | "true" | "TRUE" | "yes" | "YES" => true,
                "0" | "false" | "FALSE" | "no" | "NO" => false,
                other => return Err(Error::config(format!("invalid BOND_LOG_JSON value '{other}'"))),
            };
        }
        if let Some(status) = lookup("BOND_EXPIRED_STATUS") {
            self.reconcile.expired_status = status;
        }
        self.validate()
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.reconcile.expired_status.trim().is_empty() {
            return Err(Error::config("reconcile.expired_status must not be empty"));
        }
        if self.server.bind.trim().is_empty() {
            return Err(Error::config("server.bind must not be empty"));
        }
        Ok(())
    }
}

/// What to do with a purchase-only bond whose status is not expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnredeemedPolicy {
    /// Classify as `UnmatchedPending`.
    #[default]
    Pending,
    /// Abort reconciliation with `UnclassifiedBond`.
    Reject,
}

/// Reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Status marking an expired purchase (compared case-insensitively).
    pub expired_status: String,
    /// Policy for purchase-only bonds that are not expired.
    pub unredeemed_policy: UnredeemedPolicy,
    /// Fail instead of warning when matched amounts differ.
    pub reject_amount_mismatch: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            expired_status: "Expired".to_string(),
            unredeemed_policy: UnredeemedPolicy::Pending,
            reject_amount_mismatch: false,
        }
    }
}

impl ReconcileConfig {
    /// Does this purchase status mark an expired bond?
    pub fn is_expired(&self, status: &str) -> bool {
        status.trim().eq_ignore_ascii_case(self.expired_status.trim())
    }
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/electoral-bonds.sqlite"),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
    /// Emit JSON log lines.
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.reconcile.expired_status, "Expired");
        assert_eq!(config.reconcile.unredeemed_policy, UnredeemedPolicy::Pending);
        assert!(!config.reconcile.reject_amount_mismatch);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json_str(
            r#"{"reconcile": {"unredeemed_policy": "reject"}, "store": {"path": "x.sqlite"}}"#,
        )
        .unwrap();
        assert_eq!(config.reconcile.unredeemed_policy, UnredeemedPolicy::Reject);
        assert_eq!(config.store.path, PathBuf::from("x.sqlite"));
        assert_eq!(config.reconcile.expired_status, "Expired");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BOND_DB_PATH", "/tmp/b.sqlite"),
            ("BOND_BIND", "127.0.0.1:9000"),
            ("BOND_LOG_JSON", "yes"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.store.path, PathBuf::from("/tmp/b.sqlite"));
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert!(config.server.log_json);
    }

    #[test]
    fn test_invalid_bool_override_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|k| (k == "BOND_LOG_JSON").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_empty_expired_status_rejected() {
        assert!(Config::from_json_str(r#"{"reconcile": {"expired_status": "  "}}"#).is_err());
    }

    #[test]
    fn test_expired_status_is_case_insensitive() {
        let config = ReconcileConfig::default();
        assert!(config.is_expired("Expired"));
        assert!(config.is_expired(" expired "));
        assert!(!config.is_expired(""));
        assert!(!config.is_expired("Active"));
    }
}
