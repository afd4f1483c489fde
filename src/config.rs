//! Service configuration from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `HEARTRISK_ARTIFACT_DIR` | `models` |
//! | `HEARTRISK_BIND_ADDR` | `0.0.0.0:8000` |
//! | `HEARTRISK_REQUIRE_SIGNED_ARTIFACTS` | false |
//! | `HEARTRISK_ARTIFACT_PUBKEY_B64` / `HEARTRISK_ARTIFACT_PUBKEY_FILE` | unset |
//! | `HEARTRISK_LOG_MODE` | `auto` |
//! | `HEARTRISK_LOG_FILE` | `heartrisk.log` |

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::adapters::artifacts::ArtifactPolicy;

pub const ARTIFACT_DIR_ENV: &str = "HEARTRISK_ARTIFACT_DIR";
pub const BIND_ADDR_ENV: &str = "HEARTRISK_BIND_ADDR";
pub const REQUIRE_SIGNED_ENV: &str = "HEARTRISK_REQUIRE_SIGNED_ARTIFACTS";
pub const PUBKEY_B64_ENV: &str = "HEARTRISK_ARTIFACT_PUBKEY_B64";
pub const PUBKEY_FILE_ENV: &str = "HEARTRISK_ARTIFACT_PUBKEY_FILE";
pub const LOG_MODE_ENV: &str = "HEARTRISK_LOG_MODE";
pub const LOG_FILE_ENV: &str = "HEARTRISK_LOG_FILE";

const DEFAULT_ARTIFACT_DIR: &str = "models";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_LOG_FILE: &str = "heartrisk.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Failed to read {var} file: {source}")]
    Read {
        var: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    Stdout,
    Stderr,
    File,
    /// The binary's own console stream.
    #[default]
    Auto,
}

impl std::str::FromStr for LogMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "file" => Ok(Self::File),
            "auto" | "" => Ok(Self::Auto),
            other => Err(ConfigError::Invalid {
                var: LOG_MODE_ENV,
                reason: format!("expected stdout, stderr, file or auto, got {other:?}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub mode: LogMode,
    pub file: PathBuf,
}

impl LogConfig {
    /// # Errors
    /// Returns `ConfigError::Invalid` on an unknown log mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = lookup(LOG_MODE_ENV)
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or_default();
        let file = lookup(LOG_FILE_ENV)
            .map(|v| PathBuf::from(v.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
        Ok(Self { mode, file })
    }
}

/// Everything the server binary needs at start.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub artifact_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub artifact_policy: ArtifactPolicy,
}

/// Accepts `1|true|TRUE|yes|YES`; anything else is false.
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "YES")
}

impl ServiceConfig {
    /// # Errors
    /// Returns `ConfigError` on an unparseable address or unreadable key file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let artifact_dir = lookup(ARTIFACT_DIR_ENV)
            .map(|v| PathBuf::from(v.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT_DIR));

        let bind_raw = lookup(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: BIND_ADDR_ENV,
                reason: e.to_string(),
            })?;

        let require_signed = lookup(REQUIRE_SIGNED_ENV).is_some_and(|v| parse_bool(&v));

        // Inline key wins over a key file.
        let public_key_b64 = match (lookup(PUBKEY_B64_ENV), lookup(PUBKEY_FILE_ENV)) {
            (Some(b64), _) => Some(b64.trim().to_string()),
            (None, Some(path)) => {
                let content = fs::read_to_string(path.trim()).map_err(|source| ConfigError::Read {
                    var: PUBKEY_FILE_ENV,
                    source,
                })?;
                Some(content.trim().to_string())
            }
            (None, None) => None,
        };

        if require_signed && public_key_b64.is_none() {
            return Err(ConfigError::Invalid {
                var: REQUIRE_SIGNED_ENV,
                reason: format!("signed artifacts required but neither {PUBKEY_B64_ENV} nor {PUBKEY_FILE_ENV} is set"),
            });
        }

        Ok(Self {
            artifact_dir,
            bind_addr,
            artifact_policy: ArtifactPolicy {
                require_signed,
                public_key_b64,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[])).expect("config");
        assert_eq!(config.artifact_dir, PathBuf::from("models"));
        assert_eq!(config.bind_addr, "0.0.0.0:8000".parse::<SocketAddr>().expect("addr"));
        assert!(!config.artifact_policy.require_signed);
        assert!(config.artifact_policy.public_key_b64.is_none());

        let log = LogConfig::from_lookup(lookup_from(&[])).expect("log config");
        assert_eq!(log.mode, LogMode::Auto);
    }

    #[test]
    fn test_bool_parsing() {
        for v in ["1", "true", "TRUE", "yes", "YES"] {
            assert!(parse_bool(v), "{v}");
        }
        for v in ["0", "no", "false", "True", ""] {
            assert!(!parse_bool(v), "{v}");
        }
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = ServiceConfig::from_lookup(lookup_from(&[(BIND_ADDR_ENV, "localhost")]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::Invalid { var: BIND_ADDR_ENV, .. }));
    }

    #[test]
    fn test_require_signed_needs_public_key() {
        let err = ServiceConfig::from_lookup(lookup_from(&[(REQUIRE_SIGNED_ENV, "yes")]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::Invalid { var: REQUIRE_SIGNED_ENV, .. }));
    }

    #[test]
    fn test_public_key_from_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("pub.b64");
        fs::write(&path, "AAAA\n").expect("write");

        let config = ServiceConfig::from_lookup(lookup_from(&[
            (REQUIRE_SIGNED_ENV, "1"),
            (PUBKEY_FILE_ENV, path.to_str().expect("utf8 path")),
        ]))
        .expect("config");
        assert!(config.artifact_policy.require_signed);
        assert_eq!(config.artifact_policy.public_key_b64.as_deref(), Some("AAAA"));
    }

    #[test]
    fn test_log_mode_parsing() {
        let log = LogConfig::from_lookup(lookup_from(&[
            (LOG_MODE_ENV, "file"),
            (LOG_FILE_ENV, "/tmp/h.log"),
        ]))
        .expect("log config");
        assert_eq!(log.mode, LogMode::File);
        assert_eq!(log.file, PathBuf::from("/tmp/h.log"));

        let log = LogConfig::from_lookup(lookup_from(&[(LOG_MODE_ENV, "stderr")])).expect("stderr");
        assert_eq!(log.mode, LogMode::Stderr);

        assert!(LogConfig::from_lookup(lookup_from(&[(LOG_MODE_ENV, "syslog")])).is_err());
    }
}
