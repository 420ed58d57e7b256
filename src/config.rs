use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// 10 MiB, the upload cap for `/api/import`.
pub const DEFAULT_IMPORT_MAX_BYTES: usize = 10 << 20;

/// Server configuration loaded from environment variables.
///
/// | Env Var            | Default    |
/// |--------------------|------------|
/// | `CONDO_DB_PATH`    | `condo.db` |
/// | `HOST`             | `0.0.0.0`  |
/// | `PORT`             | `8080`     |
/// | `STATIC_DIR`       | `web`      |
/// | `IMPORT_MAX_BYTES` | 10 MiB     |
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub import_max_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("condo.db"),
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: PathBuf::from("web"),
            import_max_bytes: DEFAULT_IMPORT_MAX_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Internal(format!("PORT must be a valid u16, got {raw:?}")))?,
            None => defaults.port,
        };

        let import_max_bytes = match lookup("IMPORT_MAX_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                Error::Internal(format!("IMPORT_MAX_BYTES must be a byte count, got {raw:?}"))
            })?,
            None => defaults.import_max_bytes,
        };

        Ok(Config {
            db_path: lookup("CONDO_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            static_dir: lookup("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
            import_max_bytes,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Internal(format!("invalid bind address {}:{}: {e}", self.host, self.port)))
    }
}
