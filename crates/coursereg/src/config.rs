//! Server configuration, read from `COURSEREG_*` environment variables

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{RegistrarError, Result};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DB_PATH: &str = "coursereg.sqlite3";
pub const DEFAULT_LOGIN_URL: &str = "/accounts/login/";
pub const DEFAULT_IDENTITY_HEADER: &str = "x-student-id";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub addr: SocketAddr,
    /// SQLite database file
    pub db_path: String,
    /// Directory of catalog JSON files applied at startup, if any
    pub seed_dir: Option<PathBuf>,
    /// Where unauthenticated requests are redirected
    pub login_url: String,
    /// Header carrying the authenticated student's profile id
    pub identity_header: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            db_path: DEFAULT_DB_PATH.to_string(),
            seed_dir: None,
            login_url: DEFAULT_LOGIN_URL.to_string(),
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_string)
    }

    /// Builds configuration from an arbitrary variable lookup. Unset variables keep
    /// their defaults; a set but unparseable address is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let addr = match lookup("COURSEREG_ADDR") {
            Some(raw) => raw.parse().map_err(|e| RegistrarError::InvalidInput {
                message: format!("COURSEREG_ADDR '{raw}' is not a socket address: {e}"),
            })?,
            None => defaults.addr,
        };

        Ok(Self {
            addr,
            db_path: lookup("COURSEREG_DB_PATH").unwrap_or(defaults.db_path),
            seed_dir: lookup("COURSEREG_SEED_DIR").map(PathBuf::from),
            login_url: lookup("COURSEREG_LOGIN_URL").unwrap_or(defaults.login_url),
            identity_header: lookup("COURSEREG_IDENTITY_HEADER")
                .map(|h| h.to_ascii_lowercase())
                .unwrap_or(defaults.identity_header),
        })
    }
}
