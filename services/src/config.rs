use serde::Deserialize;
use snapfeed_utils::version_info::RuntimeEnv;
use std::env::vars;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::info;

/// Content types accepted by `POST /upload`.
pub const ALLOWED_UPLOAD_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// URL prefix under which the upload directory is served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_LOCAL_PORT: u16 = 8000;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Env {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "test")]
    Test,
    #[serde(rename = "prod")]
    Prod,
}

impl From<&Env> for RuntimeEnv {
    fn from(env: &Env) -> Self {
        match env {
            Env::Local => Self::Local,
            Env::Test => Self::Test,
            Env::Prod => Self::Prod,
        }
    }
}

impl Display for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(RuntimeEnv::from(self).label())
    }
}

// Validated configuration. Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    env: Env,
    database_url: String,
    database_max_connections: u32,
    server_addr: String,
    port: u16,
    upload_dir: PathBuf,
    max_upload_size_bytes: u64,
}

// Raw environment variables; everything except `DATABASE_URL` may be absent.
#[derive(Deserialize)]
struct RawConfig {
    env: Option<Env>,
    database_url: String,
    database_max_connections: Option<u32>,
    server_addr: Option<String>,
    port: Option<u16>,
    upload_dir: Option<String>,
    max_upload_size_bytes: Option<u64>,
}

impl Config {
    /// Create a test configuration with default values.
    ///
    /// Available to both unit and integration tests. Not for production use.
    pub fn new_for_test() -> Self {
        Self {
            env: Env::Test,
            database_url: "postgres://localhost:5432/snapfeed_test".to_owned(),
            database_max_connections: 1,
            server_addr: "127.0.0.1".to_owned(),
            port: DEFAULT_LOCAL_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_size_bytes: DEFAULT_MAX_UPLOAD_SIZE_BYTES,
        }
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size_bytes = bytes;
        self
    }

    pub fn environment(&self) -> &Env {
        &self.env
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn database_max_connections(&self) -> u32 {
        self.database_max_connections
    }

    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_bytes
    }

    pub fn allowed_content_types(&self) -> &'static [&'static str] {
        ALLOWED_UPLOAD_CONTENT_TYPES
    }

    pub fn is_local(&self) -> bool {
        matches!(self.env, Env::Local)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self.env, Env::Prod)
    }

    /// Reads configuration from environment variables and applies
    /// environment-aware defaults.
    pub fn init() -> anyhow::Result<Self> {
        info!("Loading configuration from environment variables");

        let raw_config: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw_config)
    }

    fn from_raw(raw_config: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            env,
            database_url,
            database_max_connections,
            server_addr,
            port,
            upload_dir,
            max_upload_size_bytes,
        } = raw_config;

        let env = env.unwrap_or(Env::Local);

        // .env files often quote values
        let database_url = database_url
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_owned();
        if database_url.is_empty() {
            anyhow::bail!("DATABASE_URL must not be empty");
        }

        let server_addr = match server_addr {
            Some(addr) => {
                info!("Using provided SERVER_ADDR: {}", addr);
                addr
            }
            None => {
                let default_addr = match env {
                    Env::Local => "127.0.0.1",
                    _ => "0.0.0.0",
                };
                info!(
                    "SERVER_ADDR not set, defaulting to {} for {} environment",
                    default_addr, env
                );
                default_addr.to_owned()
            }
        };

        let port = match port {
            Some(port) => port,
            None if matches!(env, Env::Local) => {
                info!(
                    "PORT not set, defaulting to {} for local environment",
                    DEFAULT_LOCAL_PORT
                );
                DEFAULT_LOCAL_PORT
            }
            None => anyhow::bail!("PORT must be set for {} environment", env),
        };

        let upload_dir = PathBuf::from(upload_dir.unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_owned()));

        let max_upload_size_bytes = max_upload_size_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_BYTES);
        if max_upload_size_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_SIZE_BYTES must be greater than zero");
        }

        Ok(Self {
            env,
            database_url,
            database_max_connections: database_max_connections
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
            server_addr,
            port,
            upload_dir,
            max_upload_size_bytes,
        })
    }
}
