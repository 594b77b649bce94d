//! Build-time version information.
//!
//! `build.rs` exports `BUILD_DATE` (RFC 3339) and `BUILD_COMMIT` (short hash,
//! or `unknown` outside a git checkout). The service combines them with its
//! runtime environment into a single `{env}:{info}` label:
//!
//! - Local: `dev:{commit}`
//! - Test: `test:{commit}`
//! - Prod: `stable:{version}+{commit}`

/// Environment the service was started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Local,
    Test,
    Prod,
}

impl RuntimeEnv {
    pub fn label(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Test => "test",
            Self::Prod => "prod",
        }
    }
}

pub fn build_date() -> &'static str {
    env!("BUILD_DATE")
}

pub fn build_commit() -> &'static str {
    env!("BUILD_COMMIT")
}

pub fn build_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Version label reported in the `x-service-version` header.
pub fn format_version_for_runtime_env(env: RuntimeEnv) -> String {
    match env {
        RuntimeEnv::Local => format!("dev:{}", build_commit()),
        RuntimeEnv::Test => format!("test:{}", build_commit()),
        RuntimeEnv::Prod => format!("stable:{}+{}", build_version(), build_commit()),
    }
}
