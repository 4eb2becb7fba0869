//! Build information exposed by the `/info` endpoint
//!
//! Commit, branch and repository are injected at build time via the
//! `GIT_COMMIT`, `GIT_BRANCH`, `GIT_REPOSITORY` and `BUILD_TIME`
//! environment variables (e.g. from CI); absent values fall back to
//! `unknown`.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub branch: String,
    pub repository: String,
    pub build_time: DateTime<Utc>,
}

impl BuildInfo {
    /// Build info of the running binary.
    #[must_use]
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("GIT_COMMIT").unwrap_or("unknown").to_string(),
            branch: option_env!("GIT_BRANCH").unwrap_or("unknown").to_string(),
            repository: option_env!("GIT_REPOSITORY")
                .unwrap_or(env!("CARGO_PKG_REPOSITORY"))
                .to_string(),
            build_time: option_env!("BUILD_TIME")
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map_or_else(Utc::now, |t| t.with_timezone(&Utc)),
        }
    }
}
