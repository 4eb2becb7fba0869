//! Health and build-info handlers

use axum::Json;
use chatroom_common::BuildInfo;

/// Liveness probe
///
/// GET /healthz
pub async fn healthz() -> &'static str {
    "OK"
}

/// Build information
///
/// GET /info
pub async fn info() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}
