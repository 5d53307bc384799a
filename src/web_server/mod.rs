//! Health checks and static hosting for the SPA bundle.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use log::info;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_status::SetStatus;

use crate::shared::config::UiConfig;
use crate::shared::state::AppState;

pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    let db_ok = state.conn.get().is_ok();

    let status = if db_ok { "healthy" } else { "degraded" };
    let code = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(serde_json::json!({
            "status": status,
            "service": "salesdesk",
            "version": env!("CARGO_PKG_VERSION"),
            "database": db_ok
        })),
    )
}

pub async fn health_check_simple() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "salesdesk",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Static file service for the built client, with an index.html fallback so
/// client-side routes resolve. Returns None (and the app runs API-only) when
/// the bundle directory is absent.
pub fn spa_service(ui: &UiConfig) -> Option<ServeDir<SetStatus<ServeFile>>> {
    if !ui.dist_dir.is_dir() {
        info!(
            "UI bundle directory {} not found, serving API only",
            ui.dist_dir.display()
        );
        return None;
    }
    let index = ui.dist_dir.join("index.html");
    Some(ServeDir::new(&ui.dist_dir).not_found_service(ServeFile::new(index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_bundle_directory_disables_hosting() {
        let ui = UiConfig {
            dist_dir: PathBuf::from("definitely/not/a/real/dir"),
        };
        assert!(spa_service(&ui).is_none());
    }
}
