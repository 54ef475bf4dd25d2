use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::periods::{self, PERIODS};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "store": state.store.backend().as_str(),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match state.open_workspace(&path) {
        Ok(()) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "dbPath": path.join(db::DB_FILE).to_string_lossy(),
                "scheduledCount": state.grid.courses().len(),
            }),
        ),
        Err(e) => {
            tracing::error!(error = ?e, path = %path.display(), "workspace open failed");
            err(&req.id, "db_open_failed", format!("{e:?}"), None)
        }
    }
}

fn handle_periods_list(req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "periods": PERIODS,
            "periodMinutes": periods::PERIOD_MINUTES,
            "rowHeightPx": periods::ROW_HEIGHT_PX,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "periods.list" => Some(handle_periods_list(req)),
        _ => None,
    }
}
