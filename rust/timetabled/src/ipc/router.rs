use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

type Handler = fn(&mut AppState, &Request) -> Option<serde_json::Value>;

/// Handler families in dispatch order. Each one answers only the methods
/// it owns.
const HANDLERS: [Handler; 7] = [
    handlers::core::try_handle,
    handlers::subjects::try_handle,
    handlers::teachers::try_handle,
    handlers::classes::try_handle,
    handlers::sidebar::try_handle,
    handlers::grid::try_handle,
    handlers::dialog::try_handle,
];

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    tracing::debug!(id = %req.id, method = %req.method, "request");
    if let Some(resp) = HANDLERS.iter().find_map(|handle| handle(state, &req)) {
        return resp;
    }

    tracing::warn!(method = %req.method, "unknown method");
    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
