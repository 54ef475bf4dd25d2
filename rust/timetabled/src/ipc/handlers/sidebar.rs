use crate::error::TimetableError;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{parse_params, required_str};
use crate::ipc::types::{AppState, Request};
use crate::sidebar::{self, SidebarFilter};
use serde_json::json;

fn sidebar_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let reset = req
        .params
        .get("reset")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let filter = if reset {
        SidebarFilter::reset()
    } else {
        parse_params(req, Some("filter"))?
    };
    let catalog = state.store.catalog()?;
    let courses = state.store.unscheduled.list()?;
    let groups = sidebar::grouped_courses(&catalog, &courses, &filter);
    let total: usize = groups.iter().map(|g| g.courses.len()).sum();
    Ok(json!({ "groups": groups, "total": total }))
}

fn sidebar_drag_payload(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let course_id = required_str(req, "courseId")?;
    let catalog = state.store.catalog()?;
    let courses = state.store.unscheduled.list()?;
    let payload = sidebar::drag_payload(&catalog, &courses, &course_id)
        .ok_or_else(|| TimetableError::not_found("course", &course_id))?;
    Ok(json!({ "payload": payload }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "sidebar.list" => sidebar_list(state, req),
        "sidebar.dragPayload" => sidebar_drag_payload(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
