use crate::error::TimetableError;
use crate::forms::ClassForm;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{confirmed, parse_params, patch_object, patch_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::SchoolClass;
use serde_json::json;

fn load_class(state: &AppState, id: &str) -> Result<SchoolClass, HandlerErr> {
    state
        .store
        .classes
        .get(id)?
        .ok_or_else(|| TimetableError::not_found("class", id).into())
}

fn classes_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    // Per-class course counts for the class dashboard.
    let unscheduled = state.store.unscheduled.list()?;
    let scheduled = state.grid.courses();
    let rows: Vec<serde_json::Value> = state
        .store
        .classes
        .list()?
        .into_iter()
        .map(|c| {
            let unscheduled_count = unscheduled.iter().filter(|u| u.class_id == c.id).count();
            let scheduled_count = scheduled
                .iter()
                .filter(|s| s.class_id.as_deref() == Some(c.id.as_str()))
                .count();
            json!({
                "id": c.id,
                "name": c.name,
                "level": c.level,
                "unscheduledCount": unscheduled_count,
                "scheduledCount": scheduled_count,
            })
        })
        .collect();
    Ok(json!({ "classes": rows }))
}

fn classes_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let form: ClassForm = parse_params(req, None)?;
    let class = form.create()?;
    state.store.classes.create(class.clone())?;
    tracing::info!(id = %class.id, name = %class.name, "class created");
    Ok(json!({ "classId": class.id, "class": class }))
}

fn classes_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let class_id = required_str(req, "classId")?;
    let patch = patch_object(req)?;
    let existing = load_class(state, &class_id)?;

    let mut form = ClassForm::from_class(&existing);
    if let Some(name) = patch_str(patch, "name")? {
        form.name = name.unwrap_or_default();
    }
    if let Some(level) = patch_str(patch, "level")? {
        form.level = level.unwrap_or_default();
    }

    let updated = form.apply_to(&existing)?;
    state.store.classes.update(updated.clone())?;
    Ok(json!({ "class": updated }))
}

fn classes_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let class_id = required_str(req, "classId")?;
    let existing = load_class(state, &class_id)?;
    if !confirmed(req) {
        return Err(
            HandlerErr::new("confirmation_required", "confirm deletion of this class")
                .with_details(json!({ "class": existing })),
        );
    }
    // Courses pointing at the class stay; the sidebar skips them once the
    // class is gone.
    state.store.classes.delete(&class_id)?;
    tracing::info!(id = %class_id, "class deleted");
    Ok(json!({ "deleted": class_id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "classes.list" => classes_list(state),
        "classes.create" => classes_create(state, req),
        "classes.update" => classes_update(state, req),
        "classes.delete" => classes_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
