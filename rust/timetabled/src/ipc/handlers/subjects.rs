use crate::error::TimetableError;
use crate::forms::{SubjectForm, SUBJECT_PALETTE};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{confirmed, parse_params, patch_object, patch_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Subject;
use serde_json::json;

fn load_subject(state: &AppState, id: &str) -> Result<Subject, HandlerErr> {
    state
        .store
        .subjects
        .get(id)?
        .ok_or_else(|| TimetableError::not_found("subject", id).into())
}

fn subjects_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let subjects = state.store.subjects.list()?;
    Ok(json!({ "subjects": subjects, "count": subjects.len() }))
}

fn subjects_palette() -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "colors": SUBJECT_PALETTE, "default": SUBJECT_PALETTE[0] }))
}

fn subjects_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let form: SubjectForm = parse_params(req, None)?;
    let subject = form.create()?;
    state.store.subjects.create(subject.clone())?;
    tracing::info!(id = %subject.id, name = %subject.name, "subject created");
    Ok(json!({ "subject": subject }))
}

fn subjects_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = required_str(req, "subjectId")?;
    let patch = patch_object(req)?;
    let existing = load_subject(state, &subject_id)?;

    let mut form = SubjectForm::from_subject(&existing);
    if let Some(name) = patch_str(patch, "name")? {
        form.name = name.unwrap_or_default();
    }
    if let Some(color) = patch_str(patch, "color")? {
        form.color = color;
    }
    if let Some(description) = patch_str(patch, "description")? {
        form.description = description;
    }

    let updated = form.apply_to(&existing)?;
    state.store.subjects.update(updated.clone())?;
    Ok(json!({ "subject": updated }))
}

fn subjects_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = required_str(req, "subjectId")?;
    let existing = load_subject(state, &subject_id)?;
    if !confirmed(req) {
        return Err(
            HandlerErr::new("confirmation_required", "confirm deletion of this subject")
                .with_details(json!({ "subject": existing })),
        );
    }
    state.store.subjects.delete(&subject_id)?;
    tracing::info!(id = %subject_id, "subject deleted");
    Ok(json!({ "deleted": subject_id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "subjects.list" => subjects_list(state),
        "subjects.palette" => subjects_palette(),
        "subjects.create" => subjects_create(state, req),
        "subjects.update" => subjects_update(state, req),
        "subjects.delete" => subjects_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
