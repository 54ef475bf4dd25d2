use crate::error::TimetableError;
use crate::forms::TeacherForm;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{confirmed, parse_params, patch_object, patch_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{Subject, Teacher};
use serde_json::json;

fn load_teacher(state: &AppState, id: &str) -> Result<Teacher, HandlerErr> {
    state
        .store
        .teachers
        .get(id)?
        .ok_or_else(|| TimetableError::not_found("teacher", id).into())
}

fn ensure_known_subjects<'a>(
    subjects: &[Subject],
    ids: impl IntoIterator<Item = &'a String>,
) -> Result<(), HandlerErr> {
    let unknown: Vec<&String> = ids
        .into_iter()
        .filter(|id| !subjects.iter().any(|s| &s.id == *id))
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    Err(HandlerErr::bad_params("unknown subject ids").with_details(json!({ "subjectIds": unknown })))
}

// Subjects that were deleted since are silently left out.
fn teacher_row(teacher: &Teacher, subjects: &[Subject]) -> serde_json::Value {
    let taught: Vec<serde_json::Value> = teacher
        .subject_ids
        .iter()
        .filter_map(|id| subjects.iter().find(|s| &s.id == id))
        .map(|s| json!({ "id": s.id, "name": s.name, "color": s.color }))
        .collect();
    json!({
        "id": teacher.id,
        "firstName": teacher.first_name,
        "lastName": teacher.last_name,
        "displayName": teacher.display_name(),
        "email": teacher.email,
        "subjectIds": teacher.subject_ids,
        "subjects": taught,
    })
}

fn teachers_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let subjects = state.store.subjects.list()?;
    let rows: Vec<serde_json::Value> = state
        .store
        .teachers
        .list()?
        .iter()
        .map(|t| teacher_row(t, &subjects))
        .collect();
    Ok(json!({ "count": rows.len(), "teachers": rows }))
}

fn teachers_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let form: TeacherForm = parse_params(req, None)?;
    let teacher = form.create()?;
    let subjects = state.store.subjects.list()?;
    ensure_known_subjects(&subjects, &teacher.subject_ids)?;
    state.store.teachers.create(teacher.clone())?;
    tracing::info!(id = %teacher.id, name = %teacher.display_name(), "teacher created");
    Ok(json!({ "teacher": teacher_row(&teacher, &subjects) }))
}

fn teachers_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = required_str(req, "teacherId")?;
    let patch = patch_object(req)?;
    let existing = load_teacher(state, &teacher_id)?;

    let mut form = TeacherForm::from_teacher(&existing);
    if let Some(first) = patch_str(patch, "firstName")? {
        form.first_name = first.unwrap_or_default();
    }
    if let Some(last) = patch_str(patch, "lastName")? {
        form.last_name = last.unwrap_or_default();
    }
    if let Some(email) = patch_str(patch, "email")? {
        form.email = email;
    }
    if let Some(raw) = patch.get("subjectIds") {
        form.subject_ids = serde_json::from_value(raw.clone())
            .map_err(|_| HandlerErr::bad_params("patch.subjectIds must be array of strings"))?;
    }

    let updated = form.apply_to(&existing)?;
    let subjects = state.store.subjects.list()?;
    // Ids of subjects deleted since stay on the teacher; only new ones are checked.
    let added = updated
        .subject_ids
        .iter()
        .filter(|id| !existing.subject_ids.contains(*id));
    ensure_known_subjects(&subjects, added)?;
    state.store.teachers.update(updated.clone())?;
    Ok(json!({ "teacher": teacher_row(&updated, &subjects) }))
}

fn teachers_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = required_str(req, "teacherId")?;
    let existing = load_teacher(state, &teacher_id)?;
    if !confirmed(req) {
        return Err(
            HandlerErr::new("confirmation_required", "confirm deletion of this teacher")
                .with_details(json!({ "teacher": existing })),
        );
    }
    state.store.teachers.delete(&teacher_id)?;
    tracing::info!(id = %teacher_id, "teacher deleted");
    Ok(json!({ "deleted": teacher_id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "teachers.list" => teachers_list(state),
        "teachers.create" => teachers_create(state, req),
        "teachers.update" => teachers_update(state, req),
        "teachers.delete" => teachers_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
