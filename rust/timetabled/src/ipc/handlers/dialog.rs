use crate::error::TimetableError;
use crate::dialog::DialogState;
use crate::grid::{EventQueue, NoopHost, ViewType, WeeklyGrid};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::model::{SchoolClass, Subject, Teacher};
use serde_json::json;

/// Everything the assignment modal draws: the slot title, the subject list
/// and the teachers offered for the current subject.
pub fn dialog_view(
    grid: &WeeklyGrid,
    subjects: &[Subject],
    teachers: &[Teacher],
) -> serde_json::Value {
    let dialog = grid.dialog();
    let available: Vec<serde_json::Value> = dialog
        .available_teachers(teachers)
        .into_iter()
        .map(|t| json!({ "id": t.id, "displayName": t.display_name() }))
        .collect();
    let offered: &[Subject] = if dialog.is_open() { subjects } else { &[] };
    let step = match dialog.state() {
        DialogState::Closed => "closed",
        DialogState::Open { .. } => "open",
        DialogState::SubjectChosen { .. } => "subjectChosen",
        DialogState::TeacherChosen { .. } => "teacherChosen",
    };
    json!({
        "open": dialog.is_open(),
        "step": step,
        "title": dialog
            .slot()
            .map(|s| format!("Assigner un cours - {} à {}", s.day, s.time)),
        "slot": dialog.slot(),
        "subject": dialog.subject(),
        "teacher": dialog.teacher(),
        "subjects": offered,
        "availableTeachers": available,
        "canConfirm": dialog.can_confirm(),
    })
}

fn current_dialog(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let subjects = state.store.subjects.list()?;
    let teachers = state.store.teachers.list()?;
    Ok(dialog_view(&state.grid, &subjects, &teachers))
}

/// Class the new course belongs to: the one in view, if the grid shows a
/// class.
fn class_in_view(state: &AppState) -> Result<Option<SchoolClass>, HandlerErr> {
    let view = state.grid.view();
    match (view.view_type, view.entity_id.as_deref()) {
        (ViewType::Class, Some(id)) => Ok(state.store.classes.get(id)?),
        _ => Ok(None),
    }
}

fn dialog_get(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "dialog": current_dialog(state)? }))
}

fn dialog_select_subject(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = required_str(req, "subjectId")?;
    let subject = state
        .store
        .subjects
        .get(&subject_id)?
        .ok_or_else(|| TimetableError::not_found("subject", &subject_id))?;
    state.grid.dialog_mut().select_subject(subject)?;
    Ok(json!({ "dialog": current_dialog(state)? }))
}

fn dialog_select_teacher(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = required_str(req, "teacherId")?;
    let teacher = state
        .store
        .teachers
        .get(&teacher_id)?
        .ok_or_else(|| TimetableError::not_found("teacher", &teacher_id))?;
    state.grid.dialog_mut().select_teacher(teacher)?;
    Ok(json!({ "dialog": current_dialog(state)? }))
}

fn dialog_confirm(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let class = class_in_view(state)?;
    let mut host = EventQueue::default();
    let course = state.grid.confirm_assignment(class.as_ref(), &mut host)?;
    if let Err(e) = state.store.scheduled.create(course.clone()) {
        state.grid.unassign(&course.id, &mut NoopHost);
        return Err(e.into());
    }
    tracing::info!(
        id = %course.id,
        day = %course.day,
        time = %course.start_time,
        subject = %course.subject,
        "course assigned"
    );
    Ok(json!({
        "course": course,
        "events": host.into_events(),
        "dialog": current_dialog(state)?,
    }))
}

fn dialog_cancel(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    state.grid.dialog_mut().cancel();
    Ok(json!({ "dialog": current_dialog(state)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "dialog.get" => dialog_get(state),
        "dialog.selectSubject" => dialog_select_subject(state, req),
        "dialog.selectTeacher" => dialog_select_teacher(state, req),
        "dialog.confirm" => dialog_confirm(state),
        "dialog.cancel" => dialog_cancel(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
