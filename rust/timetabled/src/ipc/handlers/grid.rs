use crate::error::TimetableError;
use crate::grid::{EventQueue, GridView, NoopHost, ViewType};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::handlers::dialog::dialog_view;
use crate::ipc::helpers::{opt_str, parse_day, parse_time, required_str, required_u32};
use crate::ipc::types::{AppState, Request};
use crate::periods;
use serde_json::json;

fn parse_view_type(raw: &str) -> Result<ViewType, HandlerErr> {
    match raw.to_ascii_lowercase().as_str() {
        "class" => Ok(ViewType::Class),
        "teacher" => Ok(ViewType::Teacher),
        "school" => Ok(ViewType::School),
        _ => Err(HandlerErr::bad_params("viewType must be class, teacher or school")
            .with_details(json!({ "viewType": raw }))),
    }
}

fn view_get(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "view": state.grid.view() }))
}

fn view_set(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let view_type = parse_view_type(&required_str(req, "viewType")?)?;
    let requested = opt_str(req, "entityId")?;

    let entity_id = match view_type {
        ViewType::School => None,
        ViewType::Class => match requested {
            Some(id) => {
                state
                    .store
                    .classes
                    .get(&id)?
                    .ok_or_else(|| TimetableError::not_found("class", &id))?;
                Some(id)
            }
            None => state.store.classes.list()?.first().map(|c| c.id.clone()),
        },
        ViewType::Teacher => match requested {
            Some(id) => {
                state
                    .store
                    .teachers
                    .get(&id)?
                    .ok_or_else(|| TimetableError::not_found("teacher", &id))?;
                Some(id)
            }
            None => state.store.teachers.list()?.first().map(|t| t.id.clone()),
        },
    };

    let view = GridView {
        view_type,
        entity_id,
    };
    tracing::debug!(view_type = ?view.view_type, entity = ?view.entity_id, "view changed");
    state.grid.set_view(view);
    Ok(json!({ "view": state.grid.view() }))
}

fn grid_get(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "grid": state.grid.render() }))
}

fn grid_slot(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let day = parse_day(req)?;
    let time = parse_time(req)?;
    let course = state.grid.course_at(day, &time);
    let end_time = course.and_then(|c| periods::end_time(&c.start_time, c.duration));
    Ok(json!({
        "day": day,
        "time": time,
        "period": periods::period_at(&time),
        "isBreak": periods::is_break(&time),
        "assignable": periods::is_assignable(&time),
        "course": course,
        "endTime": end_time,
    }))
}

fn grid_click(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let day = parse_day(req)?;
    let time = parse_time(req)?;
    let opened = state.grid.click(day, &time);
    let subjects = state.store.subjects.list()?;
    let teachers = state.store.teachers.list()?;
    Ok(json!({
        "opened": opened,
        "dialog": dialog_view(&state.grid, &subjects, &teachers),
    }))
}

fn grid_drop(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let course_id = required_str(req, "courseId")?;
    let day = parse_day(req)?;
    let time = parse_time(req)?;
    let mut host = EventQueue::default();
    let dropped = state.grid.drop_course(&course_id, day, &time, &mut host);
    Ok(json!({ "dropped": dropped, "events": host.into_events() }))
}

fn grid_unassign(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let course_id = required_str(req, "courseId")?;
    let mut host = EventQueue::default();
    let removed = state.grid.unassign(&course_id, &mut host);
    if let Some(course) = &removed {
        if let Err(e) = state.store.scheduled.delete(&course.id) {
            state.grid.restore(course.clone());
            return Err(e.into());
        }
        tracing::info!(id = %course.id, subject = %course.subject, "course unassigned");
    }
    Ok(json!({
        "removed": removed,
        "events": host.into_events(),
    }))
}

fn grid_resize(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let course_id = required_str(req, "courseId")?;
    let duration = required_u32(req, "duration")?;
    let previous = state
        .grid
        .courses()
        .iter()
        .find(|c| c.id == course_id)
        .map(|c| c.duration);

    let mut host = EventQueue::default();
    let course = state.grid.resize(&course_id, duration, &mut host)?;
    if let Err(e) = state.store.scheduled.update(course.clone()) {
        if let Some(previous) = previous {
            if let Err(rollback) = state.grid.resize(&course_id, previous, &mut NoopHost) {
                tracing::error!(
                    id = %course_id,
                    previous,
                    error = %rollback,
                    "could not restore course duration"
                );
            }
        }
        return Err(e.into());
    }
    Ok(json!({
        "course": course,
        "endTime": periods::end_time(&course.start_time, course.duration),
        "events": host.into_events(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "view.get" => view_get(state),
        "view.set" => view_set(state, req),
        "grid.get" => grid_get(state),
        "grid.slot" => grid_slot(state, req),
        "grid.click" => grid_click(state, req),
        "grid.drop" => grid_drop(state, req),
        "grid.unassign" => grid_unassign(state, req),
        "grid.resize" => grid_resize(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
