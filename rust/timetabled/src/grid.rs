use crate::card::CourseCard;
use crate::dialog::{AssignDialog, Slot};
use crate::error::{Result, TimetableError};
use crate::model::{Day, ScheduledCourse, SchoolClass, Subject, Teacher};
use crate::periods::{self, Period, PERIODS};
use serde::{Deserialize, Serialize};

const EMPTY_CELL_HINT: &str = "Cliquer pour assigner";

/// Callbacks the grid hands to whoever owns it. Every method defaults to a
/// no-op, so a host only overrides what it cares about.
pub trait GridHost {
    fn on_course_drop(&mut self, _course: &ScheduledCourse, _day: Day, _time: &str) {}

    fn on_course_assign(&mut self, _day: Day, _time: &str, _subject: &Subject, _teacher: &Teacher) {
    }

    fn on_course_resize(&mut self, _course: &ScheduledCourse, _new_duration: u32) {}

    fn on_course_unassign(&mut self, _course_id: &str) {}
}

pub struct NoopHost;

impl GridHost for NoopHost {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GridEvent {
    CourseDrop {
        course: ScheduledCourse,
        day: Day,
        time: String,
    },
    CourseAssign {
        day: Day,
        time: String,
        subject: Subject,
        teacher: Teacher,
    },
    CourseResize {
        course: ScheduledCourse,
        new_duration: u32,
    },
    CourseUnassign {
        course_id: String,
    },
}

/// Host that records every callback so it can be shipped back to the UI.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GridEvent>,
}

impl EventQueue {
    pub fn into_events(self) -> Vec<GridEvent> {
        self.events
    }
}

impl GridHost for EventQueue {
    fn on_course_drop(&mut self, course: &ScheduledCourse, day: Day, time: &str) {
        self.events.push(GridEvent::CourseDrop {
            course: course.clone(),
            day,
            time: time.to_string(),
        });
    }

    fn on_course_assign(&mut self, day: Day, time: &str, subject: &Subject, teacher: &Teacher) {
        self.events.push(GridEvent::CourseAssign {
            day,
            time: time.to_string(),
            subject: subject.clone(),
            teacher: teacher.clone(),
        });
    }

    fn on_course_resize(&mut self, course: &ScheduledCourse, new_duration: u32) {
        self.events.push(GridEvent::CourseResize {
            course: course.clone(),
            new_duration,
        });
    }

    fn on_course_unassign(&mut self, course_id: &str) {
        self.events.push(GridEvent::CourseUnassign {
            course_id: course_id.to_string(),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    #[default]
    Class,
    Teacher,
    School,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridView {
    pub view_type: ViewType,
    #[serde(default)]
    pub entity_id: Option<String>,
}

impl GridView {
    /// With no entity selected every course is shown.
    fn shows(&self, course: &ScheduledCourse) -> bool {
        let Some(entity) = self.entity_id.as_deref() else {
            return true;
        };
        match self.view_type {
            ViewType::Class => course.class_id.as_deref() == Some(entity),
            ViewType::Teacher => course.teacher_id.as_deref() == Some(entity),
            ViewType::School => true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GridCell {
    Break { day: Day, label: &'static str },
    Empty { day: Day, hint: &'static str },
    Occupied { day: Day, card: CourseCard },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub period: Period,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_label: Option<String>,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRender {
    pub days: [Day; 5],
    pub view: GridView,
    pub rows: Vec<GridRow>,
}

/// Weekly period x day grid. Owns the scheduled courses and the assignment
/// dialog. Occupancy is an exact `(day, start)` match: a course spanning
/// several periods is drawn taller but the rows below stay assignable.
#[derive(Debug, Default)]
pub struct WeeklyGrid {
    courses: Vec<ScheduledCourse>,
    dialog: AssignDialog,
    view: GridView,
}

impl WeeklyGrid {
    pub fn new(courses: Vec<ScheduledCourse>) -> Self {
        Self {
            courses,
            ..Self::default()
        }
    }

    pub fn courses(&self) -> &[ScheduledCourse] {
        &self.courses
    }

    /// Swaps in another course list (workspace change). The dialog closes.
    pub fn replace_courses(&mut self, courses: Vec<ScheduledCourse>) {
        self.courses = courses;
        self.dialog.cancel();
    }

    pub fn dialog(&self) -> &AssignDialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut AssignDialog {
        &mut self.dialog
    }

    pub fn view(&self) -> &GridView {
        &self.view
    }

    pub fn set_view(&mut self, view: GridView) {
        self.view = view;
    }

    pub fn course_at(&self, day: Day, time: &str) -> Option<&ScheduledCourse> {
        self.courses
            .iter()
            .find(|c| c.is_scheduled && c.day == day && c.start_time == time)
    }

    fn visible_course_at(&self, day: Day, time: &str) -> Option<&ScheduledCourse> {
        self.courses.iter().find(|c| {
            c.is_scheduled && c.day == day && c.start_time == time && self.view.shows(c)
        })
    }

    pub fn render(&self) -> GridRender {
        let rows = PERIODS
            .iter()
            .map(|period| {
                let cells = Day::ALL
                    .iter()
                    .map(|&day| {
                        if period.is_break {
                            return GridCell::Break {
                                day,
                                label: period.label,
                            };
                        }
                        match self.visible_course_at(day, period.start) {
                            Some(course) => GridCell::Occupied {
                                day,
                                card: CourseCard::placed(course),
                            },
                            None => GridCell::Empty {
                                day,
                                hint: EMPTY_CELL_HINT,
                            },
                        }
                    })
                    .collect();
                GridRow {
                    period: *period,
                    length_label: (!period.is_break)
                        .then(|| format!("{} min", periods::PERIOD_MINUTES)),
                    cells,
                }
            })
            .collect();
        GridRender {
            days: Day::ALL,
            view: self.view.clone(),
            rows,
        }
    }

    /// Opens the dialog on a teaching slot. Breaks and unknown rows are
    /// ignored and leave the dialog as it was.
    pub fn click(&mut self, day: Day, time: &str) -> bool {
        if !periods::is_assignable(time) {
            return false;
        }
        self.dialog.open(Slot {
            day,
            time: time.to_string(),
        });
        true
    }

    /// Looks the transferred id up in the grid's own course list and hands
    /// it to the host. The grid itself does not move anything.
    pub fn drop_course(
        &mut self,
        transfer_id: &str,
        day: Day,
        time: &str,
        host: &mut dyn GridHost,
    ) -> bool {
        if !periods::is_assignable(time) {
            return false;
        }
        let Some(course) = self.courses.iter().find(|c| c.id == transfer_id) else {
            tracing::debug!(transfer_id, "dropped course is not on the grid");
            return false;
        };
        host.on_course_drop(course, day, time);
        true
    }

    /// Confirms the open dialog and appends the new course.
    pub fn confirm_assignment(
        &mut self,
        class: Option<&SchoolClass>,
        host: &mut dyn GridHost,
    ) -> Result<ScheduledCourse> {
        let assignment = self.dialog.confirm(class)?;
        self.courses.push(assignment.course.clone());
        host.on_course_assign(
            assignment.slot.day,
            &assignment.slot.time,
            &assignment.subject,
            &assignment.teacher,
        );
        Ok(assignment.course)
    }

    /// Removes a placed course. Unknown ids are a no-op.
    pub fn unassign(&mut self, course_id: &str, host: &mut dyn GridHost) -> Option<ScheduledCourse> {
        let idx = self.courses.iter().position(|c| c.id == course_id)?;
        let removed = self.courses.remove(idx);
        host.on_course_unassign(course_id);
        Some(removed)
    }

    /// Puts back a course whose removal could not be persisted. No host
    /// callback.
    pub fn restore(&mut self, course: ScheduledCourse) {
        if !self.courses.iter().any(|c| c.id == course.id) {
            self.courses.push(course);
        }
    }

    pub fn resize(
        &mut self,
        course_id: &str,
        new_duration: u32,
        host: &mut dyn GridHost,
    ) -> Result<ScheduledCourse> {
        if !periods::is_valid_duration(new_duration) {
            return Err(TimetableError::bad_params(format!(
                "duration must be a positive multiple of {} minutes",
                periods::PERIOD_MINUTES
            )));
        }
        let course = self
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or_else(|| TimetableError::not_found("scheduled course", course_id))?;
        if !periods::fits_in_day(&course.start_time, new_duration) {
            return Err(TimetableError::bad_params(format!(
                "a course starting at {} must end by {}",
                course.start_time,
                periods::day_end()
            )));
        }
        host.on_course_resize(course, new_duration);
        course.duration = new_duration;
        Ok(course.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::DialogState;
    use crate::seed::SeedData;

    fn grid() -> (WeeklyGrid, SeedData) {
        let seed = SeedData::builtin();
        (WeeklyGrid::new(seed.scheduled_courses.clone()), seed)
    }

    #[test]
    fn breaks_ignore_click_and_drop() {
        let (mut g, _) = grid();
        let mut host = EventQueue::default();
        for time in ["10:30", "12:40", "14:50"] {
            assert!(!g.click(Day::Wednesday, time));
            assert!(!g.drop_course("6", Day::Wednesday, time, &mut host));
        }
        assert_eq!(g.dialog().state(), &DialogState::Closed);
        assert!(host.into_events().is_empty());
        assert_eq!(g.courses().len(), 2);
    }

    #[test]
    fn click_opens_dialog_with_blank_selection() {
        let (mut g, seed) = grid();
        assert!(g.click(Day::Monday, "08:50"));
        g.dialog_mut()
            .select_subject(seed.subjects[0].clone())
            .expect("subject");
        assert!(g.click(Day::Friday, "14:00"));
        assert!(g.dialog().subject().is_none());
        assert_eq!(g.dialog().slot().map(|s| s.day), Some(Day::Friday));
    }

    #[test]
    fn confirm_adds_exactly_one_course() {
        let (mut g, seed) = grid();
        let before = g.courses().to_vec();
        let mut host = EventQueue::default();

        assert!(g.click(Day::Tuesday, "11:00"));
        g.dialog_mut()
            .select_subject(seed.subjects[0].clone())
            .expect("subject");
        g.dialog_mut()
            .select_teacher(seed.teachers[0].clone())
            .expect("teacher");
        let added = g.confirm_assignment(None, &mut host).expect("confirm");

        assert_eq!(g.courses().len(), before.len() + 1);
        assert_eq!(&g.courses()[..before.len()], &before[..]);
        assert_eq!(added.day, Day::Tuesday);
        assert_eq!(added.start_time, "11:00");
        assert_eq!(added.duration, 50);
        assert_eq!(g.course_at(Day::Tuesday, "11:00"), Some(&added));

        let events = host.into_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            GridEvent::CourseAssign { day: Day::Tuesday, time, .. } if time == "11:00"
        ));
    }

    #[test]
    fn drop_delegates_without_mutating() {
        let (mut g, _) = grid();
        let before = g.courses().to_vec();
        let mut host = EventQueue::default();
        assert!(g.drop_course("7", Day::Thursday, "09:40", &mut host));
        assert!(!g.drop_course("unknown", Day::Thursday, "09:40", &mut host));
        assert_eq!(g.courses(), &before[..]);
        let events = host.into_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            GridEvent::CourseDrop { course, day, time } => {
                assert_eq!(course.id, "7");
                assert_eq!(*day, Day::Thursday);
                assert_eq!(time, "09:40");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn multi_period_course_does_not_reserve_rows_below() {
        let (g, _) = grid();
        assert!(g.course_at(Day::Monday, "08:00").is_some());
        assert!(g.course_at(Day::Monday, "08:50").is_none());
        let render = g.render();
        assert!(matches!(
            &render.rows[0].cells[0],
            GridCell::Occupied { card, .. } if card.height_px == Some(160)
        ));
        assert!(matches!(render.rows[1].cells[0], GridCell::Empty { .. }));
        assert!(matches!(
            render.rows[3].cells[2],
            GridCell::Break { label: "Récréation", .. }
        ));
        assert_eq!(render.rows[0].length_label.as_deref(), Some("50 min"));
        assert_eq!(render.rows[3].length_label, None);
    }

    #[test]
    fn view_filters_rendered_courses() {
        let (mut g, _) = grid();
        g.set_view(GridView {
            view_type: ViewType::Teacher,
            entity_id: Some("4".into()),
        });
        let render = g.render();
        assert!(matches!(render.rows[0].cells[0], GridCell::Empty { .. }));
        assert!(matches!(render.rows[7].cells[1], GridCell::Occupied { .. }));

        g.set_view(GridView {
            view_type: ViewType::School,
            entity_id: None,
        });
        assert!(matches!(g.render().rows[0].cells[0], GridCell::Occupied { .. }));
    }

    #[test]
    fn unassign_and_resize() {
        let (mut g, _) = grid();
        let mut host = EventQueue::default();
        let resized = g.resize("7", 100, &mut host).expect("resize");
        assert_eq!(resized.duration, 100);
        assert!(g.resize("7", 70, &mut host).is_err());
        assert!(g.resize("nope", 50, &mut host).is_err());
        let too_long = g.resize("7", 4_294_967_250, &mut host).expect_err("past day end");
        assert_eq!(too_long.code(), "bad_params");
        assert!(g.resize("7", 150, &mut host).is_err());
        assert_eq!(g.courses()[1].duration, 100);

        assert_eq!(g.unassign("6", &mut host).map(|c| c.id).as_deref(), Some("6"));
        assert!(g.unassign("6", &mut host).is_none());
        assert_eq!(g.courses().len(), 1);

        let events = host.into_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GridEvent::CourseResize { new_duration: 100, .. }));
        assert!(matches!(&events[1], GridEvent::CourseUnassign { course_id } if course_id == "6"));
    }

    #[test]
    fn noop_host_accepts_everything() {
        let (mut g, _) = grid();
        assert!(g.drop_course("6", Day::Monday, "13:10", &mut NoopHost));
        let removed = g.unassign("6", &mut NoopHost).expect("removed");
        g.restore(removed.clone());
        g.restore(removed);
        assert_eq!(g.courses().len(), 2);
    }
}
