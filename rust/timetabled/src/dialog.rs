//! Per-slot assignment dialog.
//!
//! `Closed -> Open -> SubjectChosen -> TeacherChosen -> Closed`. Confirming
//! builds a one-period course; cancelling drops the selection. Picking a
//! subject always clears the teacher.

use crate::error::{Result, TimetableError};
use crate::model::{new_id, Day, ScheduledCourse, SchoolClass, Subject, Teacher};
use crate::periods::PERIOD_MINUTES;
use serde::Serialize;

pub const DEFAULT_CLASS_NAME: &str = "Classe";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub day: Day,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Closed,
    Open {
        slot: Slot,
    },
    SubjectChosen {
        slot: Slot,
        subject: Subject,
    },
    TeacherChosen {
        slot: Slot,
        subject: Subject,
        teacher: Teacher,
    },
}

/// Result of a confirmed dialog.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub slot: Slot,
    pub subject: Subject,
    pub teacher: Teacher,
    pub course: ScheduledCourse,
}

#[derive(Debug, Default)]
pub struct AssignDialog {
    state: DialogState,
}

impl AssignDialog {
    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DialogState::Closed)
    }

    pub fn slot(&self) -> Option<&Slot> {
        match &self.state {
            DialogState::Closed => None,
            DialogState::Open { slot }
            | DialogState::SubjectChosen { slot, .. }
            | DialogState::TeacherChosen { slot, .. } => Some(slot),
        }
    }

    pub fn subject(&self) -> Option<&Subject> {
        match &self.state {
            DialogState::SubjectChosen { subject, .. }
            | DialogState::TeacherChosen { subject, .. } => Some(subject),
            _ => None,
        }
    }

    pub fn teacher(&self) -> Option<&Teacher> {
        match &self.state {
            DialogState::TeacherChosen { teacher, .. } => Some(teacher),
            _ => None,
        }
    }

    /// Opening always starts from a blank selection, even if the dialog was
    /// already open on another slot.
    pub fn open(&mut self, slot: Slot) {
        self.state = DialogState::Open { slot };
    }

    pub fn select_subject(&mut self, subject: Subject) -> Result<()> {
        let slot = self
            .slot()
            .cloned()
            .ok_or_else(|| TimetableError::invalid_state("assignment dialog is closed"))?;
        self.state = DialogState::SubjectChosen { slot, subject };
        Ok(())
    }

    /// Teachers offered for the chosen subject, keyed by subject id.
    pub fn available_teachers<'a>(&self, teachers: &'a [Teacher]) -> Vec<&'a Teacher> {
        match self.subject() {
            Some(subject) => teachers.iter().filter(|t| t.teaches(&subject.id)).collect(),
            None => Vec::new(),
        }
    }

    pub fn select_teacher(&mut self, teacher: Teacher) -> Result<()> {
        let (slot, subject) = match &self.state {
            DialogState::SubjectChosen { slot, subject }
            | DialogState::TeacherChosen { slot, subject, .. } => (slot.clone(), subject.clone()),
            DialogState::Open { .. } => {
                return Err(TimetableError::invalid_state("choose a subject first"))
            }
            DialogState::Closed => {
                return Err(TimetableError::invalid_state("assignment dialog is closed"))
            }
        };
        if !teacher.teaches(&subject.id) {
            return Err(TimetableError::bad_params(format!(
                "{} does not teach {}",
                teacher.display_name(),
                subject.name
            )));
        }
        self.state = DialogState::TeacherChosen {
            slot,
            subject,
            teacher,
        };
        Ok(())
    }

    pub fn can_confirm(&self) -> bool {
        matches!(self.state, DialogState::TeacherChosen { .. })
    }

    /// Builds the new course and closes. `class` is the class currently in
    /// view, if any.
    pub fn confirm(&mut self, class: Option<&SchoolClass>) -> Result<Assignment> {
        let (slot, subject, teacher) = match std::mem::take(&mut self.state) {
            DialogState::TeacherChosen {
                slot,
                subject,
                teacher,
            } => (slot, subject, teacher),
            other => {
                self.state = other;
                return Err(TimetableError::invalid_state(
                    "a subject and a teacher must be chosen",
                ));
            }
        };
        let course = ScheduledCourse {
            id: new_id(),
            subject: subject.name.clone(),
            teacher: teacher.display_name(),
            class_name: class
                .map(|c| c.name.clone())
                .unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string()),
            day: slot.day,
            start_time: slot.time.clone(),
            duration: PERIOD_MINUTES,
            color: subject.color.clone(),
            is_scheduled: true,
            subject_id: Some(subject.id.clone()),
            teacher_id: Some(teacher.id.clone()),
            class_id: class.map(|c| c.id.clone()),
        };
        Ok(Assignment {
            slot,
            subject,
            teacher,
            course,
        })
    }

    pub fn cancel(&mut self) {
        self.state = DialogState::Closed;
    }
}
