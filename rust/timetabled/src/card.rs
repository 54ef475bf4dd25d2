use crate::model::{ScheduledCourse, Subject, Teacher, UnscheduledCourse};
use crate::periods::{self, PERIOD_MINUTES};
use serde::Serialize;

/// What the UI needs to draw one course, in the sidebar or in a grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCard {
    pub id: String,
    pub subject: String,
    pub teacher: String,
    pub duration: u32,
    pub color: String,
    pub is_placed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_px: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_label: Option<String>,
    pub can_unassign: bool,
}

impl CourseCard {
    pub fn placed(course: &ScheduledCourse) -> Self {
        Self {
            id: course.id.clone(),
            subject: course.subject.clone(),
            teacher: course.teacher.clone(),
            duration: course.duration,
            color: course.color.clone(),
            is_placed: true,
            class_name: Some(course.class_name.clone()),
            height_px: Some(periods::span_height_px(course.duration)),
            hours_label: None,
            can_unassign: true,
        }
    }

    pub fn unscheduled(course: &UnscheduledCourse, subject: &Subject, teacher: &Teacher) -> Self {
        Self {
            id: course.id.clone(),
            subject: subject.name.clone(),
            teacher: teacher.display_name(),
            duration: PERIOD_MINUTES,
            color: subject.color.clone(),
            is_placed: false,
            class_name: None,
            height_px: None,
            hours_label: Some(format!(
                "{}h/{}h",
                course.remaining_hours, course.total_hours
            )),
            can_unassign: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedData;

    #[test]
    fn placed_card_spans_its_duration() {
        let seed = SeedData::builtin();
        let card = CourseCard::placed(&seed.scheduled_courses[0]);
        assert!(card.is_placed);
        assert!(card.can_unassign);
        assert_eq!(card.height_px, Some(160));
        assert_eq!(card.class_name.as_deref(), Some("CP-A"));
    }

    #[test]
    fn unscheduled_card_shows_remaining_quota() {
        let seed = SeedData::builtin();
        let course = &seed.unscheduled_courses[0];
        let card = CourseCard::unscheduled(course, &seed.subjects[0], &seed.teachers[0]);
        assert_eq!(card.subject, "Mathématiques");
        assert_eq!(card.teacher, "Marie Dupont");
        assert_eq!(card.hours_label.as_deref(), Some("3h/5h"));
        assert_eq!(card.duration, 50);
        assert_eq!(card.height_px, None);
        assert!(!card.can_unassign);
    }
}
