use crate::card::CourseCard;
use crate::model::{Catalog, SchoolClass, Subject, Teacher, UnscheduledCourse};
use crate::periods::PERIOD_MINUTES;
use serde::{Deserialize, Serialize};

/// Sidebar filter. `None` (or the literal `"all"` on the wire) lifts a
/// constraint. All four predicates must hold for a course to be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarFilter {
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

fn constraint(v: &Option<String>) -> Option<&str> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
}

impl SidebarFilter {
    pub fn reset() -> Self {
        Self::default()
    }

    fn matches(&self, course: &UnscheduledCourse, subject: &Subject, teacher: &Teacher) -> bool {
        let matches_class = constraint(&self.class_id).map_or(true, |id| course.class_id == id);
        let matches_teacher =
            constraint(&self.teacher_id).map_or(true, |id| course.teacher_id == id);
        let matches_subject =
            constraint(&self.subject_id).map_or(true, |id| course.subject_id == id);
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let needle = term.to_lowercase();
                subject.name.to_lowercase().contains(&needle)
                    || teacher.display_name().to_lowercase().contains(&needle)
            }
        };
        matches_class && matches_teacher && matches_subject && matches_search
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGroup {
    pub class: SchoolClass,
    pub courses: Vec<CourseCard>,
}

/// Filters the unscheduled courses and groups them by class, in class
/// registry order. Courses whose class, subject or teacher no longer
/// exists are skipped; groups left empty are dropped.
pub fn grouped_courses(
    catalog: &Catalog,
    courses: &[UnscheduledCourse],
    filter: &SidebarFilter,
) -> Vec<CourseGroup> {
    catalog
        .classes
        .iter()
        .filter_map(|class| {
            let cards: Vec<CourseCard> = courses
                .iter()
                .filter(|c| c.class_id == class.id)
                .filter_map(|c| {
                    let subject = catalog.subject(&c.subject_id)?;
                    let teacher = catalog.teacher(&c.teacher_id)?;
                    filter
                        .matches(c, subject, teacher)
                        .then(|| CourseCard::unscheduled(c, subject, teacher))
                })
                .collect();
            (!cards.is_empty()).then(|| CourseGroup {
                class: class.clone(),
                courses: cards,
            })
        })
        .collect()
}

/// Transfer data attached to a sidebar card when a drag starts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    #[serde(flatten)]
    pub course: UnscheduledCourse,
    pub subject: Subject,
    pub teacher: Teacher,
    pub class: SchoolClass,
    pub duration: u32,
}

pub fn drag_payload(
    catalog: &Catalog,
    courses: &[UnscheduledCourse],
    course_id: &str,
) -> Option<DragPayload> {
    let course = courses.iter().find(|c| c.id == course_id)?;
    Some(DragPayload {
        course: course.clone(),
        subject: catalog.subject(&course.subject_id)?.clone(),
        teacher: catalog.teacher(&course.teacher_id)?.clone(),
        class: catalog.class(&course.class_id)?.clone(),
        duration: PERIOD_MINUTES,
    })
}
