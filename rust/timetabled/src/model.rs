use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A record that can live in a [`crate::store::Repository`].
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Singular name used in error messages.
    const KIND: &'static str;
    /// Backing table name for the SQLite repository.
    const TABLE: &'static str;

    fn id(&self) -> &str;
}

/// New record ids are UUID v7, which sort by creation time.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Day {
    #[serde(alias = "monday")]
    Monday,
    #[serde(alias = "tuesday")]
    Tuesday,
    #[serde(alias = "wednesday")]
    Wednesday,
    #[serde(alias = "thursday")]
    Thursday,
    #[serde(alias = "friday")]
    Friday,
}

impl Day {
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        Day::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(t))
            .ok_or_else(|| format!("unknown day: {}", t))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record for Subject {
    const KIND: &'static str = "subject";
    const TABLE: &'static str = "subjects";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub subject_ids: Vec<String>,
}

impl Teacher {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn teaches(&self, subject_id: &str) -> bool {
        self.subject_ids.iter().any(|s| s == subject_id)
    }
}

impl Record for Teacher {
    const KIND: &'static str = "teacher";
    const TABLE: &'static str = "teachers";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub level: String,
}

impl Record for SchoolClass {
    const KIND: &'static str = "class";
    const TABLE: &'static str = "classes";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Hour quota for a class/subject/teacher triple that still needs slots.
/// `remaining_hours <= total_hours` is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledCourse {
    pub id: String,
    pub class_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    pub total_hours: u32,
    pub remaining_hours: u32,
}

impl Record for UnscheduledCourse {
    const KIND: &'static str = "course";
    const TABLE: &'static str = "unscheduled_courses";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledCourse {
    pub id: String,
    pub subject: String,
    pub teacher: String,
    pub class_name: String,
    pub day: Day,
    pub start_time: String,
    /// Minutes, a positive multiple of the period length.
    pub duration: u32,
    pub color: String,
    #[serde(default = "default_true")]
    pub is_scheduled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Record for ScheduledCourse {
    const KIND: &'static str = "scheduled course";
    const TABLE: &'static str = "scheduled_courses";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Read-only snapshot of the registries used to resolve ids while
/// rendering. Missing ids resolve to `None` and the caller skips them.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub subjects: Vec<Subject>,
    pub teachers: Vec<Teacher>,
    pub classes: Vec<SchoolClass>,
}

impl Catalog {
    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    pub fn class(&self, id: &str) -> Option<&SchoolClass> {
        self.classes.iter().find(|c| c.id == id)
    }
}
