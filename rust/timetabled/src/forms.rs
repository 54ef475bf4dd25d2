use crate::error::{Result, TimetableError};
use crate::model::{new_id, SchoolClass, Subject, Teacher};
use serde::Deserialize;

/// Colors a subject may take, in picker order.
pub const SUBJECT_PALETTE: [&str; 10] = [
    "#4f46e5", "#dc2626", "#059669", "#d97706", "#7c3aed", "#0891b2", "#be185d", "#65a30d",
    "#ea580c", "#1f2937",
];

fn trimmed(v: &str) -> String {
    v.trim().to_string()
}

fn optional(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SubjectForm {
    pub fn from_subject(s: &Subject) -> Self {
        Self {
            name: s.name.clone(),
            color: Some(s.color.clone()),
            description: s.description.clone(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty()
    }

    fn validate(&self) -> Result<String> {
        if !self.can_submit() {
            return Err(TimetableError::bad_params("name must not be empty"));
        }
        let color = self
            .color
            .as_deref()
            .map(|c| c.trim().to_ascii_lowercase())
            .unwrap_or_else(|| SUBJECT_PALETTE[0].to_string());
        if !SUBJECT_PALETTE.contains(&color.as_str()) {
            return Err(TimetableError::bad_params(format!(
                "color must be one of the palette colors, got {}",
                color
            )));
        }
        Ok(color)
    }

    pub fn create(&self) -> Result<Subject> {
        let color = self.validate()?;
        Ok(Subject {
            id: new_id(),
            name: trimmed(&self.name),
            color,
            description: optional(self.description.as_deref()),
        })
    }

    pub fn apply_to(&self, existing: &Subject) -> Result<Subject> {
        let color = self.validate()?;
        Ok(Subject {
            id: existing.id.clone(),
            name: trimmed(&self.name),
            color,
            description: optional(self.description.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject_ids: Vec<String>,
}

impl TeacherForm {
    pub fn from_teacher(t: &Teacher) -> Self {
        Self {
            first_name: t.first_name.clone(),
            last_name: t.last_name.clone(),
            email: t.email.clone(),
            subject_ids: t.subject_ids.clone(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }

    fn build(&self, id: String) -> Result<Teacher> {
        if !self.can_submit() {
            return Err(TimetableError::bad_params(
                "firstName and lastName must not be empty",
            ));
        }
        let mut subject_ids: Vec<String> = Vec::with_capacity(self.subject_ids.len());
        for s in &self.subject_ids {
            let s = s.trim();
            if !s.is_empty() && !subject_ids.iter().any(|x| x == s) {
                subject_ids.push(s.to_string());
            }
        }
        Ok(Teacher {
            id,
            first_name: trimmed(&self.first_name),
            last_name: trimmed(&self.last_name),
            email: optional(self.email.as_deref()),
            subject_ids,
        })
    }

    pub fn create(&self) -> Result<Teacher> {
        self.build(new_id())
    }

    pub fn apply_to(&self, existing: &Teacher) -> Result<Teacher> {
        self.build(existing.id.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: String,
}

impl ClassForm {
    pub fn from_class(c: &SchoolClass) -> Self {
        Self {
            name: c.name.clone(),
            level: c.level.clone(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty()
    }

    fn build(&self, id: String) -> Result<SchoolClass> {
        if !self.can_submit() {
            return Err(TimetableError::bad_params("name must not be empty"));
        }
        Ok(SchoolClass {
            id,
            name: trimmed(&self.name),
            level: trimmed(&self.level),
        })
    }

    pub fn create(&self) -> Result<SchoolClass> {
        self.build(new_id())
    }

    pub fn apply_to(&self, existing: &SchoolClass) -> Result<SchoolClass> {
        self.build(existing.id.clone())
    }
}
