//! The one place initial registry contents are declared. A JSON file of the
//! same shape can replace the built-in set (see `TIMETABLED_SEED`).

use crate::model::{
    Day, Record, ScheduledCourse, SchoolClass, Subject, Teacher, UnscheduledCourse,
};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub classes: Vec<SchoolClass>,
    #[serde(default)]
    pub unscheduled_courses: Vec<UnscheduledCourse>,
    #[serde(default)]
    pub scheduled_courses: Vec<ScheduledCourse>,
}

fn subject(id: &str, name: &str, color: &str, description: &str) -> Subject {
    Subject {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        description: Some(description.to_string()),
    }
}

fn teacher(id: &str, first: &str, last: &str, subject_ids: &[&str]) -> Teacher {
    Teacher {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: Some(format!(
            "{}.{}@ecole.fr",
            first.to_lowercase(),
            last.to_lowercase()
        )),
        subject_ids: subject_ids.iter().map(|s| s.to_string()).collect(),
    }
}

fn class(id: &str, name: &str, level: &str) -> SchoolClass {
    SchoolClass {
        id: id.to_string(),
        name: name.to_string(),
        level: level.to_string(),
    }
}

fn quota(
    id: &str,
    class_id: &str,
    subject_id: &str,
    teacher_id: &str,
    total: u32,
    remaining: u32,
) -> UnscheduledCourse {
    UnscheduledCourse {
        id: id.to_string(),
        class_id: class_id.to_string(),
        subject_id: subject_id.to_string(),
        teacher_id: teacher_id.to_string(),
        total_hours: total,
        remaining_hours: remaining,
    }
}

impl SeedData {
    pub fn builtin() -> Self {
        let subjects = vec![
            subject("1", "Mathématiques", "#4f46e5", "Calcul, géométrie, problèmes"),
            subject("2", "Français", "#dc2626", "Lecture, écriture, grammaire"),
            subject("3", "Sciences", "#059669", "Découverte du monde, expériences"),
            subject("4", "Histoire", "#d97706", "Histoire de France et du monde"),
            subject("5", "Géographie", "#7c3aed", "Cartes, régions, pays"),
            subject("6", "Anglais", "#0891b2", "Langue vivante étrangère"),
            subject("7", "Arts plastiques", "#be185d", "Dessin, peinture, créativité"),
            subject("8", "Musique", "#65a30d", "Chant, instruments, écoute"),
            subject("9", "EPS", "#ea580c", "Sport et activités physiques"),
        ];
        let teachers = vec![
            teacher("1", "Marie", "Dupont", &["1", "3"]),
            teacher("2", "Jean", "Martin", &["2", "4"]),
            teacher("3", "Sophie", "Bernard", &["6"]),
            teacher("4", "Pierre", "Rousseau", &["7", "8"]),
            teacher("5", "Claire", "Leroy", &["9"]),
        ];
        let classes = vec![
            class("1", "CP-A", "CP"),
            class("2", "CE1-A", "CE1"),
            class("3", "CE2-A", "CE2"),
            class("4", "CM1-A", "CM1"),
            class("5", "CM2-A", "CM2"),
        ];
        let unscheduled_courses = vec![
            quota("1", "1", "1", "1", 5, 3),
            quota("2", "1", "2", "2", 8, 4),
            quota("3", "2", "1", "1", 5, 2),
            quota("4", "2", "6", "3", 3, 3),
            quota("5", "3", "4", "2", 2, 2),
        ];
        let scheduled_courses = vec![
            ScheduledCourse {
                id: "6".to_string(),
                subject: "EPS".to_string(),
                teacher: "Claire Leroy".to_string(),
                class_name: "CP-A".to_string(),
                day: Day::Monday,
                start_time: "08:00".to_string(),
                duration: 100,
                color: "#ea580c".to_string(),
                is_scheduled: true,
                subject_id: Some("9".to_string()),
                teacher_id: Some("5".to_string()),
                class_id: Some("1".to_string()),
            },
            ScheduledCourse {
                id: "7".to_string(),
                subject: "Arts plastiques".to_string(),
                teacher: "Pierre Rousseau".to_string(),
                class_name: "CP-A".to_string(),
                day: Day::Tuesday,
                start_time: "13:10".to_string(),
                duration: 50,
                color: "#be185d".to_string(),
                is_scheduled: true,
                subject_id: Some("7".to_string()),
                teacher_id: Some("4".to_string()),
                class_id: Some("1".to_string()),
            },
        ];
        Self {
            subjects,
            teachers,
            classes,
            unscheduled_courses,
            scheduled_courses,
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        let seed: SeedData = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse seed file {}", path.display()))?;
        seed.validate()?;
        Ok(seed)
    }

    /// Ids must be unique within each registry.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure_unique_ids(&self.subjects)?;
        ensure_unique_ids(&self.teachers)?;
        ensure_unique_ids(&self.classes)?;
        ensure_unique_ids(&self.unscheduled_courses)?;
        ensure_unique_ids(&self.scheduled_courses)?;
        Ok(())
    }
}

fn ensure_unique_ids<T: Record>(records: &[T]) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for r in records {
        if !seen.insert(r.id()) {
            bail!("duplicate {} id in seed: {}", T::KIND, r.id());
        }
    }
    Ok(())
}
