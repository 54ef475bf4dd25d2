use crate::db::{self, SqliteRepository};
use crate::model::{
    Catalog, Record, ScheduledCourse, SchoolClass, Subject, Teacher, UnscheduledCourse,
};
use crate::seed::SeedData;
use anyhow::{bail, Context};
use std::path::Path;
use std::rc::Rc;

/// Create/read/update/delete by id. Implementations keep insertion order
/// and never reorder on update.
pub trait Repository<T: Record> {
    fn list(&self) -> anyhow::Result<Vec<T>>;
    fn get(&self, id: &str) -> anyhow::Result<Option<T>>;
    /// Fails if a record with the same id already exists.
    fn create(&mut self, record: T) -> anyhow::Result<()>;
    /// Replaces the record with the same id in place. `false` if absent.
    fn update(&mut self, record: T) -> anyhow::Result<bool>;
    /// `false` if absent.
    fn delete(&mut self, id: &str) -> anyhow::Result<bool>;
}

pub struct MemoryRepository<T> {
    records: Vec<T>,
}

impl<T: Record> MemoryRepository<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn list(&self) -> anyhow::Result<Vec<T>> {
        Ok(self.records.clone())
    }

    fn get(&self, id: &str) -> anyhow::Result<Option<T>> {
        Ok(self.records.iter().find(|r| r.id() == id).cloned())
    }

    fn create(&mut self, record: T) -> anyhow::Result<()> {
        if self.records.iter().any(|r| r.id() == record.id()) {
            bail!("duplicate {} id: {}", T::KIND, record.id());
        }
        self.records.push(record);
        Ok(())
    }

    fn update(&mut self, record: T) -> anyhow::Result<bool> {
        match self.records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => {
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&mut self, id: &str) -> anyhow::Result<bool> {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        Ok(self.records.len() != before)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Sqlite,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Sqlite => "sqlite",
        }
    }
}

/// Every registry the handlers touch, behind the repository trait so the
/// backend can be swapped without touching callers.
pub struct Store {
    pub subjects: Box<dyn Repository<Subject>>,
    pub teachers: Box<dyn Repository<Teacher>>,
    pub classes: Box<dyn Repository<SchoolClass>>,
    pub unscheduled: Box<dyn Repository<UnscheduledCourse>>,
    pub scheduled: Box<dyn Repository<ScheduledCourse>>,
    backend: Backend,
}

impl Store {
    pub fn in_memory(seed: &SeedData) -> Self {
        Self {
            subjects: Box::new(MemoryRepository::new(seed.subjects.clone())),
            teachers: Box::new(MemoryRepository::new(seed.teachers.clone())),
            classes: Box::new(MemoryRepository::new(seed.classes.clone())),
            unscheduled: Box::new(MemoryRepository::new(seed.unscheduled_courses.clone())),
            scheduled: Box::new(MemoryRepository::new(seed.scheduled_courses.clone())),
            backend: Backend::Memory,
        }
    }

    /// Opens (or creates) the workspace database. A brand-new workspace is
    /// filled from `seed`; an existing one is left as is.
    pub fn open_workspace(workspace: &Path, seed: &SeedData) -> anyhow::Result<Self> {
        let conn = Rc::new(db::open_db(workspace)?);
        let mut store = Self {
            subjects: Box::new(SqliteRepository::<Subject>::new(conn.clone())),
            teachers: Box::new(SqliteRepository::<Teacher>::new(conn.clone())),
            classes: Box::new(SqliteRepository::<SchoolClass>::new(conn.clone())),
            unscheduled: Box::new(SqliteRepository::<UnscheduledCourse>::new(conn.clone())),
            scheduled: Box::new(SqliteRepository::<ScheduledCourse>::new(conn.clone())),
            backend: Backend::Sqlite,
        };
        if db::is_empty(&conn)? {
            tracing::info!(workspace = %workspace.display(), "seeding new workspace");
            store.load_seed(seed).context("failed to seed workspace")?;
        }
        Ok(store)
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn catalog(&self) -> anyhow::Result<Catalog> {
        Ok(Catalog {
            subjects: self.subjects.list()?,
            teachers: self.teachers.list()?,
            classes: self.classes.list()?,
        })
    }

    fn load_seed(&mut self, seed: &SeedData) -> anyhow::Result<()> {
        for s in &seed.subjects {
            self.subjects.create(s.clone())?;
        }
        for t in &seed.teachers {
            self.teachers.create(t.clone())?;
        }
        for c in &seed.classes {
            self.classes.create(c.clone())?;
        }
        for c in &seed.unscheduled_courses {
            self.unscheduled.create(c.clone())?;
        }
        for c in &seed.scheduled_courses {
            self.scheduled.create(c.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(id: &str, name: &str) -> SchoolClass {
        SchoolClass {
            id: id.to_string(),
            name: name.to_string(),
            level: String::new(),
        }
    }

    fn names(repo: &MemoryRepository<SchoolClass>) -> Vec<String> {
        repo.list()
            .expect("list")
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    #[test]
    fn delete_removes_exactly_one_and_keeps_order() {
        let mut repo = MemoryRepository::new(vec![
            class("1", "CP-A"),
            class("2", "CE1-A"),
            class("3", "CE2-A"),
        ]);
        assert!(repo.delete("2").expect("delete"));
        assert_eq!(names(&repo), vec!["CP-A", "CE2-A"]);
        assert!(!repo.delete("2").expect("delete again"));
        assert_eq!(names(&repo), vec!["CP-A", "CE2-A"]);
    }

    #[test]
    fn update_replaces_in_place() {
        let mut repo = MemoryRepository::new(vec![class("1", "CP-A"), class("2", "CE1-A")]);
        assert!(repo.update(class("1", "CP-B")).expect("update"));
        assert_eq!(names(&repo), vec!["CP-B", "CE1-A"]);
        assert!(!repo.update(class("9", "ghost")).expect("update missing"));
        assert_eq!(repo.list().expect("list").len(), 2);
    }

    #[test]
    fn create_rejects_duplicate_ids() {
        let mut repo = MemoryRepository::new(vec![class("1", "CP-A")]);
        assert!(repo.create(class("1", "again")).is_err());
        repo.create(class("2", "CE1-A")).expect("create");
        assert_eq!(names(&repo), vec!["CP-A", "CE1-A"]);
        assert_eq!(repo.get("2").expect("get").map(|c| c.name).as_deref(), Some("CE1-A"));
    }

    #[test]
    fn in_memory_store_exposes_seed() {
        let seed = SeedData::builtin();
        let store = Store::in_memory(&seed);
        assert_eq!(store.backend(), Backend::Memory);
        let catalog = store.catalog().expect("catalog");
        assert_eq!(catalog.subjects.len(), seed.subjects.len());
        assert_eq!(catalog.teachers.len(), seed.teachers.len());
        assert_eq!(
            store.scheduled.list().expect("scheduled").len(),
            seed.scheduled_courses.len()
        );
    }
}
