use crate::model::{Record, ScheduledCourse, SchoolClass, Subject, Teacher, UnscheduledCourse};
use crate::store::Repository;
use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::marker::PhantomData;
use std::path::Path;
use std::rc::Rc;

pub const DB_FILE: &str = "timetable.sqlite3";

const TABLES: [&str; 5] = [
    Subject::TABLE,
    Teacher::TABLE,
    SchoolClass::TABLE,
    UnscheduledCourse::TABLE,
    ScheduledCourse::TABLE,
];

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.display()))?;
    let conn = Connection::open(workspace.join(DB_FILE))?;
    init_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

// Each record is one JSON document; sort_order keeps list order stable.
fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    for table in TABLES {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table}(
                    id TEXT PRIMARY KEY,
                    sort_order INTEGER NOT NULL,
                    payload TEXT NOT NULL
                )"
            ),
            [],
        )?;
        conn.execute(
            &format!("CREATE INDEX IF NOT EXISTS idx_{table}_sort ON {table}(sort_order)"),
            [],
        )?;
    }
    Ok(())
}

pub fn is_empty(conn: &Connection) -> anyhow::Result<bool> {
    for table in TABLES {
        let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| {
            r.get(0)
        })?;
        if n > 0 {
            return Ok(false);
        }
    }
    Ok(true)
}

pub struct SqliteRepository<T> {
    conn: Rc<Connection>,
    _record: PhantomData<T>,
}

impl<T: Record> SqliteRepository<T> {
    pub fn new(conn: Rc<Connection>) -> Self {
        Self {
            conn,
            _record: PhantomData,
        }
    }
}

fn decode<T: Record>(payload: &str) -> anyhow::Result<T> {
    serde_json::from_str(payload).with_context(|| format!("corrupt {} row in {}", T::KIND, T::TABLE))
}

impl<T: Record> Repository<T> for SqliteRepository<T> {
    fn list(&self) -> anyhow::Result<Vec<T>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT payload FROM {} ORDER BY sort_order, rowid",
            T::TABLE
        ))?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        payloads.iter().map(|p| decode::<T>(p)).collect()
    }

    fn get(&self, id: &str) -> anyhow::Result<Option<T>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT payload FROM {} WHERE id = ?", T::TABLE),
                [id],
                |r| r.get(0),
            )
            .optional()?;
        payload.as_deref().map(decode::<T>).transpose()
    }

    fn create(&mut self, record: T) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&record)?;
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {table}(id, sort_order, payload)
                     VALUES(?, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM {table}), ?)",
                    table = T::TABLE
                ),
                (record.id(), &payload),
            )
            .with_context(|| format!("failed to insert {} {}", T::KIND, record.id()))?;
        Ok(())
    }

    fn update(&mut self, record: T) -> anyhow::Result<bool> {
        let payload = serde_json::to_string(&record)?;
        let n = self.conn.execute(
            &format!("UPDATE {} SET payload = ? WHERE id = ?", T::TABLE),
            (&payload, record.id()),
        )?;
        Ok(n > 0)
    }

    fn delete(&mut self, id: &str) -> anyhow::Result<bool> {
        let n = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?", T::TABLE), [id])?;
        Ok(n > 0)
    }
}
