use crate::config::Config;
use crate::grid::WeeklyGrid;
use crate::seed::SeedData;
use crate::store::Store;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Store,
    pub grid: WeeklyGrid,
    pub seed: SeedData,
}

impl AppState {
    /// In-memory state filled from `seed`.
    pub fn new(seed: SeedData) -> anyhow::Result<Self> {
        let store = Store::in_memory(&seed);
        let grid = WeeklyGrid::new(store.scheduled.list()?);
        Ok(Self {
            workspace: None,
            store,
            grid,
            seed,
        })
    }

    pub fn bootstrap(config: &Config) -> anyhow::Result<Self> {
        let seed = match &config.seed_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading seed file");
                SeedData::load(path)?
            }
            None => SeedData::builtin(),
        };
        let mut state = Self::new(seed)?;
        if let Some(workspace) = &config.workspace {
            state.open_workspace(workspace)?;
        }
        Ok(state)
    }

    /// Switches to a SQLite-backed workspace; the grid reloads from it.
    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<()> {
        let store = Store::open_workspace(path, &self.seed)?;
        let courses = store.scheduled.list()?;
        self.store = store;
        self.grid.replace_courses(courses);
        self.workspace = Some(path.to_path_buf());
        tracing::info!(workspace = %path.display(), "workspace opened");
        Ok(())
    }
}
