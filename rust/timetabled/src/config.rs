use std::path::PathBuf;

pub const ENV_SEED: &str = "TIMETABLED_SEED";
pub const ENV_WORKSPACE: &str = "TIMETABLED_WORKSPACE";
pub const ENV_LOG: &str = "TIMETABLED_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON file replacing the built-in seed registries.
    pub seed_path: Option<PathBuf>,
    /// Workspace directory to open at start-up instead of the in-memory store.
    pub workspace: Option<PathBuf>,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            seed_path: non_empty(ENV_SEED).map(PathBuf::from),
            workspace: non_empty(ENV_WORKSPACE).map(PathBuf::from),
            log_filter: non_empty(ENV_LOG).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}
