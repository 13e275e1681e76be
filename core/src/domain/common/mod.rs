use std::path::PathBuf;
use std::time::Duration;

pub mod entities;

#[derive(Clone, Debug)]
pub struct CaloscopeConfig {
    pub api: ApiConfig,
    pub history: HistoryConfig,
    pub session: SessionConfig,
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct HistoryConfig {
    /// How long a completed fetch keeps suppressing identical fetches.
    pub fetch_grace_period: Duration,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            fetch_grace_period: Duration::from_millis(300),
        }
    }
}

#[derive(Clone, Debug)]
pub enum SessionConfig {
    File { path: PathBuf },
    Ephemeral,
}
