use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

#[derive(Clone, Debug)]
pub struct TruthlensConfig {
    pub user_agent: String,
    pub database_url: String,
    pub cache_dir: PathBuf,
    pub analyzer_cmd: String,
    pub analyzer_timeout: Duration,
    pub worklog_url: Option<String>,
    pub worklog_key: Option<String>,
}

impl TruthlensConfig {
    pub fn from_env() -> Result<Self> {
        let user_agent = std::env::var("TRUTHLENS_USER_AGENT")
            .unwrap_or_else(|_| "truthlens/0.1 (research@example.com)".to_string());

        let db_path = std::env::var("TRUTHLENS_DB").unwrap_or_else(|_| "truthlens.db".to_string());
        // mode=rwc so a fresh install creates the database file
        let database_url = format!("sqlite://{}?mode=rwc", db_path);

        let cache_dir = PathBuf::from(
            std::env::var("TRUTHLENS_CACHE_DIR").unwrap_or_else(|_| "data/cache".to_string()),
        );

        let analyzer_cmd =
            std::env::var("TRUTHLENS_ANALYZER_CMD").unwrap_or_else(|_| "claude".to_string());

        let analyzer_timeout = std::env::var("TRUTHLENS_ANALYZER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(120));

        let worklog_url = std::env::var("WORKLOG_URL").ok();
        let worklog_key = std::env::var("WORKLOG_KEY").ok();

        Ok(Self {
            user_agent,
            database_url,
            cache_dir,
            analyzer_cmd,
            analyzer_timeout,
            worklog_url,
            worklog_key,
        })
    }
}
