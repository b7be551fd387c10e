use std::{fs, path::Path};

use serde::Deserialize;

use crate::core::error::TriageError;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub webhook_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub db_path: String,
}

pub fn load_config(path: Option<&str>) -> Result<AppConfig, TriageError> {
    let default_path = Path::new("config/triage.toml");
    let path = path.map(Path::new).unwrap_or(default_path);

    if !path.exists() {
        return Ok(default_config());
    }

    let content = fs::read_to_string(path).map_err(|e| TriageError::Config(e.to_string()))?;
    let cfg: AppConfig =
        toml::from_str(&content).map_err(|e| TriageError::Config(e.to_string()))?;
    Ok(cfg)
}

fn default_config() -> AppConfig {
    AppConfig {
        webhook_url: "http://localhost:3001/api/webhook-test/log".to_string(),
        timeout_ms: 30_000,
        user_agent: "threat-triage/1.0".to_string(),
        db_path: "data/triage.db".to_string(),
    }
}
