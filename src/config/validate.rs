use anyhow::{Result, bail};

use super::AppConfig;

const SUPPORTED_SCHEMES: &[&str] = &["postgres://", "postgresql://", "sqlite:"];

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.general.port == 0 {
        errors.push("general.port must be > 0".to_string());
    }

    let url = cfg.database.url.trim().to_ascii_lowercase();
    if url.is_empty() {
        errors.push("database.url must not be empty".to_string());
    } else if !SUPPORTED_SCHEMES
        .iter()
        .any(|scheme| url.starts_with(scheme))
    {
        errors.push(format!(
            "database.url must use one of: {}",
            SUPPORTED_SCHEMES.join(", ")
        ));
    }

    if cfg.database.max_connections == 0 {
        errors.push("database.max_connections must be > 0".to_string());
    }

    if cfg.database.min_idle > cfg.database.max_connections {
        errors.push(format!(
            "database.min_idle ({}) must be <= database.max_connections ({})",
            cfg.database.min_idle, cfg.database.max_connections
        ));
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
