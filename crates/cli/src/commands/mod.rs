pub mod init;
pub mod inspect;
pub mod tools;

use cartwright_config::AppConfig;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The explicit `--user`, or the configured default.
pub(crate) fn resolve_user(config: &AppConfig, user: Option<String>) -> String {
    user.unwrap_or_else(|| config.session.default_user.clone())
}
