//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/reposo/config.toml`
//! - macOS: `~/Library/Application Support/reposo/config.toml`
//! - Windows: `%APPDATA%\reposo\config.toml`

use std::path::PathBuf;

use crate::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "reposo";

/// File name of the engine configuration.
pub const CONFIG_FILE: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Ensure the user config directory exists, creating it if necessary.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_under_app_dir() {
        let path = default_config_path();
        assert!(path.ends_with("reposo/config.toml"));
        assert_eq!(path.parent(), Some(user_config_dir().as_path()));
    }
}
