pub mod ingest;
pub mod init;
pub mod serve;

use dualchat_config::AppConfig;
use std::path::{Path, PathBuf};

/// The config file in use: `--config`, else `~/.dualchat/config.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load the config file with environment overrides applied.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = config_path(explicit);
    AppConfig::load_with_env(&path).map_err(|e| format!("Failed to load config: {e}").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_path_is_under_config_dir() {
        let path = config_path(None);
        assert!(path.ends_with(".dualchat/config.toml"));
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = config_path(Some(Path::new("/tmp/custom.toml")));
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }
}
