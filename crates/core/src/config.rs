use crate::logging::{log_file_path, LogSettings};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the OS data directory for `BatchRenamer.log`.
    pub log_dir: Option<PathBuf>,
    pub print_to_screen: bool,
    pub sort_entries: bool,
    pub copy_mode: bool,
}

impl AppConfig {
    pub fn log_settings(&self, paths: &AppPaths) -> LogSettings {
        LogSettings {
            log_dir: self
                .log_dir
                .clone()
                .unwrap_or_else(|| paths.log_dir.clone()),
            print_to_screen: self.print_to_screen,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    pub fn default_log_path(&self) -> PathBuf {
        log_file_path(&self.log_dir)
    }
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "batch-renamer", "batch-renamer")
        .context("could not determine the OS configuration directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        log_dir: proj.data_local_dir().join("logs"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    load_config_from(&paths.config_path)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let paths = app_paths()?;
    save_config_to(config, &paths.config_path)
}

/// Missing file means defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read config file: {}", path.display()))?;

    let config = toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("could not parse config file: {}", path.display()))?;
    Ok(config)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("could not create config directory: {}", dir.display()))?;
    }
    let body = toml::to_string_pretty(config).context("could not serialize config")?;
    fs::write(path, body)
        .with_context(|| format!("could not write config file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().expect("tempdir");
        let config = load_config_from(&temp.path().join("absent.toml")).expect("load");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("config.toml");
        let config = AppConfig {
            log_dir: Some(temp.path().join("logs")),
            print_to_screen: true,
            sort_entries: true,
            copy_mode: false,
        };

        save_config_to(&config, &path).expect("save");
        assert_eq!(load_config_from(&path).expect("load"), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "sort_entries = true\n").expect("write");

        let config = load_config_from(&path).expect("load");
        assert!(config.sort_entries);
        assert!(!config.print_to_screen);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn broken_file_is_reported() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "sort_entries = \"yes\"").expect("write");

        let err = load_config_from(&path).expect_err("should fail");
        assert!(err.to_string().contains("could not parse config file"));
    }

    #[test]
    fn log_dir_override_wins() {
        let paths = AppPaths {
            config_dir: PathBuf::from("/cfg"),
            config_path: PathBuf::from("/cfg/config.toml"),
            log_dir: PathBuf::from("/data/logs"),
        };
        let default = AppConfig::default().log_settings(&paths);
        assert_eq!(default.log_dir, PathBuf::from("/data/logs"));

        let custom = AppConfig {
            log_dir: Some(PathBuf::from("/elsewhere")),
            ..AppConfig::default()
        };
        assert_eq!(custom.log_settings(&paths).log_dir, PathBuf::from("/elsewhere"));
    }
}
