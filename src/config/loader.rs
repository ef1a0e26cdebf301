//! Configuration loader with tier-based merging.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    Project = 1,
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration directories from environment and defaults.
    pub fn discover() -> Self {
        let user_dir = std::env::var("JOIN_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".join")));

        let project_dir = std::env::var("JOIN_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("join")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    fn file_for(&self, tier: ConfigTier) -> Option<PathBuf> {
        let dir = match tier {
            ConfigTier::Project => self.project_dir.as_ref(),
            ConfigTier::User => self.user_dir.as_ref(),
            ConfigTier::Defaults | ConfigTier::Environment => None,
        }?;
        Some(dir.join("config.yaml"))
    }
}

/// Loads and merges configuration tiers.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Files that contributed, lowest tier first.
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration from an explicit file, skipping the tier merge.
    pub fn load_file(path: &Path) -> Result<Self> {
        let mut config = Config::load(path)?;
        Self::apply_env_overrides(&mut config)?;
        Ok(Self {
            paths: ConfigPaths::with_dirs(None, None),
            config,
            sources: vec![path.to_path_buf()],
        })
    }

    /// Load configuration with explicit tier directories.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        if let Ok(explicit) = std::env::var("JOIN_CONFIG_PATH") {
            return Self::load_file(Path::new(&explicit));
        }

        let mut tiers: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut sources = Vec::new();

        for tier in [ConfigTier::Project, ConfigTier::User] {
            let Some(file) = paths.file_for(tier) else {
                continue;
            };
            if !file.exists() {
                continue;
            }
            match read_yaml(&file) {
                Ok(value) => {
                    debug!(tier = %tier, path = %file.display(), "Loaded config tier");
                    tiers.push(value);
                    sources.push(file);
                }
                Err(e) => warn!(tier = %tier, path = %file.display(), error = %e, "Skipping unreadable config"),
            }
        }

        let mut config: Config = serde_json::from_value(deep_merge_all(tiers))?;
        Self::apply_env_overrides(&mut config)?;

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config) -> Result<()> {
        if let Ok(url) = std::env::var("JOIN_REMOTE_URL") {
            config.remote.base_url = Some(url).filter(|u| !u.trim().is_empty());
        }

        if let Ok(dir) = std::env::var("JOIN_SESSION_DIR") {
            config.session.dir = Some(PathBuf::from(dir));
        }

        if let Ok(port) = std::env::var("JOIN_UI_PORT") {
            config.ui.port = port
                .parse()
                .with_context(|| format!("JOIN_UI_PORT is not a port number: {}", port))?;
        }

        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_yaml::from_str(&content)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Tests below never set JOIN_* variables, so they only see file tiers
    // unless the surrounding environment sets them.

    #[test]
    fn defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        assert!(loader.sources().is_empty());
        assert!(!loader.config().remote.write_through);
        assert_eq!(loader.config().ui.bind, "127.0.0.1");
    }

    #[test]
    fn user_overrides_project_per_field() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("join");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        std::fs::write(
            project_dir.join("config.yaml"),
            "remote:\n  write_through: true\nui:\n  bind: 0.0.0.0\n",
        )
        .unwrap();
        std::fs::write(user_dir.join("config.yaml"), "ui:\n  bind: 10.0.0.1\n").unwrap();

        let loader =
            ConfigLoader::load_with_paths(ConfigPaths::with_dirs(Some(project_dir), Some(user_dir)))
                .unwrap();
        let config = loader.config();
        assert!(config.remote.write_through);
        assert_eq!(config.ui.bind, "10.0.0.1");
        assert_eq!(loader.sources().len(), 2);
    }

    #[test]
    fn unreadable_tier_is_skipped() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("join");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "ui: [not, a, map").unwrap();

        let loader =
            ConfigLoader::load_with_paths(ConfigPaths::with_dirs(Some(project_dir), None)).unwrap();
        assert!(loader.sources().is_empty());
    }

    #[test]
    fn explicit_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("join.yaml");
        std::fs::write(&file, "session:\n  dir: /tmp/join-session\n").unwrap();

        let loader = ConfigLoader::load_file(&file).unwrap();
        assert_eq!(
            loader.config().session.dir.as_deref(),
            Some(Path::new("/tmp/join-session"))
        );
    }
}
