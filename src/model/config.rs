use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MindError;

const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct MindConfig {
    pub general: GeneralConfig,
    pub remote: RemoteConfig,
    pub libraries: LibrariesConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    pub install_root: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub archive_path: String,
    /// No timeout unless set.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibrariesConfig {
    pub probe: Vec<String>,
    pub install: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    pub wasi: bool,
}

impl MindConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let user = match user_config_path() {
            Some(path) if path.exists() => Some(
                fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
            ),
            _ => None,
        };

        Self::layered(user.as_deref())
    }

    /// Built-in defaults only.
    pub fn defaults() -> Result<Self> {
        Self::layered(None)
    }

    /// Defaults deep-merged with an optional user document.
    pub fn layered(user: Option<&str>) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULT_CONFIG)?;

        if let Some(raw) = user {
            let overlay: toml::Table = toml::from_str(raw).context("invalid user config")?;
            merge_tables(&mut merged, overlay);
        }

        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Explicit path wins, else the configured root. Created if missing.
    pub fn install_root(&self, explicit: Option<&Path>) -> crate::Result<PathBuf> {
        let root = match explicit {
            Some(path) => path.to_path_buf(),
            None => expand_tilde(Path::new(&self.general.install_root)),
        };

        fs::create_dir_all(&root).map_err(|err| MindError::io(&root, err))?;
        Ok(root)
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "guardin_mind")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

pub fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if !text.starts_with('~') {
        return path.to_path_buf();
    }

    if let Some(base_dirs) = directories::BaseDirs::new() {
        let home = base_dirs.home_dir().to_string_lossy();
        return PathBuf::from(text.replacen('~', &home, 1));
    }

    path.to_path_buf()
}
