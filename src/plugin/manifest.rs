use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{MindError, Result};

pub const CONFIG_FILE: &str = "minder.toml";

const REQUIRED_FIELDS: [&str; 2] = ["name", "version"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
}

/// Validated metadata of one minder, read from its `minder.toml`.
///
/// Serializes with underscore keys and without unset fields; that form is
/// the descriptor handed to the registration hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinderManifest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<Author>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Required range of the Mind host version.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "mind",
        alias = "mind-requires",
        alias = "mind_requires",
        alias = "host_version_requirement"
    )]
    pub host_requirement: Option<String>,
    /// Required range of the minder runtime interface version.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "runtime",
        alias = "runtime-requires",
        alias = "runtime_requires",
        alias = "runtime_version_requirement"
    )]
    pub runtime_requirement: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "install-requires",
        alias = "library_dependencies"
    )]
    pub install_requires: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "requires-minders",
        alias = "plugin_dependencies"
    )]
    pub requires_minders: Option<Vec<String>>,
}

impl MinderManifest {
    /// Reads `minder.toml` from a minder directory.
    pub fn read(minder_dir: &Path) -> Result<Self> {
        let path = minder_dir.join(CONFIG_FILE);
        let raw = fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => MindError::ConfigNotFound { path: path.clone() },
            _ => MindError::io(&path, err),
        })?;

        Self::parse(&raw).map_err(|err| match err {
            MindError::ConfigParse { source, .. } => MindError::ConfigParse { path, source },
            other => other,
        })
    }

    /// Fields are taken from a `[minder]` table when present, else from the top level.
    pub fn parse(raw: &str) -> Result<Self> {
        let parse_err = |source: toml::de::Error| MindError::ConfigParse {
            path: CONFIG_FILE.into(),
            source,
        };

        let mut document: toml::Table = toml::from_str(raw).map_err(parse_err)?;
        let table = match document.remove("minder") {
            Some(toml::Value::Table(section)) => section,
            Some(other) => {
                document.insert("minder".to_string(), other);
                document
            }
            None => document,
        };

        if let Some(field) = REQUIRED_FIELDS
            .into_iter()
            .find(|field| !table.contains_key(*field))
        {
            return Err(MindError::MissingRequiredField { field });
        }

        toml::Value::Table(table).try_into().map_err(parse_err)
    }

    pub fn library_dependencies(&self) -> &[String] {
        self.install_requires.as_deref().unwrap_or_default()
    }

    pub fn minder_dependencies(&self) -> &[String] {
        self.requires_minders.as_deref().unwrap_or_default()
    }
}
