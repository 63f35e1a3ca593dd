use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MindError>;

/// Coarse classification used by callers that only care about the failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    MalformedInput,
    VersionIncompatible,
    TransientIo,
    Io,
}

#[derive(Debug, Error)]
pub enum MindError {
    #[error("config file not found at: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("invalid TOML in {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required field: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("invalid version requirement '{requirement}': {source}")]
    InvalidVersionRequirement {
        requirement: String,
        #[source]
        source: semver::Error,
    },

    #[error("minder requires a different runtime: {actual} not in '{required}'")]
    IncompatibleRuntimeVersion { required: String, actual: String },

    #[error("minder requires a different Mind: {actual} not in '{required}'")]
    IncompatibleHostVersion { required: String, actual: String },

    #[error("the minder `{name}` was not found on the path `{}`", path.display())]
    PluginDirectoryNotFound { name: String, path: PathBuf },

    #[error("minder '{name}' not found locally in {}{}", root.display(), suggestion_suffix(suggestion))]
    PluginNotInstalled {
        name: String,
        root: PathBuf,
        suggestion: Option<String>,
    },

    #[error("minder entry point for '{name}' not found in {}", path.display())]
    PluginClassNotFound { name: String, path: PathBuf },

    #[error("no minder named '{name}'")]
    NoSuchMinder {
        name: String,
        #[source]
        source: Box<MindError>,
    },

    #[error("minder '{name}' failed to initialise: {message}")]
    MinderInit { name: String, message: String },

    #[error("minder '{name}' call to '{function}' failed: {message}")]
    MinderCall {
        name: String,
        function: String,
        message: String,
    },

    #[error("version string not found in {}", path.display())]
    VersionStringNotFound { path: PathBuf },

    #[error("incorrect format '{ident}', use the format <author_MinderName>")]
    MalformedIdentifier { ident: String },

    #[error("error downloading the minder, status {status} for {url}")]
    DownloadFailed { status: u16, url: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("unexpected archive structure: expected one top-level directory, found {found}")]
    UnexpectedArchiveLayout { found: usize },

    #[error("failed to install library '{library}': {reason}")]
    LibraryInstallFailed { library: String, reason: String },

    #[error("dependency cycle detected: {}", chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },

    #[error("minder directory disappeared before removal: {}", path.display())]
    PluginDirectoryMissing { path: PathBuf },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|name| format!(" (did you mean '{name}'?)"))
        .unwrap_or_default()
}

impl MindError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PluginDirectoryNotFound { .. }
            | Self::PluginNotInstalled { .. } => ErrorKind::NotFound,
            Self::NoSuchMinder { source, .. } => source.kind(),
            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::MissingRequiredField { .. }
            | Self::InvalidVersionRequirement { .. }
            | Self::PluginClassNotFound { .. }
            | Self::MinderInit { .. }
            | Self::VersionStringNotFound { .. }
            | Self::MalformedIdentifier { .. }
            | Self::Archive(_)
            | Self::UnexpectedArchiveLayout { .. }
            | Self::DependencyCycle { .. } => ErrorKind::MalformedInput,
            Self::IncompatibleRuntimeVersion { .. } | Self::IncompatibleHostVersion { .. } => {
                ErrorKind::VersionIncompatible
            }
            Self::DownloadFailed { .. } | Self::Http(_) => ErrorKind::TransientIo,
            Self::MinderCall { .. }
            | Self::LibraryInstallFailed { .. }
            | Self::PluginDirectoryMissing { .. }
            | Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// True when the minder is absent, as opposed to present but broken.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PluginDirectoryNotFound { .. } | Self::PluginNotInstalled { .. }
        ) || matches!(self, Self::NoSuchMinder { source, .. } if source.is_not_found())
    }
}
