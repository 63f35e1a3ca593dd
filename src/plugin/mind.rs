use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::error::{MindError, Result};
use crate::model::config::MindConfig;
use crate::plugin::resolver::{LocalResolver, SearchRoot};
use crate::plugin::runtime::{Minder, MinderType};
use crate::plugin::version_gate::HostVersions;

static VERSION_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*version\s*=\s*['"]([^'"]+)['"]"#).expect("valid version regex")
});

/// WASI setting for [`Mind::with_install_root`] and [`Mind::with_minder_dir`].
/// Matches `[runtime] wasi` in the built-in config.
pub const DEFAULT_WASI: bool = true;

/// A minder with a statically known name.
pub trait TypedMinder: Sized {
    const NAME: &'static str;

    fn from_minder(minder: Minder) -> Self;
}

/// Lazily resolves minders by name and caches the resolved types.
#[derive(Debug)]
pub struct Mind {
    resolver: LocalResolver,
    cache: HashMap<String, Arc<MinderType>>,
}

impl Mind {
    /// Uses the configured install root, creating it if needed.
    pub fn new(config: &MindConfig) -> Result<Self> {
        let root = config.install_root(None)?;
        Ok(Self::from_resolver(LocalResolver::new(
            SearchRoot::InstallRoot(root),
            HostVersions::default(),
            config.runtime.wasi,
        )))
    }

    pub fn with_install_root(root: impl Into<PathBuf>) -> Self {
        Self::from_resolver(LocalResolver::new(
            SearchRoot::InstallRoot(root.into()),
            HostVersions::default(),
            DEFAULT_WASI,
        ))
    }

    /// Bypasses search: every lookup resolves against this one minder directory.
    pub fn with_minder_dir(dir: impl Into<PathBuf>) -> Self {
        Self::from_resolver(LocalResolver::new(
            SearchRoot::MinderDir(dir.into()),
            HostVersions::default(),
            DEFAULT_WASI,
        ))
    }

    pub fn from_resolver(resolver: LocalResolver) -> Self {
        Self {
            resolver,
            cache: HashMap::new(),
        }
    }

    pub fn resolver(&self) -> &LocalResolver {
        &self.resolver
    }

    pub fn get(&mut self, name: &str) -> Result<Arc<MinderType>> {
        if let Some(cached) = self.cache.get(name) {
            return Ok(Arc::clone(cached));
        }

        let minder_type = self
            .resolver
            .resolve(name)
            .map(Arc::new)
            .map_err(|source| MindError::NoSuchMinder {
                name: name.to_string(),
                source: Box::new(source),
            })?;

        self.cache
            .insert(name.to_string(), Arc::clone(&minder_type));
        Ok(minder_type)
    }

    pub fn instantiate(&mut self, name: &str) -> Result<Minder> {
        self.get(name)?.instantiate()
    }

    /// Resolves `T::NAME` and wraps a fresh instance.
    pub fn load<T: TypedMinder>(&mut self) -> Result<T> {
        self.instantiate(T::NAME).map(T::from_minder)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// First `version = "..."` line of a file, without parsing the document.
    pub fn version_from_file(path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).map_err(|err| MindError::io(path, err))?;

        VERSION_DECL_RE
            .captures(&content)
            .and_then(|caps| caps.get(1))
            .map(|found| found.as_str().to_string())
            .ok_or_else(|| MindError::VersionStringNotFound {
                path: path.to_path_buf(),
            })
    }
}
