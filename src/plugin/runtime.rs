use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use extism::{CompiledPlugin, Manifest, Plugin, PluginBuilder, Wasm};

use crate::error::{MindError, Result};
use crate::plugin::manifest::MinderManifest;
use crate::plugin::version_gate::HostVersions;

pub const ENTRY_FILE: &str = "minder.wasm";

/// A resolved minder: its compiled entry point, ready to be instantiated.
pub struct MinderType {
    name: String,
    root_dir: PathBuf,
    compiled: CompiledPlugin,
    versions: HostVersions,
}

impl fmt::Debug for MinderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinderType")
            .field("name", &self.name)
            .field("root_dir", &self.root_dir)
            .finish_non_exhaustive()
    }
}

impl MinderType {
    /// Compiles `entry` and checks that it exports a function named exactly `name`.
    /// Any failure is logged and yields `None`.
    pub fn load(
        entry: &Path,
        name: &str,
        wasi: bool,
        versions: &HostVersions,
    ) -> Option<Self> {
        let wasm = match fs::read(entry) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!("failed to read minder entry {}: {err}", entry.display());
                return None;
            }
        };

        let builder = PluginBuilder::new(Manifest::new([Wasm::data(wasm)])).with_wasi(wasi);
        let compiled = match CompiledPlugin::new(builder) {
            Ok(compiled) => compiled,
            Err(err) => {
                tracing::warn!("failed to compile minder {name}: {err:#}");
                return None;
            }
        };
        let plugin = match Plugin::new_from_compiled(&compiled) {
            Ok(plugin) => plugin,
            Err(err) => {
                tracing::warn!("failed to load minder {name}: {err:#}");
                return None;
            }
        };

        if !plugin.function_exists(name) {
            tracing::warn!(
                "minder entry {} does not export '{name}'",
                entry.display()
            );
            return None;
        }

        let root_dir = entry
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Some(Self {
            name: name.to_string(),
            root_dir,
            compiled,
            versions: versions.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Reads and gates the config, then runs the registration hook.
    pub fn instantiate(&self) -> Result<Minder> {
        let manifest = MinderManifest::read(&self.root_dir)?;
        self.versions.check(&manifest)?;

        if manifest.name != self.name {
            tracing::warn!(
                "minder {} declares name '{}' in its config",
                self.name,
                manifest.name
            );
        }

        let mut plugin = Plugin::new_from_compiled(&self.compiled).map_err(|err| {
            MindError::MinderInit {
                name: self.name.clone(),
                message: format!("{err:#}"),
            }
        })?;

        let descriptor = descriptor(&manifest).map_err(|err| MindError::MinderInit {
            name: self.name.clone(),
            message: err.to_string(),
        })?;

        plugin
            .call::<&str, &[u8]>(&self.name, &descriptor)
            .map_err(|err| MindError::MinderInit {
                name: self.name.clone(),
                message: format!("{err:#}"),
            })?;

        tracing::debug!("instantiated minder {} v{}", manifest.name, manifest.version);

        Ok(Minder { manifest, plugin })
    }
}

/// JSON passed to the registration hook.
pub fn descriptor(manifest: &MinderManifest) -> serde_json::Result<String> {
    serde_json::to_string(manifest)
}

/// A live minder instance. Owns its descriptor.
pub struct Minder {
    manifest: MinderManifest,
    plugin: Plugin,
}

impl Minder {
    pub fn manifest(&self) -> &MinderManifest {
        &self.manifest
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    pub fn has_function(&self, function: &str) -> bool {
        self.plugin.function_exists(function)
    }

    pub fn call(&mut self, function: &str, input: &str) -> Result<String> {
        let output: &[u8] = self.plugin.call(function, input).map_err(|err| MindError::MinderCall {
            name: self.manifest.name.clone(),
            function: function.to_string(),
            message: format!("{err:#}"),
        })?;

        Ok(String::from_utf8_lossy(output).into_owned())
    }
}

impl fmt::Debug for Minder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Minder")
            .field("name", &self.manifest.name)
            .field("version", &self.manifest.version)
            .finish_non_exhaustive()
    }
}
