use std::path::{Path, PathBuf};

use crate::error::{MindError, Result};
use crate::model::config::MindConfig;
use crate::model::ident::MinderIdent;
use crate::msg::InstallEvent;
use crate::plugin::archive;
use crate::plugin::libraries::{CommandEnvironment, LibraryEnvironment};
use crate::plugin::manifest::MinderManifest;
use crate::plugin::source::{ArchiveSource, HttpArchiveSource};
use crate::plugin::version_gate::HostVersions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadySatisfied,
}

/// Fetches, unpacks, validates, and recursively installs minders into one root.
pub struct PluginInstaller {
    install_root: PathBuf,
    source: Box<dyn ArchiveSource>,
    libraries: Box<dyn LibraryEnvironment>,
    versions: HostVersions,
}

impl PluginInstaller {
    pub fn new(
        install_root: impl Into<PathBuf>,
        source: Box<dyn ArchiveSource>,
        libraries: Box<dyn LibraryEnvironment>,
        versions: HostVersions,
    ) -> Self {
        Self {
            install_root: install_root.into(),
            source,
            libraries,
            versions,
        }
    }

    /// HTTP source and command-based library environment from config.
    pub fn from_config(config: &MindConfig, install_root: Option<&Path>) -> Result<Self> {
        Ok(Self::new(
            config.install_root(install_root)?,
            Box::new(HttpArchiveSource::new(&config.remote)?),
            Box::new(CommandEnvironment::new(&config.libraries)),
            HostVersions::default(),
        ))
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.install_root.join(name).is_dir()
    }

    pub fn install(
        &self,
        ident: &str,
        events: &mut dyn FnMut(InstallEvent),
    ) -> Result<InstallOutcome> {
        let mut chain = Vec::new();
        self.install_with_chain(ident, &mut chain, events)
    }

    fn install_with_chain(
        &self,
        raw: &str,
        chain: &mut Vec<String>,
        events: &mut dyn FnMut(InstallEvent),
    ) -> Result<InstallOutcome> {
        let ident = MinderIdent::parse(raw)?;

        // An existing directory is trusted as-is.
        if self.is_installed(&ident.name) {
            events(InstallEvent::AlreadySatisfied {
                ident,
                root: self.install_root.clone(),
            });
            return Ok(InstallOutcome::AlreadySatisfied);
        }

        events(InstallEvent::Collecting(ident.clone()));
        events(InstallEvent::Downloading {
            ident: ident.clone(),
            url: self.source.location(&ident),
        });
        let bytes = self.source.fetch(&ident)?;
        let minder_dir = archive::unpack_into(&bytes, &self.install_root, &ident.name)?;
        tracing::info!("unpacked {ident} into {}", minder_dir.display());

        // Validation failures below leave the unpacked directory in place.
        let manifest = MinderManifest::read(&minder_dir)?;
        self.versions.check(&manifest)?;

        for library in manifest.library_dependencies() {
            if self.libraries.is_available(library) {
                events(InstallEvent::LibrarySatisfied(library.clone()));
                continue;
            }
            events(InstallEvent::InstallingLibrary(library.clone()));
            self.libraries.install(library)?;
        }

        chain.push(ident.name.clone());
        for dependency in manifest.minder_dependencies() {
            let dep = MinderIdent::parse(dependency)?;
            if chain.contains(&dep.name) {
                let mut cycle = chain.clone();
                cycle.push(dep.name);
                return Err(MindError::DependencyCycle { chain: cycle });
            }
            self.install_with_chain(dependency, chain, events)?;
        }
        chain.pop();

        tracing::info!("installed {ident} v{}", manifest.version);
        events(InstallEvent::Installed(ident));
        Ok(InstallOutcome::Installed)
    }
}
