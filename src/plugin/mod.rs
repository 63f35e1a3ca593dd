pub mod archive;
pub mod installer;
pub mod libraries;
pub mod limit;
pub mod manifest;
pub mod mind;
pub mod resolver;
pub mod runtime;
pub mod source;
pub mod uninstaller;
pub mod version_gate;
#[cfg(test)]
pub(crate) mod wasm_fixture;

pub use installer::{InstallOutcome, PluginInstaller};
pub use manifest::MinderManifest;
pub use mind::{Mind, TypedMinder};
pub use runtime::{Minder, MinderType};
pub use uninstaller::{PluginUninstaller, UninstallOutcome};
