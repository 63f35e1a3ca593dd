use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{MindError, Result};
use crate::model::ident::MinderIdent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    NotInstalled,
    Declined,
    Removed,
}

#[derive(Debug, Clone)]
pub struct PluginUninstaller {
    install_root: PathBuf,
}

impl PluginUninstaller {
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
        }
    }

    /// Removes `<install_root>/<Name>`. `confirm` is only asked when `auto_confirm` is off.
    pub fn uninstall(
        &self,
        ident: &str,
        auto_confirm: bool,
        confirm: &mut dyn FnMut(&MinderIdent, &Path) -> bool,
    ) -> Result<UninstallOutcome> {
        let ident = MinderIdent::parse(ident)?;
        let minder_dir = self.install_root.join(&ident.name);

        if !minder_dir.is_dir() {
            tracing::info!("{ident} is not installed in {}", self.install_root.display());
            return Ok(UninstallOutcome::NotInstalled);
        }

        if !auto_confirm && !confirm(&ident, &minder_dir) {
            tracing::info!("uninstall of {ident} declined");
            return Ok(UninstallOutcome::Declined);
        }

        fs::remove_dir_all(&minder_dir).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => MindError::PluginDirectoryMissing {
                path: minder_dir.clone(),
            },
            _ => MindError::io(&minder_dir, err),
        })?;

        tracing::info!("removed {}", minder_dir.display());
        Ok(UninstallOutcome::Removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed(root: &Path, name: &str) {
        fs::create_dir_all(root.join(name).join("src")).unwrap();
        fs::write(root.join(name).join("minder.toml"), "").unwrap();
    }

    #[test]
    fn absent_minder_is_a_no_op() {
        let root = tempfile::tempdir().unwrap();
        let mut asked = false;

        let outcome = PluginUninstaller::new(root.path())
            .uninstall("acme_Hello", false, &mut |_, _| {
                asked = true;
                true
            })
            .unwrap();

        assert_eq!(outcome, UninstallOutcome::NotInstalled);
        assert!(!asked);
    }

    #[test]
    fn declined_confirmation_keeps_directory() {
        let root = tempfile::tempdir().unwrap();
        installed(root.path(), "Hello");

        let outcome = PluginUninstaller::new(root.path())
            .uninstall("acme_Hello", false, &mut |ident, path| {
                assert_eq!(ident.name, "Hello");
                assert!(path.ends_with("Hello"));
                false
            })
            .unwrap();

        assert_eq!(outcome, UninstallOutcome::Declined);
        assert!(root.path().join("Hello").is_dir());
    }

    #[test]
    fn confirmed_removal_deletes_tree() {
        let root = tempfile::tempdir().unwrap();
        installed(root.path(), "Hello");

        let outcome = PluginUninstaller::new(root.path())
            .uninstall("acme_Hello", false, &mut |_, _| true)
            .unwrap();

        assert_eq!(outcome, UninstallOutcome::Removed);
        assert!(!root.path().join("Hello").exists());
    }

    #[test]
    fn auto_confirm_skips_prompt() {
        let root = tempfile::tempdir().unwrap();
        installed(root.path(), "Hello");

        let outcome = PluginUninstaller::new(root.path())
            .uninstall("Hello", true, &mut |_, _| panic!("prompted"))
            .unwrap();

        assert_eq!(outcome, UninstallOutcome::Removed);
    }

    #[test]
    fn directory_vanishing_after_confirmation_is_reported() {
        let root = tempfile::tempdir().unwrap();
        installed(root.path(), "Hello");

        let err = PluginUninstaller::new(root.path())
            .uninstall("acme_Hello", false, &mut |_, path| {
                fs::remove_dir_all(path).unwrap();
                true
            })
            .unwrap_err();

        assert!(matches!(err, MindError::PluginDirectoryMissing { .. }));
    }

    #[test]
    fn malformed_identifier_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let err = PluginUninstaller::new(root.path())
            .uninstall("acme_hello", true, &mut |_, _| true)
            .unwrap_err();

        assert!(matches!(err, MindError::MalformedIdentifier { .. }));
    }
}
