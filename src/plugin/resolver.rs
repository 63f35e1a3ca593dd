use std::fs;
use std::path::{Path, PathBuf};

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::error::{MindError, Result};
use crate::plugin::archive::SCRATCH_DIR;
use crate::plugin::runtime::{ENTRY_FILE, MinderType};
use crate::plugin::version_gate::HostVersions;

/// Where minders are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRoot {
    /// Parent of all installed minder directories.
    InstallRoot(PathBuf),
    /// A single minder directory, bypassing search.
    MinderDir(PathBuf),
}

#[derive(Debug, Clone)]
pub struct LocalResolver {
    root: SearchRoot,
    versions: HostVersions,
    wasi: bool,
}

impl LocalResolver {
    pub fn new(root: SearchRoot, versions: HostVersions, wasi: bool) -> Self {
        Self {
            root,
            versions,
            wasi,
        }
    }

    pub fn root(&self) -> &SearchRoot {
        &self.root
    }

    /// Exact, case-sensitive match among first-level directories of the install root.
    pub fn search(&self, name: &str) -> Result<Option<PathBuf>> {
        let root = match &self.root {
            SearchRoot::InstallRoot(root) => root,
            SearchRoot::MinderDir(dir) => return Ok(Some(dir.clone())),
        };

        for entry in fs::read_dir(root).map_err(|err| MindError::io(root, err))? {
            let entry = entry.map_err(|err| MindError::io(root, err))?;
            let path = entry.path();
            if path.is_dir() && entry.file_name() == name {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    pub fn load(&self, minder_dir: &Path, name: &str) -> Option<MinderType> {
        MinderType::load(&minder_dir.join(ENTRY_FILE), name, self.wasi, &self.versions)
    }

    pub fn resolve(&self, name: &str) -> Result<MinderType> {
        let minder_dir = match &self.root {
            SearchRoot::MinderDir(dir) => {
                if !dir.join(ENTRY_FILE).is_file() {
                    return Err(MindError::PluginDirectoryNotFound {
                        name: name.to_string(),
                        path: dir.clone(),
                    });
                }
                dir.clone()
            }
            SearchRoot::InstallRoot(root) => {
                tracing::info!("starting a local {name} search");
                let Some(dir) = self.search(name)? else {
                    return Err(MindError::PluginNotInstalled {
                        name: name.to_string(),
                        root: root.clone(),
                        suggestion: self.suggest(name),
                    });
                };
                dir
            }
        };

        tracing::info!("starting to load the {name}");
        self.load(&minder_dir, name)
            .ok_or_else(|| MindError::PluginClassNotFound {
                name: name.to_string(),
                path: minder_dir,
            })
    }

    /// Names of installed minders, sorted.
    pub fn installed(&self) -> Result<Vec<String>> {
        let root = match &self.root {
            SearchRoot::InstallRoot(root) => root,
            SearchRoot::MinderDir(dir) => {
                return Ok(dir
                    .file_name()
                    .map(|name| vec![name.to_string_lossy().into_owned()])
                    .unwrap_or_default());
            }
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(root).map_err(|err| MindError::io(root, err))? {
            let entry = entry.map_err(|err| MindError::io(root, err))?;
            if entry.path().is_dir() && entry.file_name() != SCRATCH_DIR {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        names.sort();
        Ok(names)
    }

    fn suggest(&self, name: &str) -> Option<String> {
        let matcher = SkimMatcherV2::default();
        self.installed()
            .ok()?
            .into_iter()
            .filter_map(|candidate| {
                matcher
                    .fuzzy_match(&candidate, name)
                    .map(|score| (score, candidate))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, candidate)| candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::runtime::test_support::{basic_config, write_minder};

    fn resolver(root: &Path) -> LocalResolver {
        LocalResolver::new(
            SearchRoot::InstallRoot(root.to_path_buf()),
            HostVersions::default(),
            false,
        )
    }

    #[test]
    fn search_is_exact_and_case_sensitive() {
        let root = tempfile::tempdir().unwrap();
        write_minder(root.path(), "TestMinder", None);
        let resolver = resolver(root.path());

        let found = resolver.search("TestMinder").unwrap().unwrap();
        assert!(found.ends_with("TestMinder"));
        assert_eq!(resolver.search("testminder").unwrap(), None);
        assert_eq!(resolver.search("Test").unwrap(), None);
        assert_eq!(resolver.search("NoMinder").unwrap(), None);
    }

    #[test]
    fn search_does_not_recurse_or_match_files() {
        let root = tempfile::tempdir().unwrap();
        write_minder(&root.path().join("group"), "Nested", None);
        fs::write(root.path().join("Loose"), "").unwrap();
        let resolver = resolver(root.path());

        assert_eq!(resolver.search("Nested").unwrap(), None);
        assert_eq!(resolver.search("Loose").unwrap(), None);
    }

    #[test]
    fn resolve_distinguishes_missing_from_broken() {
        let root = tempfile::tempdir().unwrap();
        write_minder(root.path(), "Hello", Some(&basic_config("Hello")));
        let broken = root.path().join("Broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(ENTRY_FILE), b"garbage").unwrap();
        let resolver = resolver(root.path());

        assert_eq!(resolver.resolve("Hello").unwrap().name(), "Hello");

        let missing = resolver.resolve("Helo").unwrap_err();
        assert!(missing.is_not_found());
        match missing {
            MindError::PluginNotInstalled { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("Hello"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let broken = resolver.resolve("Broken").unwrap_err();
        assert!(!broken.is_not_found());
        assert!(matches!(broken, MindError::PluginClassNotFound { .. }));
    }

    #[test]
    fn override_dir_requires_entry_file() {
        let root = tempfile::tempdir().unwrap();
        let dir = write_minder(root.path(), "Hello", None);
        let empty = root.path().join("Empty");
        fs::create_dir_all(&empty).unwrap();

        let direct = LocalResolver::new(SearchRoot::MinderDir(dir), HostVersions::default(), false);
        assert_eq!(direct.resolve("Hello").unwrap().name(), "Hello");

        let direct = LocalResolver::new(SearchRoot::MinderDir(empty), HostVersions::default(), false);
        let err = direct.resolve("Hello").unwrap_err();
        assert!(matches!(err, MindError::PluginDirectoryNotFound { .. }));
    }

    #[test]
    fn installed_lists_directories_sorted() {
        let root = tempfile::tempdir().unwrap();
        write_minder(root.path(), "Zeta", None);
        write_minder(root.path(), "Alpha", None);
        fs::write(root.path().join("notes.txt"), "").unwrap();
        fs::create_dir_all(root.path().join(SCRATCH_DIR)).unwrap();

        assert_eq!(resolver(root.path()).installed().unwrap(), ["Alpha", "Zeta"]);
    }
}
