#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::rc::Rc;

use guardin_mind::plugin::libraries::LibraryEnvironment;
use guardin_mind::plugin::source::ArchiveSource;
use guardin_mind::{MindError, MinderIdent, Result};
use zip::ZipWriter;
use zip::write::FileOptions;

#[path = "../../src/plugin/wasm_fixture.rs"]
mod wasm_fixture;

pub use wasm_fixture::wasm_exporting;

/// A repository archive `<Name>-main/{minder.toml, minder.wasm}`.
pub fn minder_archive(name: &str, config: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(format!("{name}-main/minder.toml"), FileOptions::default())
        .unwrap();
    writer.write_all(config.as_bytes()).unwrap();
    writer
        .start_file(format!("{name}-main/minder.wasm"), FileOptions::default())
        .unwrap();
    writer.write_all(&wasm_exporting(&[name, "ask"])).unwrap();
    writer.finish().unwrap().into_inner()
}

#[derive(Default, Clone)]
pub struct MemorySource {
    pub archives: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    pub fetches: Rc<RefCell<usize>>,
}

impl MemorySource {
    pub fn publish(&self, author: &str, name: &str, config: &str) {
        self.archives
            .borrow_mut()
            .insert(format!("{author}/{name}"), minder_archive(name, config));
    }
}

impl ArchiveSource for MemorySource {
    fn location(&self, ident: &MinderIdent) -> String {
        format!("memory://{}", ident.repo())
    }

    fn fetch(&self, ident: &MinderIdent) -> Result<Vec<u8>> {
        *self.fetches.borrow_mut() += 1;
        self.archives
            .borrow()
            .get(&ident.repo())
            .cloned()
            .ok_or_else(|| MindError::DownloadFailed {
                status: 404,
                url: self.location(ident),
            })
    }
}

/// Every library is already present.
pub struct SatisfiedLibraries;

impl LibraryEnvironment for SatisfiedLibraries {
    fn is_available(&self, _library: &str) -> bool {
        true
    }

    fn install(&self, _library: &str) -> Result<()> {
        Ok(())
    }
}
