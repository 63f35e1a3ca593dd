use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{MindError, Result};

pub const SCRATCH_DIR: &str = "__temp_extract";

/// Removes the scratch directory on every exit path.
struct Scratch(PathBuf);

impl Drop for Scratch {
    fn drop(&mut self) {
        if self.0.exists() {
            if let Err(err) = fs::remove_dir_all(&self.0) {
                tracing::warn!("failed to remove {}: {err}", self.0.display());
            }
        }
    }
}

/// Extracts a repository archive and places its single top-level directory at
/// `<root>/<name>`, replacing whatever was there.
pub fn unpack_into(bytes: &[u8], root: &Path, name: &str) -> Result<PathBuf> {
    let scratch = Scratch(root.join(SCRATCH_DIR));
    if scratch.0.exists() {
        fs::remove_dir_all(&scratch.0).map_err(|err| MindError::io(&scratch.0, err))?;
    }
    fs::create_dir_all(&scratch.0).map_err(|err| MindError::io(&scratch.0, err))?;

    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    archive.extract(&scratch.0)?;

    let mut extracted = Vec::new();
    for entry in fs::read_dir(&scratch.0).map_err(|err| MindError::io(&scratch.0, err))? {
        let path = entry.map_err(|err| MindError::io(&scratch.0, err))?.path();
        if path.is_dir() {
            extracted.push(path);
        }
    }

    let [top] = extracted.as_slice() else {
        return Err(MindError::UnexpectedArchiveLayout {
            found: extracted.len(),
        });
    };

    let target = root.join(name);
    if target.exists() {
        fs::remove_dir_all(&target).map_err(|err| MindError::io(&target, err))?;
    }
    fs::rename(top, &target).map_err(|err| MindError::io(&target, err))?;

    tracing::debug!("unpacked {} into {}", top.display(), target.display());
    Ok(target)
}
