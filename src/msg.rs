use std::path::PathBuf;

use crate::model::ident::MinderIdent;

/// Progress reported while installing minders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallEvent {
    Collecting(MinderIdent),
    Downloading { ident: MinderIdent, url: String },
    /// The minder directory already exists under `root`.
    AlreadySatisfied { ident: MinderIdent, root: PathBuf },
    LibrarySatisfied(String),
    InstallingLibrary(String),
    Installed(MinderIdent),
}
