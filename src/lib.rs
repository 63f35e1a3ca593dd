//! Minder framework: resolves installed minders by name, loads their WASM
//! entry points, and installs them (with their dependencies) from a remote host.

pub mod error;
pub mod model;
pub mod msg;
pub mod plugin;

pub use error::{ErrorKind, MindError, Result};
pub use model::config::MindConfig;
pub use model::ident::MinderIdent;
pub use plugin::{Mind, Minder, MinderManifest, MinderType, TypedMinder};
