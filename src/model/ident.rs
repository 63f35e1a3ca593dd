use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{MindError, Result};

static MINDER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][a-zA-Z]*$").expect("valid minder name regex"));

/// A qualified minder identifier in the `author_MinderName` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MinderIdent {
    pub author: String,
    pub name: String,
}

impl MinderIdent {
    /// The minder name is the trailing run starting with an uppercase letter;
    /// everything before it, minus trailing underscores, is the author.
    pub fn parse(raw: &str) -> Result<Self> {
        let Some(found) = MINDER_NAME_RE.find(raw) else {
            return Err(MindError::MalformedIdentifier {
                ident: raw.to_string(),
            });
        };

        Ok(Self {
            author: raw[..found.start()].trim_end_matches('_').to_string(),
            name: found.as_str().to_string(),
        })
    }

    /// Remote repository slug, `author/Name`.
    pub fn repo(&self) -> String {
        format!("{}/{}", self.author, self.name)
    }
}

impl fmt::Display for MinderIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.author.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}_{}", self.author, self.name)
        }
    }
}
