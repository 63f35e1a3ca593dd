use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::error::{MindError, Result};
use crate::model::config::RemoteConfig;
use crate::model::ident::MinderIdent;

/// Where minder archives come from.
pub trait ArchiveSource {
    /// Human-readable location of the archive for `ident`.
    fn location(&self, ident: &MinderIdent) -> String;

    /// Zip bytes of the minder repository.
    fn fetch(&self, ident: &MinderIdent) -> Result<Vec<u8>>;
}

/// Fetches `<base_url>/<author>/<Name>/<archive_path>` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpArchiveSource {
    client: Client,
    base_url: String,
    archive_path: String,
}

impl HttpArchiveSource {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .user_agent(concat!("guardin-mind/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            archive_path: config.archive_path.trim_start_matches('/').to_string(),
        })
    }
}

impl ArchiveSource for HttpArchiveSource {
    fn location(&self, ident: &MinderIdent) -> String {
        format!("{}/{}/{}", self.base_url, ident.repo(), self.archive_path)
    }

    fn fetch(&self, ident: &MinderIdent) -> Result<Vec<u8>> {
        let url = self.location(ident);
        tracing::debug!("GET {url}");

        let response = self.client.get(&url).send()?;
        if response.status() != StatusCode::OK {
            return Err(MindError::DownloadFailed {
                status: response.status().as_u16(),
                url,
            });
        }

        Ok(response.bytes()?.to_vec())
    }
}
