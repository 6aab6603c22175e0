//! Retrieve the HPO master data in obo format
use std::fmt::Display;
use std::path::PathBuf;

use tracing::info;

use crate::{read_text_file, HpoError, HpoResult, Ontology};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The location of the `hp.obo` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OboSource {
    /// Download from a URL, e.g. [`crate::OBO_URL`]
    Url(String),
    /// Read from a local file
    File(PathBuf),
}

impl OboSource {
    /// Returns the content of the obo file
    ///
    /// # Errors
    ///
    /// - Download failed or returned a non-success status: [`HpoError::Download`]
    /// - Local file not present or readable: [`HpoError::CannotOpenFile`]
    pub fn load(&self) -> HpoResult<String> {
        info!("Loading ontology from {self}");
        match self {
            OboSource::Url(url) => download(url),
            OboSource::File(path) => read_text_file(path),
        }
    }

    /// Loads and parses the obo file into an [`Ontology`]
    ///
    /// # Errors
    ///
    /// See [`OboSource::load`] and [`Ontology::from_obo_str`]
    pub fn ontology(&self) -> HpoResult<Ontology> {
        Ontology::from_obo_str(&self.load()?)
    }
}

impl Display for OboSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OboSource::Url(url) => write!(f, "{url}"),
            OboSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn download(url: &str) -> HpoResult<String> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| HpoError::Download(format!("{url}: {err}")))?;

    let response = client
        .get(url)
        .send()
        .map_err(|err| HpoError::Download(format!("{url}: {err}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HpoError::Download(format!("{url}: HTTP status {status}")));
    }

    response
        .text()
        .map_err(|err| HpoError::Download(format!("{url}: {err}")))
}
