//! Fetching boundary documents from files, URLs or inline text.
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::boundary::Boundary;
use crate::error::{Error, Result};

/// Location of the boundary SVG document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundarySource {
    File(PathBuf),
    Url(String),
    Inline(String),
}

impl BoundarySource {
    /// Interprets `location` as a URL when it has an `http(s)://` scheme, otherwise as a path.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            BoundarySource::Url(location.to_owned())
        } else {
            BoundarySource::File(PathBuf::from(location))
        }
    }

    async fn fetch(&self) -> Result<String> {
        match self {
            BoundarySource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                Error::Initialization(format!("cannot read boundary '{}': {e}", path.display()))
            }),
            BoundarySource::Url(url) => {
                let unreachable =
                    |e: reqwest::Error| Error::Initialization(format!("cannot fetch boundary '{url}': {e}"));
                let response = reqwest::get(url.as_str())
                    .await
                    .map_err(unreachable)?
                    .error_for_status()
                    .map_err(unreachable)?;
                response.text().await.map_err(unreachable)
            }
            BoundarySource::Inline(text) => Ok(text.clone()),
        }
    }
}

impl fmt::Display for BoundarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundarySource::File(path) => write!(f, "{}", path.display()),
            BoundarySource::Url(url) => f.write_str(url),
            BoundarySource::Inline(_) => f.write_str("<inline>"),
        }
    }
}

/// Fetches and parses the boundary, waiting at most `timeout` for the document.
pub async fn load_boundary(source: &BoundarySource, timeout: Option<Duration>) -> Result<Boundary> {
    debug!(%source, ?timeout, "fetching boundary");
    let text = fetch_within(source, timeout, source.fetch()).await?;
    let boundary = Boundary::from_svg_str(&text)?;
    info!(
        %source,
        paths = boundary.paths().len(),
        "boundary loaded"
    );
    Ok(boundary)
}

async fn fetch_within<F>(source: &BoundarySource, timeout: Option<Duration>, fetch: F) -> Result<String>
where
    F: Future<Output = Result<String>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fetch).await.map_err(|_| {
            Error::Initialization(format!("timed out after {limit:?} fetching boundary '{source}'"))
        })?,
        None => fetch.await,
    }
}
