use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{span, Level};
use url::Url;

use html::DOMElement;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not fetch {url}: {source}")]
    Fetch { url: Url, source: reqwest::Error },
    #[error("{0} is not a local file path")]
    BadFileUrl(Url),
    #[error("could not parse HTML from {0}")]
    Parse(String),
    #[error("could not parse HTML from {origin} past byte {offset}")]
    Trailing { origin: String, offset: usize },
}

/// A document loaded from a file or URL
pub struct Page {
    pub source: String,
    pub dom: DOMElement,
}

impl Page {
    /// Loads and parses a document. `source` is a URL, or a path when it does not parse as one
    pub fn load(source: &str) -> Result<Self, LoadError> {
        let text = match Url::parse(source) {
            Ok(url) => Page::get_text_resource(url)?,
            Err(_) => read_file(Path::new(source))?,
        };
        let dom = match html::document(&text) {
            Ok(("", dom)) => dom,
            Ok((rest, _)) => {
                return Err(LoadError::Trailing {
                    origin: source.to_string(),
                    offset: text.len() - rest.len(),
                })
            }
            Err(_) => return Err(LoadError::Parse(source.to_string())),
        };
        Ok(Self {
            source: source.to_string(),
            dom,
        })
    }

    fn get_text_resource(url: Url) -> Result<String, LoadError> {
        let span = span!(Level::DEBUG, "Loading resource", url = %url);
        let _enter = span.enter();
        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|_| LoadError::BadFileUrl(url.clone()))?;
            read_file(&path)
        } else {
            reqwest::blocking::get(url.as_str())
                .and_then(|resp| resp.error_for_status())
                .and_then(|resp| resp.text())
                .map_err(|source| LoadError::Fetch { url, source })
        }
    }
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
