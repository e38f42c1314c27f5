//! Where the catalog and the raw icons come from.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use iconir::catalog::{dedupe_by_id, CatalogEntry};
use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::Error;

/// Produces the list of icons the font should contain.
pub trait CatalogSource: Send + Sync {
    fn entries(&self) -> Result<Vec<CatalogEntry>, Error>;
}

impl CatalogSource for Vec<CatalogEntry> {
    fn entries(&self) -> Result<Vec<CatalogEntry>, Error> {
        Ok(self.clone())
    }
}

/// Retrieves raw svg for an icon.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, uri: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No source to fetch from")]
    NoSource,
    #[error("Unsupported uri '{0}'")]
    UnsupportedScheme(String),
    #[error("Unable to read '{path}': '{source}'")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    pages: Vec<CatalogPage>,
    /// Component id to the uri of its svg.
    #[serde(default)]
    images: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CatalogPage {
    name: String,
    #[serde(default)]
    components: Vec<CatalogComponent>,
}

#[derive(Debug, Deserialize)]
struct CatalogComponent {
    id: String,
    name: String,
}

/// A catalog exported from a design tool as json.
///
/// Each page is a category. Pages with an underscore in their name are
/// scratch space and are skipped.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> JsonCatalog {
        JsonCatalog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, json: &str) -> Result<Vec<CatalogEntry>, Error> {
        let doc: CatalogDocument =
            serde_json::from_str(json).map_err(|e| Error::MalformedCatalog {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        let mut entries = Vec::new();
        for page in doc.pages.iter() {
            if page.name.contains('_') {
                debug!("Skipping page '{}'", page.name);
                continue;
            }
            for component in page.components.iter() {
                entries.push(CatalogEntry::new(
                    component.id.as_str(),
                    component.name.trim(),
                    page.name.as_str(),
                    doc.images.get(&component.id).cloned(),
                ));
            }
        }
        let mut entries = dedupe_by_id(entries);
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

impl CatalogSource for JsonCatalog {
    fn entries(&self) -> Result<Vec<CatalogEntry>, Error> {
        let json = fs::read_to_string(&self.path).map_err(|source| Error::FileIo {
            path: self.path.clone(),
            source,
        })?;
        let entries = self.parse(&json)?;
        info!("{} icons in {:?}", entries.len(), self.path);
        Ok(entries)
    }
}

/// Reads icons from the local file system.
///
/// Takes `file://` uris and plain paths; relative paths are relative to `base_dir`.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    base_dir: PathBuf,
}

impl LocalFetcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> LocalFetcher {
        LocalFetcher {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, uri: &str) -> Result<PathBuf, FetchError> {
        let raw = match uri.split_once("://") {
            Some(("file", path)) => path,
            Some(_) => return Err(FetchError::UnsupportedScheme(uri.to_string())),
            None => uri,
        };
        let path = Path::new(raw);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.base_dir.join(path))
        }
    }
}

impl AssetFetcher for LocalFetcher {
    fn fetch(&self, uri: &str) -> Result<String, FetchError> {
        if uri.trim().is_empty() {
            return Err(FetchError::NoSource);
        }
        let path = self.resolve(uri)?;
        fs::read_to_string(&path).map_err(|source| FetchError::Io { path, source })
    }
}
