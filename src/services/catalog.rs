//! Loading and saving the static content document.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::Catalog;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid content document {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Niche '{0}' not found")]
    NicheNotFound(String),

    #[error("Catalog has no niches")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Catalog, CatalogError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CatalogError::Read {
                path: self.path.clone(),
                source,
            })?;

        serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// A missing document is an empty catalog; a broken one is still an error.
    pub async fn load_or_default(&self) -> Result<Catalog, CatalogError> {
        match self.load().await {
            Err(CatalogError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!(path = %self.path.display(), "Content document not found, catalog is empty");
                Ok(Catalog::default())
            }
            other => other,
        }
    }

    /// Stamps `last_updated` and writes the document back.
    pub async fn save(&self, catalog: &mut Catalog) -> Result<(), CatalogError> {
        catalog.last_updated = chrono::Utc::now().to_rfc3339();

        let write_err = |source: std::io::Error| CatalogError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let content = serde_json::to_string_pretty(catalog)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(write_err)?;

        info!(path = %self.path.display(), "Content document saved");
        Ok(())
    }
}
