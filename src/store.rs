use crate::error::StoreError;
use crate::models::CarDetail;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.display().to_string(),
        source,
    })?;

    tokio::fs::write(path, json)
        .await
        .map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Listing URLs handled by any earlier run. Entries are never removed.
#[derive(Debug)]
pub struct ProcessedUrlStore {
    path: PathBuf,
    urls: BTreeSet<String>,
}

impl ProcessedUrlStore {
    /// Load the persisted set; a missing file is an empty set
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let urls = match tokio::fs::read_to_string(&path).await {
            Ok(data) => {
                serde_json::from_str::<Vec<String>>(&data).map_err(|source| StoreError::Json {
                    path: path.display().to_string(),
                    source,
                })?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No processed URLs yet");
                Vec::new()
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let store = Self {
            path,
            urls: urls.into_iter().collect(),
        };
        info!(count = store.len(), path = %store.path.display(), "Loaded processed URLs");
        Ok(store)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Returns true if the URL was not present before
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn urls(&self) -> &BTreeSet<String> {
        &self.urls
    }

    /// Rewrite the whole set
    pub async fn save(&self) -> Result<(), StoreError> {
        write_json(&self.path, &self.urls).await?;
        debug!(count = self.len(), path = %self.path.display(), "Saved processed URLs");
        Ok(())
    }
}

/// Overwrite the results document with this run's cars
pub async fn save_results(path: &Path, cars: &[CarDetail]) -> Result<(), StoreError> {
    write_json(path, cars).await?;
    info!(count = cars.len(), path = %path.display(), "💾 Saved results");
    Ok(())
}
