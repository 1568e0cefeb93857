// src/store/json.rs
// =============================================================================
// JsonFileStore: writes each raw page record as pretty-printed JSON.
//
// - The resource directory is created on demand before every write
// - Files are opened with create_new, never truncated
// - A name clash (two pages in the same millisecond) gets a -1, -2, ...
//   suffix instead of overwriting
//
// It also answers "what have we crawled so far?" by enumerating resource
// directories under raw_data/.
// =============================================================================

use super::{PageStore, RawCrawlResult};
use crate::error::PersistenceError;
use async_trait::async_trait;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

const RAW_DATA_DIR: &str = "raw_data";

/// One resource directory and how many records it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub name: String,
    pub file_count: usize,
    pub path: PathBuf,
}

/// Stores records under `<storage_dir>/raw_data/<resource>/`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(storage_dir: impl AsRef<Path>) -> Self {
        Self {
            root: storage_dir.as_ref().join(RAW_DATA_DIR),
        }
    }

    /// Directory holding every resource (`<storage_dir>/raw_data`)
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resource_dir(&self, resource: &str) -> Result<PathBuf, PersistenceError> {
        let name = resource.trim();
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\']);
        if invalid {
            return Err(PersistenceError::InvalidResource(resource.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// Lists resource directories with their `.json` record counts, sorted
    /// by name. A store that has never been written to has no resources.
    pub async fn list_resources(&self) -> Result<Vec<ResourceSummary>, PersistenceError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.root, e)),
        };

        let mut resources = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.root, e))?
        {
            let path = entry.path();
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }

            let file_count = record_paths(&path).await?.len();
            resources.push(ResourceSummary {
                name: entry.file_name().to_string_lossy().into_owned(),
                file_count,
                path,
            });
        }

        resources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(resources)
    }

    /// Paths of every record stored for `resource`, sorted.
    pub async fn list_pages(&self, resource: &str) -> Result<Vec<PathBuf>, PersistenceError> {
        let dir = self.resource_dir(resource)?;
        match fs::metadata(&dir).await {
            Ok(_) => record_paths(&dir).await,
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(io_error(&dir, e)),
        }
    }

    /// Reads one record back from disk.
    pub async fn load(&self, path: &Path) -> Result<RawCrawlResult, PersistenceError> {
        let bytes = fs::read(path).await.map_err(|e| io_error(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| PersistenceError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[async_trait]
impl PageStore for JsonFileStore {
    async fn save(
        &self,
        resource: &str,
        filename: &str,
        record: &RawCrawlResult,
    ) -> Result<PathBuf, PersistenceError> {
        let dir = self.resource_dir(resource)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error(&dir, e))?;

        let body = serde_json::to_vec_pretty(record).map_err(|e| PersistenceError::Json {
            path: dir.join(filename),
            source: e,
        })?;

        let mut attempt = 0;
        loop {
            let path = dir.join(numbered(filename, attempt));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(&body).await.map_err(|e| io_error(&path, e))?;
                    file.flush().await.map_err(|e| io_error(&path, e))?;
                    tracing::debug!("Wrote {} bytes to {}", body.len(), path.display());
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(io_error(&path, e)),
            }
        }
    }
}

// "page_123.json", 2 -> "page_123-2.json"
fn numbered(filename: &str, attempt: usize) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{}-{}.{}", stem, attempt, ext),
        None => format!("{}-{}", filename, attempt),
    }
}

// Every .json file directly inside `dir`, sorted
async fn record_paths(dir: &Path) -> Result<Vec<PathBuf>, PersistenceError> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| io_error(dir, e))?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, e))? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}
