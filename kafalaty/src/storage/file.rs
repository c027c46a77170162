//! File-backed document store.
//!
//! Each collection is a directory and each document a YAML file named after
//! its id, so `users/u1/children/c1` lives at
//! `<base>/users/u1/children/c1.yaml` and its kafalas under
//! `<base>/users/u1/children/c1/kafalas/`. Writes go to a temporary file that
//! is then renamed over the target.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use super::ordering::sort_documents;
use super::paths::{CollectionPath, DocumentPath};
use super::traits::{Document, DocumentStore, SortDirection, StoredDocument};
use crate::domain::errors::StoreError;

const EXTENSION: &str = "yaml";

#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    base_directory: PathBuf,
}

fn map_io_error(error: io::Error, path: &str) -> StoreError {
    match error.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound {
            path: path.to_string(),
        },
        io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
            detail: format!("{}: {}", path, error),
        },
        io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
            StoreError::Transient {
                detail: format!("{}: {}", path, error),
            }
        }
        _ => StoreError::unknown(format!("{}: {}", path, error)),
    }
}

/// Reject segments that would escape the collection directory
fn check_segment(segment: &str) -> Result<&str, StoreError> {
    let invalid = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\'])
        || segment.ends_with(".tmp");

    if invalid {
        return Err(StoreError::PermissionDenied {
            detail: format!("invalid path segment '{}'", segment),
        });
    }
    Ok(segment)
}

impl FileDocumentStore {
    /// Open a store rooted at `base_directory`, creating it if needed
    pub async fn open<P: AsRef<Path>>(base_directory: P) -> Result<Self, StoreError> {
        let base_directory = base_directory.as_ref().to_path_buf();
        let display = base_directory.display().to_string();

        fs::create_dir_all(&base_directory)
            .await
            .map_err(|e| map_io_error(e, &display))?;

        info!("Opened document store at {}", display);
        Ok(Self { base_directory })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    fn collection_dir(&self, collection: &CollectionPath) -> Result<PathBuf, StoreError> {
        let mut dir = self.base_directory.clone();
        for segment in collection.segments() {
            dir.push(check_segment(segment)?);
        }
        Ok(dir)
    }

    fn document_file(&self, document: &DocumentPath) -> Result<PathBuf, StoreError> {
        let id = check_segment(document.id())?;
        Ok(self
            .collection_dir(document.collection())?
            .join(format!("{}.{}", id, EXTENSION)))
    }

    async fn write_document(&self, file: &Path, fields: &Document, label: &str) -> Result<(), StoreError> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| map_io_error(e, label))?;
        }

        let yaml = serde_yaml::to_string(fields).map_err(StoreError::unknown)?;
        let temp = file.with_extension(format!("{}.tmp", EXTENSION));

        fs::write(&temp, yaml)
            .await
            .map_err(|e| map_io_error(e, label))?;
        fs::rename(&temp, file)
            .await
            .map_err(|e| map_io_error(e, label))
    }

    async fn read_document(&self, file: &Path, id: &str, label: &str) -> Result<StoredDocument, StoreError> {
        let content = fs::read_to_string(file)
            .await
            .map_err(|e| map_io_error(e, label))?;

        let fields: Document = serde_yaml::from_str(&content)
            .map_err(|e| StoreError::unknown(format!("malformed document {}: {}", label, e)))?;

        Ok(StoredDocument {
            id: id.to_string(),
            fields,
        })
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn create(&self, collection: &CollectionPath, fields: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let document = collection.document(&id);
        self.set(&document, fields).await?;
        Ok(id)
    }

    async fn set(&self, document: &DocumentPath, fields: Document) -> Result<(), StoreError> {
        let label = document.to_string();
        let file = self.document_file(document)?;
        self.write_document(&file, &fields, &label).await?;

        debug!("Wrote document {}", label);
        Ok(())
    }

    async fn list(
        &self,
        collection: &CollectionPath,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let label = collection.to_string();
        let dir = self.collection_dir(collection)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Collection {} does not exist yet, returning empty list", label);
                return Ok(Vec::new());
            }
            Err(e) => return Err(map_io_error(e, &label)),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| map_io_error(e, &label))? {
            let path = entry.path();

            // Sub-collection directories and temporary files are skipped
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }

            let id = match path.file_stem().and_then(|s| s.to_str()) {
                Some(id) => id.to_string(),
                None => {
                    warn!("Skipping file with invalid name: {:?}", path);
                    continue;
                }
            };

            let document_label = format!("{}/{}", label, id);
            documents.push(self.read_document(&path, &id, &document_label).await?);
        }

        sort_documents(&mut documents, order_by, direction);
        Ok(documents)
    }

    async fn get(&self, document: &DocumentPath) -> Result<StoredDocument, StoreError> {
        let label = document.to_string();
        let file = self.document_file(document)?;
        self.read_document(&file, document.id(), &label).await
    }

    async fn delete(&self, document: &DocumentPath) -> Result<(), StoreError> {
        let label = document.to_string();
        let file = self.document_file(document)?;

        match fs::remove_file(&file).await {
            Ok(()) => {
                debug!("Deleted document {}", label);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Delete of missing document {} ignored", label);
                Ok(())
            }
            Err(e) => Err(map_io_error(e, &label)),
        }
    }
}
