//! Company document library: metadata in a `DocumentStore`, file bodies
//! under the configured documents directory.

use crate::errors::{AppError, AppResult};
use crate::models::document::{Document, DocumentType, NewDocument};
use crate::ui::messages::warning;
use chrono::Utc;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Document metadata storage. Listing is newest first.
pub trait DocumentStore {
    fn add(&mut self, doc: NewDocument) -> AppResult<Document>;
    fn list(&self) -> AppResult<Vec<Document>>;
    fn get(&self, id: i64) -> AppResult<Option<Document>>;
    fn delete(&mut self, id: i64) -> AppResult<Option<Document>>;
}

/// Runs of characters outside `[A-Za-z0-9_.-]` become a single `_`.
pub fn sanitize_file_name(name: &str) -> AppResult<String> {
    let re = Regex::new(r"[^A-Za-z0-9_.-]+").map_err(|e| AppError::Other(e.to_string()))?;
    Ok(re.replace_all(name.trim(), "_").into_owned())
}

/// Title used when none is given: the sanitized name without extension.
pub fn default_title(sanitized: &str) -> String {
    match sanitized.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => sanitized.to_string(),
    }
}

pub fn storage_path(millis: i64, sanitized: &str) -> String {
    format!("uploads/{millis}_{sanitized}")
}

pub struct DocumentLibrary<S: DocumentStore> {
    store: S,
    root: PathBuf,
}

impl<S: DocumentStore> DocumentLibrary<S> {
    pub fn new(store: S, root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    pub fn file_path(&self, doc: &Document) -> PathBuf {
        self.root.join(&doc.storage_path)
    }

    /// Copy `source` into the library and record its metadata.
    pub fn upload(
        &mut self,
        source: &Path,
        doc_type: DocumentType,
        title: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Document> {
        if !source.is_file() {
            return Err(AppError::NotFound(format!("file {}", source.display())));
        }

        let original = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sanitized = sanitize_file_name(&original)?;
        if sanitized.is_empty() {
            return Err(AppError::Validation(format!(
                "cannot derive a file name from {}",
                source.display()
            )));
        }

        let mut millis = Utc::now().timestamp_millis();
        let (rel, dest) = loop {
            let rel = storage_path(millis, &sanitized);
            let dest = self.root.join(&rel);
            if !dest.exists() {
                break (rel, dest);
            }
            millis += 1;
        };
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, &dest)?;

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_title(&sanitized));
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let added = self.store.add(NewDocument {
            title,
            doc_type,
            description,
            storage_path: rel,
        });

        if added.is_err() {
            fs::remove_file(&dest).ok();
        }
        added
    }

    pub fn list(&self) -> AppResult<Vec<Document>> {
        self.store.list()
    }

    pub fn get(&self, id: i64) -> AppResult<Document> {
        self.store
            .get(id)?
            .ok_or_else(|| AppError::NotFound(format!("document #{id}")))
    }

    /// Copy the stored file of document `id` to `out`.
    pub fn fetch(&self, id: i64, out: &Path) -> AppResult<Document> {
        let doc = self.get(id)?;
        let src = self.file_path(&doc);
        if !src.is_file() {
            return Err(AppError::NotFound(format!("file {}", src.display())));
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&src, out)?;
        Ok(doc)
    }

    /// Remove metadata and stored file. A missing file only warns.
    pub fn delete(&mut self, id: i64) -> AppResult<Document> {
        let doc = self
            .store
            .delete(id)?
            .ok_or_else(|| AppError::NotFound(format!("document #{id}")))?;

        let path = self.file_path(&doc);
        if let Err(e) = fs::remove_file(&path) {
            warning(format!("Stored file {} not removed: {}", path.display(), e));
        }
        Ok(doc)
    }
}

#[cfg(test)]
pub struct InMemoryDocumentStore {
    docs: Vec<Document>,
    next_id: i64,
}

#[cfg(test)]
impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            docs: Vec::new(),
            next_id: 1,
        }
    }
}

#[cfg(test)]
impl DocumentStore for InMemoryDocumentStore {
    fn add(&mut self, doc: NewDocument) -> AppResult<Document> {
        let stored = Document {
            id: self.next_id,
            title: doc.title,
            doc_type: doc.doc_type,
            description: doc.description,
            storage_path: doc.storage_path,
            created_at: Utc::now().to_rfc3339(),
        };
        self.next_id += 1;
        self.docs.push(stored.clone());
        Ok(stored)
    }

    fn list(&self) -> AppResult<Vec<Document>> {
        let mut out = self.docs.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    fn get(&self, id: i64) -> AppResult<Option<Document>> {
        Ok(self.docs.iter().find(|d| d.id == id).cloned())
    }

    fn delete(&mut self, id: i64) -> AppResult<Option<Document>> {
        let pos = self.docs.iter().position(|d| d.id == id);
        Ok(pos.map(|i| self.docs.remove(i)))
    }
}
