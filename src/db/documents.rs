use crate::core::documents::DocumentStore;
use crate::errors::AppResult;
use crate::models::document::{Document, DocumentType, NewDocument};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// `DocumentStore` over the `documents` table.
pub struct SqliteDocumentStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteDocumentStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const SELECT_DOCUMENT: &str =
    "SELECT id, title, type, description, storage_path, created_at FROM documents";

impl DocumentStore for SqliteDocumentStore<'_> {
    fn add(&mut self, doc: NewDocument) -> AppResult<Document> {
        let created_at = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents (title, type, description, storage_path, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                doc.title,
                doc.doc_type.as_str(),
                doc.description,
                doc.storage_path,
                created_at
            ],
        )?;

        Ok(Document {
            id: self.conn.last_insert_rowid(),
            title: doc.title,
            doc_type: doc.doc_type,
            description: doc.description,
            storage_path: doc.storage_path,
            created_at,
        })
    }

    fn list(&self) -> AppResult<Vec<Document>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_DOCUMENT} ORDER BY created_at DESC, id DESC"))?;
        let rows = stmt.query_map([], map_document)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn get(&self, id: i64) -> AppResult<Option<Document>> {
        let doc = self
            .conn
            .query_row(
                &format!("{SELECT_DOCUMENT} WHERE id = ?1"),
                [id],
                map_document,
            )
            .optional()?;
        Ok(doc)
    }

    fn delete(&mut self, id: i64) -> AppResult<Option<Document>> {
        let Some(doc) = self.get(id)? else {
            return Ok(None);
        };
        self.conn
            .execute("DELETE FROM documents WHERE id = ?1", [id])?;
        Ok(Some(doc))
    }
}

fn map_document(row: &Row) -> rusqlite::Result<Document> {
    let type_text: String = row.get(2)?;
    // Unknown types from older rows read as Other.
    let doc_type = type_text.parse().unwrap_or(DocumentType::Other);

    Ok(Document {
        id: row.get(0)?,
        title: row.get(1)?,
        doc_type,
        description: row.get(3)?,
        storage_path: row.get(4)?,
        created_at: row.get(5)?,
    })
}
