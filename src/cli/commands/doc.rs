use crate::cli::commands::{open_db, print_json};
use crate::cli::parser::{Commands, DocCmd};
use crate::config::Config;
use crate::core::documents::DocumentLibrary;
use crate::db::documents::SqliteDocumentStore;
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::models::document::DocumentType;
use crate::ui::messages::{info, success};
use crate::utils::path::expand_tilde;
use crate::utils::table::{Column, Table};
use std::env;
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Doc { action } = cmd else {
        return Ok(());
    };
    let pool = open_db(cfg)?;
    let conn = &pool.conn;
    let mut library = DocumentLibrary::new(SqliteDocumentStore::new(conn), cfg.documents_root());

    match action {
        DocCmd::Add {
            file,
            doc_type,
            title,
            description,
        } => {
            let doc_type: DocumentType = doc_type.parse()?;
            let doc = library.upload(
                &expand_tilde(file),
                doc_type,
                title.as_deref(),
                description.as_deref(),
            )?;
            ttlog(conn, "doc_add", &doc.id.to_string(), &format!("{} ({})", doc.title, doc.doc_type))?;
            success(format!(
                "Document #{} '{}' stored as {}",
                doc.id, doc.title, doc.storage_path
            ));
        }

        DocCmd::List { json } => {
            let docs = library.list()?;
            if *json {
                return print_json(&docs);
            }
            if docs.is_empty() {
                info("No documents stored.");
                return Ok(());
            }

            let mut t = Table::new(vec![
                Column::right("ID"),
                Column::left("Title"),
                Column::left("Type"),
                Column::left("Created"),
                Column::left("Description"),
            ]);
            for d in &docs {
                t.add_row(vec![
                    d.id.to_string(),
                    d.title.clone(),
                    d.doc_type.to_string(),
                    d.created_at.chars().take(19).collect(),
                    d.description.clone().unwrap_or_default(),
                ]);
            }
            print!("{}", t.render());
        }

        DocCmd::Get { id, out } => {
            let doc = library.get(*id)?;
            let dest = match out {
                Some(o) => expand_tilde(o),
                None => {
                    let name = Path::new(&doc.storage_path)
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| format!("document-{id}"));
                    env::current_dir()?.join(name)
                }
            };
            library.fetch(*id, &dest)?;
            success(format!("Document #{id} copied to {}", dest.display()));
        }

        DocCmd::Del { id } => {
            let doc = library.delete(*id)?;
            ttlog(conn, "doc_del", &id.to_string(), &format!("Deleted {}", doc.title))?;
            success(format!("Document #{id} '{}' deleted", doc.title));
        }
    }

    Ok(())
}
