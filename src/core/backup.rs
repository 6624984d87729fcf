use crate::db::log::ttlog;
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::ui::messages::{success, warning};
use flate2::Compression;
use flate2::write::GzEncoder;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the database to `dest_file`; with `compress` the copy is packed
    /// (zip on Windows, tar.gz elsewhere) and the plain copy removed.
    /// Returns the path of the final artifact.
    pub fn backup(db_path: &str, dest_file: &str, compress: bool, force: bool) -> AppResult<PathBuf> {
        let src = Path::new(db_path);
        let dest = Path::new(dest_file);

        if !src.is_file() {
            return Err(AppError::NotFound(format!("database {}", src.display())));
        }
        if !dest.is_absolute() {
            return Err(AppError::Validation(format!(
                "backup path must be absolute: {}",
                dest.display()
            )));
        }

        ensure_writable(dest, force)?;
        fs::copy(src, dest)?;
        success(format!("Backup created: {}", dest.display()));

        let final_path = if compress {
            let packed = if cfg!(target_os = "windows") {
                zip_backup(dest)?
            } else {
                tar_gz_backup(dest)?
            };

            if let Err(e) = fs::remove_file(dest) {
                warning(format!("Failed to remove uncompressed backup: {e}"));
            }
            success(format!("Compressed: {}", packed.display()));
            packed
        } else {
            dest.to_path_buf()
        };

        let conn = Connection::open(src)?;
        ttlog(
            &conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        )?;

        Ok(final_path)
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sitehours.sqlite".to_string())
}

fn zip_backup(path: &Path) -> AppResult<PathBuf> {
    let zip_path = path.with_extension("zip");
    let file = fs::File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(entry_name(path), options)
        .map_err(std::io::Error::other)?;

    let mut f = fs::File::open(path)?;
    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    Ok(zip_path)
}

fn tar_gz_backup(path: &Path) -> AppResult<PathBuf> {
    let gz_path = PathBuf::from(format!("{}.tar.gz", path.display()));
    let file = fs::File::create(&gz_path)?;
    let encoder = GzEncoder::new(file, Compression::default());

    let mut tar = tar::Builder::new(encoder);
    tar.append_path_with_name(path, entry_name(path))?;
    tar.into_inner()?.finish()?;

    Ok(gz_path)
}
