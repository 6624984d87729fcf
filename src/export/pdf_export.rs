// src/export/pdf_export.rs
use crate::core::timesheet::Timesheet;
use crate::errors::{AppError, AppResult};
use crate::export::model::{get_headers, weeks_to_table};
use crate::export::pdf::PdfManager;
use crate::export::{WeekExport, notify_export_success};
use crate::ui::messages::info;
use std::path::Path;

/// Weekly rows as a paginated A4 table.
pub(crate) fn export_pdf(weeks: &[WeekExport], path: &Path, title: &str) -> AppResult<()> {
    info(format!("Exporting to PDF: {}", path.display()));

    let headers = get_headers();
    let data_vec = weeks_to_table(weeks);

    let mut pdf = PdfManager::new();
    pdf.write_table(title, &headers, &data_vec);

    pdf.save(path)
        .map_err(|e| AppError::Export(format!("PDF export error: {e}")))?;

    notify_export_success("PDF", path);
    Ok(())
}

/// One worker's week on one landscape page.
pub fn export_timesheet(ts: &Timesheet, path: &Path) -> AppResult<()> {
    info(format!("Writing timesheet: {}", path.display()));

    let mut pdf = PdfManager::landscape();
    pdf.write_timesheet(ts);

    pdf.save(path)
        .map_err(|e| AppError::Export(format!("PDF export error: {e}")))?;

    notify_export_success("Timesheet", path);
    Ok(())
}
