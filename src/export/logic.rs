// src/export/logic.rs
use crate::config::Config;
use crate::core::aggregator::{GroupBy, Order, WeekWindow};
use crate::core::report::{ReportLogic, Scope, name_of};
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::flatten;
use crate::export::pdf_export::export_pdf;
use crate::export::range::range_window;
use crate::export::xlsx::export_xlsx;
use crate::export::{ExportFormat, WeekExport};
use crate::ui::messages::warning;
use crate::utils::date::{add_days, month_name};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// What to export and where.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub format: ExportFormat,
    /// Absolute path of the output file.
    pub file: String,
    pub scope: Scope,
    pub group_by: GroupBy,
    /// `None`, `all`, `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or `a:b` of one shape.
    pub range: Option<String>,
    pub force: bool,
}

pub struct ExportLogic;

impl ExportLogic {
    /// Flatten the weekly report for the request and write it out.
    /// Returns `None` when there was nothing to write.
    pub fn export(
        conn: &Connection,
        cfg: &Config,
        req: &ExportRequest,
    ) -> AppResult<Option<PathBuf>> {
        let path = Path::new(&req.file);

        if !path.is_absolute() {
            return Err(AppError::Validation(format!(
                "output file path must be absolute: {}",
                req.file
            )));
        }

        let logic = ReportLogic::new(conn, cfg.calendar()?);
        let window = match range_window(req.range.as_deref())? {
            Some(w) => w,
            None => req.scope.default_window(
                logic.calendar().today(),
                cfg.default_weeks,
                cfg.report_epoch,
            ),
        };

        let report = logic
            .weeks(&req.scope, window, req.group_by)?
            .ordered(Order::OldestFirst);
        let names = logic.group_names(req.group_by)?;
        let weeks: Vec<WeekExport> = flatten(&report, |k| name_of(&names, k));

        if weeks.is_empty() {
            warning("No hours found for the selected range.");
            return Ok(None);
        }

        ensure_writable(path, req.force)?;

        match req.format {
            ExportFormat::Csv => export_csv(&weeks, path)?,
            ExportFormat::Json => export_json(&weeks, path)?,
            ExportFormat::Xlsx => export_xlsx(&weeks, path)?,
            ExportFormat::Pdf => export_pdf(&weeks, path, &pdf_title(&req.range, window))?,
        }

        Ok(Some(path.to_path_buf()))
    }
}

/// Title line for the PDF table, following the shape of `--range`.
fn pdf_title(range: &Option<String>, window: WeekWindow) -> String {
    let last = add_days(window.end_exclusive, -1);
    let Some(p) = range.as_deref().map(str::trim) else {
        return format!("Weekly hours {} - {}", window.start, last);
    };

    match p.len() {
        4 => format!("Weekly hours for year {p}"),
        7 => match p.split_once('-') {
            Some((year, month)) if !month_name(month).is_empty() => {
                format!("Weekly hours for {} {}", month_name(month), year)
            }
            _ => format!("Weekly hours {p}"),
        },
        10 => format!("Weekly hours for the week of {p}"),
        _ => format!("Weekly hours {} - {}", window.start, last),
    }
}
