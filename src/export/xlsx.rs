// src/export/xlsx.rs
use crate::errors::{AppError, AppResult};
use crate::export::excel_date::date_to_excel_serial;
use crate::export::model::{get_headers, week_to_row};
use crate::export::{WeekExport, notify_export_success};
use crate::ui::messages::info;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

/// Column holding `week_start`, written as a real Excel date.
const WEEK_START_COL: usize = 2;

/// Styled worksheet with a frozen header row and fitted column widths.
pub(crate) fn export_xlsx(weeks: &[WeekExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to XLSX: {}", path.display()));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Weekly hours").map_err(xlsx_error)?;

    if weeks.is_empty() {
        worksheet
            .write(0, 0, "No data available")
            .map_err(xlsx_error)?;
        workbook.save(path).map_err(xlsx_error)?;
        notify_export_success("XLSX (empty dataset)", path);
        return Ok(());
    }

    let headers = get_headers();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_error)?;
    }

    worksheet.set_freeze_panes(1, 0).map_err(xlsx_error)?;

    let mut col_widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(*h)).collect();

    let band1 = Color::RGB(0xEAF3FB);
    let band2 = Color::RGB(0xFFFFFF);

    for (row_index, week) in weeks.iter().enumerate() {
        let row = (row_index + 1) as u32;
        let band = if row_index % 2 == 0 { band1 } else { band2 };

        for (col, value) in week_to_row(week).iter().enumerate() {
            if col == WEEK_START_COL
                && let Some(serial) = date_to_excel_serial(value)
            {
                let fmt = cell_format(band).set_num_format("yyyy-mm-dd");
                worksheet
                    .write_with_format(row, col as u16, serial, &fmt)
                    .map_err(xlsx_error)?;
            } else {
                write_cell(worksheet, row, col as u16, value, band)?;
            }

            col_widths[col] = col_widths[col].max(UnicodeWidthStr::width(value.as_str()));
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, *w as f64 + 2.0)
            .map_err(xlsx_error)?;
    }

    workbook.save(path).map_err(xlsx_error)?;

    notify_export_success("XLSX", path);
    Ok(())
}

fn cell_format(bg: Color) -> Format {
    Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin)
}

/// Numbers are written as numbers (right aligned), everything else as text.
fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, s: &str, bg: Color) -> AppResult<()> {
    if !s.is_empty()
        && let Ok(num) = s.parse::<f64>()
    {
        let fmt = cell_format(bg).set_align(FormatAlign::Right);
        worksheet
            .write_with_format(row, col, num, &fmt)
            .map_err(xlsx_error)?;
        return Ok(());
    }

    worksheet
        .write_with_format(row, col, s, &cell_format(bg))
        .map_err(xlsx_error)?;
    Ok(())
}

fn xlsx_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(format!("XLSX error: {e}"))
}
