// src/export/pdf.rs
use crate::core::timesheet::Timesheet;
use crate::utils::formatting::{format_hours, hours_cell, hours_decimal};
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const A4_SHORT: f32 = 595.0;
const A4_LONG: f32 = 842.0;

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

/// Timesheet grid: label and width of each column.
const TIMESHEET_COLS: [(&str, f32); 7] = [
    ("Dato", 92.0),
    ("Dag", 112.0),
    ("Start", 70.0),
    ("Slut", 70.0),
    ("Pause (min)", 92.0),
    ("Timer", 78.0),
    ("Noter", 280.0),
];

pub struct PdfManager {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    page_refs: Vec<Ref>,
    current_content_id: Option<Ref>,

    page_w: f32,
    page_h: f32,
    margin: f32,
    row_h: f32,

    next_id: i32,
    font_id: Ref,
    bold_id: Ref,

    font_size: f32,
    header_font_size: f32,
    title_font_size: f32,
}

impl Default for PdfManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfManager {
    /// A4 portrait.
    pub fn new() -> Self {
        Self::with_page(A4_SHORT, A4_LONG, 50.0, 20.0)
    }

    /// A4 landscape, used for timesheets.
    pub fn landscape() -> Self {
        Self::with_page(A4_LONG, A4_SHORT, 32.0, 26.0)
    }

    fn with_page(page_w: f32, page_h: f32, margin: f32, row_h: f32) -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);
        let bold_id = Ref::new(4);

        pdf.type1_font(font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            page_refs: Vec::new(),
            current_content_id: None,

            page_w,
            page_h,
            margin,
            row_h,

            next_id: 5,
            font_id,
            bold_id,

            font_size: 10.0,
            header_font_size: 11.0,
            title_font_size: 14.0,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn new_page(&mut self) -> Content {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();

        self.page_refs.push(page_id);

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, self.page_w, self.page_h))
            .contents(content_id);

        let mut resources = page.resources();
        let mut fonts = resources.fonts();
        fonts.pair(REGULAR, self.font_id);
        fonts.pair(BOLD, self.bold_id);

        self.current_content_id = Some(content_id);

        Content::new()
    }

    fn finalize_page(&mut self, content: Content) {
        if let Some(id) = self.current_content_id {
            self.pdf.stream(id, &content.finish());
        }
    }

    fn build_pages_tree(&mut self) {
        let mut pages = self.pdf.pages(self.pages_id);
        pages.count(self.page_refs.len() as i32);
        pages.kids(self.page_refs.clone());
    }

    fn draw_text_with(&self, content: &mut Content, font: Name, x: f32, y: f32, size: f32, text: &str) {
        let bytes = encode_win_ansi(text);
        content.begin_text();
        content.set_font(font, size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(&bytes));
        content.end_text();
    }

    fn draw_text(&self, content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
        self.draw_text_with(content, REGULAR, x, y, size, text);
    }

    fn draw_bold(&self, content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
        self.draw_text_with(content, BOLD, x, y, size, text);
    }

    fn draw_cell_borders(&self, content: &mut Content, x: f32, y: f32, w: f32, h: f32) {
        content.save_state();
        content.set_stroke_rgb(0.65, 0.67, 0.7);
        content.set_line_width(0.6);
        content.rect(x, y, w, h);
        content.stroke();
        content.restore_state();
    }

    fn fill_band(&self, content: &mut Content, y: f32, width: f32, rgb: (f32, f32, f32)) {
        content.save_state();
        content.set_fill_rgb(rgb.0, rgb.1, rgb.2);
        content.rect(self.margin, y, width, self.row_h);
        content.fill_nonzero();
        content.restore_state();
    }

    fn draw_row(
        &self,
        content: &mut Content,
        y: f32,
        col_widths: &[f32],
        row: &[String],
        font_size: f32,
    ) {
        let mut x = self.margin;

        for (i, text) in row.iter().enumerate() {
            let w = col_widths[i];
            self.draw_text(content, x + 4.0, y + 5.0, font_size, text);
            self.draw_cell_borders(content, x, y, w, self.row_h);
            x += w;
        }
    }

    /// Fit column widths to header and content, scaled down to the page.
    fn compute_col_widths(&self, headers: &[&str], rows: &[Vec<String>]) -> Vec<f32> {
        let mut widths: Vec<f32> = headers.iter().map(|h| h.len() as f32 * 6.5).collect();

        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (cell.chars().count() as f32 * 6.2).max(*w);
                }
            }
        }

        let total: f32 = widths.iter().sum();
        let max = self.page_w - 2.0 * self.margin;

        if total > max {
            let scale = max / total;
            for w in &mut widths {
                *w *= scale;
            }
        }

        widths
    }

    fn draw_page_header_footer(&self, content: &mut Content, title: &str, page: usize) {
        self.draw_bold(
            content,
            self.margin,
            self.page_h - self.margin + 15.0,
            self.title_font_size,
            title,
        );

        let pg = format!("Page {}", page);
        self.draw_text(
            content,
            self.page_w - self.margin - 60.0,
            self.margin - 35.0,
            self.font_size,
            &pg,
        );
    }

    /// Multi-page table with a title and zebra rows.
    pub fn write_table(&mut self, title: &str, headers: &[&str], rows: &[Vec<String>]) {
        let col_widths = self.compute_col_widths(headers, rows);
        let table_w: f32 = col_widths.iter().sum();
        let header_row: Vec<String> = headers.iter().map(|s| s.to_string()).collect();

        let mut remaining: &[Vec<String>] = rows;
        let mut page_idx = 1;

        loop {
            let mut content = self.new_page();
            self.draw_page_header_footer(&mut content, title, page_idx);

            let mut y = self.page_h - self.margin - 30.0;

            self.fill_band(&mut content, y, table_w, (0.85, 0.87, 0.90));
            self.draw_row(&mut content, y, &col_widths, &header_row, self.header_font_size);
            y -= self.row_h;

            let mut consumed = 0;
            for (i, row) in remaining.iter().enumerate() {
                if y - self.row_h < self.margin {
                    break;
                }
                if i % 2 == 0 {
                    self.fill_band(&mut content, y, table_w, (0.96, 0.96, 0.96));
                }
                self.draw_row(&mut content, y, &col_widths, row, self.font_size);
                y -= self.row_h;
                consumed += 1;
            }

            self.finalize_page(content);
            remaining = &remaining[consumed..];
            page_idx += 1;

            if remaining.is_empty() || consumed == 0 {
                break;
            }
        }
    }

    /// One landscape page: header fields, seven day rows, total and signatures.
    pub fn write_timesheet(&mut self, ts: &Timesheet) {
        let mut content = self.new_page();
        let left = self.margin;
        let right = self.page_w - self.margin;
        let size = self.font_size;

        self.draw_bold(
            &mut content,
            left,
            self.page_h - self.margin - 6.0,
            16.0,
            "DANSK ARBEJDSKRAFT - UGENTLIG TIMESEDDEL",
        );

        let hdr_y = self.page_h - self.margin - 36.0;
        let right_col = left + (right - left) / 2.0 + 8.0;
        let h = &ts.header;
        let week = format!("{} ({})", ts.bucket.label(), ts.bucket.span_text());

        let fields: [(f32, f32, &str, &str); 5] = [
            (left, 0.0, "Fulde navn", &h.worker_name),
            (left, 32.0, "Virksomhedsnavn", &h.company),
            (left, 64.0, "Site / Adresse", &h.site_line),
            (right_col, 0.0, "Projekt / Arbejdsplads", &h.site_name),
            (right_col, 32.0, "Uge", &week),
        ];
        for (x, dy, label, value) in fields {
            self.draw_bold(&mut content, x, hdr_y - dy, size, label);
            self.draw_text(&mut content, x, hdr_y - dy - 14.0, size, value);
        }

        let table_top = self.page_h - 200.0;
        let mut x = left;
        for (label, w) in TIMESHEET_COLS {
            self.draw_cell_borders(&mut content, x, table_top, w, self.row_h);
            self.draw_bold(&mut content, x + 6.0, table_top + 7.0, size, label);
            x += w;
        }

        for (i, day) in ts.days.iter().enumerate() {
            let y = table_top - self.row_h * (i as f32 + 1.0);
            let brk = if day.break_minutes > 0 {
                day.break_minutes.to_string()
            } else {
                String::new()
            };
            let cells = [
                day.date.format("%d-%m-%Y").to_string(),
                day.weekday.to_string(),
                day.start.clone().unwrap_or_default(),
                day.end.clone().unwrap_or_default(),
                brk,
                hours_cell(day.worked_minutes),
                day.notes.clone(),
            ];

            let mut x = left;
            for (idx, ((_, w), text)) in TIMESHEET_COLS.iter().zip(cells.iter()).enumerate() {
                self.draw_cell_borders(&mut content, x, y, *w, self.row_h);
                let tx = if idx == 4 || idx == 5 {
                    x + w - 6.0 - digits_width(text, size)
                } else {
                    x + 6.0
                };
                self.draw_text(&mut content, tx, y + 7.0, size, text);
                x += w;
            }
        }

        let total_y = table_top - self.row_h * 8.0;
        let total = format_hours(hours_decimal(ts.total_minutes()));
        let mut x = left;
        for (idx, (_, w)) in TIMESHEET_COLS.iter().enumerate() {
            self.draw_cell_borders(&mut content, x, total_y, *w, self.row_h);
            if idx == 0 {
                self.draw_bold(&mut content, x + 6.0, total_y + 7.0, size, "I alt timer");
            }
            if idx == 5 {
                let tx = x + w - 6.0 - digits_width(&total, size);
                self.draw_bold(&mut content, tx, total_y + 7.0, size, &total);
            }
            x += w;
        }

        let sig_y = self.margin + 34.0;
        self.draw_cell_borders(&mut content, left, sig_y, right - left, 64.0);
        self.draw_bold(&mut content, left + 400.0, sig_y + 90.0, size, "Foremand Fulde navn:");
        self.draw_bold(
            &mut content,
            left + 8.0,
            sig_y + 40.0,
            size,
            &format!("{} underskrift:", h.worker_name),
        );
        self.draw_bold(&mut content, left + 400.0, sig_y + 40.0, size, "Foremand underskrift:");

        self.finalize_page(content);
    }

    /// Serialise the document.
    pub fn finish(mut self) -> Vec<u8> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.build_pages_tree();
        self.pdf.finish()
    }

    pub fn save(self, path: &Path) -> std::io::Result<()> {
        let bytes = self.finish();
        let mut f = File::create(path)?;
        f.write_all(&bytes)?;
        Ok(())
    }
}

/// Helvetica digits, dot and comma are all 0.556 em wide.
fn digits_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * 0.556 * size
}

/// Map text to WinAnsiEncoding bytes. Latin-1 passes through; a few common
/// typographic characters map to their cp1252 slots; the rest become `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timesheet::{TimesheetEntry, TimesheetHeader, build_timesheet};
    use crate::models::interval::TimeInterval;
    use crate::models::week::WeekBucket;
    use crate::utils::date::Calendar;
    use chrono::{DateTime, NaiveDate};

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn win_ansi_keeps_danish_letters() {
        assert_eq!(encode_win_ansi("Lørdag"), b"L\xf8rdag".to_vec());
        assert_eq!(encode_win_ansi("Æbleø Å"), b"\xc6ble\xf8 \xc5".to_vec());
        assert_eq!(encode_win_ansi("13 – 19 okt"), b"13 \x96 19 okt".to_vec());
        assert_eq!(encode_win_ansi("日"), b"?".to_vec());
    }

    #[test]
    fn table_paginates() {
        let rows: Vec<Vec<String>> = (0..120).map(|i| vec![i.to_string(), "x".into()]).collect();
        let mut pdf = PdfManager::new();
        pdf.write_table("Weekly hours", &["n", "v"], &rows);
        assert!(pdf.page_refs.len() > 1);

        let bytes = pdf.finish();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(contains(&bytes, b"Page 2"));
    }

    #[test]
    fn empty_table_still_has_a_page() {
        let mut pdf = PdfManager::new();
        pdf.write_table("Nothing", &["week"], &[]);
        assert_eq!(pdf.page_refs.len(), 1);
    }

    #[test]
    fn timesheet_page_has_labels_and_total() {
        let monday = NaiveDate::from_ymd_opt(2025, 10, 13).unwrap();
        let entry = TimesheetEntry {
            interval: TimeInterval::new(
                "w1",
                Some("1".into()),
                DateTime::parse_from_rfc3339("2025-10-13T07:00:00Z").unwrap(),
                DateTime::parse_from_rfc3339("2025-10-13T15:30:00Z").unwrap(),
                30,
            ),
            notes: Some("formwork".into()),
        };
        let header = TimesheetHeader {
            worker_id: "w1".into(),
            worker_name: "Anna Holm".into(),
            company: "Acme".into(),
            site_name: "Harbour".into(),
            site_line: "S-12".into(),
        };
        let ts = build_timesheet(&Calendar::utc(), header, WeekBucket::containing(monday), &[entry]);

        let mut pdf = PdfManager::landscape();
        pdf.write_timesheet(&ts);
        assert_eq!(pdf.page_refs.len(), 1);

        let bytes = pdf.finish();
        for needle in [
            b"DANSK ARBEJDSKRAFT - UGENTLIG TIMESEDDEL".as_slice(),
            b"I alt timer",
            b"Pause (min)",
            b"Anna Holm underskrift:",
            b"13-10-2025",
            b"formwork",
            b"Helvetica-Bold",
            b"WinAnsiEncoding",
        ] {
            assert!(contains(&bytes, needle), "{}", String::from_utf8_lossy(needle));
        }
    }
}
