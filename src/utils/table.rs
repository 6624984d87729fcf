//! Table rendering utilities for CLI outputs.

use unicode_width::UnicodeWidthStr;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub struct Column {
    pub header: String,
    pub align: Align,
}

impl Column {
    pub fn left(header: &str) -> Self {
        Self {
            header: header.to_string(),
            align: Align::Left,
        }
    }

    pub fn right(header: &str) -> Self {
        Self {
            header: header.to_string(),
            align: Align::Right,
        }
    }
}

/// Display width ignoring `ESC [ ... m` colour sequences.
pub fn visible_width(s: &str) -> usize {
    if !s.contains('\x1b') {
        return UnicodeWidthStr::width(s);
    }
    let mut plain = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for n in chars.by_ref() {
                if n.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            plain.push(c);
        }
    }
    UnicodeWidthStr::width(plain.as_str())
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| visible_width(&c.header))
            .collect();

        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(visible_width(cell));
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        let header: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        self.push_line(&mut out, &header, &widths);

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        self.push_line(&mut out, &rule, &widths);

        for row in &self.rows {
            self.push_line(&mut out, row, &widths);
        }

        out
    }

    fn push_line(&self, out: &mut String, cells: &[String], widths: &[usize]) {
        let mut parts = Vec::with_capacity(self.columns.len());
        for (i, col) in self.columns.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = widths[i].saturating_sub(visible_width(cell));
            let padded = match col.align {
                Align::Left => format!("{}{}", cell, " ".repeat(pad)),
                Align::Right => format!("{}{}", " ".repeat(pad), cell),
            };
            parts.push(padded);
        }
        out.push_str(parts.join("  ").trim_end());
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_grow_to_widest_cell() {
        let mut t = Table::new(vec![Column::left("Week"), Column::right("Total")]);
        t.add_row(vec!["2025W42".into(), "42h 30m".into()]);
        t.add_row(vec!["2025W43".into(), "0h 0m".into()]);

        let out = t.render();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Week       Total");
        assert_eq!(lines[2], "2025W42  42h 30m");
        assert_eq!(lines[3], "2025W43    0h 0m");
    }

    #[test]
    fn colour_codes_do_not_count() {
        assert_eq!(visible_width("\x1b[31m8h 0m\x1b[0m"), 5);
        assert_eq!(visible_width("Lørdag"), 6);

        let mut t = Table::new(vec![Column::right("Total")]);
        t.add_row(vec!["\x1b[33m1h 0m\x1b[0m".into()]);
        let out = t.render();
        assert_eq!(out.lines().nth(2), Some("\x1b[33m1h 0m\x1b[0m"));
    }
}
