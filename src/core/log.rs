//! Renders the internal audit log (`sitehours log --print`).

use crate::db::log::{LogRow, load_log};
use crate::errors::AppResult;
use crate::ui::messages::use_color;
use ansi_term::Colour;
use regex::Regex;
use rusqlite::Connection;

const OP_WIDTH_MAX: usize = 60;
const MESSAGE_WIDTH: usize = 70;

fn strip_ansi(re: &Regex, s: &str) -> String {
    re.replace_all(s, "").into_owned()
}

/// Colour per operation family.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "migration_applied" => Colour::Purple,
        "backup" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51),
        "export" | "timesheet" => Colour::Cyan,
        other if other.ends_with("_add") => Colour::Green,
        other if other.ends_with("_del") => Colour::Red,
        other if other.ends_with("_edit")
            || other.ends_with("_status")
            || other.ends_with("_active") =>
        {
            Colour::Yellow
        }
        _ => Colour::White,
    }
}

/// `operation (target)`, cut to `max` visible characters.
fn op_target_text(row: &LogRow, max: usize) -> (String, Option<String>) {
    let full = if row.target.is_empty() {
        row.operation.clone()
    } else {
        format!("{} ({})", row.operation, row.target)
    };

    let visible = if full.chars().count() > max {
        let mut s: String = full.chars().take(max.saturating_sub(3)).collect();
        s.push_str("...");
        s
    } else {
        full
    };

    match visible.split_once(' ') {
        Some((op, rest)) => (op.to_string(), Some(rest.to_string())),
        None => (visible, None),
    }
}

pub struct LogLogic;

impl LogLogic {
    /// Formatted log lines, oldest first.
    pub fn render(rows: &[LogRow], color: bool) -> AppResult<Vec<String>> {
        let ansi = Regex::new(r"\x1B\[[0-9;]*[mK]").map_err(|e| {
            crate::errors::AppError::Other(e.to_string())
        })?;

        let id_w = rows.iter().map(|r| r.id.to_string().len()).max().unwrap_or(1);

        let dates: Vec<String> = rows
            .iter()
            .map(|r| {
                chrono::DateTime::parse_from_rfc3339(&r.date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or_else(|_| r.date.clone())
            })
            .collect();
        let date_w = dates.iter().map(|d| d.len()).max().unwrap_or(10);

        let cells: Vec<String> = rows
            .iter()
            .map(|r| {
                let (op, rest) = op_target_text(r, OP_WIDTH_MAX);
                let op = if color {
                    color_for_operation(&r.operation).paint(op).to_string()
                } else {
                    op
                };
                match rest {
                    Some(rest) => format!("{op} {rest}"),
                    None => op,
                }
            })
            .collect();

        let op_w = cells
            .iter()
            .map(|c| strip_ansi(&ansi, c).chars().count())
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH_MAX);

        let indent = " ".repeat(id_w + 2 + date_w + 3 + op_w + 4);
        let mut out = Vec::with_capacity(rows.len());

        for ((row, date), cell) in rows.iter().zip(&dates).zip(&cells) {
            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&ansi, cell).chars().count()));
            let wrapped = textwrap::wrap(&row.message, MESSAGE_WIDTH);
            let first = wrapped.first().map(|l| l.to_string()).unwrap_or_default();

            out.push(format!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                row.id, date, cell, padding, first
            ));
            for cont in wrapped.iter().skip(1) {
                out.push(format!("{indent}{cont}"));
            }
        }

        Ok(out)
    }

    pub fn print_log(conn: &Connection) -> AppResult<()> {
        let rows = load_log(conn)?;

        println!("📜 Internal log:\n");
        for line in Self::render(&rows, use_color())? {
            println!("{line}");
        }

        Ok(())
    }
}
