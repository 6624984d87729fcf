/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Overtime colour: tier 2 → red, tier 1 → yellow, none → reset.
pub fn color_for_overtime(tier1: i64, tier2: i64) -> &'static str {
    if tier2 > 0 {
        RED
    } else if tier1 > 0 {
        YELLOW
    } else {
        RESET
    }
}

/// Greys out empty-looking cells (`""`, `0h 0m`, `0.0 h`).
pub fn colorize_optional(value: &str) -> String {
    let v = value.trim();
    if v.is_empty() || v == "0h 0m" || v == "0.0 h" || v == "—" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}

pub fn colorize_status(status: &str) -> String {
    let color = match status {
        "approved" => GREEN,
        "rejected" => RED,
        _ => YELLOW,
    };
    format!("{color}{status}{RESET}")
}
