use std::env;
use std::fmt;

/// ANSI colors
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

/// Icons
const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

/// Colour is off when `NO_COLOR` is set to anything non-empty.
pub fn use_color() -> bool {
    env::var_os("NO_COLOR").is_none_or(|v| v.is_empty())
}

fn prefix(color: &str, icon: &str) -> String {
    if use_color() {
        format!("{color}{BOLD}{icon}{RESET}")
    } else {
        icon.to_string()
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{} {}", prefix(FG_BLUE, ICON_INFO), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{} {}", prefix(FG_GREEN, ICON_OK), msg);
}

/// Warnings go to stderr so that `--json` output stays parseable.
pub fn warning<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", prefix(FG_YELLOW, ICON_WARN), msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", prefix(FG_RED, ICON_ERR), msg);
}

/// Formatted section header
pub fn header<T: fmt::Display>(msg: T) {
    if use_color() {
        println!("{FG_BLUE}{BOLD}====================== {msg}{RESET}\n");
    } else {
        println!("====================== {msg}\n");
    }
}
