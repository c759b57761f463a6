//! Plain-text helpers for the informational commands.

use std::fmt::Display;

const RULE_WIDTH: usize = 48;
const LABEL_WIDTH: usize = 18;

/// Title line followed by a horizontal rule.
pub fn section(title: &str) {
    println!("\n{title}\n{}", "─".repeat(RULE_WIDTH));
}

/// One aligned `label value` row.
pub fn key_value(label: &str, value: impl Display) {
    println!("{label:<LABEL_WIDTH$} {value}");
}
