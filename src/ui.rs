//! Terminal output helpers

use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::storage::DbStats;

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Table")]
    table: &'static str,
    #[tabled(rename = "Rows")]
    rows: usize,
}

/// Render database statistics as a rounded table
pub fn stats_table(stats: &DbStats) -> String {
    let rows: Vec<StatsRow> = stats
        .entries()
        .iter()
        .map(|&(table, count)| StatsRow { table, rows: count })
        .collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

/// Progress bar for folder imports, hidden when stdout is not a terminal
pub fn import_progress(total: u64) -> ProgressBar {
    if console::Term::stdout().is_term() {
        ProgressBar::new(total).with_message("Importing")
    } else {
        ProgressBar::hidden()
    }
}

pub fn success(label: &str) {
    println!("{} {}", "✓".green(), label);
}

pub fn warn(label: &str) {
    eprintln!("{} {}", "!".yellow(), label);
}

pub fn error(label: &str) {
    eprintln!("{} {}", "✗".red(), label);
}
