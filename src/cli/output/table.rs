//! Table output for CLI commands using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::SearchResult;

use super::truncate;

/// Row for one ingested (or failed) document.
pub struct IngestRow<'a> {
    pub path: &'a str,
    pub chunks: Option<usize>,
    pub tokens: Option<u64>,
    pub error: Option<&'a str>,
}

pub fn create_base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

pub fn format_ingest(rows: &[IngestRow<'_>]) -> String {
    let use_colors = supports_color();
    let mut table = create_base_table();
    table.set_header(header(&["Document", "Chunks", "Tokens", "Status"]));

    for row in rows {
        let status = match row.error {
            None if use_colors => Cell::new("ok").fg(Color::Green),
            None => Cell::new("✓ ok"),
            Some(err) if use_colors => Cell::new(truncate(err, 60)).fg(Color::Red),
            Some(err) => Cell::new(format!("✗ {}", truncate(err, 60))),
        };
        table.add_row(vec![
            Cell::new(truncate(row.path, 50)),
            Cell::new(row.chunks.map_or_else(|| "-".to_string(), |n| n.to_string())),
            Cell::new(row.tokens.map_or_else(|| "-".to_string(), |n| n.to_string())),
            status,
        ]);
    }

    table.to_string()
}

pub fn format_search_results(results: &[SearchResult]) -> String {
    let mut table = create_base_table();
    table.set_header(header(&["#", "Score", "Source", "Preview"]));

    for (i, result) in results.iter().enumerate() {
        let source = result
            .metadata
            .get("source")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format!("{:.3}", result.score)),
            Cell::new(truncate(source, 30)),
            Cell::new(truncate(&result.text.replace('\n', " "), 60)),
        ]);
    }

    table.to_string()
}

/// Whether the terminal should get colored cells.
pub fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}
