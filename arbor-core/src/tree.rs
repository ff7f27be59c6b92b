use crate::data::TreeRow;

/// Format a single row as `Depth: <depth>: <url>: <title>`.
pub fn render_row(row: &TreeRow) -> String {
    match row.title {
        Some(ref title) => format!("Depth: {}: {}: {}", row.depth, row.url, title),
        None => format!("Depth: {}: {}", row.depth, row.url),
    }
}

/// One line per row, in the order given.
pub fn render(rows: &[TreeRow]) -> Vec<String> {
    rows.iter().map(render_row).collect()
}

pub fn render_json(rows: &[TreeRow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}
