//! Tolerant extraction of markdown-style tables from free-form LLM answers.
//!
//! The parser scans adjacent line pairs for a header row followed by a
//! separator row. Prose before and after the table, blank lines, and tables
//! with zero data rows are all tolerated; a data row whose cell count does
//! not match the header is silently dropped.

/// Separator tolerance. `Strict` accepts only dashes in the separator row
/// and is used where exact row extraction matters; `Lenient` also accepts
/// alignment colons and is used for mere presence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    Strict,
    Lenient,
}

/// One extracted data row, keyed by header name in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<(String, String)>,
}

impl TableRow {
    /// Value for a column, or `None` if the header has no such column.
    /// With duplicated header names the later cell wins.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// All cell values in header order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

/// Find the first markdown table in `text`, or `None` if no valid
/// header/separator pair exists. Recomputed fresh on every call.
pub fn find_table(text: &str, mode: TableMode) -> Option<ParsedTable> {
    let lines: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end())
        .filter(|line| !line.trim().is_empty())
        .collect();

    for i in 0..lines.len().saturating_sub(1) {
        if !lines[i].contains('|') || !is_separator(lines[i + 1], mode) {
            continue;
        }
        let columns = split_cells(lines[i]);
        let mut rows = Vec::new();
        for line in &lines[i + 2..] {
            if !line.contains('|') {
                break;
            }
            let cells = split_cells(line);
            if cells.len() != columns.len() {
                continue;
            }
            rows.push(TableRow {
                cells: columns.iter().cloned().zip(cells).collect(),
            });
        }
        return Some(ParsedTable { columns, rows });
    }
    None
}

/// True if `text` contains at least one markdown table in the given mode.
pub fn has_table(text: &str, mode: TableMode) -> bool {
    find_table(text, mode).is_some()
}

fn is_separator(line: &str, mode: TableMode) -> bool {
    let compact: String = line.chars().filter(|c| *c != ' ').collect();
    if !compact.starts_with('|') {
        return false;
    }
    let body: Vec<char> = compact.chars().filter(|c| *c != '|').collect();
    if !body.contains(&'-') {
        return false;
    }
    match mode {
        TableMode::Strict => body.iter().all(|c| *c == '-'),
        TableMode::Lenient => body.iter().all(|c| *c == '-' || *c == ':'),
    }
}

fn split_cells(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = "Here are your results:\n\n\
        | Track | Artist |\n\
        |-------|--------|\n\
        | A | B |\n\
        | C | D |\n\n\
        Let me know if you need more.";

    #[test]
    fn test_round_trip_simple_table() {
        let table = find_table(SIMPLE, TableMode::Strict).unwrap();
        assert_eq!(table.columns, vec!["Track", "Artist"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("Track"), Some("A"));
        assert_eq!(table.rows[0].get("Artist"), Some("B"));
        assert_eq!(table.rows[1].get("Track"), Some("C"));
        assert_eq!(table.rows[1].get("Artist"), Some("D"));
    }

    #[test]
    fn test_malformed_row_dropped() {
        let text = "| Track | Artist |\n|---|---|\n| A | B |\n| too | many | cells |\n| C | D |";
        let table = find_table(text, TableMode::Strict).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get("Track"), Some("C"));
    }

    #[test]
    fn test_body_ends_at_first_non_table_line() {
        let text = "| A | B |\n|---|---|\n| 1 | 2 |\nplain prose\n| 3 | 4 |";
        let table = find_table(text, TableMode::Strict).unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_alignment_colons_lenient_only() {
        let text = "| Track | Artist |\n|:------|-------:|\n| A | B |";
        assert!(!has_table(text, TableMode::Strict));
        let table = find_table(text, TableMode::Lenient).unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_header_only_table_is_valid() {
        let text = "| Track | Artist |\n|---|---|";
        let table = find_table(text, TableMode::Strict).unwrap();
        assert_eq!(table.columns, vec!["Track", "Artist"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_no_table() {
        assert!(find_table("just some prose\nwith | a stray pipe", TableMode::Lenient).is_none());
        assert!(!has_table("", TableMode::Lenient));
    }

    #[test]
    fn test_separator_needs_a_dash() {
        // A colon-only separator is not a table in either mode.
        let text = "| A | B |\n|:::|:::|\n| 1 | 2 |";
        assert!(!has_table(text, TableMode::Lenient));
    }

    #[test]
    fn test_duplicate_header_later_cell_wins() {
        let text = "| Name | Name |\n|---|---|\n| first | second |";
        let table = find_table(text, TableMode::Strict).unwrap();
        assert_eq!(table.rows[0].get("Name"), Some("second"));
    }

    #[test]
    fn test_blank_lines_inside_surrounding_prose() {
        let text = "intro\n\n\n| X |\n|---|\n| 1 |\n\n\noutro";
        let table = find_table(text, TableMode::Strict).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("X"), Some("1"));
    }
}
