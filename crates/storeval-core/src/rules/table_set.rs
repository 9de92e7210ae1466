use std::collections::BTreeMap;

use crate::normalize::normalize;
use crate::rule::Rule;
use crate::table::{find_table, TableMode, TableRow};
use crate::transcript::{last_assistant_content, Message};
use crate::types::{ScenarioRow, ScoreResult};

/// Column/value pairs identifying one required table row, compared after
/// normalization (e.g. `{Track: "Love Comes", Artist: "The Posies"}`).
pub type RowIdentity = BTreeMap<String, String>;

/// Exact-set table matching with a penalty: extracts the final answer's
/// table in strict mode, filters placeholder rows, awards `per_item_weight`
/// for each required row identity present, adds `table_bonus` when a table
/// exists, and subtracts `extra_row_penalty` once if the table holds rows
/// beyond the required identities. Floor of zero.
pub struct TableSetRule {
    required: Vec<RowIdentity>,
    per_item_weight: f64,
    table_bonus: f64,
    extra_row_penalty: f64,
}

impl TableSetRule {
    pub fn new(
        required: Vec<RowIdentity>,
        per_item_weight: f64,
        table_bonus: f64,
        extra_row_penalty: f64,
    ) -> Self {
        Self {
            required,
            per_item_weight,
            table_bonus,
            extra_row_penalty,
        }
    }
}

fn is_placeholder_row(row: &TableRow) -> bool {
    row.values()
        .any(|v| matches!(normalize(v).as_str(), "" | "*(none)*"))
}

fn matches_identity(row: &TableRow, identity: &RowIdentity) -> bool {
    identity.iter().all(|(column, want)| {
        row.get(column)
            .is_some_and(|got| normalize(got) == normalize(want))
    })
}

impl Rule for TableSetRule {
    fn name(&self) -> &'static str {
        "table_set"
    }

    fn score(&self, transcript: &[Message], _row: &ScenarioRow) -> ScoreResult {
        let content = last_assistant_content(transcript);
        let table = find_table(&content, TableMode::Strict);
        let bonus = if table.is_some() { self.table_bonus } else { 0.0 };

        let rows: Vec<TableRow> = table
            .map(|t| t.rows)
            .unwrap_or_default()
            .into_iter()
            .filter(|r| !is_placeholder_row(r))
            .collect();

        let matched = self
            .required
            .iter()
            .filter(|identity| rows.iter().any(|r| matches_identity(r, identity)))
            .count();
        let item_score = matched as f64 * self.per_item_weight;

        // Any rows beyond the required identities draw one flat penalty.
        let penalty = if rows.len() > matched {
            self.extra_row_penalty
        } else {
            0.0
        };

        let total = (bonus + item_score - penalty).max(0.0);
        let mut reason_parts = vec![
            format!(
                "markdown table: {} (+{:.2})",
                if bonus > 0.0 { "yes" } else { "no" },
                bonus
            ),
            format!(
                "matched expected rows: {}/{} (+{:.2})",
                matched,
                self.required.len(),
                item_score
            ),
        ];
        if penalty > 0.0 {
            reason_parts.push(format!("extra rows detected (-{:.2})", penalty));
        }
        ScoreResult::new(total, reason_parts.join("; "))
    }
}
