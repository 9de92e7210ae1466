use serde::{Deserialize, Serialize};

use crate::rule::Rule;
use crate::table::{find_table, TableMode};
use crate::transcript::{last_assistant_content, Message};
use crate::types::{ScenarioRow, ScoreResult};

/// Per-column numeric predicate for [`TableRangeRule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum FieldPredicate {
    /// Currency-like field must parse and be ≤ `max`.
    CurrencyMax { column: String, max: f64 },
    /// `minutes:seconds` field must convert to seconds within the
    /// inclusive range.
    DurationRange {
        column: String,
        min_seconds: i64,
        max_seconds: i64,
    },
}

impl FieldPredicate {
    fn column(&self) -> &str {
        match self {
            FieldPredicate::CurrencyMax { column, .. } => column,
            FieldPredicate::DurationRange { column, .. } => column,
        }
    }

    fn holds(&self, cell: &str) -> bool {
        match self {
            FieldPredicate::CurrencyMax { max, .. } => parse_currency(cell) <= *max,
            FieldPredicate::DurationRange {
                min_seconds,
                max_seconds,
                ..
            } => {
                let seconds = parse_duration_seconds(cell);
                *min_seconds <= seconds && seconds <= *max_seconds
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            FieldPredicate::CurrencyMax { column, max } => format!("{column}<={max}"),
            FieldPredicate::DurationRange {
                column,
                min_seconds,
                max_seconds,
            } => format!("{column} {min_seconds}-{max_seconds}s"),
        }
    }
}

/// Hard pass/fail gate: the final answer must contain a strict-mode table
/// with at least one extracted row, and every row must satisfy every
/// predicate. Unparsable fields fail their predicate (fail-closed).
pub struct TableRangeRule {
    predicates: Vec<FieldPredicate>,
}

impl TableRangeRule {
    pub fn new(predicates: Vec<FieldPredicate>) -> Self {
        Self { predicates }
    }
}

impl Rule for TableRangeRule {
    fn name(&self) -> &'static str {
        "table_range"
    }

    fn score(&self, transcript: &[Message], _row: &ScenarioRow) -> ScoreResult {
        let content = last_assistant_content(transcript);
        let table = find_table(&content, TableMode::Strict);
        let table_ok = table.is_some();
        let rows = table.map(|t| t.rows).unwrap_or_default();

        let mut predicate_ok = vec![true; self.predicates.len()];
        for row in &rows {
            for (i, predicate) in self.predicates.iter().enumerate() {
                let cell = row.get(predicate.column()).unwrap_or_default();
                if !predicate.holds(cell) {
                    predicate_ok[i] = false;
                }
            }
        }

        let all_ok = table_ok && !rows.is_empty() && predicate_ok.iter().all(|ok| *ok);
        let mut reason_parts = vec![
            format!("table={}", if table_ok { "ok" } else { "missing" }),
            format!("rows={}", rows.len()),
        ];
        for (predicate, ok) in self.predicates.iter().zip(&predicate_ok) {
            reason_parts.push(format!(
                "{}={}",
                predicate.describe(),
                if *ok { "yes" } else { "no" }
            ));
        }
        ScoreResult::new(if all_ok { 1.0 } else { 0.0 }, reason_parts.join("; "))
    }
}

/// Parse a currency-like cell: space variants and `$` stripped, decimal
/// comma converted to a point, then digits and the point only. Unparsable
/// input yields NaN, which fails any comparison.
pub fn parse_currency(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '\u{2009}' | '\u{202f}' | '\u{00a0}' => ' ',
            other => other,
        })
        .collect();
    let cleaned = cleaned.replace('$', "").trim().replace(',', ".");
    let digits: String = cleaned
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().unwrap_or(f64::NAN)
}

/// Parse a `minutes:seconds` cell into seconds. Anything else (missing
/// colon, wrong segment count, non-integer segments) yields -1, which
/// fails any inclusive-range predicate.
pub fn parse_duration_seconds(raw: &str) -> i64 {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '\u{2009}' | '\u{202f}' | '\u{00a0}' => ' ',
            other => other,
        })
        .collect();
    let parts: Vec<&str> = cleaned.trim().split(':').collect();
    if parts.len() != 2 {
        return -1;
    }
    match (
        parts[0].trim().parse::<i64>(),
        parts[1].trim().parse::<i64>(),
    ) {
        (Ok(minutes), Ok(seconds)) => minutes * 60 + seconds,
        _ => -1,
    }
}
