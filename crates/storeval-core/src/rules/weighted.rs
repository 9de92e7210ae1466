use crate::normalize::normalize;
use crate::rule::Rule;
use crate::table::{has_table, TableMode};
use crate::transcript::{last_assistant_content, Message};
use crate::types::{ScenarioRow, ScoreResult};

/// Weighted multi-item matching with a cap: awards `per_item_weight` for
/// each expected item found (by normalized substring containment) in the
/// final answer, up to `cap`, plus a flat bonus when a markdown table
/// (lenient mode) is present.
pub struct WeightedContainsRule {
    expected_items: Vec<String>,
    per_item_weight: f64,
    cap: f64,
    table_bonus: f64,
}

impl WeightedContainsRule {
    pub fn new(expected_items: Vec<String>, per_item_weight: f64, cap: f64) -> Self {
        Self {
            expected_items,
            per_item_weight,
            cap,
            table_bonus: 0.0,
        }
    }

    pub fn with_table_bonus(mut self, bonus: f64) -> Self {
        self.table_bonus = bonus;
        self
    }
}

impl Rule for WeightedContainsRule {
    fn name(&self) -> &'static str {
        "weighted_contains"
    }

    fn score(&self, transcript: &[Message], _row: &ScenarioRow) -> ScoreResult {
        let content = last_assistant_content(transcript);
        let normalized = normalize(&content);

        let matched = self
            .expected_items
            .iter()
            .filter(|item| normalized.contains(&normalize(item)))
            .count();
        let item_score = (matched as f64 * self.per_item_weight).min(self.cap);

        let bonus = if self.table_bonus > 0.0 && has_table(&content, TableMode::Lenient) {
            self.table_bonus
        } else {
            0.0
        };

        let reason = format!(
            "matched {}/{} expected items (score {:.2}); {}",
            matched,
            self.expected_items.len(),
            item_score,
            if bonus > 0.0 {
                format!("markdown table detected (+{:.2})", bonus)
            } else {
                "no markdown table (+0.00)".to_string()
            }
        );
        ScoreResult::new(item_score + bonus, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Message;

    fn row() -> ScenarioRow {
        ScenarioRow::new("sys", "list the tracks")
    }

    fn ten_items() -> Vec<String> {
        (0..10).map(|i| format!("track number {i}")).collect()
    }

    #[test]
    fn test_cap_applies() {
        let answer = ten_items().join(", ");
        let rule = WeightedContainsRule::new(ten_items(), 0.08, 0.8);
        let result = rule.score(&[Message::assistant(answer)], &row());
        assert!((result.score - 0.8).abs() < 1e-9);
        assert!(result.reason.contains("10/10"));
    }

    #[test]
    fn test_duplicate_expected_items_still_cap() {
        // Twelve configured items, all present: raw sum 0.96 caps at 0.8.
        let mut items = ten_items();
        items.push("track number 0".into());
        items.push("track number 1".into());
        let answer = ten_items().join(", ");
        let rule = WeightedContainsRule::new(items, 0.08, 0.8);
        let result = rule.score(&[Message::assistant(answer)], &row());
        assert!((result.score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_partial_match_with_table_bonus() {
        let answer = "| Track |\n|:---|\n| track number 0 |\n| track number 1 |";
        let rule = WeightedContainsRule::new(ten_items(), 0.08, 0.8).with_table_bonus(0.2);
        let result = rule.score(&[Message::assistant(answer)], &row());
        assert!((result.score - (0.16 + 0.2)).abs() < 1e-9);
        assert!(result.reason.contains("2/10"));
        assert!(result.reason.contains("table detected"));
    }

    #[test]
    fn test_matching_is_normalized() {
        let rule = WeightedContainsRule::new(vec!["Baltimore, DC".into()], 0.5, 1.0);
        let answer = "the set includes  BALTIMORE,\u{00a0}DC  among others";
        let result = rule.score(&[Message::assistant(answer)], &row());
        assert!((result.score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_transcript_scores_zero() {
        let rule = WeightedContainsRule::new(ten_items(), 0.08, 0.8).with_table_bonus(0.2);
        let result = rule.score(&[], &row());
        assert_eq!(result.score, 0.0);
    }
}
