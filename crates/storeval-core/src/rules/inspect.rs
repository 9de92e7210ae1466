use crate::rule::Rule;
use crate::transcript::Message;
use crate::types::{ScenarioRow, ScoreResult};

/// Inert rule for manual-review scenarios: records the transcript without
/// judging it. Pair with no pass threshold so it never gates a suite.
pub struct InspectRule;

impl Rule for InspectRule {
    fn name(&self) -> &'static str {
        "inspect"
    }

    fn score(&self, _transcript: &[Message], _row: &ScenarioRow) -> ScoreResult {
        ScoreResult::new(1.0, "recorded for manual review")
    }
}
