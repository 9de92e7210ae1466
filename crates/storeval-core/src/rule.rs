use crate::transcript::Message;
use crate::types::{ScenarioRow, ScoreResult};

/// A scoring rule: a deterministic, pure function from a frozen transcript
/// and its scenario metadata to a score in [0, 1] plus a justification.
///
/// Rules never fail; malformed transcript content is data to be scored, not
/// an engine error, so one bad transcript can never abort a batch.
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn score(&self, transcript: &[Message], row: &ScenarioRow) -> ScoreResult;
}
