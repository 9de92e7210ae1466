use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

use crate::transcript::Transcript;

/// One unit of evaluation: a resolved prompt pair plus optional expected
/// outcome. Immutable once produced by the flattener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRow {
	pub system_prompt: String,
	pub user_prompt: String,
	#[serde(default)]
	pub ground_truth: String,
}

impl ScenarioRow {
	pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
		Self {
			system_prompt: system_prompt.into(),
			user_prompt: user_prompt.into(),
			ground_truth: String::new(),
		}
	}

	pub fn with_ground_truth(mut self, ground_truth: impl Into<String>) -> Self {
		self.ground_truth = ground_truth.into();
		self
	}
}

/// Outcome of one scoring rule: a score in [0, 1] and a human-readable
/// justification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
	pub score: f64,
	pub reason: String,
}

impl ScoreResult {
	pub fn new(score: f64, reason: impl Into<String>) -> Self {
		Self { score: score.clamp(0.0, 1.0), reason: reason.into() }
	}
}

/// One scored case. `passed` is `None` when no pass threshold was
/// configured (the rule reports a score for inspection only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
	pub row: ScenarioRow,
	#[serde(skip_serializing_if = "Vec::is_empty", default)]
	pub transcript: Transcript,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result: Option<ScoreResult>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub passed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
	pub total: usize,
	pub passed: usize,
	pub failed: usize,
	pub ungated: usize,
	pub pass_rate: f64,
	pub avg_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalResult {
	pub cases: Vec<CaseOutcome>,
	pub summary: EvalSummary,
}

#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
	case: String,
	score: String,
	passed: String,
	reason: String,
}

impl EvalResult {
	pub fn summarize(cases: &[CaseOutcome]) -> EvalSummary {
		let total = cases.len();
		let passed = cases.iter().filter(|c| c.passed == Some(true)).count();
		let failed = cases.iter().filter(|c| c.passed == Some(false)).count();
		let ungated = total - passed - failed;

		let gated = passed + failed;
		let pass_rate = if gated == 0 { 0.0 } else { passed as f64 / gated as f64 };

		let mut score_sum = 0.0f64;
		let mut score_count = 0usize;
		for c in cases {
			if let Some(result) = &c.result {
				score_sum += result.score;
				score_count += 1;
			}
		}
		let avg_score = if score_count == 0 { 0.0 } else { score_sum / score_count as f64 };

		EvalSummary { total, passed, failed, ungated, pass_rate, avg_score }
	}

	pub fn summary_table(&self) -> String {
		let rows: Vec<SummaryRow> = self.cases.iter().map(|c| {
			let (score, reason) = match (&c.result, &c.error) {
				(Some(r), _) => (format!("{:.2}", r.score), r.reason.clone()),
				(None, Some(err)) => ("-".to_string(), format!("rollout error: {err}")),
				(None, None) => ("-".to_string(), String::new()),
			};
			let passed = match c.passed {
				Some(true) => "✓",
				Some(false) => "✗",
				None => "·",
			};
			SummaryRow {
				case: truncate(c.row.user_prompt.clone(), 48),
				score,
				passed: passed.to_string(),
				reason: truncate(reason, 72),
			}
		}).collect();

		let table = Table::new(rows);

		let summary_text = format!(
			"Total: {}  Passed: {}  Failed: {}  Ungated: {}  Pass rate: {:.1}%  Avg score: {:.3}",
			self.summary.total,
			self.summary.passed,
			self.summary.failed,
			self.summary.ungated,
			self.summary.pass_rate * 100.0,
			self.summary.avg_score
		);

		format!("{}\n\n{}\n", table, summary_text)
	}
}

fn truncate(s: String, max_len: usize) -> String {
	if s.chars().count() <= max_len {
		return s;
	}
	let mut truncated = s.chars().take(max_len.saturating_sub(1)).collect::<String>();
	truncated.push('…');
	truncated
}
