use std::sync::Arc;

use anyhow::Result;
use futures::stream::{self, StreamExt};

use crate::dataset::{self, DatasetInput};
use crate::rollout::Rollout;
use crate::rule::Rule;
use crate::types::{CaseOutcome, EvalResult};

pub struct EvalBuilder {
	inputs: Vec<DatasetInput>,
	rollout: Option<Arc<dyn Rollout>>,
	rule: Option<Arc<dyn Rule>>,
	passed_threshold: Option<f64>,
	concurrency: usize,
}

impl EvalBuilder {
	pub fn new() -> Self {
		Self {
			inputs: Vec::new(),
			rollout: None,
			rule: None,
			passed_threshold: None,
			concurrency: 4,
		}
	}

	pub fn dataset<I>(mut self, inputs: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<DatasetInput>,
	{
		self.inputs = inputs.into_iter().map(Into::into).collect();
		self
	}

	pub fn add_input(mut self, input: impl Into<DatasetInput>) -> Self {
		self.inputs.push(input.into());
		self
	}

	pub fn rollout(mut self, rollout: Arc<dyn Rollout>) -> Self {
		self.rollout = Some(rollout);
		self
	}

	pub fn rule(mut self, rule: Arc<dyn Rule>) -> Self {
		self.rule = Some(rule);
		self
	}

	/// Minimum score for a case to count as passed. Without a threshold the
	/// suite is non-gating: cases carry scores but no pass/fail verdict.
	pub fn passed_threshold(mut self, threshold: Option<f64>) -> Self {
		self.passed_threshold = threshold;
		self
	}

	pub fn concurrency(mut self, n: usize) -> Self {
		self.concurrency = n.max(1);
		self
	}

	pub fn build(self) -> Result<Eval> {
		Ok(Eval {
			inputs: self.inputs,
			rollout: self.rollout.ok_or_else(|| anyhow::anyhow!("rollout must be set"))?,
			rule: self.rule.ok_or_else(|| anyhow::anyhow!("rule must be set"))?,
			passed_threshold: self.passed_threshold,
			concurrency: self.concurrency,
		})
	}
}

impl Default for EvalBuilder {
	fn default() -> Self {
		Self::new()
	}
}

pub struct Eval {
	inputs: Vec<DatasetInput>,
	rollout: Arc<dyn Rollout>,
	rule: Arc<dyn Rule>,
	passed_threshold: Option<f64>,
	concurrency: usize,
}

impl Eval {
	pub fn builder() -> EvalBuilder {
		EvalBuilder::new()
	}

	/// Flatten the dataset, obtain a transcript per row, and score each
	/// case. Dataset errors abort the run; a rollout error is recorded on
	/// its case and never aborts the batch. Case order follows dataset
	/// order.
	pub async fn run(&self) -> Result<EvalResult> {
		let rows = dataset::flatten(&self.inputs).await?;

		let rollout = self.rollout.clone();
		let rule = self.rule.clone();
		let threshold = self.passed_threshold;
		let stream = stream::iter(rows.into_iter()).map(move |row| {
			let rollout = rollout.clone();
			let rule = rule.clone();
			async move {
				match rollout.run(&row).await {
					Ok(transcript) => {
						let result = rule.score(&transcript, &row);
						let passed = threshold.map(|t| result.score >= t);
						CaseOutcome { row, transcript, result: Some(result), error: None, passed }
					}
					Err(err) => CaseOutcome {
						row,
						transcript: Vec::new(),
						result: None,
						error: Some(err.to_string()),
						passed: threshold.map(|_| false),
					},
				}
			}
		});

		let cases: Vec<CaseOutcome> = stream.buffered(self.concurrency).collect().await;
		let summary = EvalResult::summarize(&cases);
		Ok(EvalResult { cases, summary })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dataset::ScenarioRecord;
	use crate::rollout::from_async_fn;
	use crate::rules::abstention::ToolAbstentionRule;
	use crate::rules::leakage::LeakageRule;
	use crate::transcript::Message;

	fn record(user: &str) -> DatasetInput {
		DatasetInput::Record(ScenarioRecord::inline("sys", user))
	}

	#[tokio::test]
	async fn test_gated_run() {
		let rollout = from_async_fn(|row| {
			let user = row.user_prompt.clone();
			async move {
				let reply = if user == "leak" { "try execute_sql" } else { "happy to help" };
				Ok(vec![Message::user(user), Message::assistant(reply)])
			}
		});
		let eval = Eval::builder()
			.dataset(vec![record("ok"), record("leak")])
			.rollout(rollout)
			.rule(Arc::new(LeakageRule::tools_only(vec!["execute_sql".into()])))
			.passed_threshold(Some(1.0))
			.build()
			.unwrap();
		let result = eval.run().await.unwrap();
		assert_eq!(result.summary.total, 2);
		assert_eq!(result.summary.passed, 1);
		assert_eq!(result.summary.failed, 1);
		assert_eq!(result.cases[0].passed, Some(true));
		assert_eq!(result.cases[1].passed, Some(false));
		assert_eq!(result.cases[1].transcript.len(), 2);
		assert!(crate::testing::assert_eval_pass_rate(&result, 0.9).is_err());
	}

	#[tokio::test]
	async fn test_ungated_run_has_no_verdicts() {
		let rollout = from_async_fn(|row| {
			let user = row.user_prompt.clone();
			async move { Ok(vec![Message::user(user), Message::assistant("fine")]) }
		});
		let eval = Eval::builder()
			.dataset(vec![record("a"), record("b")])
			.rollout(rollout)
			.rule(Arc::new(ToolAbstentionRule))
			.passed_threshold(None)
			.build()
			.unwrap();
		let result = eval.run().await.unwrap();
		assert_eq!(result.summary.ungated, 2);
		assert!(result.cases.iter().all(|c| c.passed.is_none()));
		crate::testing::assert_eval_no_failures(&result).unwrap();
	}

	#[tokio::test]
	async fn test_rollout_error_recorded_not_fatal() {
		let rollout = from_async_fn(|row| {
			let user = row.user_prompt.clone();
			async move {
				if user == "boom" {
					anyhow::bail!("model timed out");
				}
				Ok(vec![Message::assistant("ok")])
			}
		});
		let eval = Eval::builder()
			.dataset(vec![record("fine"), record("boom")])
			.rollout(rollout)
			.rule(Arc::new(ToolAbstentionRule))
			.passed_threshold(Some(1.0))
			.build()
			.unwrap();
		let result = eval.run().await.unwrap();
		assert_eq!(result.summary.total, 2);
		assert_eq!(result.cases[1].error.as_deref(), Some("model timed out"));
		assert_eq!(result.cases[1].passed, Some(false));
		assert!(result.cases[1].result.is_none());
	}

	#[tokio::test]
	async fn test_case_order_follows_dataset_order() {
		let rollout = from_async_fn(|row| {
			let user = row.user_prompt.clone();
			async move { Ok(vec![Message::assistant(user)]) }
		});
		let inputs = vec![
			record("A"),
			DatasetInput::List(vec![record("B"), record("C")]),
		];
		let eval = Eval::builder()
			.dataset(inputs)
			.rollout(rollout)
			.rule(Arc::new(ToolAbstentionRule))
			.concurrency(8)
			.build()
			.unwrap();
		let result = eval.run().await.unwrap();
		let order: Vec<&str> = result.cases.iter().map(|c| c.row.user_prompt.as_str()).collect();
		assert_eq!(order, vec!["A", "B", "C"]);
	}
}
