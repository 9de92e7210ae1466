use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_json::json;
use storeval_core::{
	from_async_fn, Eval, EvalConfig, Message, Rollout, ScenarioRow, Transcript,
};

#[derive(Debug, Parser)]
#[command(name = "storeval", about = "Score storefront agent transcripts against an eval config")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
	Run(RunArgs),
}

#[derive(Debug, Clone, Parser)]
struct RunArgs {
	/// Eval config (YAML): dataset paths, rule, passed_threshold, concurrency
	#[arg(long)]
	config: PathBuf,

	/// Recorded transcripts, one JSON message array per line, matched to
	/// dataset rows by position
	#[arg(long)]
	transcripts: Option<PathBuf>,

	/// Rollout endpoint: POSTs { "messages": [system, user] } and expects
	/// { "messages": [...] } with the full transcript back
	#[arg(long)]
	http_url: Option<String>,

	/// Output JSON result to a file
	#[arg(long)]
	json_out: Option<PathBuf>,
}

/// Replays pre-recorded transcripts in dataset order. Cases beyond the
/// recorded set score against an empty transcript. Position-based, so the
/// runner must use concurrency 1.
struct ReplayRollout {
	transcripts: Vec<Transcript>,
	cursor: AtomicUsize,
}

impl ReplayRollout {
	fn from_jsonl(text: &str) -> Result<Self> {
		let mut transcripts = Vec::new();
		for (idx, line) in text.lines().enumerate() {
			if line.trim().is_empty() {
				continue;
			}
			let messages: Vec<Message> = serde_json::from_str(line)
				.with_context(|| format!("invalid transcript on line {}", idx + 1))?;
			transcripts.push(messages);
		}
		Ok(Self { transcripts, cursor: AtomicUsize::new(0) })
	}
}

#[async_trait]
impl Rollout for ReplayRollout {
	async fn run(&self, _row: &ScenarioRow) -> Result<Transcript> {
		let idx = self.cursor.fetch_add(1, Ordering::SeqCst);
		Ok(self.transcripts.get(idx).cloned().unwrap_or_default())
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	match cli.command {
		Commands::Run(args) => run(args).await?,
	}
	Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
	let config = EvalConfig::load(&args.config).await?;

	let (rollout, concurrency): (Arc<dyn Rollout>, usize) = if let Some(path) = &args.transcripts {
		let text = tokio::fs::read_to_string(path)
			.await
			.with_context(|| format!("failed to read {}", path.display()))?;
		// Replay is position-based; keep the cases in order.
		(Arc::new(ReplayRollout::from_jsonl(&text)?), 1)
	} else if let Some(url) = args.http_url.clone() {
		let rollout = from_async_fn(move |row| {
			let url = url.clone();
			let system = row.system_prompt.clone();
			let user = row.user_prompt.clone();
			async move {
				let client = reqwest::Client::new();
				let body = json!({
					"messages": [Message::system(system), Message::user(user)],
				});
				let resp = client.post(&url).json(&body).send().await?;
				let status = resp.status();
				let v = resp.json::<serde_json::Value>().await?;
				if !status.is_success() {
					anyhow::bail!("HTTP {}: {}", status.as_u16(), v);
				}
				let messages = v
					.get("messages")
					.cloned()
					.ok_or_else(|| anyhow::anyhow!("response missing `messages`"))?;
				let transcript: Transcript = serde_json::from_value(messages)?;
				Ok(transcript)
			}
		});
		(rollout, config.concurrency)
	} else {
		anyhow::bail!("one of --transcripts or --http-url is required");
	};

	let eval = Eval::builder()
		.dataset(config.dataset.clone())
		.rollout(rollout)
		.rule(config.rule.build())
		.passed_threshold(config.passed_threshold)
		.concurrency(concurrency)
		.build()?;

	let result = eval.run().await?;
	println!("{}", result.summary_table());

	if let Some(path) = args.json_out {
		let json = serde_json::to_string_pretty(&result)?;
		tokio::fs::write(path, json).await?;
	}

	if result.summary.failed > 0 {
		anyhow::bail!(
			"{} of {} gated cases below threshold",
			result.summary.failed,
			result.summary.passed + result.summary.failed
		);
	}

	Ok(())
}
