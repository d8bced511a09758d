use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use ragloop_domain::format_sources;
use ragloop_service::{Orchestrator, TurnOutcome};

const PROMPT: &str = "Question> ";
const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

#[derive(Debug, Parser)]
#[command(
	version = ragloop_cli::VERSION,
	rename_all = "kebab",
	styles = ragloop_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Answer one question and exit instead of starting the prompt loop.
	#[arg(long, short = 'q', value_name = "TEXT")]
	pub question: Option<String>,
	/// Lowers `orchestrator.max_retries`; larger values are rejected.
	#[arg(long, value_name = "N")]
	pub max_retries: Option<u32>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = ragloop_config::load(&args.config)?;

	ragloop_cli::init_tracing(&config.service.log_level);

	let orchestrator = Orchestrator::from_config(&config)?;
	let max_retries = resolve_max_retries(args.max_retries, config.orchestrator.max_retries)?;
	let context_limit = config.retrieval.context_limit as usize;

	if let Some(question) = args.question {
		let outcome = orchestrator.process_question(&question, max_retries).await?;

		println!("{}", render_outcome(&outcome, context_limit));

		return Ok(());
	}

	let mut lines = BufReader::new(io::stdin()).lines();
	let mut stdout = io::stdout();

	loop {
		stdout.write_all(PROMPT.as_bytes()).await?;
		stdout.flush().await?;

		let Some(line) = lines.next_line().await? else {
			break;
		};
		let question = line.trim();

		if is_exit(question) {
			break;
		}
		if question.is_empty() {
			continue;
		}

		match orchestrator.process_question(question, max_retries).await {
			Ok(outcome) => {
				let rendered = render_outcome(&outcome, context_limit);

				stdout.write_all(format!("\n{rendered}\n\n").as_bytes()).await?;
			},
			Err(err) => {
				tracing::warn!(error = %err, "Question rejected.");

				stdout.write_all(format!("\n{err}\n\n").as_bytes()).await?;
			},
		}
	}

	Ok(())
}

/// Applies a per-run override that may only lower the configured retry budget.
pub fn resolve_max_retries(requested: Option<u32>, configured: u32) -> color_eyre::Result<u32> {
	match requested {
		Some(requested) if requested > configured => Err(eyre::eyre!(
			"--max-retries {requested} exceeds orchestrator.max_retries ({configured})."
		)),
		Some(requested) => Ok(requested),
		None => Ok(configured),
	}
}

pub fn is_exit(input: &str) -> bool {
	EXIT_WORDS.iter().any(|word| input.eq_ignore_ascii_case(word))
}

/// Formats an outcome for the terminal: the answer, then sources, attempts and notes.
pub fn render_outcome(outcome: &TurnOutcome, context_limit: usize) -> String {
	let mut out = outcome.answer.trim_end().to_string();

	if !outcome.evidence.is_empty() {
		out.push_str(&format!("\n\n(Sources: {})", format_sources(&outcome.evidence, context_limit)));
	}

	out.push_str(&format!("\nAttempts: {}", outcome.attempts));

	for note in outcome.notes() {
		out.push_str(&format!("\nNote: {note}"));
	}

	out
}
