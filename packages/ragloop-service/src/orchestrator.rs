use std::sync::Arc;

use crate::{
	ChatGeneration, Error, Gateways, QdrantRetrieval, Result, prompts,
	sufficiency::{self, JudgmentRequest, SufficiencyPolicy},
	turn::{Phase, Step, StepOutcome, TurnOutcome, TurnState, transition},
};
use ragloop_config::Config;
use ragloop_domain::{Normalizer, format_context, parse_rewrite, parse_route};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrchestratorSettings {
	pub top_k: u32,
	pub context_limit: u32,
	pub max_retries: u32,
}
impl OrchestratorSettings {
	pub fn from_config(cfg: &Config) -> Self {
		Self {
			top_k: cfg.retrieval.top_k,
			context_limit: cfg.retrieval.context_limit,
			max_retries: cfg.orchestrator.max_retries,
		}
	}
}

/// Drives one question at a time through the routing, retrieval, answer and review loop.
pub struct Orchestrator {
	gateways: Gateways,
	policy: Arc<dyn SufficiencyPolicy>,
	normalizer: Normalizer,
	settings: OrchestratorSettings,
}
impl Orchestrator {
	pub fn new(cfg: &Config, gateways: Gateways) -> Result<Self> {
		let policy = sufficiency::resolve_policy(&cfg.orchestrator.judge, gateways.generation.clone())?;
		let normalizer = Normalizer::new(&cfg.normalizer.noise_phrases)
			.map_err(|err| Error::InvalidConfig { message: err.to_string() })?;

		Ok(Self { gateways, policy, normalizer, settings: OrchestratorSettings::from_config(cfg) })
	}

	/// Builds the orchestrator on the Qdrant index and the configured chat model.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let retrieval = QdrantRetrieval::from_config(cfg)?;
		let generation = ChatGeneration::new(cfg.providers.llm.clone());

		Self::new(cfg, Gateways::new(Arc::new(retrieval), Arc::new(generation)))
	}

	pub fn with_policy(mut self, policy: Arc<dyn SufficiencyPolicy>) -> Self {
		self.policy = policy;

		self
	}

	pub fn settings(&self) -> OrchestratorSettings {
		self.settings
	}

	/// Answers `question` with the configured retry budget.
	pub async fn ask(&self, question: &str) -> Result<TurnOutcome> {
		self.process_question(question, self.settings.max_retries).await
	}

	/// Runs one turn to completion.
	///
	/// Gateway failures never surface as `Err`: they are folded into the returned outcome as
	/// degradations or a failure answer. `Err` is reserved for invalid input.
	pub async fn process_question(&self, question: &str, max_retries: u32) -> Result<TurnOutcome> {
		let question = question.trim();

		if question.is_empty() {
			return Err(Error::InvalidRequest { message: "question must be non-empty.".to_string() });
		}
		if max_retries == 0 {
			return Err(Error::InvalidRequest {
				message: "max_retries must be greater than zero.".to_string(),
			});
		}

		let mut state = TurnState::new(question, max_retries);

		tracing::info!(
			turn_id = %state.turn_id,
			max_retries,
			judge = self.policy.name(),
			"Turn started."
		);

		while !state.is_terminal() {
			let outcome = self.step(&state).await;

			if let StepOutcome::Failed { step, reason } = &outcome {
				tracing::warn!(
					turn_id = %state.turn_id,
					step = ?step,
					attempts = state.attempts,
					%reason,
					"Turn step failed."
				);
			}

			state = transition(state, outcome);

			tracing::info!(
				turn_id = %state.turn_id,
				phase = state.phase.as_str(),
				route = state.route.as_str(),
				attempts = state.attempts,
				"Turn advanced."
			);
		}

		let outcome = state.into_outcome();

		tracing::info!(
			turn_id = %outcome.turn_id,
			route = outcome.route.as_str(),
			attempts = outcome.attempts,
			evidence = outcome.evidence.len(),
			degraded = outcome.degraded,
			"Turn finished."
		);

		Ok(outcome)
	}

	async fn step(&self, state: &TurnState) -> StepOutcome {
		match state.phase {
			Phase::Routing => self.route(state).await,
			Phase::Retrieving => self.retrieve(state).await,
			Phase::Answering => self.answer(state).await,
			Phase::Judging => self.judge(state).await,
			Phase::Reformulating => self.reformulate(state).await,
			Phase::Terminal => unreachable!("terminal turns are not stepped"),
		}
	}

	async fn route(&self, state: &TurnState) -> StepOutcome {
		let prompt = prompts::routing_prompt(&state.original_question);

		match self.gateways.generation.generate(&prompt).await {
			Ok(reply) => StepOutcome::Routed(parse_route(&reply)),
			Err(err) => StepOutcome::Failed { step: Step::Routing, reason: err.to_string() },
		}
	}

	async fn retrieve(&self, state: &TurnState) -> StepOutcome {
		let query = self.normalizer.normalize(&state.question);

		tracing::debug!(turn_id = %state.turn_id, %query, top_k = self.settings.top_k, "Retrieving.");

		match self.gateways.retrieval.retrieve(&query, self.settings.top_k).await {
			Ok(passages) => StepOutcome::Retrieved(passages),
			Err(err) => StepOutcome::Failed { step: Step::Retrieval, reason: err.to_string() },
		}
	}

	async fn answer(&self, state: &TurnState) -> StepOutcome {
		let context = format_context(&state.evidence, self.settings.context_limit as usize);
		let prompt = prompts::answer_prompt(&state.original_question, &context);

		tracing::debug!(
			turn_id = %state.turn_id,
			evidence = state.evidence.len(),
			prompt_chars = prompt.len(),
			"Generating answer."
		);

		match self.gateways.generation.generate(&prompt).await {
			Ok(answer) => StepOutcome::Answered(answer),
			Err(err) => StepOutcome::Failed { step: Step::Answer, reason: err.to_string() },
		}
	}

	async fn judge(&self, state: &TurnState) -> StepOutcome {
		let request = JudgmentRequest {
			question: &state.original_question,
			answer: &state.answer,
			evidence: &state.evidence,
			route: state.route,
		};

		match self.policy.judge(request).await {
			Ok(verdict) => StepOutcome::Judged(verdict),
			Err(err) => StepOutcome::Failed { step: Step::Judgment, reason: err.to_string() },
		}
	}

	async fn reformulate(&self, state: &TurnState) -> StepOutcome {
		let prompt = prompts::reformulation_prompt(&state.question);

		match self.gateways.generation.generate(&prompt).await {
			Ok(reply) => match parse_rewrite(&reply) {
				Some(question) => StepOutcome::Reformulated(question),
				None => StepOutcome::Failed {
					step: Step::Reformulation,
					reason: "rewrite was empty".to_string(),
				},
			},
			Err(err) => StepOutcome::Failed { step: Step::Reformulation, reason: err.to_string() },
		}
	}
}
