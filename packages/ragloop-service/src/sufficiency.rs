//! Pluggable answer-sufficiency policies consulted in the Judging phase.

use std::sync::Arc;

use crate::{BoxFuture, Error, GatewayError, GenerationGateway, Result, prompts};
use ragloop_domain::{EvidencePassage, Route, Sufficiency, parse_judgment};

pub struct JudgmentRequest<'a> {
	pub question: &'a str,
	pub answer: &'a str,
	pub evidence: &'a [EvidencePassage],
	pub route: Route,
}

pub trait SufficiencyPolicy
where
	Self: Send + Sync,
{
	fn judge<'a>(
		&'a self,
		request: JudgmentRequest<'a>,
	) -> BoxFuture<'a, Result<Sufficiency, GatewayError>>;

	fn name(&self) -> &'static str;
}

/// Asks the language model for a YES/NO verdict.
pub struct ModelJudgment {
	generation: Arc<dyn GenerationGateway>,
}
impl ModelJudgment {
	pub fn new(generation: Arc<dyn GenerationGateway>) -> Self {
		Self { generation }
	}
}
impl SufficiencyPolicy for ModelJudgment {
	fn judge<'a>(
		&'a self,
		request: JudgmentRequest<'a>,
	) -> BoxFuture<'a, Result<Sufficiency, GatewayError>> {
		Box::pin(async move {
			let prompt = prompts::judgment_prompt(request.question, request.answer);
			let reply = self.generation.generate(&prompt).await?;

			Ok(parse_judgment(&reply))
		})
	}

	fn name(&self) -> &'static str {
		"model"
	}
}

/// Deterministic policy: a retrieval-route answer is insufficient exactly when no evidence
/// backed it. Makes no external calls.
pub struct EvidencePresence;
impl SufficiencyPolicy for EvidencePresence {
	fn judge<'a>(
		&'a self,
		request: JudgmentRequest<'a>,
	) -> BoxFuture<'a, Result<Sufficiency, GatewayError>> {
		let verdict = if request.route == Route::Retrieve && request.evidence.is_empty() {
			Sufficiency::Insufficient
		} else {
			Sufficiency::Sufficient
		};

		Box::pin(async move { Ok(verdict) })
	}

	fn name(&self) -> &'static str {
		"evidence"
	}
}

/// Resolves `orchestrator.judge` into a policy.
pub fn resolve_policy(
	judge: &str,
	generation: Arc<dyn GenerationGateway>,
) -> Result<Arc<dyn SufficiencyPolicy>> {
	match judge {
		"model" => Ok(Arc::new(ModelJudgment::new(generation))),
		"evidence" => Ok(Arc::new(EvidencePresence)),
		other => Err(Error::InvalidConfig { message: format!("Unknown judge mode {other:?}.") }),
	}
}
