pub mod gateways;
pub mod orchestrator;
pub mod prompts;
pub mod sufficiency;
pub mod turn;

mod error;

pub use error::{Error, GatewayError, Result};
pub use gateways::{ChatGeneration, QdrantRetrieval};
pub use orchestrator::{Orchestrator, OrchestratorSettings};
pub use sufficiency::{EvidencePresence, JudgmentRequest, ModelJudgment, SufficiencyPolicy};
pub use turn::{
	Degradation, Phase, Recovery, Step, StepOutcome, TurnFailure, TurnOutcome, TurnState,
	failure_policy, transition,
};

use std::{future::Future, pin::Pin, sync::Arc};

use ragloop_domain::EvidencePassage;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Similarity search over the prepared corpus.
///
/// Implementations return passages best match first with `sequence_index` numbered in that
/// order. No match is an empty vector, not an error.
pub trait RetrievalGateway
where
	Self: Send + Sync,
{
	fn retrieve<'a>(
		&'a self,
		query: &'a str,
		k: u32,
	) -> BoxFuture<'a, Result<Vec<EvidencePassage>, GatewayError>>;
}

/// Prompt in, text out.
pub trait GenerationGateway
where
	Self: Send + Sync,
{
	fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GatewayError>>;
}

#[derive(Clone)]
pub struct Gateways {
	pub retrieval: Arc<dyn RetrievalGateway>,
	pub generation: Arc<dyn GenerationGateway>,
}
impl Gateways {
	pub fn new(
		retrieval: Arc<dyn RetrievalGateway>,
		generation: Arc<dyn GenerationGateway>,
	) -> Self {
		Self { retrieval, generation }
	}
}
