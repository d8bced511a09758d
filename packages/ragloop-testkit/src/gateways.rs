use std::{
	collections::{HashMap, VecDeque},
	sync::Mutex,
};

use ragloop_domain::EvidencePassage;
use ragloop_service::{BoxFuture, GatewayError, GenerationGateway, RetrievalGateway};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PromptKind {
	Routing,
	Answer,
	Judgment,
	Reformulation,
}
impl PromptKind {
	/// Recognizes which orchestrator prompt template produced `prompt`.
	pub fn classify(prompt: &str) -> Option<Self> {
		let head = prompt.trim_start();

		if head.starts_with("Classify if the following question") {
			Some(Self::Routing)
		} else if head.starts_with("You are an expert assistant") {
			Some(Self::Answer)
		} else if head.starts_with("You are reviewing a Q&A system output") {
			Some(Self::Judgment)
		} else if head.starts_with("Rewrite the following question") {
			Some(Self::Reformulation)
		} else {
			None
		}
	}
}

type Reply = Result<String, GatewayError>;

/// Plays back scripted replies per prompt kind.
///
/// Replies for a kind are consumed in order; the last one repeats. A kind without a script
/// fails with [`GatewayError::GenerationUnavailable`].
#[derive(Default)]
pub struct ScriptedGeneration {
	scripts: Mutex<HashMap<PromptKind, VecDeque<Reply>>>,
	calls: Mutex<Vec<(PromptKind, String)>>,
}
impl ScriptedGeneration {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn reply(self, kind: PromptKind, text: &str) -> Self {
		self.push(kind, Ok(text.to_string()))
	}

	pub fn fail(self, kind: PromptKind, err: GatewayError) -> Self {
		self.push(kind, Err(err))
	}

	/// Number of generation calls made with prompts of `kind`.
	pub fn calls(&self, kind: PromptKind) -> usize {
		self.lock_calls().iter().filter(|(call_kind, _)| *call_kind == kind).count()
	}

	pub fn total_calls(&self) -> usize {
		self.lock_calls().len()
	}

	pub fn prompts(&self, kind: PromptKind) -> Vec<String> {
		self.lock_calls()
			.iter()
			.filter(|(call_kind, _)| *call_kind == kind)
			.map(|(_, prompt)| prompt.clone())
			.collect()
	}

	/// Prompt kinds in call order.
	pub fn sequence(&self) -> Vec<PromptKind> {
		self.lock_calls().iter().map(|(kind, _)| *kind).collect()
	}

	fn push(self, kind: PromptKind, reply: Reply) -> Self {
		let mut scripts = self.scripts.lock().unwrap_or_else(|err| err.into_inner());

		scripts.entry(kind).or_default().push_back(reply);
		drop(scripts);

		self
	}

	fn next_reply(&self, kind: PromptKind) -> Reply {
		let mut scripts = self.scripts.lock().unwrap_or_else(|err| err.into_inner());
		let Some(queue) = scripts.get_mut(&kind) else {
			return Err(GatewayError::GenerationUnavailable {
				message: format!("No scripted reply for {kind:?} prompts."),
			});
		};

		if queue.len() > 1 {
			queue.pop_front().unwrap_or(Err(GatewayError::GenerationEmpty))
		} else {
			queue.front().cloned().unwrap_or(Err(GatewayError::GenerationEmpty))
		}
	}

	fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<(PromptKind, String)>> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl GenerationGateway for ScriptedGeneration {
	fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GatewayError>> {
		let reply = match PromptKind::classify(prompt) {
			Some(kind) => {
				self.lock_calls().push((kind, prompt.to_string()));

				self.next_reply(kind)
			},
			None => Err(GatewayError::GenerationUnavailable {
				message: "Unrecognized prompt.".to_string(),
			}),
		};

		Box::pin(async move { reply })
	}
}

/// Serves fixed retrieval results and records every query it receives.
///
/// Results are consumed in order per call; the last one repeats.
pub struct StaticRetrieval {
	results: Mutex<VecDeque<Result<Vec<EvidencePassage>, GatewayError>>>,
	queries: Mutex<Vec<(String, u32)>>,
}
impl StaticRetrieval {
	pub fn with_passages(passages: Vec<EvidencePassage>) -> Self {
		Self::sequence(vec![Ok(passages)])
	}

	pub fn empty() -> Self {
		Self::with_passages(Vec::new())
	}

	pub fn failing(message: &str) -> Self {
		Self::sequence(vec![Err(GatewayError::RetrievalUnavailable {
			message: message.to_string(),
		})])
	}

	pub fn sequence(results: Vec<Result<Vec<EvidencePassage>, GatewayError>>) -> Self {
		Self { results: Mutex::new(results.into()), queries: Mutex::new(Vec::new()) }
	}

	pub fn calls(&self) -> usize {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	/// `(query, k)` pairs in call order.
	pub fn queries(&self) -> Vec<(String, u32)> {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl RetrievalGateway for StaticRetrieval {
	fn retrieve<'a>(
		&'a self,
		query: &'a str,
		k: u32,
	) -> BoxFuture<'a, Result<Vec<EvidencePassage>, GatewayError>> {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).push((query.to_string(), k));

		let mut results = self.results.lock().unwrap_or_else(|err| err.into_inner());
		let result = if results.len() > 1 {
			results.pop_front().unwrap_or_else(|| Ok(Vec::new()))
		} else {
			results.front().cloned().unwrap_or_else(|| Ok(Vec::new()))
		};

		Box::pin(async move { result })
	}
}
