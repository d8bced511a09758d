//! Turn state and the pure transition function of the question state machine.
//!
//! ```text
//! Routing -> (Retrieving | -) -> Answering -> Judging -> (Reformulating -> Retrieving | Terminal)
//! ```
//!
//! Every step produces a [`StepOutcome`]; [`transition`] folds it into the next [`TurnState`].
//! Answering increments `attempts` before the Judging gate (`attempts < max_retries`) is checked,
//! so a turn makes at most `max_retries` answer calls. Only retrieval-route turns are judged; a
//! direct answer has no retrieval to improve and ends the turn.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prompts;
use ragloop_domain::{EvidencePassage, Route, Sufficiency};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
	Routing,
	Retrieving,
	Answering,
	Judging,
	Reformulating,
	Terminal,
}
impl Phase {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Routing => "routing",
			Self::Retrieving => "retrieving",
			Self::Answering => "answering",
			Self::Judging => "judging",
			Self::Reformulating => "reformulating",
			Self::Terminal => "terminal",
		}
	}
}

/// The step whose external call produced an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
	Routing,
	Retrieval,
	Answer,
	Judgment,
	Reformulation,
}
impl Step {
	pub fn phase(self) -> Phase {
		match self {
			Self::Routing => Phase::Routing,
			Self::Retrieval => Phase::Retrieving,
			Self::Answer => Phase::Answering,
			Self::Judgment => Phase::Judging,
			Self::Reformulation => Phase::Reformulating,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
	Routed(Route),
	Retrieved(Vec<EvidencePassage>),
	Answered(String),
	Judged(Sufficiency),
	Reformulated(String),
	Failed { step: Step, reason: String },
}
impl StepOutcome {
	pub fn step(&self) -> Step {
		match self {
			Self::Routed(_) => Step::Routing,
			Self::Retrieved(_) => Step::Retrieval,
			Self::Answered(_) => Step::Answer,
			Self::Judged(_) => Step::Judgment,
			Self::Reformulated(_) => Step::Reformulation,
			Self::Failed { step, .. } => *step,
		}
	}
}

/// A recovered failure in an advisory step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
	RoutingDegraded { reason: String },
	JudgmentDegraded { reason: String },
	ReformulationDegraded { reason: String },
}
impl Degradation {
	pub fn note(&self) -> String {
		match self {
			Self::RoutingDegraded { reason } =>
				format!("Routing failed ({reason}); answered from general knowledge."),
			Self::JudgmentDegraded { reason } =>
				format!("Answer review failed ({reason}); kept the current answer."),
			Self::ReformulationDegraded { reason } =>
				format!("Query rewrite failed ({reason}); retried with the previous query."),
		}
	}
}

/// A failure in a load-bearing step. The turn ends with a failure answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnFailure {
	RetrievalFailed { reason: String },
	GenerationFailed { reason: String },
}
impl TurnFailure {
	pub fn note(&self) -> String {
		match self {
			Self::RetrievalFailed { reason } => format!("Retrieval failed: {reason}."),
			Self::GenerationFailed { reason } => format!("Answer generation failed: {reason}."),
		}
	}
}

/// What the machine does when a step's external call fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recovery {
	/// Answer without retrieval.
	RouteDirect,
	/// End the turn with a failure answer.
	FailTurn,
	/// End the turn keeping the current answer.
	Stop,
	/// Retry retrieval with the unmodified query.
	KeepQuestion,
}

/// The single table of failure defaults.
///
/// Advisory steps recover toward the cheaper or terminal path; load-bearing steps fail the
/// turn. No entry leads to an extra answer call, so failures never extend the retry loop.
pub fn failure_policy(step: Step) -> Recovery {
	match step {
		Step::Routing => Recovery::RouteDirect,
		Step::Retrieval => Recovery::FailTurn,
		Step::Answer => Recovery::FailTurn,
		Step::Judgment => Recovery::Stop,
		Step::Reformulation => Recovery::KeepQuestion,
	}
}

#[derive(Clone, Debug)]
pub struct TurnState {
	pub turn_id: Uuid,
	pub original_question: String,
	/// Current search query; rewritten by reformulation.
	pub question: String,
	pub route: Route,
	pub evidence: Vec<EvidencePassage>,
	pub answer: String,
	pub attempts: u32,
	pub max_retries: u32,
	pub retry_requested: bool,
	pub phase: Phase,
	pub degradations: Vec<Degradation>,
	pub failure: Option<TurnFailure>,
}
impl TurnState {
	pub fn new(question: impl Into<String>, max_retries: u32) -> Self {
		let question = question.into();

		Self {
			turn_id: Uuid::new_v4(),
			original_question: question.clone(),
			question,
			route: Route::Unset,
			evidence: Vec::new(),
			answer: String::new(),
			attempts: 0,
			max_retries,
			retry_requested: false,
			phase: Phase::Routing,
			degradations: Vec::new(),
			failure: None,
		}
	}

	pub fn is_terminal(&self) -> bool {
		self.phase == Phase::Terminal
	}

	/// Finishes the turn.
	///
	/// A successful retrieval-route turn that ended without evidence gets the insufficiency
	/// notice appended to its answer.
	pub fn into_outcome(self) -> TurnOutcome {
		let answer = if self.failure.is_none()
			&& self.route == Route::Retrieve
			&& self.evidence.is_empty()
		{
			prompts::with_insufficiency_notice(&self.answer)
		} else {
			self.answer
		};
		let degraded = self.failure.is_some() || !self.degradations.is_empty();

		TurnOutcome {
			turn_id: self.turn_id,
			question: self.original_question,
			final_query: self.question,
			route: self.route,
			answer,
			evidence: self.evidence,
			attempts: self.attempts,
			degraded,
			degradations: self.degradations,
			failure: self.failure,
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnOutcome {
	pub turn_id: Uuid,
	pub question: String,
	/// Search query used by the last retrieval.
	pub final_query: String,
	pub route: Route,
	pub answer: String,
	pub evidence: Vec<EvidencePassage>,
	pub attempts: u32,
	pub degraded: bool,
	pub degradations: Vec<Degradation>,
	pub failure: Option<TurnFailure>,
}
impl TurnOutcome {
	/// Human-readable notes for every degradation and failure, in occurrence order.
	pub fn notes(&self) -> Vec<String> {
		let mut notes: Vec<String> = self.degradations.iter().map(Degradation::note).collect();

		if let Some(failure) = &self.failure {
			notes.push(failure.note());
		}

		notes
	}
}

pub fn transition(mut state: TurnState, outcome: StepOutcome) -> TurnState {
	debug_assert_eq!(state.phase, outcome.step().phase(), "Outcome does not belong to phase.");

	match outcome {
		StepOutcome::Routed(route) => {
			state.route = route;
			state.phase = match route {
				Route::Retrieve => Phase::Retrieving,
				Route::Direct | Route::Unset => Phase::Answering,
			};
		},
		StepOutcome::Retrieved(passages) => {
			state.evidence = passages;
			state.retry_requested = false;
			state.phase = Phase::Answering;
		},
		StepOutcome::Answered(answer) => {
			state.answer = answer;
			state.attempts += 1;
			state.phase = if state.route == Route::Retrieve && state.attempts < state.max_retries {
				Phase::Judging
			} else {
				Phase::Terminal
			};
		},
		StepOutcome::Judged(verdict) => {
			state.phase = match verdict {
				Sufficiency::Insufficient => Phase::Reformulating,
				Sufficiency::Sufficient => Phase::Terminal,
			};
		},
		StepOutcome::Reformulated(question) => {
			state.question = question;
			state.retry_requested = true;
			state.phase = Phase::Retrieving;
		},
		StepOutcome::Failed { step, reason } => return recover(state, step, reason),
	}

	state
}

fn recover(mut state: TurnState, step: Step, reason: String) -> TurnState {
	match failure_policy(step) {
		Recovery::RouteDirect => {
			state.route = Route::Direct;
			state.degradations.push(Degradation::RoutingDegraded { reason });
			state.phase = Phase::Answering;
		},
		Recovery::FailTurn => {
			let (failure, answer) = match step {
				Step::Retrieval => (
					TurnFailure::RetrievalFailed { reason },
					prompts::RETRIEVAL_FAILED_ANSWER,
				),
				_ => (TurnFailure::GenerationFailed { reason }, prompts::GENERATION_FAILED_ANSWER),
			};

			if step == Step::Retrieval {
				state.evidence.clear();
			}

			state.answer = answer.to_string();
			state.failure = Some(failure);
			state.phase = Phase::Terminal;
		},
		Recovery::Stop => {
			state.degradations.push(Degradation::JudgmentDegraded { reason });
			state.phase = Phase::Terminal;
		},
		Recovery::KeepQuestion => {
			state.degradations.push(Degradation::ReformulationDegraded { reason });
			state.retry_requested = true;
			state.phase = Phase::Retrieving;
		},
	}

	state
}

#[cfg(test)]
mod tests {
	use super::*;

	fn passage() -> EvidencePassage {
		EvidencePassage::new("Max load 40 kg.", "lift.pdf", 2_u32, 0)
	}

	fn answered(max_retries: u32, route: Route) -> TurnState {
		let state = TurnState::new("Max load?", max_retries);
		let state = transition(state, StepOutcome::Routed(route));
		let state = if route == Route::Retrieve {
			transition(state, StepOutcome::Retrieved(vec![passage()]))
		} else {
			state
		};

		transition(state, StepOutcome::Answered("40 kg [lift.pdf - page 2]".to_string()))
	}

	#[test]
	fn routing_selects_first_phase() {
		let retrieve = transition(TurnState::new("q", 2), StepOutcome::Routed(Route::Retrieve));
		let direct = transition(TurnState::new("q", 2), StepOutcome::Routed(Route::Direct));

		assert_eq!(retrieve.phase, Phase::Retrieving);
		assert_eq!(direct.phase, Phase::Answering);
	}

	#[test]
	fn answer_at_cap_skips_judging() {
		let state = answered(1, Route::Retrieve);

		assert_eq!(state.attempts, 1);
		assert_eq!(state.phase, Phase::Terminal);
	}

	#[test]
	fn answer_below_cap_is_judged() {
		assert_eq!(answered(2, Route::Retrieve).phase, Phase::Judging);
	}

	#[test]
	fn insufficient_retrieval_answer_is_reformulated() {
		let state = transition(
			answered(3, Route::Retrieve),
			StepOutcome::Judged(Sufficiency::Insufficient),
		);

		assert_eq!(state.phase, Phase::Reformulating);

		let state = transition(state, StepOutcome::Reformulated("lift max load kg".to_string()));

		assert_eq!(state.phase, Phase::Retrieving);
		assert_eq!(state.question, "lift max load kg");
		assert_eq!(state.original_question, "Max load?");
		assert!(state.retry_requested);

		let state = transition(state, StepOutcome::Retrieved(Vec::new()));

		assert!(!state.retry_requested);
		assert!(state.evidence.is_empty());
	}

	#[test]
	fn direct_answer_skips_judging() {
		let state = answered(3, Route::Direct);

		assert_eq!(state.attempts, 1);
		assert_eq!(state.phase, Phase::Terminal);
	}

	#[test]
	fn policy_table_never_adds_answer_calls() {
		assert_eq!(failure_policy(Step::Routing), Recovery::RouteDirect);
		assert_eq!(failure_policy(Step::Retrieval), Recovery::FailTurn);
		assert_eq!(failure_policy(Step::Answer), Recovery::FailTurn);
		assert_eq!(failure_policy(Step::Judgment), Recovery::Stop);
		assert_eq!(failure_policy(Step::Reformulation), Recovery::KeepQuestion);
	}

	#[test]
	fn routing_failure_defaults_to_direct() {
		let state = transition(
			TurnState::new("q", 2),
			StepOutcome::Failed { step: Step::Routing, reason: "timeout".to_string() },
		);

		assert_eq!(state.route, Route::Direct);
		assert_eq!(state.phase, Phase::Answering);
		assert_eq!(
			state.degradations,
			vec![Degradation::RoutingDegraded { reason: "timeout".to_string() }]
		);
	}

	#[test]
	fn answer_failure_keeps_attempts() {
		let state = transition(TurnState::new("q", 2), StepOutcome::Routed(Route::Direct));
		let state = transition(
			state,
			StepOutcome::Failed { step: Step::Answer, reason: "503".to_string() },
		);
		let outcome = state.into_outcome();

		assert_eq!(outcome.attempts, 0);
		assert_eq!(outcome.answer, prompts::GENERATION_FAILED_ANSWER);
		assert!(outcome.degraded);
		assert!(matches!(outcome.failure, Some(TurnFailure::GenerationFailed { .. })));
	}

	#[test]
	fn retrieval_failure_drops_stale_evidence() {
		let state = transition(
			answered(3, Route::Retrieve),
			StepOutcome::Judged(Sufficiency::Insufficient),
		);
		let state = transition(state, StepOutcome::Reformulated("again".to_string()));
		let state = transition(
			state,
			StepOutcome::Failed { step: Step::Retrieval, reason: "qdrant down".to_string() },
		);
		let outcome = state.into_outcome();

		assert_eq!(outcome.attempts, 1);
		assert!(outcome.evidence.is_empty());
		assert_eq!(outcome.answer, prompts::RETRIEVAL_FAILED_ANSWER);
	}

	#[test]
	fn empty_retrieval_appends_notice_only_on_retrieve_route() {
		let state = transition(TurnState::new("q", 1), StepOutcome::Routed(Route::Retrieve));
		let state = transition(state, StepOutcome::Retrieved(Vec::new()));
		let state = transition(state, StepOutcome::Answered("Best guess.".to_string()));
		let retrieve = state.into_outcome();

		assert!(retrieve.answer.ends_with(prompts::INSUFFICIENT_CONTEXT_NOTICE));

		let direct = answered(1, Route::Direct).into_outcome();

		assert!(!direct.answer.contains(prompts::INSUFFICIENT_CONTEXT_NOTICE));
	}
}
