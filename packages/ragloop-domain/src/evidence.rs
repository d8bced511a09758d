use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Where a passage sits inside its source document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
	Page(u32),
	Label(String),
}
impl Display for Location {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Page(page) => write!(f, "{page}"),
			Self::Label(label) => f.write_str(label),
		}
	}
}
impl From<u32> for Location {
	fn from(page: u32) -> Self {
		Self::Page(page)
	}
}
impl From<&str> for Location {
	fn from(label: &str) -> Self {
		Self::Label(label.to_string())
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidencePassage {
	pub content: String,
	pub source_id: String,
	pub location: Location,
	/// Position inside the retrieval result that produced this passage.
	pub sequence_index: u32,
}
impl EvidencePassage {
	pub fn new(
		content: impl Into<String>,
		source_id: impl Into<String>,
		location: impl Into<Location>,
		sequence_index: u32,
	) -> Self {
		Self {
			content: content.into(),
			source_id: source_id.into(),
			location: location.into(),
			sequence_index,
		}
	}

	/// Citation label in the `[source_id - page location]` notation the answer prompt asks for.
	pub fn citation(&self) -> String {
		format!("[{} - page {}]", self.source_id, self.location)
	}
}

/// Renders the first `limit` passages, in the given order, as labeled context blocks.
pub fn format_context(passages: &[EvidencePassage], limit: usize) -> String {
	passages
		.iter()
		.take(limit)
		.map(|passage| format!("{}\n{}", passage.citation(), passage.content))
		.collect::<Vec<_>>()
		.join(CONTEXT_SEPARATOR)
}

/// Renders a comma-separated provenance list for the first `limit` passages.
pub fn format_sources(passages: &[EvidencePassage], limit: usize) -> String {
	passages
		.iter()
		.take(limit)
		.map(|passage| format!("{} - page {}", passage.source_id, passage.location))
		.collect::<Vec<_>>()
		.join(", ")
}
