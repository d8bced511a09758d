//! Parsers that turn free-form model replies into categorical decisions.
//!
//! Matching is case-insensitive and tolerant of surrounding prose, so a reply such as
//! `"Answer: lookup."` still routes to retrieval.

use serde::{Deserialize, Serialize};

/// Marker that selects the retrieval route when present anywhere in the routing reply.
pub const ROUTE_LOOKUP_MARKER: &str = "LOOKUP";
/// Verdict word for "the answer is insufficient, retry with a better query".
pub const JUDGMENT_RETRY_MARKER: &str = "YES";
/// Verdict word for "stop".
pub const JUDGMENT_STOP_MARKER: &str = "NO";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
	#[default]
	Unset,
	Retrieve,
	Direct,
}
impl Route {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Unset => "unset",
			Self::Retrieve => "retrieve",
			Self::Direct => "direct",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sufficiency {
	Sufficient,
	Insufficient,
}

pub fn parse_route(reply: &str) -> Route {
	if reply.to_uppercase().contains(ROUTE_LOOKUP_MARKER) {
		Route::Retrieve
	} else {
		Route::Direct
	}
}

/// Reads a YES/NO sufficiency verdict.
///
/// Only a reply carrying the retry word without the stop word counts as insufficient. Anything
/// ambiguous or unrecognized resolves to [`Sufficiency::Sufficient`] so a confused judge ends
/// the loop.
pub fn parse_judgment(reply: &str) -> Sufficiency {
	let upper = reply.to_uppercase();
	let mut retry = false;
	let mut stop = false;

	for word in upper.split(|ch: char| !ch.is_alphanumeric()) {
		match word {
			JUDGMENT_RETRY_MARKER => retry = true,
			JUDGMENT_STOP_MARKER => stop = true,
			_ => {},
		}
	}

	if retry && !stop { Sufficiency::Insufficient } else { Sufficiency::Sufficient }
}

/// Extracts a rewritten search query, or `None` when the reply carries no usable text.
pub fn parse_rewrite(reply: &str) -> Option<String> {
	let line = reply.lines().map(str::trim).find(|line| !line.is_empty())?;
	let unquoted = line
		.strip_prefix('"')
		.and_then(|rest| rest.strip_suffix('"'))
		.unwrap_or(line)
		.trim();

	if unquoted.is_empty() { None } else { Some(unquoted.to_string()) }
}
