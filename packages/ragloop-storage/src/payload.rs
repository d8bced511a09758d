//! Decoding of passage payloads stored alongside the dense vectors.
//!
//! The ingestion pipeline writes `content`, `source_id`, `page` or `location`, and
//! `passage_type`. Older corpora use `text` and `source`, which are accepted as fallbacks.

use std::collections::HashMap;

use qdrant_client::qdrant::{ScoredPoint, Value, value::Kind};

use ragloop_domain::{EvidencePassage, Location};

pub const CONTENT_KEYS: [&str; 2] = ["content", "text"];
pub const SOURCE_KEYS: [&str; 2] = ["source_id", "source"];
pub const PAGE_KEY: &str = "page";
pub const LOCATION_KEY: &str = "location";
pub const UNKNOWN_LOCATION: &str = "unknown";

pub fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}

pub fn payload_u32(payload: &HashMap<String, Value>, key: &str) -> Option<u32> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::IntegerValue(value)) => u32::try_from(*value).ok(),
		Some(Kind::DoubleValue(value)) =>
			if value.fract() == 0.0 && *value >= 0.0 {
				u32::try_from(*value as i64).ok()
			} else {
				None
			},
		Some(Kind::StringValue(text)) => text.trim().parse().ok(),
		_ => None,
	}
}

pub fn payload_location(payload: &HashMap<String, Value>) -> Location {
	if let Some(page) = payload_u32(payload, PAGE_KEY) {
		return Location::Page(page);
	}

	[PAGE_KEY, LOCATION_KEY]
		.iter()
		.filter_map(|key| payload_string(payload, key))
		.map(|text| text.trim().to_string())
		.find(|text| !text.is_empty())
		.map(Location::Label)
		.unwrap_or_else(|| Location::Label(UNKNOWN_LOCATION.to_string()))
}

/// Maps a scored point to a passage, or `None` when its payload lacks text or provenance.
pub fn passage_from_point(point: &ScoredPoint, sequence_index: u32) -> Option<EvidencePassage> {
	let payload = &point.payload;
	let content = first_string(payload, &CONTENT_KEYS)?;
	let source_id = first_string(payload, &SOURCE_KEYS)?;

	Some(EvidencePassage { content, source_id, location: payload_location(payload), sequence_index })
}

fn first_string(payload: &HashMap<String, Value>, keys: &[&str]) -> Option<String> {
	keys.iter()
		.filter_map(|key| payload_string(payload, key))
		.find(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn payload(entries: &[(&str, Value)]) -> HashMap<String, Value> {
		entries.iter().map(|(key, value)| (key.to_string(), value.clone())).collect()
	}

	#[test]
	fn reads_integer_and_string_pages() {
		assert_eq!(payload_location(&payload(&[("page", Value::from(4_i64))])), Location::Page(4));
		assert_eq!(payload_location(&payload(&[("page", Value::from("12"))])), Location::Page(12));
		assert_eq!(
			payload_location(&payload(&[("location", Value::from("offset 380"))])),
			Location::Label("offset 380".to_string())
		);
		assert_eq!(payload_location(&payload(&[])), Location::Label("unknown".to_string()));
	}

	#[test]
	fn maps_point_with_fallback_keys() {
		let point = ScoredPoint {
			payload: payload(&[
				("text", Value::from("Max load 40 kg.")),
				("source", Value::from("lift.pdf")),
				("page", Value::from(2_i64)),
				("passage_type", Value::from("table")),
			]),
			score: 0.8,
			..Default::default()
		};
		let passage = passage_from_point(&point, 3).expect("passage expected");

		assert_eq!(passage, EvidencePassage::new("Max load 40 kg.", "lift.pdf", 2_u32, 3));
	}

	#[test]
	fn skips_points_without_provenance() {
		let point = ScoredPoint {
			payload: payload(&[("content", Value::from("orphan"))]),
			..Default::default()
		};

		assert!(passage_from_point(&point, 0).is_none());
	}
}
