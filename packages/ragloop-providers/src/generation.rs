//! Chat-completions client used for every prompt the orchestrator sends.

use serde_json::Value;

use crate::{Error, Result};
use ragloop_config::LlmProviderConfig;

/// Sends `prompt` as a single user message and returns the trimmed completion text.
pub async fn complete(cfg: &LlmProviderConfig, prompt: &str) -> Result<String> {
	let client = crate::build_client(cfg.timeout_ms)?;
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [{ "role": "user", "content": prompt }],
	});
	let res = client
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion(&json)
}

fn parse_completion(json: &Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.ok_or_else(|| Error::invalid_response("Completion response is missing message content."))?;

	match content.as_str().map(str::trim) {
		Some(text) if !text.is_empty() => Ok(text.to_string()),
		_ => Err(Error::EmptyCompletion),
	}
}
