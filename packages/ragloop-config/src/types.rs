use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub retrieval: Retrieval,
	pub orchestrator: Orchestrator,
	#[serde(default)]
	pub normalizer: Normalizer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Retrieval {
	/// Passages requested from the index per retrieval call.
	pub top_k: u32,
	/// Passages rendered into the answer prompt, taken from the head of the retrieval result.
	#[serde(default = "default_context_limit")]
	pub context_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Orchestrator {
	/// Upper bound on answer-generation calls per question.
	pub max_retries: u32,
	#[serde(default = "default_judge")]
	pub judge: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Normalizer {
	/// Extra phrases stripped from queries before retrieval, matched case-insensitively.
	pub noise_phrases: Vec<String>,
}

fn default_context_limit() -> u32 {
	5
}

fn default_judge() -> String {
	"model".to_string()
}
