mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Normalizer, Orchestrator, Providers, Qdrant,
	Retrieval, Service, Storage,
};

use std::{fs, path::Path};

pub const JUDGE_MODES: [&str; 2] = ["model", "evidence"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	from_toml_str(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn from_toml_str(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw).map_err(|err| Error::ParseConfig {
		path: Default::default(),
		source: Box::new(err),
	})?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::validation("service.http_bind must be non-empty."));
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::validation("service.log_level must be non-empty."));
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::validation("storage.qdrant.collection must be non-empty."));
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::validation(
			"providers.embedding.dimensions must be greater than zero.",
		));
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::validation(
			"providers.embedding.dimensions must match storage.qdrant.vector_dim.",
		));
	}
	if !cfg.providers.llm.temperature.is_finite() {
		return Err(Error::validation("providers.llm.temperature must be a finite number."));
	}
	if !(0.0..=2.0).contains(&cfg.providers.llm.temperature) {
		return Err(Error::validation("providers.llm.temperature must be in the range 0.0-2.0."));
	}

	for (label, key) in
		[("embedding", &cfg.providers.embedding.api_key), ("llm", &cfg.providers.llm.api_key)]
	{
		if key.trim().is_empty() {
			return Err(Error::validation(format!("Provider {label} api_key must be non-empty.")));
		}
	}
	for (label, timeout_ms) in [
		("embedding", cfg.providers.embedding.timeout_ms),
		("llm", cfg.providers.llm.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::validation(format!(
				"Provider {label} timeout_ms must be greater than zero."
			)));
		}
	}

	if cfg.retrieval.top_k == 0 {
		return Err(Error::validation("retrieval.top_k must be greater than zero."));
	}
	if cfg.retrieval.context_limit == 0 {
		return Err(Error::validation("retrieval.context_limit must be greater than zero."));
	}
	if cfg.orchestrator.max_retries == 0 {
		return Err(Error::validation("orchestrator.max_retries must be greater than zero."));
	}
	if !JUDGE_MODES.contains(&cfg.orchestrator.judge.as_str()) {
		return Err(Error::validation("orchestrator.judge must be one of model or evidence."));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.orchestrator.judge = cfg.orchestrator.judge.trim().to_ascii_lowercase();
	cfg.normalizer.noise_phrases = cfg
		.normalizer
		.noise_phrases
		.iter()
		.map(|phrase| phrase.split_whitespace().collect::<Vec<_>>().join(" "))
		.filter(|phrase| !phrase.is_empty())
		.collect();
}
