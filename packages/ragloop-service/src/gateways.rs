use ragloop_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use ragloop_domain::EvidencePassage;
use ragloop_providers::{embedding, generation};
use ragloop_storage::qdrant::QdrantStore;

use crate::{BoxFuture, GatewayError, GenerationGateway, Result, RetrievalGateway};

/// Dense retrieval: embeds the query, then asks Qdrant for its nearest passages.
pub struct QdrantRetrieval {
	pub embedding: EmbeddingProviderConfig,
	pub store: QdrantStore,
}
impl QdrantRetrieval {
	pub fn new(embedding: EmbeddingProviderConfig, store: QdrantStore) -> Self {
		Self { embedding, store }
	}

	pub fn from_config(cfg: &Config) -> Result<Self> {
		let store = QdrantStore::new(&cfg.storage.qdrant)?;

		Ok(Self::new(cfg.providers.embedding.clone(), store))
	}

	async fn search(&self, query: &str, k: u32) -> Result<Vec<EvidencePassage>, GatewayError> {
		let provider = &self.embedding.provider_id;
		let vectors = embedding::embed(&self.embedding, &[query.to_string()])
			.await
			.map_err(|err| GatewayError::retrieval(format!("{provider}: {err}")))?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(GatewayError::RetrievalUnavailable {
				message: format!("{provider}: embedding provider returned no vectors."),
			});
		};
		let passages =
			self.store.search_passages(vector, k).await.map_err(GatewayError::retrieval)?;

		tracing::debug!(%provider, k, hits = passages.len(), "Dense retrieval finished.");

		Ok(passages)
	}
}
impl RetrievalGateway for QdrantRetrieval {
	fn retrieve<'a>(
		&'a self,
		query: &'a str,
		k: u32,
	) -> BoxFuture<'a, Result<Vec<EvidencePassage>, GatewayError>> {
		Box::pin(self.search(query, k))
	}
}

/// Chat-completions backed generation.
pub struct ChatGeneration {
	pub llm: LlmProviderConfig,
}
impl ChatGeneration {
	pub fn new(llm: LlmProviderConfig) -> Self {
		Self { llm }
	}
}
impl GenerationGateway for ChatGeneration {
	fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GatewayError>> {
		Box::pin(async move {
			let text = generation::complete(&self.llm, prompt)
				.await
				.map_err(|err| GatewayError::generation(&self.llm.provider_id, err))?;

			tracing::debug!(
				provider = %self.llm.provider_id,
				model = %self.llm.model,
				prompt_chars = prompt.len(),
				reply_chars = text.len(),
				"Chat completion finished."
			);

			Ok(text)
		})
	}
}
