pub mod gateways;

mod error;

pub use error::{Error, Result};
pub use gateways::{PromptKind, ScriptedGeneration, StaticRetrieval};

use std::{collections::HashMap, env, thread, time::Duration};

use qdrant_client::{
	Payload, Qdrant,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, UpsertPointsBuilder, Vector,
		VectorParamsBuilder, VectorsConfigBuilder,
	},
};
use serde_json::{Map, Value};
use tokio::{runtime::Builder, time};
use uuid::Uuid;

use ragloop_config::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Normalizer, Orchestrator, Providers,
	Retrieval, Service, Storage,
};
use ragloop_domain::EvidencePassage;
use ragloop_storage::qdrant::DENSE_VECTOR_NAME;

/// One point to seed into a test collection.
pub struct SeedPoint {
	pub vector: Vec<f32>,
	pub content: String,
	pub source_id: String,
	pub page: Option<u32>,
}

/// A uniquely named Qdrant collection that is deleted when the test ends.
pub struct TestCollection {
	client: Qdrant,
	name: String,
	vector_dim: u32,
	qdrant_url: String,
	cleaned: bool,
}
impl TestCollection {
	pub async fn new(qdrant_url: &str, prefix: &str, vector_dim: u32) -> Result<Self> {
		let client = Qdrant::from_url(qdrant_url)
			.build()
			.map_err(|err| Error::Message(format!("Failed to build Qdrant client: {err}.")))?;
		let name = format!("{prefix}_{}", Uuid::new_v4().simple());
		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DENSE_VECTOR_NAME,
			VectorParamsBuilder::new(u64::from(vector_dim), Distance::Cosine),
		);
		client
			.create_collection(CreateCollectionBuilder::new(name.clone()).vectors_config(vectors_config))
			.await?;

		Ok(Self { client, name, vector_dim, qdrant_url: qdrant_url.to_string(), cleaned: false })
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Storage settings pointing at this collection.
	pub fn qdrant_config(&self) -> ragloop_config::Qdrant {
		ragloop_config::Qdrant {
			url: self.qdrant_url.clone(),
			collection: self.name.clone(),
			vector_dim: self.vector_dim,
		}
	}

	pub async fn seed(&self, points: Vec<SeedPoint>) -> Result<()> {
		let mut structs = Vec::with_capacity(points.len());

		for point in points {
			if point.vector.len() != self.vector_dim as usize {
				return Err(Error::Message(format!(
					"Seed vector has {} dimensions; expected {}.",
					point.vector.len(),
					self.vector_dim
				)));
			}

			let mut payload = Payload::new();

			payload.insert("content", point.content);
			payload.insert("source_id", point.source_id);

			if let Some(page) = point.page {
				payload.insert("page", Value::from(page));
			}

			let mut vectors = HashMap::new();

			vectors.insert(DENSE_VECTOR_NAME.to_string(), Vector::from(point.vector));
			structs.push(PointStruct::new(Uuid::new_v4().to_string(), vectors, payload));
		}

		self.client
			.upsert_points(UpsertPointsBuilder::new(self.name.clone(), structs).wait(true))
			.await?;

		Ok(())
	}

	pub async fn cleanup(mut self) -> Result<()> {
		let result = delete_collection(&self.client, &self.name).await;

		self.cleaned = true;

		result
	}
}
impl Drop for TestCollection {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}

		let url = self.qdrant_url.clone();
		let name = self.name.clone();
		let cleanup_thread = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Test Qdrant cleanup failed: {err}.");

					return;
				},
			};
			let client = match Qdrant::from_url(&url).build() {
				Ok(client) => client,
				Err(err) => {
					eprintln!("Test Qdrant cleanup failed: {err}.");

					return;
				},
			};

			if let Err(err) = runtime.block_on(delete_collection(&client, &name)) {
				eprintln!("Test Qdrant cleanup failed: {err}.");
			}
		});
		let _ = cleanup_thread.join();
	}
}

pub fn env_qdrant_url() -> Option<String> {
	env::var("RAGLOOP_QDRANT_URL").ok()
}

/// A valid configuration whose provider endpoints point nowhere.
pub fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			qdrant: ragloop_config::Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				collection: "ragloop_test".to_string(),
				vector_dim: 4,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "test-embedding".to_string(),
				dimensions: 4,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			llm: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/chat/completions".to_string(),
				model: "test-chat".to_string(),
				temperature: 0.0,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		retrieval: Retrieval { top_k: 10, context_limit: 5 },
		orchestrator: Orchestrator { max_retries: 2, judge: "model".to_string() },
		normalizer: Normalizer::default(),
	}
}

/// Three passages from two manuals, best match first.
pub fn sample_passages() -> Vec<EvidencePassage> {
	vec![
		EvidencePassage::new(
			"Error 5.E12 indicates a blocked drain pump.",
			"washer_manual.pdf",
			12_u32,
			0,
		),
		EvidencePassage::new(
			"Clean the pump filter behind the front flap.",
			"washer_manual.pdf",
			13_u32,
			1,
		),
		EvidencePassage::new("Maximum load is 8 kg.", "washer_datasheet.pdf", "spec table", 2),
	]
}

async fn delete_collection(client: &Qdrant, name: &str) -> Result<()> {
	let max_attempts = 6;
	let mut backoff = Duration::from_millis(100);

	for attempt in 1..=max_attempts {
		let result =
			time::timeout(Duration::from_secs(10), client.delete_collection(name.to_string())).await;

		match result {
			Ok(Ok(_)) => return Ok(()),
			Ok(Err(err)) =>
				if attempt == max_attempts {
					return Err(Error::Message(format!(
						"Failed to delete Qdrant collection {name:?} after {attempt} attempts: {err}."
					)));
				},
			Err(_) =>
				if attempt == max_attempts {
					return Err(Error::Message(format!(
						"Timed out deleting Qdrant collection {name:?} after {attempt} attempts."
					)));
				},
		}

		time::sleep(backoff).await;

		backoff = backoff.saturating_mul(2).min(Duration::from_secs(2));
	}

	Ok(())
}
