pub const DENSE_VECTOR_NAME: &str = "dense";

use qdrant_client::qdrant::{Query, QueryPointsBuilder, ScoredPoint};

use crate::{Error, Result, payload};
use ragloop_domain::EvidencePassage;

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &ragloop_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Nearest-neighbour query on the dense vector, best match first.
	pub async fn search_dense(&self, vector: Vec<f32>, limit: u32) -> Result<Vec<ScoredPoint>> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Query vector has {} dimensions; collection {} expects {}.",
				vector.len(),
				self.collection,
				self.vector_dim
			)));
		}

		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.using(DENSE_VECTOR_NAME)
			.with_payload(true)
			.limit(u64::from(limit));
		let response = self.client.query(search).await?;

		Ok(response.result)
	}

	/// Runs [`Self::search_dense`] and decodes the hits into passages in rank order.
	///
	/// Hits whose payload cannot be decoded are dropped; `sequence_index` counts only the
	/// passages that are kept.
	pub async fn search_passages(
		&self,
		vector: Vec<f32>,
		limit: u32,
	) -> Result<Vec<EvidencePassage>> {
		let points = self.search_dense(vector, limit).await?;

		Ok(decode_passages(&points))
	}
}

pub fn decode_passages(points: &[ScoredPoint]) -> Vec<EvidencePassage> {
	let mut passages = Vec::with_capacity(points.len());

	for point in points {
		if let Some(passage) = payload::passage_from_point(point, passages.len() as u32) {
			passages.push(passage);
		}
	}

	passages
}
