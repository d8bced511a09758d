pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invalid config: {message}")]
	InvalidConfig { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl From<ragloop_storage::Error> for Error {
	fn from(err: ragloop_storage::Error) -> Self {
		match err {
			ragloop_storage::Error::InvalidArgument(message) => Self::InvalidConfig { message },
			ragloop_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}

/// Failure reported by a retrieval or generation gateway.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
	#[error("Generation unavailable: {message}")]
	GenerationUnavailable { message: String },
	#[error("Generation returned no usable text.")]
	GenerationEmpty,
	#[error("Retrieval unavailable: {message}")]
	RetrievalUnavailable { message: String },
}
impl GatewayError {
	/// Classifies a chat-provider failure; the message names the provider.
	pub fn generation(provider_id: &str, err: ragloop_providers::Error) -> Self {
		match err {
			ragloop_providers::Error::EmptyCompletion => Self::GenerationEmpty,
			other => Self::GenerationUnavailable { message: format!("{provider_id}: {other}") },
		}
	}

	pub fn retrieval(err: impl std::fmt::Display) -> Self {
		Self::RetrievalUnavailable { message: err.to_string() }
	}
}
