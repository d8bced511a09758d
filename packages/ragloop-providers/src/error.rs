pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("Completion response carried no text.")]
	EmptyCompletion,
}
impl Error {
	pub(crate) fn invalid_response(message: impl Into<String>) -> Self {
		Self::InvalidResponse { message: message.into() }
	}

	/// Whether the failure came from reaching the provider rather than from its payload.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Reqwest(_))
	}
}
