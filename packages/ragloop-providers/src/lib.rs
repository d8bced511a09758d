pub mod embedding;
pub mod generation;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: format!("Default header {key} must be a string."),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

pub(crate) fn build_client(timeout_ms: u64) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(timeout_ms)).build()?)
}

pub(crate) fn endpoint(api_base: &str, path: &str) -> String {
	format!("{}{}", api_base.trim_end_matches('/'), path)
}
