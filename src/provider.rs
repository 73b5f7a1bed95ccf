//! Optional AI-generated backgrounds. The compositor never calls this; the caller fetches first and passes the image in
//! through [`StyleConfig::with_background_image`](crate::style::StyleConfig::with_background_image).

use image::RgbaImage;
use thiserror::Error;

use crate::{
	quotes::Quote,
	secrets::{SecretError, SecretStore},
};

#[derive(Debug, Error)]
pub enum ProviderError {
	#[error("no API key stored under `{0}`")]
	MissingCredential(String),
	#[error(transparent)]
	Secret(#[from] SecretError),
	#[error("image API request failed: {0}")]
	Http(String),
	#[error("could not decode generated image: {0}")]
	Decode(String),
}

/// Source of a background raster for a quote. One attempt per call, no retries.
pub trait BackgroundProvider {
	fn fetch(&self, quote: &Quote) -> Result<RgbaImage, ProviderError>;
}

/// Text sent to the image model for `quote`. Asks for imagery only, since the quote is drawn on top.
pub fn prompt_for(quote: &Quote) -> String {
	let mut prompt = format!("An atmospheric, softly lit background image evoking the mood of the quote \"{}\"", quote.text.trim());
	if let Some(author) = quote.attribution() {
		prompt.push_str(&format!(" by {author}"));
	}
	if !quote.categories.is_empty() {
		prompt.push_str(&format!(", with themes of {}", quote.categories.join(", ")));
	}
	prompt.push_str(". No text, letters or words in the image.");
	prompt
}

#[cfg(feature = "image-api")]
pub use http::ImageApiProvider;

#[cfg(feature = "image-api")]
mod http {
	use base64::Engine as _;
	use serde::{Deserialize, Serialize};

	use super::*;
	use crate::config::ImageApiConfig;

	#[derive(Debug, Serialize)]
	struct GenerationRequest<'a> {
		model: &'a str,
		prompt: String,
		n: u8,
		size: &'a str,
		response_format: &'a str,
	}

	#[derive(Debug, Deserialize)]
	struct GenerationResponse {
		data: Vec<GeneratedImage>,
	}

	#[derive(Debug, Deserialize)]
	struct GeneratedImage {
		b64_json: Option<String>,
	}

	/// OpenAI-compatible `images/generations` client.
	pub struct ImageApiProvider {
		client: reqwest::blocking::Client,
		config: ImageApiConfig,
		api_key: String,
	}

	impl std::fmt::Debug for ImageApiProvider {
		fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
			f.debug_struct("ImageApiProvider").field("config", &self.config).field("api_key", &"<redacted>").finish_non_exhaustive()
		}
	}

	impl ImageApiProvider {
		/// Fails with [`ProviderError::MissingCredential`] before any network I/O if no key is stored.
		pub fn from_store(config: ImageApiConfig, store: &dyn SecretStore) -> Result<Self, ProviderError> {
			let api_key = store
				.retrieve(&config.secret_name)?
				.filter(|k| !k.trim().is_empty())
				.ok_or_else(|| ProviderError::MissingCredential(config.secret_name.clone()))?;
			let client = reqwest::blocking::Client::builder()
				.timeout(std::time::Duration::from_secs(config.timeout_secs))
				.build()
				.map_err(|e| ProviderError::Http(e.to_string()))?;
			Ok(Self { client, config, api_key })
		}
	}

	impl BackgroundProvider for ImageApiProvider {
		fn fetch(&self, quote: &Quote) -> Result<RgbaImage, ProviderError> {
			let request = GenerationRequest {
				model: &self.config.model,
				prompt: prompt_for(quote),
				n: 1,
				size: &self.config.size,
				response_format: "b64_json",
			};
			tracing::info!(quote = %quote.id, endpoint = %self.config.endpoint, "requesting generated background");

			let response = self
				.client
				.post(&self.config.endpoint)
				.bearer_auth(&self.api_key)
				.json(&request)
				.send()
				.map_err(|e| ProviderError::Http(e.to_string()))?;
			let status = response.status();
			if !status.is_success() {
				let body = response.text().unwrap_or_default();
				return Err(ProviderError::Http(format!("{status}: {}", body.trim())));
			}
			let response: GenerationResponse = response.json().map_err(|e| ProviderError::Decode(e.to_string()))?;
			decode_first(response)
		}
	}

	fn decode_first(response: GenerationResponse) -> Result<RgbaImage, ProviderError> {
		let encoded = response
			.data
			.into_iter()
			.find_map(|image| image.b64_json)
			.ok_or_else(|| ProviderError::Decode("response contained no image data".to_owned()))?;
		let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim()).map_err(|e| ProviderError::Decode(e.to_string()))?;
		let image = image::load_from_memory(&bytes).map_err(|e| ProviderError::Decode(e.to_string()))?;
		Ok(image.to_rgba8())
	}

}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prompt_names_quote_and_forbids_text() {
		let quote = Quote::new("q", " Stay hungry. ", Some("Steve Jobs"), &["motivation", "work"]);
		let prompt = prompt_for(&quote);
		assert!(prompt.contains("\"Stay hungry.\" by Steve Jobs"));
		assert!(prompt.contains("themes of motivation, work"));
		assert!(prompt.ends_with("No text, letters or words in the image."));
	}
}
