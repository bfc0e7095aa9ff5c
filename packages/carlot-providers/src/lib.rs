pub mod embedding;
pub mod selector;

use color_eyre::{Result, eyre};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde_json::{Map, Value};

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(eyre::eyre!("Default header '{key}' must be a string."));
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

#[cfg(test)]
mod tests {
	use reqwest::header::AUTHORIZATION;
	use serde_json::{Map, Value, json};

	use crate::auth_headers;

	#[test]
	fn bearer_and_default_headers_are_set() {
		let mut defaults = Map::new();

		defaults.insert("x-team".to_string(), json!("search"));

		let headers = auth_headers("secret", &defaults).expect("Headers must build.");

		assert_eq!(headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()), Some("Bearer secret"));
		assert_eq!(headers.get("x-team").and_then(|v| v.to_str().ok()), Some("search"));
	}

	#[test]
	fn non_string_default_header_is_rejected() {
		let mut defaults = Map::new();

		defaults.insert("x-retries".to_string(), Value::from(3));

		assert!(auth_headers("secret", &defaults).is_err());
	}
}
