use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::{Value, json};

const SYSTEM_PROMPT: &str = "You choose which single search constraint to loosen when a vehicle \
search returned nothing. Reply with exactly one name from the candidate list, or \"none\".";

/// Asks a chat-completion model which candidate field to relax.
///
/// Returns `None` when the model declines. The answer is not validated against `candidates`.
pub async fn select_field(
	cfg: &carlot_config::LlmProviderConfig,
	criteria: &Value,
	free_text: Option<&str>,
	candidates: &[String],
) -> Result<Option<String>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let question = json!({
		"criteria": criteria,
		"free_text": free_text,
		"candidates": candidates,
	});
	let body = json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [
			{ "role": "system", "content": SYSTEM_PROMPT },
			{ "role": "user", "content": question.to_string() },
		],
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_selector_answer(&json)
}

fn parse_selector_answer(json: &Value) -> Result<Option<String>> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| eyre::eyre!("Selector response is missing message content."))?;
	let answer = content
		.trim()
		.trim_matches(|ch: char| ch == '"' || ch == '\'' || ch == '`' || ch == '.')
		.trim()
		.to_ascii_lowercase();

	if answer.is_empty() || answer == "none" {
		return Ok(None);
	}

	Ok(Some(answer))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn response(content: &str) -> Value {
		json!({ "choices": [{ "message": { "content": content } }] })
	}

	#[test]
	fn answer_is_trimmed_and_lowercased() {
		let parsed = parse_selector_answer(&response(" \"Brand\". ")).expect("parse failed");

		assert_eq!(parsed.as_deref(), Some("brand"));
	}

	#[test]
	fn none_means_no_suggestion() {
		assert_eq!(parse_selector_answer(&response("none")).expect("parse failed"), None);
		assert_eq!(parse_selector_answer(&response("  ")).expect("parse failed"), None);
	}

	#[test]
	fn missing_content_is_an_error() {
		assert!(parse_selector_answer(&json!({ "choices": [] })).is_err());
	}
}
