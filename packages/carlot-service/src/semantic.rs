use tokio_util::sync::CancellationToken;

use carlot_domain::{SearchCriteria, SemanticHit, TextField, text};

use crate::SemanticSearch;

/// Natural-language rendering of the request used as the similarity query.
pub fn projection(
	criteria: &SearchCriteria,
	free_text: Option<&str>,
	preferences: &[String],
) -> String {
	let mut parts: Vec<&str> = free_text.into_iter().collect();

	parts.extend(criteria.categorical_filters().into_iter().map(|(_, value)| value));
	parts.extend(criteria.features.iter().map(String::as_str));

	text::semantic_projection(&parts, preferences)
}

pub fn filters(criteria: &SearchCriteria) -> Vec<(TextField, String)> {
	criteria
		.categorical_filters()
		.into_iter()
		.map(|(field, value)| (field, value.trim().to_string()))
		.collect()
}

/// Similarity hits for the request. Never fails: a missing or unreachable backend, an empty
/// projection, or cancellation all yield an empty list.
pub async fn search(
	backend: Option<&dyn SemanticSearch>,
	top_k: u32,
	criteria: &SearchCriteria,
	free_text: Option<&str>,
	preferences: &[String],
	cancel: &CancellationToken,
) -> Vec<SemanticHit> {
	let Some(backend) = backend else { return Vec::new() };
	let text = projection(criteria, free_text, preferences);

	if text.is_empty() {
		return Vec::new();
	}

	let filters = filters(criteria);
	let result = tokio::select! {
		biased;
		_ = cancel.cancelled() => return Vec::new(),
		result = backend.search(&text, &filters, top_k) => result,
	};

	match result {
		Ok(hits) => post_filter(hits, &filters),
		Err(err) => {
			tracing::warn!(error = %err, "Semantic backend unavailable. Continuing without it.");

			Vec::new()
		},
	}
}

fn post_filter(hits: Vec<SemanticHit>, filters: &[(TextField, String)]) -> Vec<SemanticHit> {
	hits.into_iter()
		.filter(|hit| {
			filters.iter().all(|(field, value)| {
				hit.payload.text(*field).is_some_and(|actual| actual.trim().eq_ignore_ascii_case(value))
			})
		})
		.map(|mut hit| {
			hit.similarity =
				if hit.similarity.is_nan() { 0.0 } else { hit.similarity.clamp(0.0, 1.0) };

			hit
		})
		.collect()
}
