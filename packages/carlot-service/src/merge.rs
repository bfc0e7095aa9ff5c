use std::{
	cmp::Ordering,
	collections::{BTreeMap, HashSet},
};

use serde::{Deserialize, Serialize};

use carlot_domain::{ExactHit, SemanticHit, Vehicle};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
	Exact,
	Semantic,
	Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
	pub id: u64,
	pub origin: Origin,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub exact_score: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub semantic_score: Option<f32>,
	pub combined_score: f32,
	pub payload: Vehicle,
}

struct Entry {
	exact_score: Option<f32>,
	semantic_score: Option<f32>,
	payload: Vehicle,
}

/// Merges both sources into one list keyed by id, best combined score first.
///
/// Exact scores are multiplied by `exact_boost`; an id found by both sources keeps the larger of
/// the boosted exact score and the similarity. Ties fall back to ascending id.
pub fn merge(
	exact: &[ExactHit],
	semantic: &[SemanticHit],
	exact_boost: f32,
	limit: usize,
) -> Vec<ScoredItem> {
	let mut entries: BTreeMap<u64, Entry> = BTreeMap::new();

	for hit in exact {
		let entry = entries.entry(hit.id).or_insert_with(|| Entry {
			exact_score: None,
			semantic_score: None,
			payload: hit.payload.clone(),
		});

		if entry.exact_score.is_none_or(|score| hit.score > score) {
			entry.exact_score = Some(hit.score);
		}
	}
	for hit in semantic {
		let entry = entries.entry(hit.id).or_insert_with(|| Entry {
			exact_score: None,
			semantic_score: None,
			payload: hit.payload.clone(),
		});

		if entry.semantic_score.is_none_or(|score| hit.similarity > score) {
			entry.semantic_score = Some(hit.similarity);
		}
	}

	let mut items: Vec<ScoredItem> = entries
		.into_iter()
		.filter_map(|(id, entry)| {
			let boosted = entry.exact_score.map(|score| score * exact_boost);
			let (origin, combined_score) = match (boosted, entry.semantic_score) {
				(Some(exact), Some(semantic)) => (Origin::Both, exact.max(semantic)),
				(Some(exact), None) => (Origin::Exact, exact),
				(None, Some(semantic)) => (Origin::Semantic, semantic),
				(None, None) => return None,
			};

			Some(ScoredItem {
				id,
				origin,
				exact_score: entry.exact_score,
				semantic_score: entry.semantic_score,
				combined_score,
				payload: entry.payload,
			})
		})
		.collect();

	items.sort_by(|left, right| {
		cmp_f32_desc(left.combined_score, right.combined_score).then_with(|| left.id.cmp(&right.id))
	});
	items.truncate(limit);

	items
}

/// Exact hits as result items, in backend order.
pub fn exact_items(hits: &[ExactHit], exact_boost: f32) -> Vec<ScoredItem> {
	hits.iter()
		.map(|hit| ScoredItem {
			id: hit.id,
			origin: Origin::Exact,
			exact_score: Some(hit.score),
			semantic_score: None,
			combined_score: hit.score * exact_boost,
			payload: hit.payload.clone(),
		})
		.collect()
}

pub fn ensure_unique_ids(items: &[ScoredItem]) -> Result<()> {
	let mut seen = HashSet::with_capacity(items.len());

	for item in items {
		if !seen.insert(item.id) {
			tracing::error!(id = item.id, items = items.len(), "Result list repeats an identifier.");

			return Err(Error::Internal {
				message: format!("Result list repeats identifier {}.", item.id),
			});
		}
	}

	Ok(())
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
