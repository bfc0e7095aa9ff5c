use std::{cmp::Ordering, fs, path::Path, time::Instant};

use carlot_domain::{
	ExactHit, ExactPage, ExactQuery, FieldFilter, SemanticHit, SortDirection, SortKey, TextField,
	Vehicle, text,
};

use crate::{Error, Result};

const FIELD_WEIGHTS: [(TextField, f32); 9] = [
	(TextField::Brand, 3.0),
	(TextField::Model, 3.0),
	(TextField::Description, 2.0),
	(TextField::BodyType, 1.0),
	(TextField::FuelType, 1.0),
	(TextField::Gearbox, 1.0),
	(TextField::Color, 1.0),
	(TextField::InteriorColor, 1.0),
	(TextField::City, 1.0),
];

/// Inventory held in memory, evaluating the same plans as the Elasticsearch index.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
	vehicles: Vec<Vehicle>,
}
impl MemoryIndex {
	pub fn new(vehicles: Vec<Vehicle>) -> Self {
		Self { vehicles }
	}

	/// Loads a JSON array of vehicles.
	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadInventory { path: path.to_path_buf(), source: err })?;
		let vehicles: Vec<Vehicle> = serde_json::from_str(&raw)
			.map_err(|err| Error::ParseInventory { path: path.to_path_buf(), source: err })?;

		tracing::info!(path = %path.display(), vehicles = vehicles.len(), "Inventory loaded.");

		Ok(Self::new(vehicles))
	}

	pub fn search(&self, query: &ExactQuery) -> ExactPage {
		let started = Instant::now();
		let mut matched: Vec<ExactHit> = Vec::new();

		for vehicle in &self.vehicles {
			if !query.filters.iter().all(|filter| matches_filter(vehicle, filter)) {
				continue;
			}

			let text_score =
				query.text.as_deref().map(|text| text_relevance(vehicle, text)).unwrap_or(0.0);

			if query.require_text && text_score <= 0.0 {
				continue;
			}

			let boost_score: f32 = query
				.boosts
				.iter()
				.filter(|boost| {
					vehicle.description.as_deref().is_some_and(|description| {
						description.to_lowercase().contains(&boost.value.to_lowercase())
					})
				})
				.map(|boost| boost.weight)
				.sum();

			matched.push(ExactHit {
				id: vehicle.id,
				score: text_score + boost_score,
				payload: vehicle.clone(),
			});
		}

		matched.sort_by(|left, right| compare_hits(left, right, &query.sort));

		let total = matched.len() as u64;
		let hits =
			matched.into_iter().skip(query.offset as usize).take(query.limit as usize).collect();

		ExactPage { hits, total, took_ms: started.elapsed().as_millis() as u64 }
	}

	/// Token-overlap similarity, post-filtered on categorical values.
	pub fn similar(
		&self,
		text: &str,
		filters: &[(TextField, String)],
		top_k: u32,
	) -> Vec<SemanticHit> {
		let mut hits: Vec<SemanticHit> = self
			.vehicles
			.iter()
			.filter(|vehicle| {
				filters.iter().all(|(field, value)| {
					vehicle
						.text(*field)
						.is_some_and(|actual| actual.trim().eq_ignore_ascii_case(value.trim()))
				})
			})
			.filter_map(|vehicle| {
				let similarity = text::lexical_overlap(text, &vehicle.search_text());

				(similarity > 0.0).then(|| SemanticHit {
					id: vehicle.id,
					similarity,
					payload: vehicle.clone(),
				})
			})
			.collect();

		hits.sort_by(|left, right| {
			right.similarity.total_cmp(&left.similarity).then_with(|| left.id.cmp(&right.id))
		});
		hits.truncate(top_k as usize);

		hits
	}

	pub fn sample(&self, limit: u32) -> Vec<Vehicle> {
		self.vehicles.iter().take(limit as usize).cloned().collect()
	}
}

fn matches_filter(vehicle: &Vehicle, filter: &FieldFilter) -> bool {
	match filter {
		FieldFilter::Match { field, value } => vehicle
			.text(*field)
			.is_some_and(|actual| actual.trim().eq_ignore_ascii_case(value.trim())),
		FieldFilter::AllOf { field: TextField::Features, values } =>
			values.iter().all(|value| vehicle.has_feature(value)),
		FieldFilter::AllOf { field, values } => vehicle.text(*field).is_some_and(|actual| {
			values.iter().all(|value| actual.to_lowercase().contains(&value.to_lowercase()))
		}),
		FieldFilter::Contains { field, value } => vehicle
			.text(*field)
			.is_some_and(|actual| actual.to_uppercase().contains(&value.to_uppercase())),
		FieldFilter::Range { field, min, max } => {
			let Some(actual) = vehicle.numeric(*field) else { return false };

			min.is_none_or(|min| actual >= min) && max.is_none_or(|max| actual <= max)
		},
	}
}

fn text_relevance(vehicle: &Vehicle, text: &str) -> f32 {
	let tokens = text::tokenize(text);

	if tokens.is_empty() {
		return 0.0;
	}

	let mut score = 0.0;

	for (field, weight) in FIELD_WEIGHTS {
		let Some(value) = vehicle.text(field) else { continue };
		let field_tokens = text::tokenize(value);

		score += weight * tokens.iter().filter(|token| field_tokens.contains(token)).count() as f32;
	}

	let feature_tokens: Vec<String> =
		vehicle.features.iter().flat_map(|feature| text::tokenize(feature)).collect();

	score + tokens.iter().filter(|token| feature_tokens.contains(token)).count() as f32
}

fn compare_hits(left: &ExactHit, right: &ExactHit, sort: &[SortKey]) -> Ordering {
	for key in sort {
		let ordering = match key {
			SortKey::Field { field, direction } => {
				let left_value = left.payload.numeric(*field);
				let right_value = right.payload.numeric(*field);

				match (left_value, right_value) {
					(Some(a), Some(b)) => match direction {
						SortDirection::Asc => a.total_cmp(&b),
						SortDirection::Desc => b.total_cmp(&a),
					},
					(Some(_), None) => Ordering::Less,
					(None, Some(_)) => Ordering::Greater,
					(None, None) => Ordering::Equal,
				}
			},
			SortKey::Relevance => right.score.total_cmp(&left.score),
		};

		if ordering != Ordering::Equal {
			return ordering;
		}
	}

	left.id.cmp(&right.id)
}
