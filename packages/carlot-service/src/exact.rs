use std::ops::RangeInclusive;

use tokio_util::sync::CancellationToken;

use carlot_config::Search;
use carlot_domain::{
	BoundSide, CriteriaField, ExactPage, ExactQuery, FieldFilter, InvalidField, NumericField,
	SearchCriteria, SortDirection, SortKey, Superlative, TextBoost, TextField, litres_to_cc,
	text::{self, IdentifierCodeKind},
};

use crate::{Error, ExactSearch, Result};

const NUMERIC_FIELDS: [NumericField; 5] = [
	NumericField::Price,
	NumericField::Year,
	NumericField::Mileage,
	NumericField::Power,
	NumericField::EngineVolume,
];
const BOUND_SIDES: [BoundSide; 2] = [BoundSide::Min, BoundSide::Max];
const VALID_YEARS: RangeInclusive<f64> = 1_900.0..=2_100.0;
const ENGINE_VOLUME_MIN_FACTOR: f64 = 0.9;
const ENGINE_VOLUME_MAX_FACTOR: f64 = 1.1;
const BOOSTED_FIELDS: [CriteriaField; 6] = [
	CriteriaField::Color,
	CriteriaField::InteriorColor,
	CriteriaField::BodyType,
	CriteriaField::FuelType,
	CriteriaField::Transmission,
	CriteriaField::DriveType,
];
const BOOST_WEIGHT: f32 = 1.0;

/// Removes values the backends cannot interpret. Each removal is logged and reported.
pub fn sanitize(criteria: &SearchCriteria) -> (SearchCriteria, Vec<InvalidField>) {
	let mut clean = criteria.clone();
	let mut dropped = Vec::new();

	for field in NUMERIC_FIELDS {
		for side in BOUND_SIDES {
			let Some(value) = clean.bound(field, side) else { continue };
			let reason = if !value.is_finite() {
				Some("Bound must be a finite number.")
			} else if value < 0.0 {
				Some("Bound must not be negative.")
			} else if field == NumericField::Year && !VALID_YEARS.contains(&value) {
				Some("Year must be between 1900 and 2100.")
			} else {
				None
			};

			if let Some(reason) = reason {
				drop_field(&mut clean, &mut dropped, CriteriaField::for_bound(field, side), reason);
			}
		}

		if let (Some(min), Some(max)) =
			(clean.bound(field, BoundSide::Min), clean.bound(field, BoundSide::Max))
			&& min > max
		{
			for side in BOUND_SIDES {
				drop_field(
					&mut clean,
					&mut dropped,
					CriteriaField::for_bound(field, side),
					"Range minimum exceeds its maximum.",
				);
			}
		}
	}

	for field in CriteriaField::ALL {
		let blank = clean.text(field).is_some_and(|value| value.trim().is_empty());

		if blank {
			drop_field(&mut clean, &mut dropped, field, "Value must be non-empty.");
		}
	}

	let invalid_code = clean
		.identifier_code
		.as_deref()
		.is_some_and(|code| text::identifier_code_kind(code) == IdentifierCodeKind::Invalid);

	if invalid_code {
		drop_field(
			&mut clean,
			&mut dropped,
			CriteriaField::IdentifierCode,
			"Identifier code has an invalid format.",
		);
	}

	let features = clean.features.len();

	clean.features.retain(|feature| !feature.trim().is_empty());

	if clean.features.len() != features {
		let reason = "Feature entries must be non-empty.";

		log_invalid(CriteriaField::Features, reason);
		dropped.push(InvalidField::new(CriteriaField::Features.as_str(), reason));
	}

	(clean, dropped)
}

/// Translates criteria into a backend-neutral plan.
///
/// Structured values are strict filters. Free text only contributes relevance, except when no
/// filter is present at all, and is skipped when it merely restates filters.
pub fn plan(criteria: &SearchCriteria, free_text: Option<&str>, cfg: &Search) -> ExactQuery {
	let filters = filters(criteria);
	let brands: Vec<&str> = criteria.brand.as_deref().into_iter().collect();
	let text = free_text
		.map(str::trim)
		.filter(|text| !text.is_empty() && !text::is_pure_filter_text(text, &brands))
		.map(str::to_string);
	let require_text = text.is_some() && filters.is_empty();
	let boosts = BOOSTED_FIELDS
		.into_iter()
		.filter_map(|field| criteria.text(field))
		.map(|value| TextBoost { value: value.to_string(), weight: BOOST_WEIGHT })
		.collect();
	let sort = sort_keys(criteria, text.is_some());
	let (offset, limit) = if criteria.superlative.is_some() {
		(0, 1)
	} else {
		let limit = criteria.limit.filter(|limit| *limit > 0).unwrap_or(cfg.default_limit);

		(criteria.offset.unwrap_or(0), limit.min(cfg.max_limit))
	};

	ExactQuery { filters, text, require_text, boosts, sort, offset, limit }
}

pub async fn search(
	backend: &dyn ExactSearch,
	cfg: &Search,
	criteria: &SearchCriteria,
	free_text: Option<&str>,
	cancel: &CancellationToken,
) -> Result<ExactPage> {
	let (criteria, _) = sanitize(criteria);
	let query = plan(&criteria, free_text, cfg);

	tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(Error::Cancelled),
		result = backend.search(&query) => result.map_err(|err| Error::BackendUnavailable {
			backend: "exact",
			message: format!("{err:#}"),
		}),
	}
}

fn filters(criteria: &SearchCriteria) -> Vec<FieldFilter> {
	let mut filters: Vec<FieldFilter> = criteria
		.categorical_filters()
		.into_iter()
		.map(|(field, value)| FieldFilter::Match { field, value: value.trim().to_string() })
		.collect();

	if !criteria.features.is_empty() {
		filters.push(FieldFilter::AllOf {
			field: TextField::Features,
			values: criteria.features.clone(),
		});
	}
	if let Some(code) = criteria.identifier_code.as_deref() {
		let value = code.trim().to_ascii_uppercase();

		match text::identifier_code_kind(&value) {
			IdentifierCodeKind::Full =>
				filters.push(FieldFilter::Match { field: TextField::IdentifierCode, value }),
			IdentifierCodeKind::Partial =>
				filters.push(FieldFilter::Contains { field: TextField::IdentifierCode, value }),
			IdentifierCodeKind::Invalid => {},
		}
	}

	for field in NUMERIC_FIELDS {
		let min = criteria.bound(field, BoundSide::Min);
		let max = criteria.bound(field, BoundSide::Max);

		if min.is_none() && max.is_none() {
			continue;
		}

		let (min, max) = match field {
			NumericField::EngineVolume => (
				min.map(|value| litres_to_cc(value) * ENGINE_VOLUME_MIN_FACTOR),
				max.map(|value| litres_to_cc(value) * ENGINE_VOLUME_MAX_FACTOR),
			),
			_ => (min, max),
		};

		filters.push(FieldFilter::Range { field, min, max });
	}

	filters
}

fn sort_keys(criteria: &SearchCriteria, has_text: bool) -> Vec<SortKey> {
	let mut keys: Vec<SortKey> = criteria
		.sort
		.iter()
		.map(|directive| SortKey::Field { field: directive.field, direction: directive.direction })
		.collect();

	if let Some(superlative) = criteria.superlative {
		let direction = match superlative {
			Superlative::Cheapest => SortDirection::Asc,
			Superlative::MostExpensive => SortDirection::Desc,
		};

		keys.retain(|key| !matches!(key, SortKey::Field { field: NumericField::Price, .. }));
		keys.insert(0, SortKey::Field { field: NumericField::Price, direction });
	}
	if has_text {
		keys.push(SortKey::Relevance);
	}
	if keys.is_empty() {
		keys.push(SortKey::Field { field: NumericField::Price, direction: SortDirection::Asc });
	}

	keys
}

fn drop_field(
	criteria: &mut SearchCriteria,
	dropped: &mut Vec<InvalidField>,
	field: CriteriaField,
	reason: &str,
) {
	log_invalid(field, reason);

	criteria.remove(field);
	dropped.push(InvalidField::new(field.as_str(), reason));
}

fn log_invalid(field: CriteriaField, reason: &str) {
	let err = Error::InvalidFieldValue {
		field: field.as_str().to_string(),
		message: reason.to_string(),
	};

	tracing::warn!(error = %err, field = field.as_str(), "Dropping malformed criteria field.");
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use tokio_util::sync::CancellationToken;

	use carlot_config::Search;
	use carlot_domain::{
		FieldFilter, NumericField, SearchCriteria, SortDirection, SortKey, TextField, Vehicle,
	};
	use carlot_storage::memory::MemoryIndex;

	use crate::{
		Error,
		exact::{plan, sanitize, search},
	};

	fn criteria(value: serde_json::Value) -> SearchCriteria {
		let (criteria, invalid) = SearchCriteria::from_json(&value);

		assert!(invalid.is_empty(), "Unexpected invalid fields: {invalid:?}");

		criteria
	}

	fn range(query: &carlot_domain::ExactQuery, field: NumericField) -> (Option<f64>, Option<f64>) {
		query
			.filters
			.iter()
			.find_map(|filter| match filter {
				FieldFilter::Range { field: found, min, max } if *found == field => Some((*min, *max)),
				_ => None,
			})
			.expect("Range filter must exist.")
	}

	#[test]
	fn inverted_ranges_and_bad_years_are_dropped() {
		let (clean, dropped) = sanitize(&criteria(json!({
			"min_price": 2_000_000,
			"max_price": 1_000_000,
			"min_year": 1850,
			"max_year": 2020,
			"brand": "Zeta"
		})));

		assert!(clean.price.is_empty());
		assert_eq!(clean.year.min, None);
		assert_eq!(clean.year.max, Some(2020));
		assert_eq!(clean.brand.as_deref(), Some("Zeta"));

		let mut names: Vec<&str> = dropped.iter().map(|field| field.field.as_str()).collect();

		names.sort_unstable();

		assert_eq!(names, vec!["max_price", "min_price", "min_year"]);
	}

	#[test]
	fn blank_feature_entries_are_reported() {
		let raw = SearchCriteria {
			features: vec!["sunroof".to_string(), "  ".to_string()],
			..Default::default()
		};
		let (clean, dropped) = sanitize(&raw);

		assert_eq!(clean.features, vec!["sunroof".to_string()]);
		assert_eq!(dropped.len(), 1);
		assert_eq!(dropped[0].field, "features");
	}

	#[test]
	fn invalid_identifier_codes_are_dropped() {
		let (clean, dropped) = sanitize(&criteria(json!({"vin": "IO!"})));

		assert!(clean.identifier_code.is_none());
		assert_eq!(dropped.len(), 1);
	}

	#[test]
	fn pure_filter_text_does_not_score() {
		let query = plan(
			&criteria(json!({"min_price": 2_000_000})),
			Some("from 2 million"),
			&Search::default(),
		);

		assert_eq!(query.text, None);
		assert!(!query.require_text);
		assert_eq!(
			query.sort,
			vec![SortKey::Field { field: NumericField::Price, direction: SortDirection::Asc }]
		);
	}

	#[test]
	fn text_only_queries_require_a_match() {
		let query = plan(&SearchCriteria::default(), Some("family wagon"), &Search::default());

		assert_eq!(query.text.as_deref(), Some("family wagon"));
		assert!(query.require_text);
		assert_eq!(query.sort, vec![SortKey::Relevance]);
	}

	#[test]
	fn explicit_sort_comes_before_relevance() {
		let query = plan(
			&criteria(json!({"brand": "Zeta", "sort": "-year"})),
			Some("quiet cabin"),
			&Search::default(),
		);

		assert!(!query.require_text);
		assert_eq!(
			query.sort,
			vec![
				SortKey::Field { field: NumericField::Year, direction: SortDirection::Desc },
				SortKey::Relevance,
			]
		);
	}

	#[test]
	fn superlative_narrows_to_one_item() {
		let query = plan(
			&criteria(json!({"superlative": "most expensive", "limit": 10, "offset": 5})),
			None,
			&Search::default(),
		);

		assert_eq!((query.offset, query.limit), (0, 1));
		assert_eq!(
			query.sort,
			vec![SortKey::Field { field: NumericField::Price, direction: SortDirection::Desc }]
		);
	}

	#[test]
	fn engine_volume_is_converted_with_tolerance() {
		let query = plan(
			&criteria(json!({"min_engine_volume": 1.6, "max_engine_volume": 2.0})),
			None,
			&Search::default(),
		);
		let (min, max) = range(&query, NumericField::EngineVolume);

		assert!((min.expect("Min must be set.") - 1_440.0).abs() < 1e-6);
		assert!((max.expect("Max must be set.") - 2_200.0).abs() < 1e-6);
	}

	#[test]
	fn window_is_clamped() {
		let cfg = Search::default();

		assert_eq!(plan(&SearchCriteria::default(), None, &cfg).limit, 20);
		assert_eq!(plan(&criteria(json!({"limit": 500})), None, &cfg).limit, 100);
	}

	#[test]
	fn categorical_values_filter_and_boost() {
		let query = plan(&criteria(json!({"color": "red", "vin": "A004352"})), None, &Search::default());

		assert!(query.filters.contains(&FieldFilter::Match {
			field: TextField::Color,
			value: "red".to_string(),
		}));
		assert!(query.filters.contains(&FieldFilter::Contains {
			field: TextField::IdentifierCode,
			value: "A004352".to_string(),
		}));
		assert_eq!(query.boosts.len(), 1);
		assert_eq!(query.boosts[0].value, "red");
	}

	#[tokio::test]
	async fn cancelled_search_reports_cancellation() {
		let index = MemoryIndex::new(vec![Vehicle { id: 1, ..Default::default() }]);
		let cancel = CancellationToken::new();

		cancel.cancel();

		let result =
			search(&index, &Search::default(), &SearchCriteria::default(), None, &cancel).await;

		assert!(matches!(result, Err(Error::Cancelled)));
	}
}
