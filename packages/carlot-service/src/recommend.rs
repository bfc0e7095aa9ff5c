use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use carlot_config::Recommendations as RecommendationConfig;
use carlot_domain::{
	BoundSide, CriteriaField, NumericField, SearchCriteria, TextField, Vehicle, litres_to_cc, text,
};

pub const NO_INVENTORY: &str = "No inventory available.";

const NO_MATCH: &str = "No vehicles match the requested criteria.";
const COMBINATION: &str =
	"Every constraint matches some vehicles on its own; no vehicle satisfies their combination.";
const NUMERIC_FIELDS: [NumericField; 5] = [
	NumericField::Price,
	NumericField::Year,
	NumericField::Mileage,
	NumericField::Power,
	NumericField::EngineVolume,
];
const CATEGORICAL_FIELDS: [CriteriaField; 9] = [
	CriteriaField::Brand,
	CriteriaField::Model,
	CriteriaField::City,
	CriteriaField::BodyType,
	CriteriaField::FuelType,
	CriteriaField::Transmission,
	CriteriaField::DriveType,
	CriteriaField::Color,
	CriteriaField::InteriorColor,
];
const NUMERIC_WEIGHT: f64 = 1.0;
const PRIMARY_WEIGHT: f64 = 0.5;
const SECONDARY_WEIGHT: f64 = 0.25;
const YEAR_DECAY: f64 = 5.0;
const ENGINE_VOLUME_MIN_FACTOR: f64 = 0.9;
const ENGINE_VOLUME_MAX_FACTOR: f64 = 1.1;
const PRICE_CEILING_FACTOR: f64 = 1.1;
const BUDGET_ADVICE_FACTOR: f64 = 1.2;
const YEAR_ADVICE_STEP: i32 = 2;
const YEAR_ADVICE_FLOOR: i32 = 2015;

/// Fallback payload returned when relaxation cannot recover any result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
	pub message: String,
	pub total_available: u64,
	pub gaps: Vec<GapStatement>,
	pub closest_matches: Vec<ClosestMatch>,
	pub alternatives: Vec<AlternativeCriteria>,
	pub advice: Vec<String>,
}
impl Recommendations {
	pub fn unavailable(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			total_available: 0,
			gaps: Vec::new(),
			closest_matches: Vec::new(),
			alternatives: Vec::new(),
			advice: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapStatement {
	pub field: CriteriaField,
	pub message: String,
	/// Pool vehicles satisfying this constraint on its own.
	pub matching: u64,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub options: Vec<ValueCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
	pub value: String,
	pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosestMatch {
	pub id: u64,
	/// Weighted share of satisfied constraints in [0, 1].
	pub match_score: f64,
	pub match_percentage: u32,
	pub explanation: Vec<FieldExplanation>,
	pub payload: Vehicle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExplanation {
	pub field: CriteriaField,
	pub satisfied: bool,
	pub credit: f64,
	pub weight: f64,
	pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeCriteria {
	pub field: CriteriaField,
	pub suggested_value: Value,
	pub supporting_count: u64,
	pub reason: String,
}

struct Bound {
	field: CriteriaField,
	numeric: NumericField,
	side: BoundSide,
	requested: f64,
	/// In storage units, tolerance included.
	limit: f64,
}
impl Bound {
	fn satisfied_by(&self, value: f64) -> bool {
		match self.side {
			BoundSide::Min => value >= self.limit,
			BoundSide::Max => value <= self.limit,
		}
	}

	/// Full credit inside the bound, decaying linearly with the distance outside it.
	fn credit(&self, value: f64) -> f64 {
		if self.satisfied_by(value) {
			return 1.0;
		}

		let scale = match self.numeric {
			NumericField::Year => YEAR_DECAY,
			_ => self.limit.abs(),
		};

		if scale <= 0.0 {
			return 0.0;
		}

		1.0 - ((value - self.limit).abs() / scale).min(1.0)
	}

	fn relation(&self) -> &'static str {
		match self.side {
			BoundSide::Min => "at least",
			BoundSide::Max => "at most",
		}
	}
}

/// Scores a candidate pool against the original criteria and derives alternatives.
///
/// Never fails; an empty pool yields [`NO_INVENTORY`] with empty lists.
pub fn recommend(
	pool: &[Vehicle],
	original: &SearchCriteria,
	free_text: Option<&str>,
	cfg: &RecommendationConfig,
) -> Recommendations {
	if pool.is_empty() {
		return Recommendations::unavailable(NO_INVENTORY);
	}

	let bounds = bounds(original);
	let gaps = gaps(pool, original, &bounds, cfg.top_alternatives as usize);
	let message = if gaps.iter().all(|gap| gap.matching > 0) { COMBINATION } else { NO_MATCH };

	Recommendations {
		message: message.to_string(),
		total_available: pool.len() as u64,
		gaps,
		closest_matches: closest_matches(
			pool,
			original,
			&bounds,
			free_text,
			cfg.max_results as usize,
		),
		alternatives: alternatives(pool, original),
		advice: advice(original),
	}
}

fn bounds(criteria: &SearchCriteria) -> Vec<Bound> {
	let mut bounds = Vec::new();

	for numeric in NUMERIC_FIELDS {
		for side in [BoundSide::Min, BoundSide::Max] {
			let Some(requested) = criteria.bound(numeric, side) else { continue };
			let limit = match (numeric, side) {
				(NumericField::EngineVolume, BoundSide::Min) =>
					litres_to_cc(requested) * ENGINE_VOLUME_MIN_FACTOR,
				(NumericField::EngineVolume, BoundSide::Max) =>
					litres_to_cc(requested) * ENGINE_VOLUME_MAX_FACTOR,
				_ => requested,
			};

			bounds.push(Bound {
				field: CriteriaField::for_bound(numeric, side),
				numeric,
				side,
				requested,
				limit,
			});
		}
	}

	bounds
}

fn gaps(
	pool: &[Vehicle],
	original: &SearchCriteria,
	bounds: &[Bound],
	top_k: usize,
) -> Vec<GapStatement> {
	let mut gaps = Vec::new();

	for bound in bounds {
		let values: Vec<f64> =
			pool.iter().filter_map(|vehicle| vehicle.numeric(bound.numeric)).collect();
		let matching = values.iter().filter(|value| bound.satisfied_by(**value)).count();
		let outside = values.iter().copied().filter(|value| !bound.satisfied_by(*value));
		let nearest = match bound.side {
			BoundSide::Min => outside.reduce(f64::max),
			BoundSide::Max => outside.reduce(f64::min),
		};
		let label = label(bound.numeric);
		let requested = display_number(bound.requested);
		let message = match (matching, nearest) {
			(_, None) if values.is_empty() => format!("No vehicle in inventory lists a {label}."),
			(_, None) => format!(
				"All {matching} vehicles listing a {label} have it {} {requested}.",
				bound.relation(),
			),
			(0, Some(nearest)) => format!(
				"No vehicle has {label} {} {requested}; the closest available is {}.",
				bound.relation(),
				display_number(display_value(bound.numeric, nearest)),
			),
			(_, Some(nearest)) => format!(
				"{matching} of {} vehicles have {label} {} {requested}; the closest outside it is {}.",
				values.len(),
				bound.relation(),
				display_number(display_value(bound.numeric, nearest)),
			),
		};

		gaps.push(GapStatement {
			field: bound.field,
			message,
			matching: matching as u64,
			options: Vec::new(),
		});
	}

	for field in CATEGORICAL_FIELDS {
		let (Some(wanted), Some(text_field)) = (original.text(field), field.text_field()) else {
			continue;
		};
		let present: Vec<&str> =
			pool.iter().filter_map(|vehicle| vehicle.text(text_field)).collect();

		if present.iter().any(|value| same(value, wanted)) {
			continue;
		}

		gaps.push(GapStatement {
			field,
			message: format!("No {} '{wanted}' in inventory.", field.as_str().replace('_', " ")),
			matching: 0,
			options: top_values(present, top_k),
		});
	}

	let missing: Vec<&str> = original
		.features
		.iter()
		.map(String::as_str)
		.filter(|feature| !pool.iter().any(|vehicle| vehicle.has_feature(feature)))
		.collect();

	if !missing.is_empty() {
		let present = pool.iter().flat_map(|vehicle| vehicle.features.iter().map(String::as_str));

		gaps.push(GapStatement {
			field: CriteriaField::Features,
			message: format!("No vehicle offers {}.", missing.join(", ")),
			matching: 0,
			options: top_values(present, top_k),
		});
	}

	gaps
}

fn closest_matches(
	pool: &[Vehicle],
	original: &SearchCriteria,
	bounds: &[Bound],
	free_text: Option<&str>,
	limit: usize,
) -> Vec<ClosestMatch> {
	let mut scored: Vec<(ClosestMatch, f32)> = pool
		.iter()
		.map(|vehicle| {
			let overlap = free_text
				.map(|text| text::lexical_overlap(text, &vehicle.search_text()))
				.unwrap_or(0.0);

			(score(vehicle, original, bounds), overlap)
		})
		.collect();

	scored.sort_by(|(left, left_overlap), (right, right_overlap)| {
		right
			.match_score
			.partial_cmp(&left.match_score)
			.unwrap_or(Ordering::Equal)
			.then_with(|| right_overlap.total_cmp(left_overlap))
			.then_with(|| left.id.cmp(&right.id))
	});
	scored.truncate(limit);

	scored.into_iter().map(|(item, _)| item).collect()
}

fn score(vehicle: &Vehicle, original: &SearchCriteria, bounds: &[Bound]) -> ClosestMatch {
	let mut explanation = Vec::new();

	for bound in bounds {
		let label = label(bound.numeric);
		let (credit, detail) = match vehicle.numeric(bound.numeric) {
			Some(value) => {
				let credit = bound.credit(value);
				let verdict = if credit >= 1.0 { "meets" } else { "misses" };

				(
					credit,
					format!(
						"{label} {} {verdict} {} {}",
						display_number(display_value(bound.numeric, value)),
						bound.relation(),
						display_number(bound.requested),
					),
				)
			},
			None => (0.0, format!("{label} not listed")),
		};

		explanation.push(FieldExplanation {
			field: bound.field,
			satisfied: credit >= 1.0,
			credit,
			weight: NUMERIC_WEIGHT,
			detail,
		});
	}

	for field in CATEGORICAL_FIELDS {
		let (Some(wanted), Some(text_field)) = (original.text(field), field.text_field()) else {
			continue;
		};
		let weight = match field {
			CriteriaField::Brand | CriteriaField::BodyType => PRIMARY_WEIGHT,
			_ => SECONDARY_WEIGHT,
		};
		let label = field.as_str().replace('_', " ");
		let (satisfied, detail) = match vehicle.text(text_field) {
			Some(actual) if same(actual, wanted) => (true, format!("{label} {actual} matches")),
			Some(actual) => (false, format!("{label} {actual} instead of {wanted}")),
			None => (false, format!("{label} not listed")),
		};

		explanation.push(FieldExplanation {
			field,
			satisfied,
			credit: if satisfied { 1.0 } else { 0.0 },
			weight,
			detail,
		});
	}

	if !original.features.is_empty() {
		let present =
			original.features.iter().filter(|feature| vehicle.has_feature(feature)).count();
		let credit = present as f64 / original.features.len() as f64;

		explanation.push(FieldExplanation {
			field: CriteriaField::Features,
			satisfied: present == original.features.len(),
			credit,
			weight: SECONDARY_WEIGHT,
			detail: format!("{present} of {} requested features", original.features.len()),
		});
	}
	if let Some(code) = original.identifier_code.as_deref() {
		let wanted = code.trim().to_ascii_uppercase();
		let satisfied = vehicle
			.identifier_code
			.as_deref()
			.is_some_and(|actual| actual.to_ascii_uppercase().contains(&wanted));

		explanation.push(FieldExplanation {
			field: CriteriaField::IdentifierCode,
			satisfied,
			credit: if satisfied { 1.0 } else { 0.0 },
			weight: SECONDARY_WEIGHT,
			detail: format!("identifier code {}", if satisfied { "matches" } else { "differs" }),
		});
	}

	let total_weight: f64 = explanation.iter().map(|item| item.weight).sum();
	let match_score = if total_weight > 0.0 {
		explanation.iter().map(|item| item.weight * item.credit).sum::<f64>() / total_weight
	} else {
		1.0
	};
	let violated = explanation.iter().any(|item| !item.satisfied);
	let mut match_percentage = (match_score * 100.0).round().clamp(0.0, 100.0) as u32;

	if violated {
		match_percentage = match_percentage.min(99);
	}

	ClosestMatch {
		id: vehicle.id,
		match_score,
		match_percentage,
		explanation,
		payload: vehicle.clone(),
	}
}

fn alternatives(pool: &[Vehicle], original: &SearchCriteria) -> Vec<AlternativeCriteria> {
	let mut alternatives = Vec::new();

	if let Some(brand) = original.brand.as_deref()
		&& !pool.iter().any(|vehicle| vehicle.brand.as_deref().is_some_and(|b| same(b, brand)))
		&& let Some(top) = top_values(pool.iter().filter_map(|vehicle| vehicle.brand.as_deref()), 1)
			.into_iter()
			.next()
	{
		alternatives.push(AlternativeCriteria {
			field: CriteriaField::Brand,
			reason: format!("No {brand} in inventory; {} is the most common brand.", top.value),
			suggested_value: Value::from(top.value),
			supporting_count: top.count,
		});
	}

	let body_types = pool.iter().filter_map(|vehicle| vehicle.text(TextField::BodyType));

	if let Some(top) = top_values(body_types, 1).into_iter().next()
		&& !original.body_type.as_deref().is_some_and(|wanted| same(wanted, &top.value))
	{
		alternatives.push(AlternativeCriteria {
			field: CriteriaField::BodyType,
			reason: format!("{} is the most common body type in inventory.", top.value),
			suggested_value: Value::from(top.value),
			supporting_count: top.count,
		});
	}

	let prices: Vec<f64> = pool.iter().filter_map(|vehicle| vehicle.price).collect();

	if let Some(max_price) = original.price.max
		&& !prices.is_empty()
	{
		let mean = prices.iter().sum::<f64>() / prices.len() as f64;

		if max_price < mean {
			let ceiling = (mean * PRICE_CEILING_FACTOR).round();
			let supporting_count = prices.iter().filter(|price| **price <= ceiling).count() as u64;

			alternatives.push(AlternativeCriteria {
				field: CriteriaField::MaxPrice,
				suggested_value: Value::from(ceiling),
				supporting_count,
				reason: format!(
					"The average price is {}; a ceiling of {} covers {supporting_count} vehicles.",
					display_number(mean.round()),
					display_number(ceiling),
				),
			});
		}
	}

	let newest = pool.iter().filter_map(|vehicle| vehicle.year).max();

	if let (Some(min_year), Some(newest)) = (original.year.min, newest)
		&& min_year > newest
	{
		let supporting_count =
			pool.iter().filter(|vehicle| vehicle.year == Some(newest)).count() as u64;

		alternatives.push(AlternativeCriteria {
			field: CriteriaField::MinYear,
			suggested_value: Value::from(newest),
			supporting_count,
			reason: format!("The newest vehicles in inventory are from {newest}."),
		});
	}

	alternatives
}

fn advice(original: &SearchCriteria) -> Vec<String> {
	let mut advice = Vec::new();

	if let Some(max_price) = original.price.max {
		advice.push(format!(
			"Consider raising the budget to {}.",
			display_number((max_price * BUDGET_ADVICE_FACTOR).round())
		));
	}
	if let Some(min_year) = original.year.min
		&& min_year - YEAR_ADVICE_STEP >= YEAR_ADVICE_FLOOR
	{
		advice.push(format!("Consider vehicles from {} onwards.", min_year - YEAR_ADVICE_STEP));
	}
	if let Some(brand) = original.brand.as_deref() {
		advice.push(format!("Consider brands other than {brand}."));
	}

	advice
}

/// Most frequent values first, case-insensitively grouped, ties by value.
fn top_values<'a>(values: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<ValueCount> {
	let mut counts: BTreeMap<String, ValueCount> = BTreeMap::new();

	for value in values {
		let value = value.trim();

		if value.is_empty() {
			continue;
		}

		counts
			.entry(value.to_lowercase())
			.or_insert_with(|| ValueCount { value: value.to_string(), count: 0 })
			.count += 1;
	}

	let mut ranked: Vec<ValueCount> = counts.into_values().collect();

	ranked.sort_by(|left, right| {
		right.count.cmp(&left.count).then_with(|| left.value.cmp(&right.value))
	});
	ranked.truncate(limit);

	ranked
}

fn same(left: &str, right: &str) -> bool {
	left.trim().eq_ignore_ascii_case(right.trim())
}

fn label(field: NumericField) -> String {
	field.as_str().replace('_', " ")
}

fn display_value(field: NumericField, stored: f64) -> f64 {
	match field {
		NumericField::EngineVolume => stored / 1_000.0,
		_ => stored,
	}
}

fn display_number(value: f64) -> String {
	if value.fract() == 0.0 { format!("{value:.0}") } else { format!("{value:.1}") }
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use carlot_config::Recommendations as RecommendationConfig;
	use carlot_domain::{CriteriaField, SearchCriteria, Vehicle};

	use crate::recommend::{COMBINATION, NO_INVENTORY, NO_MATCH, recommend};

	fn criteria(value: serde_json::Value) -> SearchCriteria {
		SearchCriteria::from_json(&value).0
	}

	fn vehicle(id: u64, brand: &str, body: &str, price: Option<f64>, year: i32) -> Vehicle {
		Vehicle {
			id,
			brand: Some(brand.to_string()),
			body_type: Some(body.to_string()),
			price,
			year: Some(year),
			..Default::default()
		}
	}

	#[test]
	fn empty_pool_reports_no_inventory() {
		let result = recommend(
			&[],
			&criteria(json!({"brand": "Zeta"})),
			None,
			&RecommendationConfig::default(),
		);

		assert_eq!(result.message, NO_INVENTORY);
		assert!(result.closest_matches.is_empty());
		assert!(result.alternatives.is_empty());
		assert_eq!(result.total_available, 0);
	}

	#[test]
	fn only_full_matches_reach_one_hundred_percent() {
		let pool = [
			vehicle(1, "Zeta", "suv", Some(900_000.0), 2020),
			vehicle(2, "Zeta", "suv", Some(1_050_000.0), 2020),
			vehicle(3, "Zeta", "suv", Some(1_000_000.0), 2019),
			vehicle(4, "Yota", "suv", None, 2020),
		];
		let result = recommend(
			&pool,
			&criteria(json!({"brand": "Zeta", "max_price": 1_000_000, "min_year": 2019})),
			None,
			&RecommendationConfig::default(),
		);
		let ranked: Vec<(u64, u32)> =
			result.closest_matches.iter().map(|item| (item.id, item.match_percentage)).collect();

		assert_eq!(ranked, vec![(1, 100), (3, 100), (2, 98), (4, 40)]);
		assert!(result.closest_matches[2].explanation.iter().any(|item| !item.satisfied));
	}

	#[test]
	fn year_credit_decays_over_five_years() {
		let pool = [vehicle(1, "Zeta", "suv", None, 2018), vehicle(2, "Zeta", "suv", None, 2013)];
		let result = recommend(
			&pool,
			&criteria(json!({"min_year": 2020})),
			None,
			&RecommendationConfig::default(),
		);

		assert!((result.closest_matches[0].match_score - 0.6).abs() < 1e-9);
		assert_eq!(result.closest_matches[0].match_percentage, 60);
		assert_eq!(result.closest_matches[1].match_score, 0.0);
	}

	#[test]
	fn ties_prefer_free_text_overlap_then_id() {
		let mut quiet = vehicle(5, "Yota", "wagon", None, 2020);

		quiet.description = Some("quiet family wagon".to_string());

		let pool = [
			vehicle(2, "Kappa", "wagon", None, 2020),
			quiet,
			vehicle(1, "Mu", "wagon", None, 2020),
		];
		let result = recommend(
			&pool,
			&criteria(json!({"brand": "Zeta"})),
			Some("quiet"),
			&RecommendationConfig::default(),
		);
		let ids: Vec<u64> = result.closest_matches.iter().map(|item| item.id).collect();

		assert_eq!(ids, vec![5, 1, 2]);
	}

	#[test]
	fn gaps_name_the_nearest_value_and_present_alternatives() {
		let pool = [
			vehicle(1, "Yota", "suv", Some(1_500_000.0), 2019),
			vehicle(2, "Yota", "sedan", Some(1_300_000.0), 2018),
			vehicle(3, "Kappa", "suv", Some(2_000_000.0), 2017),
		];
		let result = recommend(
			&pool,
			&criteria(json!({"brand": "Zeta", "max_price": 1_000_000})),
			None,
			&RecommendationConfig::default(),
		);

		assert_eq!(result.gaps.len(), 2);
		assert_eq!(result.gaps[0].field, CriteriaField::MaxPrice);
		assert!(result.gaps[0].message.contains("1300000"), "{}", result.gaps[0].message);
		assert_eq!(result.gaps[1].field, CriteriaField::Brand);
		assert_eq!(result.gaps[1].options[0].value, "Yota");
		assert_eq!(result.gaps[1].options[0].count, 2);
	}

	#[test]
	fn combination_message_when_each_constraint_matches_alone() {
		let pool = [
			vehicle(1, "Zeta", "suv", Some(2_000_000.0), 2020),
			vehicle(2, "Yota", "suv", Some(900_000.0), 2020),
		];
		let result = recommend(
			&pool,
			&criteria(json!({"brand": "Zeta", "max_price": 1_000_000})),
			None,
			&RecommendationConfig::default(),
		);

		assert_eq!(result.gaps.len(), 1);
		assert_eq!(result.gaps[0].field, CriteriaField::MaxPrice);
		assert_eq!(result.gaps[0].matching, 1);
		assert!(result.gaps[0].message.contains("2000000"), "{}", result.gaps[0].message);
		assert_eq!(result.message, COMBINATION);
	}

	#[test]
	fn every_numeric_bound_is_explained_when_partly_satisfied() {
		let pool = [
			vehicle(1, "Yota", "suv", Some(900_000.0), 2015),
			vehicle(2, "Yota", "suv", Some(3_000_000.0), 2022),
		];
		let result = recommend(
			&pool,
			&criteria(json!({"brand": "Zeta", "max_price": 1_000_000, "min_year": 2020})),
			None,
			&RecommendationConfig::default(),
		);
		let fields: Vec<(CriteriaField, u64)> =
			result.gaps.iter().map(|gap| (gap.field, gap.matching)).collect();

		assert_eq!(
			fields,
			vec![(CriteriaField::MaxPrice, 1), (CriteriaField::MinYear, 1), (CriteriaField::Brand, 0)]
		);
		assert!(result.gaps[0].message.contains("3000000"), "{}", result.gaps[0].message);
		assert!(result.gaps[1].message.contains("2015"), "{}", result.gaps[1].message);
		assert_eq!(result.message, NO_MATCH);
	}

	#[test]
	fn alternatives_carry_supporting_counts() {
		let pool = [
			vehicle(1, "Yota", "suv", Some(1_000_000.0), 2018),
			vehicle(2, "Yota", "suv", Some(2_000_000.0), 2019),
			vehicle(3, "Kappa", "sedan", Some(3_000_000.0), 2019),
		];
		let result = recommend(
			&pool,
			&criteria(json!({"brand": "Zeta", "max_price": 900_000, "min_year": 2022})),
			None,
			&RecommendationConfig::default(),
		);
		let by_field = |field: CriteriaField| {
			result
				.alternatives
				.iter()
				.find(|alternative| alternative.field == field)
				.expect("Alternative must exist.")
		};

		assert_eq!(by_field(CriteriaField::Brand).suggested_value, json!("Yota"));
		assert_eq!(by_field(CriteriaField::Brand).supporting_count, 2);
		assert_eq!(by_field(CriteriaField::BodyType).suggested_value, json!("suv"));
		assert_eq!(by_field(CriteriaField::MaxPrice).suggested_value, json!(2_200_000.0));
		assert_eq!(by_field(CriteriaField::MaxPrice).supporting_count, 2);
		assert_eq!(by_field(CriteriaField::MinYear).suggested_value, json!(2019));
		assert_eq!(by_field(CriteriaField::MinYear).supporting_count, 2);
		assert_eq!(
			result.advice,
			vec![
				"Consider raising the budget to 1080000.".to_string(),
				"Consider vehicles from 2020 onwards.".to_string(),
				"Consider brands other than Zeta.".to_string(),
			]
		);
	}
}
