use serde::{Deserialize, Serialize};

use crate::{
	criteria::SortDirection,
	field::{NumericField, TextField},
	vehicle::Vehicle,
};

/// Strict constraint. A document missing the attribute never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldFilter {
	/// Case-insensitive equality on a single-valued attribute.
	Match { field: TextField, value: String },
	/// Every value must be present in a list attribute.
	AllOf { field: TextField, values: Vec<String> },
	/// Case-insensitive substring, used for partial identifier codes.
	Contains { field: TextField, value: String },
	/// Inclusive range in storage units.
	Range { field: NumericField, min: Option<f64>, max: Option<f64> },
}

/// Scoring bonus for descriptions mentioning a structured value. Never filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBoost {
	pub value: String,
	pub weight: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SortKey {
	Field { field: NumericField, direction: SortDirection },
	Relevance,
}

/// Backend-neutral plan produced by the exact adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactQuery {
	pub filters: Vec<FieldFilter>,
	pub text: Option<String>,
	/// The text clause must match at least one searchable attribute.
	pub require_text: bool,
	pub boosts: Vec<TextBoost>,
	pub sort: Vec<SortKey>,
	pub offset: u32,
	pub limit: u32,
}
impl ExactQuery {
	/// Plan matching every document, used for samples and tests.
	pub fn match_all(limit: u32) -> Self {
		Self {
			filters: Vec::new(),
			text: None,
			require_text: false,
			boosts: Vec::new(),
			sort: vec![SortKey::Field { field: NumericField::Price, direction: SortDirection::Asc }],
			offset: 0,
			limit,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactHit {
	pub id: u64,
	pub score: f32,
	pub payload: Vehicle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExactPage {
	pub hits: Vec<ExactHit>,
	/// Matching documents before windowing.
	pub total: u64,
	pub took_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticHit {
	pub id: u64,
	/// Similarity in [0, 1].
	pub similarity: f32,
	pub payload: Vehicle,
}
