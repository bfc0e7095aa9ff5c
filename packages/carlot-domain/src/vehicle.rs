use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field::{NumericField, TextField};

/// A listing as stored by the backends. Unknown attributes ride along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
	pub id: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub brand: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub body_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fuel_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gearbox: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub drive_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub interior_color: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub features: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub identifier_code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub price: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub year: Option<i32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mileage: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub power: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub engine_volume_cc: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl Vehicle {
	/// Single-valued text attribute. Body type falls back to the listing category.
	pub fn text(&self, field: TextField) -> Option<&str> {
		let value = match field {
			TextField::Brand => &self.brand,
			TextField::Model => &self.model,
			TextField::City => &self.city,
			TextField::BodyType => return self.body_type.as_deref().or(self.category.as_deref()),
			TextField::FuelType => &self.fuel_type,
			TextField::Gearbox => &self.gearbox,
			TextField::DriveType => &self.drive_type,
			TextField::Color => &self.color,
			TextField::InteriorColor => &self.interior_color,
			TextField::IdentifierCode => &self.identifier_code,
			TextField::Description => &self.description,
			TextField::Features => return None,
		};

		value.as_deref()
	}

	/// Numeric attribute in storage units.
	pub fn numeric(&self, field: NumericField) -> Option<f64> {
		match field {
			NumericField::Price => self.price,
			NumericField::Year => self.year.map(f64::from),
			NumericField::Mileage => self.mileage,
			NumericField::Power => self.power,
			NumericField::EngineVolume => self.engine_volume_cc,
		}
	}

	pub fn has_feature(&self, wanted: &str) -> bool {
		self.features.iter().any(|feature| feature.trim().eq_ignore_ascii_case(wanted.trim()))
	}

	/// Concatenated searchable text used for lexical scoring.
	pub fn search_text(&self) -> String {
		let mut parts: Vec<&str> = [
			TextField::Brand,
			TextField::Model,
			TextField::City,
			TextField::BodyType,
			TextField::FuelType,
			TextField::Gearbox,
			TextField::DriveType,
			TextField::Color,
			TextField::InteriorColor,
			TextField::Description,
		]
		.into_iter()
		.filter_map(|field| self.text(field))
		.collect();

		parts.extend(self.features.iter().map(String::as_str));

		parts.join(" ")
	}
}
