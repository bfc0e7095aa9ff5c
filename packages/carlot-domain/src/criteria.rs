use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::{BoundSide, CriteriaField, NumericField, TextField};

const SINGLE_VALUED: [CriteriaField; 9] = [
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

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min: Option<T>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max: Option<T>,
}
impl<T> Bounds<T> {
	pub fn is_empty(&self) -> bool {
		self.min.is_none() && self.max.is_none()
	}

	fn side_mut(&mut self, side: BoundSide) -> &mut Option<T> {
		match side {
			BoundSide::Min => &mut self.min,
			BoundSide::Max => &mut self.max,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	Asc,
	Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
	pub field: NumericField,
	pub direction: SortDirection,
}

/// "Cheapest" or "most expensive" requests, which narrow the window to one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Superlative {
	Cheapest,
	MostExpensive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidField {
	pub field: String,
	pub message: String,
}
impl InvalidField {
	pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self { field: field.into(), message: message.into() }
	}
}

/// Structured search request. Absent fields are unconstrained; an empty value matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub brand: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub body_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub fuel_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none", alias = "transmission")]
	pub gearbox: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub drive_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub interior_color: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub features: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub identifier_code: Option<String>,
	#[serde(skip_serializing_if = "Bounds::is_empty")]
	pub price: Bounds<f64>,
	#[serde(skip_serializing_if = "Bounds::is_empty")]
	pub year: Bounds<i32>,
	#[serde(skip_serializing_if = "Bounds::is_empty")]
	pub mileage: Bounds<f64>,
	#[serde(skip_serializing_if = "Bounds::is_empty")]
	pub power: Bounds<f64>,
	/// Requested in litres.
	#[serde(skip_serializing_if = "Bounds::is_empty")]
	pub engine_volume: Bounds<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub offset: Option<u32>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub sort: Vec<SortDirective>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub superlative: Option<Superlative>,
}
impl SearchCriteria {
	/// Builds criteria from loosely typed input. Values that cannot be interpreted are omitted and
	/// reported instead of failing the whole request.
	pub fn from_json(value: &Value) -> (Self, Vec<InvalidField>) {
		let mut criteria = Self::default();
		let mut invalid = Vec::new();
		let Some(object) = value.as_object() else {
			invalid.push(InvalidField::new("criteria", "Criteria must be a JSON object."));

			return (criteria, invalid);
		};

		for (key, raw) in object {
			if raw.is_null() {
				continue;
			}
			if let Err(message) = criteria.apply(key, raw) {
				invalid.push(InvalidField::new(key.as_str(), message));
			}
		}

		(criteria, invalid)
	}

	/// True when no field constrains the result set.
	pub fn is_empty(&self) -> bool {
		CriteriaField::ALL.into_iter().all(|field| !self.has(field))
	}

	pub fn has(&self, field: CriteriaField) -> bool {
		if let Some((numeric, side)) = field.numeric_bound() {
			return self.bound(numeric, side).is_some();
		}

		match field {
			CriteriaField::Features => !self.features.is_empty(),
			_ => self.text(field).is_some(),
		}
	}

	/// Current value of a field as JSON, used for step history and explanations.
	pub fn get(&self, field: CriteriaField) -> Option<Value> {
		if let Some((numeric, side)) = field.numeric_bound() {
			return match numeric {
				NumericField::Year => self.year_side(side).map(Value::from),
				_ => self.bound(numeric, side).map(Value::from),
			};
		}

		match field {
			CriteriaField::Features if !self.features.is_empty() =>
				Some(Value::from(self.features.clone())),
			CriteriaField::Features => None,
			_ => self.text(field).map(Value::from),
		}
	}

	/// Single-valued text constraint, if set.
	pub fn text(&self, field: CriteriaField) -> Option<&str> {
		let slot = match field {
			CriteriaField::Brand => &self.brand,
			CriteriaField::Model => &self.model,
			CriteriaField::City => &self.city,
			CriteriaField::BodyType => &self.body_type,
			CriteriaField::FuelType => &self.fuel_type,
			CriteriaField::Transmission => &self.gearbox,
			CriteriaField::DriveType => &self.drive_type,
			CriteriaField::Color => &self.color,
			CriteriaField::InteriorColor => &self.interior_color,
			CriteriaField::IdentifierCode => &self.identifier_code,
			_ => return None,
		};

		slot.as_deref()
	}

	/// Numeric bound in request units (engine volume in litres).
	pub fn bound(&self, field: NumericField, side: BoundSide) -> Option<f64> {
		match field {
			NumericField::Year => self.year_side(side).map(f64::from),
			NumericField::Price => side_of(&self.price, side),
			NumericField::Mileage => side_of(&self.mileage, side),
			NumericField::Power => side_of(&self.power, side),
			NumericField::EngineVolume => side_of(&self.engine_volume, side),
		}
	}

	pub fn remove(&mut self, field: CriteriaField) {
		if let Some((numeric, side)) = field.numeric_bound() {
			match numeric {
				NumericField::Year => *self.year.side_mut(side) = None,
				_ =>
					if let Some(bounds) = self.float_bounds_mut(numeric) {
						*bounds.side_mut(side) = None;
					},
			}

			return;
		}

		match field {
			CriteriaField::Features => self.features.clear(),
			_ =>
				if let Some(slot) = self.text_slot_mut(field) {
					*slot = None;
				},
		}
	}

	/// Copy with one field removed. The receiver is never modified.
	pub fn without(&self, field: CriteriaField) -> Self {
		let mut copy = self.clone();

		copy.remove(field);

		copy
	}

	/// Fields constrained here that `original` left unconstrained.
	pub fn added_constraints(&self, original: &Self) -> Vec<CriteriaField> {
		CriteriaField::ALL
			.into_iter()
			.filter(|field| self.has(*field) && !original.has(*field))
			.collect()
	}

	/// Single-valued categorical filters, in a stable order.
	pub fn categorical_filters(&self) -> Vec<(TextField, &str)> {
		SINGLE_VALUED
			.into_iter()
			.filter_map(|field| Some((field.text_field()?, self.text(field)?)))
			.collect()
	}

	/// Sets one field from loosely typed input.
	pub fn set(&mut self, field: CriteriaField, raw: &Value) -> Result<(), String> {
		if let Some((numeric, side)) = field.numeric_bound() {
			let number =
				parse_number(raw).ok_or_else(|| format!("Expected a number but found {raw}."))?;

			match numeric {
				NumericField::Year => *self.year.side_mut(side) = Some(whole_year(number)?),
				_ =>
					if let Some(bounds) = self.float_bounds_mut(numeric) {
						*bounds.side_mut(side) = Some(number);
					},
			}

			return Ok(());
		}

		match field {
			CriteriaField::Features => self.features = parse_list(raw)?,
			_ =>
				if let Some(slot) = self.text_slot_mut(field) {
					*slot = Some(parse_text(raw)?);
				},
		}

		Ok(())
	}

	fn apply(&mut self, key: &str, raw: &Value) -> Result<(), String> {
		let normalized = key.trim().to_ascii_lowercase();

		match normalized.as_str() {
			"limit" => {
				self.limit = Some(parse_count(raw)?);

				return Ok(());
			},
			"offset" => {
				self.offset = Some(parse_count(raw)?);

				return Ok(());
			},
			"sort" => {
				self.sort = parse_sort(raw)?;

				return Ok(());
			},
			"superlative" => {
				self.superlative = Some(parse_superlative(raw)?);

				return Ok(());
			},
			_ => {},
		}

		if let Some(numeric) = NumericField::parse(&normalized)
			&& let Value::Object(sides) = raw
		{
			for (side, value) in sides {
				let side = match side.as_str() {
					"min" => BoundSide::Min,
					"max" => BoundSide::Max,
					other => return Err(format!("Unknown bound '{other}'.")),
				};

				if value.is_null() {
					continue;
				}

				self.set(CriteriaField::for_bound(numeric, side), value)?;
			}

			return Ok(());
		}

		let Some(field) = CriteriaField::parse(&normalized) else {
			return Err("Unknown criterion.".to_string());
		};

		self.set(field, raw)
	}

	fn year_side(&self, side: BoundSide) -> Option<i32> {
		match side {
			BoundSide::Min => self.year.min,
			BoundSide::Max => self.year.max,
		}
	}

	fn float_bounds_mut(&mut self, field: NumericField) -> Option<&mut Bounds<f64>> {
		match field {
			NumericField::Price => Some(&mut self.price),
			NumericField::Mileage => Some(&mut self.mileage),
			NumericField::Power => Some(&mut self.power),
			NumericField::EngineVolume => Some(&mut self.engine_volume),
			NumericField::Year => None,
		}
	}

	fn text_slot_mut(&mut self, field: CriteriaField) -> Option<&mut Option<String>> {
		let slot = match field {
			CriteriaField::Brand => &mut self.brand,
			CriteriaField::Model => &mut self.model,
			CriteriaField::City => &mut self.city,
			CriteriaField::BodyType => &mut self.body_type,
			CriteriaField::FuelType => &mut self.fuel_type,
			CriteriaField::Transmission => &mut self.gearbox,
			CriteriaField::DriveType => &mut self.drive_type,
			CriteriaField::Color => &mut self.color,
			CriteriaField::InteriorColor => &mut self.interior_color,
			CriteriaField::IdentifierCode => &mut self.identifier_code,
			_ => return None,
		};

		Some(slot)
	}
}

/// Accepts JSON numbers and strings such as "1 000 000", "1,500,000" or "2,5".
pub fn parse_number(raw: &Value) -> Option<f64> {
	let number = match raw {
		Value::Number(number) => number.as_f64()?,
		Value::String(text) => parse_number_text(text)?,
		_ => return None,
	};

	number.is_finite().then_some(number)
}

/// Converts a requested engine volume to cm³. Values above 100 are taken as cm³ already.
pub fn litres_to_cc(value: f64) -> f64 {
	if value > 100.0 {
		return value;
	}

	value * 1_000.0
}

fn parse_number_text(text: &str) -> Option<f64> {
	let compact: String =
		text.chars().filter(|ch| !ch.is_whitespace() && *ch != '_').collect();

	if compact.is_empty() {
		return None;
	}

	let normalized = if compact.contains('.') {
		compact.replace(',', "")
	} else if compact.contains(',') {
		let groups: Vec<&str> = compact.split(',').skip(1).collect();

		if groups.iter().all(|group| group.len() == 3) {
			compact.replace(',', "")
		} else if groups.len() == 1 {
			compact.replacen(',', ".", 1)
		} else {
			return None;
		}
	} else {
		compact
	};

	normalized.parse::<f64>().ok()
}

fn side_of(bounds: &Bounds<f64>, side: BoundSide) -> Option<f64> {
	match side {
		BoundSide::Min => bounds.min,
		BoundSide::Max => bounds.max,
	}
}

fn whole_year(number: f64) -> Result<i32, String> {
	if number.fract() != 0.0 || number < f64::from(i32::MIN) || number > f64::from(i32::MAX) {
		return Err(format!("Expected a whole year but found {number}."));
	}

	Ok(number as i32)
}

fn parse_count(raw: &Value) -> Result<u32, String> {
	let number = parse_number(raw).ok_or_else(|| format!("Expected a count but found {raw}."))?;

	if number < 0.0 || number.fract() != 0.0 || number > f64::from(u32::MAX) {
		return Err(format!("Expected a non-negative whole number but found {number}."));
	}

	Ok(number as u32)
}

fn parse_text(raw: &Value) -> Result<String, String> {
	let text = match raw {
		Value::String(text) => text.trim().to_string(),
		Value::Number(number) => number.to_string(),
		_ => return Err(format!("Expected text but found {raw}.")),
	};

	if text.is_empty() {
		return Err("Expected non-empty text.".to_string());
	}

	Ok(text)
}

fn parse_list(raw: &Value) -> Result<Vec<String>, String> {
	let items: Vec<String> = match raw {
		Value::String(text) => text.split(',').map(|item| item.trim().to_string()).collect(),
		Value::Array(values) => values.iter().map(parse_text).collect::<Result<_, _>>()?,
		_ => return Err(format!("Expected a list but found {raw}.")),
	};
	let mut out: Vec<String> = Vec::with_capacity(items.len());

	for item in items {
		if item.is_empty() || out.iter().any(|seen| seen.eq_ignore_ascii_case(&item)) {
			continue;
		}

		out.push(item);
	}

	Ok(out)
}

fn parse_sort(raw: &Value) -> Result<Vec<SortDirective>, String> {
	let items: Vec<&Value> = match raw {
		Value::Array(items) => items.iter().collect(),
		other => vec![other],
	};

	items.into_iter().map(parse_sort_item).collect()
}

fn parse_sort_item(raw: &Value) -> Result<SortDirective, String> {
	match raw {
		Value::Object(_) => serde_json::from_value(raw.clone())
			.map_err(|err| format!("Invalid sort directive: {err}.")),
		Value::String(text) => {
			let text = text.trim();
			let (name, direction) = if let Some(name) = text.strip_prefix('-') {
				(name, SortDirection::Desc)
			} else if let Some((name, direction)) = text.split_once(':') {
				let direction = match direction.trim().to_ascii_lowercase().as_str() {
					"asc" => SortDirection::Asc,
					"desc" => SortDirection::Desc,
					other => return Err(format!("Unknown sort direction '{other}'.")),
				};

				(name, direction)
			} else {
				(text, SortDirection::Asc)
			};
			let field = NumericField::parse(name)
				.ok_or_else(|| format!("Cannot sort by '{}'.", name.trim()))?;

			Ok(SortDirective { field, direction })
		},
		_ => Err(format!("Expected a sort directive but found {raw}.")),
	}
}

fn parse_superlative(raw: &Value) -> Result<Superlative, String> {
	let text = raw.as_str().map(|text| text.trim().to_ascii_lowercase()).unwrap_or_default();

	match text.replace([' ', '-'], "_").as_str() {
		"cheapest" | "min_price" => Ok(Superlative::Cheapest),
		"most_expensive" | "max_price" => Ok(Superlative::MostExpensive),
		_ => Err(format!("Unknown superlative {raw}.")),
	}
}
