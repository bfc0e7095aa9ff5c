use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Every key a caller may constrain in [`crate::SearchCriteria`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaField {
	Brand,
	Model,
	City,
	BodyType,
	FuelType,
	Transmission,
	DriveType,
	Color,
	InteriorColor,
	Features,
	IdentifierCode,
	MinPrice,
	MaxPrice,
	MinYear,
	MaxYear,
	MinMileage,
	MaxMileage,
	MinPower,
	MaxPower,
	MinEngineVolume,
	MaxEngineVolume,
}
impl CriteriaField {
	pub const ALL: [Self; 21] = [
		Self::Brand,
		Self::Model,
		Self::City,
		Self::BodyType,
		Self::FuelType,
		Self::Transmission,
		Self::DriveType,
		Self::Color,
		Self::InteriorColor,
		Self::Features,
		Self::IdentifierCode,
		Self::MinPrice,
		Self::MaxPrice,
		Self::MinYear,
		Self::MaxYear,
		Self::MinMileage,
		Self::MaxMileage,
		Self::MinPower,
		Self::MaxPower,
		Self::MinEngineVolume,
		Self::MaxEngineVolume,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Brand => "brand",
			Self::Model => "model",
			Self::City => "city",
			Self::BodyType => "body_type",
			Self::FuelType => "fuel_type",
			Self::Transmission => "transmission",
			Self::DriveType => "drive_type",
			Self::Color => "color",
			Self::InteriorColor => "interior_color",
			Self::Features => "features",
			Self::IdentifierCode => "identifier_code",
			Self::MinPrice => "min_price",
			Self::MaxPrice => "max_price",
			Self::MinYear => "min_year",
			Self::MaxYear => "max_year",
			Self::MinMileage => "min_mileage",
			Self::MaxMileage => "max_mileage",
			Self::MinPower => "min_power",
			Self::MaxPower => "max_power",
			Self::MinEngineVolume => "min_engine_volume",
			Self::MaxEngineVolume => "max_engine_volume",
		}
	}

	/// Parses a canonical name or one of the accepted aliases, case-insensitively.
	pub fn parse(name: &str) -> Option<Self> {
		let name = name.trim().to_ascii_lowercase();
		let canonical = match name.as_str() {
			"gearbox" => "transmission",
			"category" | "body_category" => "body_type",
			"options" => "features",
			"vin" => "identifier_code",
			other => other,
		};

		Self::ALL.into_iter().find(|field| field.as_str() == canonical)
	}

	pub fn is_relaxable(self) -> bool {
		matches!(
			self,
			Self::Color
				| Self::InteriorColor
				| Self::Features
				| Self::Transmission
				| Self::FuelType
				| Self::MaxPrice
				| Self::MinYear
				| Self::BodyType
				| Self::Brand
		)
	}

	pub fn text_field(self) -> Option<TextField> {
		let field = match self {
			Self::Brand => TextField::Brand,
			Self::Model => TextField::Model,
			Self::City => TextField::City,
			Self::BodyType => TextField::BodyType,
			Self::FuelType => TextField::FuelType,
			Self::Transmission => TextField::Gearbox,
			Self::DriveType => TextField::DriveType,
			Self::Color => TextField::Color,
			Self::InteriorColor => TextField::InteriorColor,
			Self::Features => TextField::Features,
			Self::IdentifierCode => TextField::IdentifierCode,
			_ => return None,
		};

		Some(field)
	}

	pub fn numeric_bound(self) -> Option<(NumericField, BoundSide)> {
		let bound = match self {
			Self::MinPrice => (NumericField::Price, BoundSide::Min),
			Self::MaxPrice => (NumericField::Price, BoundSide::Max),
			Self::MinYear => (NumericField::Year, BoundSide::Min),
			Self::MaxYear => (NumericField::Year, BoundSide::Max),
			Self::MinMileage => (NumericField::Mileage, BoundSide::Min),
			Self::MaxMileage => (NumericField::Mileage, BoundSide::Max),
			Self::MinPower => (NumericField::Power, BoundSide::Min),
			Self::MaxPower => (NumericField::Power, BoundSide::Max),
			Self::MinEngineVolume => (NumericField::EngineVolume, BoundSide::Min),
			Self::MaxEngineVolume => (NumericField::EngineVolume, BoundSide::Max),
			_ => return None,
		};

		Some(bound)
	}

	pub fn for_bound(field: NumericField, side: BoundSide) -> Self {
		match (field, side) {
			(NumericField::Price, BoundSide::Min) => Self::MinPrice,
			(NumericField::Price, BoundSide::Max) => Self::MaxPrice,
			(NumericField::Year, BoundSide::Min) => Self::MinYear,
			(NumericField::Year, BoundSide::Max) => Self::MaxYear,
			(NumericField::Mileage, BoundSide::Min) => Self::MinMileage,
			(NumericField::Mileage, BoundSide::Max) => Self::MaxMileage,
			(NumericField::Power, BoundSide::Min) => Self::MinPower,
			(NumericField::Power, BoundSide::Max) => Self::MaxPower,
			(NumericField::EngineVolume, BoundSide::Min) => Self::MinEngineVolume,
			(NumericField::EngineVolume, BoundSide::Max) => Self::MaxEngineVolume,
		}
	}
}
impl Display for CriteriaField {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundSide {
	Min,
	Max,
}

/// Text attributes of a stored vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
	Brand,
	Model,
	City,
	BodyType,
	FuelType,
	Gearbox,
	DriveType,
	Color,
	InteriorColor,
	Features,
	IdentifierCode,
	Description,
}
impl TextField {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Brand => "brand",
			Self::Model => "model",
			Self::City => "city",
			Self::BodyType => "body_type",
			Self::FuelType => "fuel_type",
			Self::Gearbox => "gearbox",
			Self::DriveType => "drive_type",
			Self::Color => "color",
			Self::InteriorColor => "interior_color",
			Self::Features => "features",
			Self::IdentifierCode => "identifier_code",
			Self::Description => "description",
		}
	}
}

/// Numeric attributes of a stored vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
	Price,
	Year,
	Mileage,
	Power,
	EngineVolume,
}
impl NumericField {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Price => "price",
			Self::Year => "year",
			Self::Mileage => "mileage",
			Self::Power => "power",
			Self::EngineVolume => "engine_volume",
		}
	}

	/// Name of the stored attribute. Engine volume is stored in cm³.
	pub fn storage_name(self) -> &'static str {
		match self {
			Self::EngineVolume => "engine_volume_cc",
			other => other.as_str(),
		}
	}

	pub fn parse(name: &str) -> Option<Self> {
		match name.trim().to_ascii_lowercase().as_str() {
			"price" => Some(Self::Price),
			"year" => Some(Self::Year),
			"mileage" => Some(Self::Mileage),
			"power" => Some(Self::Power),
			"engine_volume" | "engine_volume_cc" => Some(Self::EngineVolume),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::field::CriteriaField;

	#[test]
	fn aliases_resolve_to_canonical_fields() {
		assert_eq!(CriteriaField::parse("gearbox"), Some(CriteriaField::Transmission));
		assert_eq!(CriteriaField::parse("Category"), Some(CriteriaField::BodyType));
		assert_eq!(CriteriaField::parse("body_category"), Some(CriteriaField::BodyType));
		assert_eq!(CriteriaField::parse("options"), Some(CriteriaField::Features));
		assert_eq!(CriteriaField::parse("wheel_size"), None);
	}

	#[test]
	fn every_field_round_trips_through_its_name() {
		for field in CriteriaField::ALL {
			assert_eq!(CriteriaField::parse(field.as_str()), Some(field));
		}
	}
}
