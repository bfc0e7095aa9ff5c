pub mod criteria;
pub mod field;
pub mod query;
pub mod text;
pub mod vehicle;

pub use criteria::{
	Bounds, InvalidField, SearchCriteria, SortDirection, SortDirective, Superlative, litres_to_cc,
	parse_number,
};
pub use field::{BoundSide, CriteriaField, NumericField, TextField};
pub use query::{ExactHit, ExactPage, ExactQuery, FieldFilter, SemanticHit, SortKey, TextBoost};
pub use vehicle::Vehicle;
