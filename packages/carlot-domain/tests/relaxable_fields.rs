use carlot_config::{FIELD_ALIASES, RELAXABLE_FIELDS, canonical_field_name};
use carlot_domain::CriteriaField;

#[test]
fn configured_relaxable_names_map_to_relaxable_fields() {
	for name in RELAXABLE_FIELDS {
		let field = CriteriaField::parse(name)
			.unwrap_or_else(|| panic!("Relaxable name '{name}' must parse."));

		assert!(field.is_relaxable(), "Field '{name}' must be relaxable.");
		assert_eq!(field.as_str(), name);
	}
}

#[test]
fn relaxable_fields_are_listed_in_config() {
	for field in CriteriaField::ALL.into_iter().filter(|field| field.is_relaxable()) {
		assert!(RELAXABLE_FIELDS.contains(&field.as_str()), "Field '{field}' must be configurable.");
	}
}

#[test]
fn config_aliases_match_criteria_aliases() {
	for (alias, canonical) in FIELD_ALIASES {
		let field = CriteriaField::parse(alias)
			.unwrap_or_else(|| panic!("Alias '{alias}' must parse."));

		assert_eq!(field.as_str(), canonical);
		assert_eq!(canonical_field_name(alias), canonical);
	}
}
