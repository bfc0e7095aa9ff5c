mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Backends, Config, EmbeddingProviderConfig, ExactBackend, FIELD_ALIASES, LlmProviderConfig,
	PriceRule, Providers, RELAXABLE_FIELDS, Recommendations, Relaxation, RelaxationRules, Search,
	SemanticBackend, Service, YearRule,
};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	validate_exact_backend(cfg)?;
	validate_semantic_backend(cfg)?;

	if let Some(selector) = cfg.providers.selector.as_ref()
		&& selector.api_key.trim().is_empty()
	{
		return Err(Error::Validation {
			message: "providers.selector.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.search.default_limit == 0 {
		return Err(Error::Validation {
			message: "search.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_limit < cfg.search.default_limit {
		return Err(Error::Validation {
			message: "search.max_limit must be at least search.default_limit.".to_string(),
		});
	}
	if cfg.search.merge_limit == 0 {
		return Err(Error::Validation {
			message: "search.merge_limit must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.exact_boost.is_finite() || cfg.search.exact_boost <= 0.0 {
		return Err(Error::Validation {
			message: "search.exact_boost must be a finite number greater than zero.".to_string(),
		});
	}

	validate_relaxation(cfg)?;

	if cfg.recommendations.max_results == 0 {
		return Err(Error::Validation {
			message: "recommendations.max_results must be greater than zero.".to_string(),
		});
	}
	if cfg.recommendations.sample_size == 0 {
		return Err(Error::Validation {
			message: "recommendations.sample_size must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_exact_backend(cfg: &Config) -> Result<()> {
	let exact = &cfg.backends.exact;

	match exact.kind.as_str() {
		"elasticsearch" => {
			for (label, value) in
				[("backends.exact.url", &exact.url), ("backends.exact.index", &exact.index)]
			{
				if value.is_none() {
					return Err(Error::Validation {
						message: format!("{label} is required for the elasticsearch backend."),
					});
				}
			}
		},
		"memory" =>
			if exact.inventory_path.is_none() {
				return Err(Error::Validation {
					message: "backends.exact.inventory_path is required for the memory backend."
						.to_string(),
				});
			},
		_ => {
			return Err(Error::Validation {
				message: "backends.exact.kind must be one of elasticsearch or memory.".to_string(),
			});
		},
	}

	if exact.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backends.exact.timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_semantic_backend(cfg: &Config) -> Result<()> {
	let Some(semantic) = cfg.backends.semantic.as_ref() else { return Ok(()) };

	if !semantic.enabled {
		return Ok(());
	}

	match semantic.kind.as_str() {
		"qdrant" => {
			if semantic.url.is_none() || semantic.collection.is_none() {
				return Err(Error::Validation {
					message: "backends.semantic.url and backends.semantic.collection are required for the qdrant backend."
						.to_string(),
				});
			}

			let Some(embedding) = cfg.providers.embedding.as_ref() else {
				return Err(Error::Validation {
					message: "providers.embedding is required for the qdrant semantic backend."
						.to_string(),
				});
			};

			if embedding.dimensions == 0 {
				return Err(Error::Validation {
					message: "providers.embedding.dimensions must be greater than zero."
						.to_string(),
				});
			}
			if embedding.api_key.trim().is_empty() {
				return Err(Error::Validation {
					message: "providers.embedding.api_key must be non-empty.".to_string(),
				});
			}
		},
		"memory" =>
			if semantic.inventory_path.is_none() {
				return Err(Error::Validation {
					message:
						"backends.semantic.inventory_path is required for the memory backend."
							.to_string(),
				});
			},
		_ => {
			return Err(Error::Validation {
				message: "backends.semantic.kind must be one of qdrant or memory.".to_string(),
			});
		},
	}

	if semantic.top_k == 0 {
		return Err(Error::Validation {
			message: "backends.semantic.top_k must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_relaxation(cfg: &Config) -> Result<()> {
	let relaxation = &cfg.relaxation;

	if relaxation.max_steps == 0 || relaxation.max_steps > 20 {
		return Err(Error::Validation {
			message: "relaxation.max_steps must be in the range 1-20.".to_string(),
		});
	}

	let mut seen = HashSet::new();

	for name in &relaxation.priority {
		if !RELAXABLE_FIELDS.contains(&name.as_str()) {
			return Err(Error::Validation {
				message: format!(
					"relaxation.priority entry '{name}' is not one of {}.",
					RELAXABLE_FIELDS.join(", ")
				),
			});
		}
		if !seen.insert(name.as_str()) {
			return Err(Error::Validation {
				message: format!("relaxation.priority lists '{name}' more than once."),
			});
		}
	}

	let price = &relaxation.rules.price;

	if !price.increase_percent.is_finite() || price.increase_percent <= 0.0 {
		return Err(Error::Validation {
			message: "relaxation.rules.price.increase_percent must be greater than zero."
				.to_string(),
		});
	}
	if !price.max_increase_percent.is_finite() || price.max_increase_percent < 0.0 {
		return Err(Error::Validation {
			message: "relaxation.rules.price.max_increase_percent must be zero or greater."
				.to_string(),
		});
	}

	let year = &relaxation.rules.year;

	if year.decrease_years <= 0 {
		return Err(Error::Validation {
			message: "relaxation.rules.year.decrease_years must be greater than zero.".to_string(),
		});
	}
	if year.max_decrease_years < 0 {
		return Err(Error::Validation {
			message: "relaxation.rules.year.max_decrease_years must be zero or greater."
				.to_string(),
		});
	}
	if relaxation.selector_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "relaxation.selector_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for value in [&mut cfg.backends.exact.url, &mut cfg.backends.exact.index] {
		if value.as_deref().map(|text| text.trim().is_empty()).unwrap_or(false) {
			*value = None;
		}
	}

	if let Some(semantic) = cfg.backends.semantic.as_mut() {
		for value in [&mut semantic.url, &mut semantic.collection] {
			if value.as_deref().map(|text| text.trim().is_empty()).unwrap_or(false) {
				*value = None;
			}
		}
	}

	for name in &mut cfg.relaxation.priority {
		*name = canonical_field_name(name);
	}
}

/// Lower-cased field name with aliases such as `gearbox` resolved.
pub fn canonical_field_name(name: &str) -> String {
	let name = name.trim().to_ascii_lowercase();

	FIELD_ALIASES
		.iter()
		.find(|(alias, _)| *alias == name)
		.map(|(_, canonical)| canonical.to_string())
		.unwrap_or(name)
}
