use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Field names the relaxation priority list may reference, in default order.
pub const RELAXABLE_FIELDS: [&str; 9] = [
	"color",
	"interior_color",
	"features",
	"transmission",
	"fuel_type",
	"max_price",
	"min_year",
	"body_type",
	"brand",
];
/// Alternative spellings accepted wherever a criteria field is named.
pub const FIELD_ALIASES: [(&str, &str); 5] = [
	("gearbox", "transmission"),
	("category", "body_type"),
	("body_category", "body_type"),
	("options", "features"),
	("vin", "identifier_code"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backends: Backends,
	#[serde(default)]
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub relaxation: Relaxation,
	#[serde(default)]
	pub recommendations: Recommendations,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backends {
	pub exact: ExactBackend,
	pub semantic: Option<SemanticBackend>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExactBackend {
	/// One of "elasticsearch" or "memory".
	pub kind: String,
	pub url: Option<String>,
	pub index: Option<String>,
	/// JSON array of vehicles, required when `kind = "memory"`.
	pub inventory_path: Option<PathBuf>,
	#[serde(default = "default_backend_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SemanticBackend {
	#[serde(default = "default_true")]
	pub enabled: bool,
	/// One of "qdrant" or "memory".
	pub kind: String,
	pub url: Option<String>,
	pub collection: Option<String>,
	pub inventory_path: Option<PathBuf>,
	#[serde(default = "default_semantic_top_k")]
	pub top_k: u32,
	#[serde(default = "default_backend_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Providers {
	pub embedding: Option<EmbeddingProviderConfig>,
	pub selector: Option<LlmProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub hybrid_default: bool,
	pub default_limit: u32,
	pub max_limit: u32,
	/// Size of the merged list in hybrid mode.
	pub merge_limit: u32,
	/// Trust multiplier applied to exact scores before merging.
	pub exact_boost: f32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			hybrid_default: false,
			default_limit: 20,
			max_limit: 100,
			merge_limit: 20,
			exact_boost: 1.2,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Relaxation {
	pub enabled: bool,
	#[serde(alias = "maxSteps")]
	pub max_steps: u32,
	pub priority: Vec<String>,
	pub rules: RelaxationRules,
	#[serde(alias = "yearFloor")]
	pub year_floor: i32,
	#[serde(alias = "selectorTimeoutMs")]
	pub selector_timeout_ms: u64,
}
impl Default for Relaxation {
	fn default() -> Self {
		Self {
			enabled: true,
			max_steps: 5,
			priority: [
				"color",
				"features",
				"transmission",
				"fuel_type",
				"max_price",
				"min_year",
				"body_type",
				"brand",
			]
			.map(str::to_string)
			.to_vec(),
			rules: RelaxationRules::default(),
			year_floor: 2000,
			selector_timeout_ms: 1_500,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelaxationRules {
	pub price: PriceRule,
	pub year: YearRule,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriceRule {
	#[serde(alias = "increasePercent")]
	pub increase_percent: f64,
	#[serde(alias = "maxIncreasePercent")]
	pub max_increase_percent: f64,
}
impl Default for PriceRule {
	fn default() -> Self {
		Self { increase_percent: 20.0, max_increase_percent: 50.0 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct YearRule {
	#[serde(alias = "decreaseYears")]
	pub decrease_years: i32,
	#[serde(alias = "maxDecreaseYears")]
	pub max_decrease_years: i32,
}
impl Default for YearRule {
	fn default() -> Self {
		Self { decrease_years: 2, max_decrease_years: 5 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Recommendations {
	pub enabled: bool,
	#[serde(alias = "maxResults")]
	pub max_results: u32,
	/// Upper bound on the inventory sample scored by the fallback.
	pub sample_size: u32,
	pub top_alternatives: u32,
}
impl Default for Recommendations {
	fn default() -> Self {
		Self { enabled: true, max_results: 5, sample_size: 500, top_alternatives: 3 }
	}
}

fn default_true() -> bool {
	true
}

fn default_backend_timeout_ms() -> u64 {
	5_000
}

fn default_semantic_top_k() -> u32 {
	20
}
