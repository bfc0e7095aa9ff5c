use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use carlot_config::{Config, Search};
use carlot_domain::{ExactPage, InvalidField, SearchCriteria, SemanticHit};

use crate::{
	Backends, Error, Result, exact,
	merge::{self, ScoredItem},
	recommend::{self, Recommendations},
	relaxation::{RelaxationPolicy, RelaxationState, RelaxationStep},
	semantic,
};

const CANCELLED: &str = "Search was cancelled.";
const NO_RESULTS: &str = "No vehicles match the requested criteria.";
const INVENTORY_UNAVAILABLE: &str = "Inventory is unavailable; no recommendations could be made.";
const SEMANTIC_ONLY: &str = "Exact index unavailable; showing similarity matches only.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
	#[serde(default)]
	pub criteria: SearchCriteria,
	#[serde(default)]
	pub free_text: Option<String>,
	/// Falls back to `search.hybrid_default`.
	#[serde(default)]
	pub hybrid: Option<bool>,
	#[serde(default)]
	pub max_relax_steps: Option<u32>,
	#[serde(default)]
	pub preferences: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
	pub search_id: Uuid,
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	pub degraded: bool,
	pub items: Vec<ScoredItem>,
	pub total: u64,
	pub relaxation_applied: bool,
	pub relaxation_steps: u32,
	pub relaxation_history: Vec<RelaxationStep>,
	pub relaxed_criteria: Option<SearchCriteria>,
	pub original_criteria: SearchCriteria,
	pub recommendations: Option<Recommendations>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub dropped_fields: Vec<InvalidField>,
}
impl SearchOutcome {
	fn new(search_id: Uuid, original_criteria: SearchCriteria) -> Self {
		Self {
			search_id,
			success: false,
			message: None,
			degraded: false,
			items: Vec::new(),
			total: 0,
			relaxation_applied: false,
			relaxation_steps: 0,
			relaxation_history: Vec::new(),
			relaxed_criteria: None,
			original_criteria,
			recommendations: None,
			dropped_fields: Vec::new(),
		}
	}
}

/// Immutable configuration view shared by every search started while it is current.
#[derive(Debug, Clone)]
pub struct Snapshot {
	pub cfg: Config,
	pub policy: RelaxationPolicy,
}
impl Snapshot {
	pub fn new(cfg: Config) -> Self {
		let policy = RelaxationPolicy::from_config(&cfg.relaxation);

		Self { cfg, policy }
	}
}

pub struct SearchService {
	snapshot: RwLock<Arc<Snapshot>>,
	backends: Backends,
}
impl SearchService {
	pub fn new(cfg: Config, backends: Backends) -> Self {
		Self { snapshot: RwLock::new(Arc::new(Snapshot::new(cfg))), backends }
	}

	pub fn snapshot(&self) -> Arc<Snapshot> {
		self.snapshot.read().unwrap_or_else(PoisonError::into_inner).clone()
	}

	/// Installs a new configuration. Searches already running keep their snapshot.
	pub fn reload(&self, cfg: Config) {
		let snapshot = Arc::new(Snapshot::new(cfg));

		*self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;

		tracing::info!("Search configuration reloaded.");
	}

	/// Resolves one request. Expected failures become an unsuccessful outcome; only internal
	/// invariant violations are returned as errors.
	pub async fn search(
		&self,
		req: SearchRequest,
		cancel: &CancellationToken,
	) -> Result<SearchOutcome> {
		let snapshot = self.snapshot();
		let search_id = Uuid::new_v4();
		let (original, dropped) = exact::sanitize(&req.criteria);
		let mut outcome = SearchOutcome::new(search_id, original.clone());

		outcome.dropped_fields = dropped;

		match self.run(&snapshot, &req, &original, &mut outcome, cancel).await {
			Ok(()) => {},
			Err(Error::Cancelled) => {
				outcome = SearchOutcome {
					message: Some(CANCELLED.to_string()),
					..SearchOutcome::new(search_id, original)
				};
			},
			Err(err @ Error::BackendUnavailable { .. }) => {
				tracing::warn!(error = %err, %search_id, "Search degraded.");

				outcome.success = false;
				outcome.degraded = true;
				outcome.items.clear();
				outcome.total = 0;
				outcome.message = Some(err.to_string());
			},
			Err(err) => {
				tracing::error!(error = %err, %search_id, "Search failed with an internal error.");

				return Err(err);
			},
		}

		tracing::info!(
			%search_id,
			success = outcome.success,
			degraded = outcome.degraded,
			items = outcome.items.len(),
			total = outcome.total,
			relaxation_steps = outcome.relaxation_steps,
			"Search completed."
		);

		Ok(outcome)
	}

	async fn run(
		&self,
		snapshot: &Snapshot,
		req: &SearchRequest,
		original: &SearchCriteria,
		outcome: &mut SearchOutcome,
		cancel: &CancellationToken,
	) -> Result<()> {
		let cfg = &snapshot.cfg;
		let free_text = req.free_text.as_deref().map(str::trim).filter(|text| !text.is_empty());
		let semantic_backend = self.backends.semantic.as_deref();
		let hybrid = req.hybrid.unwrap_or(cfg.search.hybrid_default) && semantic_backend.is_some();
		let exact_backend = self.backends.exact.as_ref();
		let (exact_result, semantic_hits) = if hybrid {
			let top_k = cfg
				.backends
				.semantic
				.as_ref()
				.map(|semantic| semantic.top_k)
				.unwrap_or(cfg.search.merge_limit);

			tokio::join!(
				exact::search(exact_backend, &cfg.search, original, free_text, cancel),
				semantic::search(
					semantic_backend,
					top_k,
					original,
					free_text,
					&req.preferences,
					cancel,
				),
			)
		} else {
			(exact::search(exact_backend, &cfg.search, original, free_text, cancel).await, Vec::new())
		};
		let page = match exact_result {
			Ok(page) => page,
			Err(err @ Error::BackendUnavailable { .. }) if !semantic_hits.is_empty() => {
				tracing::warn!(error = %err, "Exact backend unavailable. Serving similarity matches.");

				outcome.items = merge::merge(
					&[],
					&semantic_hits,
					cfg.search.exact_boost,
					cfg.search.merge_limit as usize,
				);
				outcome.total = outcome.items.len() as u64;
				outcome.success = true;
				outcome.degraded = true;
				outcome.message = Some(SEMANTIC_ONLY.to_string());

				return Ok(());
			},
			Err(err) => return Err(err),
		};

		if page.total > 0 {
			outcome.items = result_items(&page, &semantic_hits, hybrid, &cfg.search);
			outcome.total = page.total;
			outcome.success = true;

			return merge::ensure_unique_ids(&outcome.items);
		}

		let max_steps = snapshot.policy.step_budget(req.max_relax_steps);

		if cfg.relaxation.enabled && max_steps > 0 {
			let run = snapshot
				.policy
				.relax(&self.backends, &cfg.search, original, free_text, max_steps, cancel)
				.await?;

			outcome.relaxation_steps = run.history.len() as u32;
			outcome.relaxation_history = run.history;

			if let RelaxationState::Success { page } = run.state {
				outcome.items = result_items(&page, &semantic_hits, hybrid, &cfg.search);
				outcome.total = page.total;
				outcome.success = true;
				outcome.relaxation_applied = true;
				outcome.relaxed_criteria = Some(run.criteria);
				outcome.message = Some(format!(
					"No exact matches; showing results after {} relaxation step(s).",
					outcome.relaxation_steps
				));

				return merge::ensure_unique_ids(&outcome.items);
			}
		}

		if cancel.is_cancelled() {
			return Err(Error::Cancelled);
		}
		if !cfg.recommendations.enabled {
			outcome.message = Some(NO_RESULTS.to_string());

			return Ok(());
		}

		let recommendations = self.recommendations(cfg, original, free_text, cancel).await?;

		outcome.message = Some(recommendations.message.clone());
		outcome.recommendations = Some(recommendations);

		Ok(())
	}

	async fn recommendations(
		&self,
		cfg: &Config,
		original: &SearchCriteria,
		free_text: Option<&str>,
		cancel: &CancellationToken,
	) -> Result<Recommendations> {
		let sample = tokio::select! {
			biased;
			_ = cancel.cancelled() => return Err(Error::Cancelled),
			result = self.backends.inventory.sample(cfg.recommendations.sample_size) => result,
		};

		match sample {
			Ok(pool) => Ok(recommend::recommend(&pool, original, free_text, &cfg.recommendations)),
			Err(err) => {
				tracing::warn!(error = %err, "Inventory sample failed. Returning empty recommendations.");

				Ok(Recommendations::unavailable(INVENTORY_UNAVAILABLE))
			},
		}
	}
}

fn result_items(
	page: &ExactPage,
	semantic_hits: &[SemanticHit],
	hybrid: bool,
	cfg: &Search,
) -> Vec<ScoredItem> {
	if hybrid {
		merge::merge(&page.hits, semantic_hits, cfg.exact_boost, cfg.merge_limit as usize)
	} else {
		merge::exact_items(&page.hits, cfg.exact_boost)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use serde_json::json;
	use tokio_util::sync::CancellationToken;

	use carlot_config::{
		Backends as BackendConfig, Config, ExactBackend, Providers, Recommendations, Relaxation,
		Search, Service,
	};
	use carlot_domain::{SearchCriteria, Vehicle};
	use carlot_storage::memory::MemoryIndex;

	use crate::{
		Backends,
		search::{SearchRequest, SearchService},
	};

	fn config() -> Config {
		Config {
			service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
			backends: BackendConfig {
				exact: ExactBackend {
					kind: "memory".to_string(),
					url: None,
					index: None,
					inventory_path: None,
					timeout_ms: 1_000,
				},
				semantic: None,
			},
			providers: Providers::default(),
			search: Search::default(),
			relaxation: Relaxation::default(),
			recommendations: Recommendations::default(),
		}
	}

	fn service(cfg: Config) -> SearchService {
		let index = Arc::new(MemoryIndex::new(vec![Vehicle {
			id: 1,
			brand: Some("Yota".to_string()),
			price: Some(900_000.0),
			year: Some(2019),
			..Default::default()
		}]));

		SearchService::new(cfg, Backends::new(index.clone(), index))
	}

	fn request(criteria: serde_json::Value) -> SearchRequest {
		SearchRequest { criteria: SearchCriteria::from_json(&criteria).0, ..Default::default() }
	}

	#[test]
	fn reload_leaves_held_snapshots_untouched() {
		let service = service(config());
		let before = service.snapshot();
		let mut next = config();

		next.relaxation.max_steps = 2;
		service.reload(next);

		assert_eq!(before.policy.max_steps, 5);
		assert_eq!(service.snapshot().policy.max_steps, 2);
	}

	#[tokio::test]
	async fn disabled_relaxation_goes_straight_to_recommendations() {
		let mut cfg = config();

		cfg.relaxation.enabled = false;

		let outcome = service(cfg)
			.search(request(json!({"brand": "Zeta"})), &CancellationToken::new())
			.await
			.expect("Search must not fail.");

		assert!(!outcome.success);
		assert_eq!(outcome.relaxation_steps, 0);
		assert!(outcome.recommendations.is_some());
	}

	#[tokio::test]
	async fn disabled_recommendations_return_no_payload() {
		let mut cfg = config();

		cfg.recommendations.enabled = false;

		let outcome = service(cfg)
			.search(request(json!({"city": "Nowhere"})), &CancellationToken::new())
			.await
			.expect("Search must not fail.");

		assert!(!outcome.success);
		assert!(outcome.recommendations.is_none());
		assert!(outcome.message.is_some());
	}

	#[tokio::test]
	async fn malformed_fields_are_reported_not_raised() {
		let outcome = service(config())
			.search(
				request(json!({"min_price": 2_000_000, "max_price": 1_000_000})),
				&CancellationToken::new(),
			)
			.await
			.expect("Search must not fail.");

		assert!(outcome.success);
		assert_eq!(outcome.dropped_fields.len(), 2);
		assert!(outcome.original_criteria.price.is_empty());
	}
}
