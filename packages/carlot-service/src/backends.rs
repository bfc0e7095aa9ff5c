use std::{path::Path, sync::Arc};

use color_eyre::eyre;

use carlot_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use carlot_domain::{ExactPage, ExactQuery, SearchCriteria, SemanticHit, TextField, Vehicle};
use carlot_providers::{embedding, selector};
use carlot_storage::{elastic::ElasticIndex, memory::MemoryIndex, qdrant::QdrantStore};

use crate::{
	Backends, BoxFuture, ConstraintSelector, Error, ExactSearch, InventorySample, Result,
	SemanticSearch,
};

/// Qdrant similarity search over embeddings produced by the configured provider.
pub struct QdrantSemantic {
	store: QdrantStore,
	embedding: EmbeddingProviderConfig,
}
impl QdrantSemantic {
	pub fn new(store: QdrantStore, embedding: EmbeddingProviderConfig) -> Self {
		Self { store, embedding }
	}
}

/// Constraint selector backed by a chat-completion model.
pub struct LlmSelector {
	cfg: LlmProviderConfig,
}
impl LlmSelector {
	pub fn new(cfg: LlmProviderConfig) -> Self {
		Self { cfg }
	}
}

impl ExactSearch for ElasticIndex {
	fn search<'a>(&'a self, query: &'a ExactQuery) -> BoxFuture<'a, color_eyre::Result<ExactPage>> {
		Box::pin(async move { Ok(ElasticIndex::search(self, query).await?) })
	}
}

impl InventorySample for ElasticIndex {
	fn sample(&self, limit: u32) -> BoxFuture<'_, color_eyre::Result<Vec<Vehicle>>> {
		Box::pin(async move { Ok(ElasticIndex::sample(self, limit).await?) })
	}
}

impl ExactSearch for MemoryIndex {
	fn search<'a>(&'a self, query: &'a ExactQuery) -> BoxFuture<'a, color_eyre::Result<ExactPage>> {
		Box::pin(async move { Ok(MemoryIndex::search(self, query)) })
	}
}

impl SemanticSearch for MemoryIndex {
	fn search<'a>(
		&'a self,
		text: &'a str,
		filters: &'a [(TextField, String)],
		top_k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SemanticHit>>> {
		Box::pin(async move { Ok(self.similar(text, filters, top_k)) })
	}
}

impl InventorySample for MemoryIndex {
	fn sample(&self, limit: u32) -> BoxFuture<'_, color_eyre::Result<Vec<Vehicle>>> {
		Box::pin(async move { Ok(MemoryIndex::sample(self, limit)) })
	}
}

impl SemanticSearch for QdrantSemantic {
	fn search<'a>(
		&'a self,
		text: &'a str,
		filters: &'a [(TextField, String)],
		top_k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SemanticHit>>> {
		Box::pin(async move {
			let vectors = embedding::embed(&self.embedding, &[text.to_string()]).await?;
			let vector = vectors
				.into_iter()
				.next()
				.ok_or_else(|| eyre::eyre!("Embedding provider returned no vectors."))?;

			Ok(self.store.search(vector, filters, top_k).await?)
		})
	}
}

impl ConstraintSelector for LlmSelector {
	fn select<'a>(
		&'a self,
		criteria: &'a SearchCriteria,
		free_text: Option<&'a str>,
		candidates: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Option<String>>> {
		Box::pin(async move {
			let criteria = serde_json::to_value(criteria)?;

			selector::select_field(&self.cfg, &criteria, free_text, candidates).await
		})
	}
}

impl Backends {
	/// Builds the backends named by the configuration.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let (exact, inventory) = exact_backend(cfg)?;
		let mut backends = Self::new(exact, inventory);

		if let Some(semantic) = semantic_backend(cfg)? {
			backends = backends.with_semantic(semantic);
		}
		if let Some(selector) = cfg.providers.selector.clone() {
			backends = backends.with_selector(Arc::new(LlmSelector::new(selector)));
		}

		Ok(backends)
	}
}

fn exact_backend(cfg: &Config) -> Result<(Arc<dyn ExactSearch>, Arc<dyn InventorySample>)> {
	let backend = &cfg.backends.exact;

	match backend.kind.as_str() {
		"elasticsearch" => {
			let index = Arc::new(ElasticIndex::new(backend)?);
			let exact: Arc<dyn ExactSearch> = index.clone();
			let inventory: Arc<dyn InventorySample> = index;

			Ok((exact, inventory))
		},
		"memory" => {
			let index = Arc::new(load_inventory(backend.inventory_path.as_deref(), "exact")?);
			let exact: Arc<dyn ExactSearch> = index.clone();
			let inventory: Arc<dyn InventorySample> = index;

			Ok((exact, inventory))
		},
		other => Err(Error::Config { message: format!("Unknown exact backend kind '{other}'.") }),
	}
}

fn semantic_backend(cfg: &Config) -> Result<Option<Arc<dyn SemanticSearch>>> {
	let Some(semantic) = cfg.backends.semantic.as_ref().filter(|semantic| semantic.enabled) else {
		return Ok(None);
	};
	let backend: Arc<dyn SemanticSearch> = match semantic.kind.as_str() {
		"qdrant" => {
			let embedding = cfg.providers.embedding.clone().ok_or_else(|| Error::Config {
				message: "providers.embedding is required for the qdrant semantic backend."
					.to_string(),
			})?;

			Arc::new(QdrantSemantic::new(QdrantStore::new(semantic)?, embedding))
		},
		"memory" => Arc::new(load_inventory(semantic.inventory_path.as_deref(), "semantic")?),
		other =>
			return Err(Error::Config {
				message: format!("Unknown semantic backend kind '{other}'."),
			}),
	};

	Ok(Some(backend))
}

fn load_inventory(path: Option<&Path>, section: &str) -> Result<MemoryIndex> {
	let path = path.ok_or_else(|| Error::Config {
		message: format!("backends.{section}.inventory_path is required for the memory backend."),
	})?;

	Ok(MemoryIndex::load(path)?)
}
