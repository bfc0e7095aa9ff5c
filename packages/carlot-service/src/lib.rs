pub mod backends;
pub mod exact;
pub mod merge;
pub mod recommend;
pub mod relaxation;
pub mod search;
pub mod semantic;

mod error;

pub use error::{Error, Result};
pub use merge::{Origin, ScoredItem};
pub use recommend::{
	AlternativeCriteria, ClosestMatch, FieldExplanation, GapStatement, Recommendations, ValueCount,
};
pub use relaxation::{RelaxationPolicy, RelaxationRule, RelaxationStep};
pub use search::{SearchOutcome, SearchRequest, SearchService, Snapshot};

use std::{future::Future, pin::Pin, sync::Arc};

use carlot_domain::{ExactPage, ExactQuery, SearchCriteria, SemanticHit, TextField, Vehicle};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Structured index returning filter-exact matches with relevance scores.
pub trait ExactSearch
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, query: &'a ExactQuery) -> BoxFuture<'a, color_eyre::Result<ExactPage>>;
}

/// Similarity index. Callers treat failures as an empty contribution.
pub trait SemanticSearch
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		text: &'a str,
		filters: &'a [(TextField, String)],
		top_k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SemanticHit>>>;
}

/// Best-effort delegate suggesting which constraint to relax next.
pub trait ConstraintSelector
where
	Self: Send + Sync,
{
	fn select<'a>(
		&'a self,
		criteria: &'a SearchCriteria,
		free_text: Option<&'a str>,
		candidates: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Option<String>>>;
}

/// Candidate pool for recommendation scoring.
pub trait InventorySample
where
	Self: Send + Sync,
{
	fn sample(&self, limit: u32) -> BoxFuture<'_, color_eyre::Result<Vec<Vehicle>>>;
}

#[derive(Clone)]
pub struct Backends {
	pub exact: Arc<dyn ExactSearch>,
	pub semantic: Option<Arc<dyn SemanticSearch>>,
	pub selector: Option<Arc<dyn ConstraintSelector>>,
	pub inventory: Arc<dyn InventorySample>,
}
impl Backends {
	pub fn new(exact: Arc<dyn ExactSearch>, inventory: Arc<dyn InventorySample>) -> Self {
		Self { exact, semantic: None, selector: None, inventory }
	}

	pub fn with_semantic(mut self, semantic: Arc<dyn SemanticSearch>) -> Self {
		self.semantic = Some(semantic);

		self
	}

	pub fn with_selector(mut self, selector: Arc<dyn ConstraintSelector>) -> Self {
		self.selector = Some(selector);

		self
	}
}
