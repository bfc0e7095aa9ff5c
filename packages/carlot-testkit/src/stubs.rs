use std::{
	future,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use color_eyre::eyre;
use tokio_util::sync::CancellationToken;

use carlot_domain::{ExactPage, ExactQuery, SearchCriteria, SemanticHit, TextField, Vehicle};
use carlot_service::{BoxFuture, ConstraintSelector, ExactSearch, InventorySample, SemanticSearch};

/// Returns the same page for every query and counts the calls.
#[derive(Default)]
pub struct FixedExact {
	page: ExactPage,
	calls: AtomicUsize,
}
impl FixedExact {
	pub fn new(page: ExactPage) -> Self {
		Self { page, calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl ExactSearch for FixedExact {
	fn search<'a>(&'a self, _: &'a ExactQuery) -> BoxFuture<'a, color_eyre::Result<ExactPage>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move { Ok(self.page.clone()) })
	}
}

pub struct FailingExact;
impl ExactSearch for FailingExact {
	fn search<'a>(&'a self, _: &'a ExactQuery) -> BoxFuture<'a, color_eyre::Result<ExactPage>> {
		Box::pin(async { Err(eyre::eyre!("Exact index refused the connection.")) })
	}
}

/// Cancels the caller's token while answering with an empty page, so cancellation lands between
/// relaxation steps.
pub struct CancellingExact {
	cancel: CancellationToken,
	calls: AtomicUsize,
}
impl CancellingExact {
	pub fn new(cancel: CancellationToken) -> Self {
		Self { cancel, calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl ExactSearch for CancellingExact {
	fn search<'a>(&'a self, _: &'a ExactQuery) -> BoxFuture<'a, color_eyre::Result<ExactPage>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			self.cancel.cancel();

			Ok(ExactPage::default())
		})
	}
}

/// Never answers. Used to observe cancellation.
pub struct PendingExact;
impl ExactSearch for PendingExact {
	fn search<'a>(&'a self, _: &'a ExactQuery) -> BoxFuture<'a, color_eyre::Result<ExactPage>> {
		Box::pin(future::pending())
	}
}

pub struct FixedSemantic {
	hits: Vec<SemanticHit>,
}
impl FixedSemantic {
	pub fn new(hits: Vec<SemanticHit>) -> Self {
		Self { hits }
	}
}
impl SemanticSearch for FixedSemantic {
	fn search<'a>(
		&'a self,
		_: &'a str,
		_: &'a [(TextField, String)],
		top_k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SemanticHit>>> {
		Box::pin(async move { Ok(self.hits.iter().take(top_k as usize).cloned().collect()) })
	}
}

pub struct FailingSemantic;
impl SemanticSearch for FailingSemantic {
	fn search<'a>(
		&'a self,
		_: &'a str,
		_: &'a [(TextField, String)],
		_: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SemanticHit>>> {
		Box::pin(async { Err(eyre::eyre!("Similarity index timed out.")) })
	}
}

/// Answers with a fixed field name after an optional delay.
pub struct FixedSelector {
	answer: Option<String>,
	delay: Duration,
	calls: Arc<AtomicUsize>,
}
impl FixedSelector {
	pub fn new(answer: Option<&str>) -> Self {
		Self { answer: answer.map(str::to_string), delay: Duration::ZERO, calls: Arc::default() }
	}

	pub fn slow(answer: Option<&str>, delay: Duration) -> Self {
		Self { delay, ..Self::new(answer) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl ConstraintSelector for FixedSelector {
	fn select<'a>(
		&'a self,
		_: &'a SearchCriteria,
		_: Option<&'a str>,
		_: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Option<String>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			if !self.delay.is_zero() {
				tokio::time::sleep(self.delay).await;
			}

			Ok(self.answer.clone())
		})
	}
}

pub struct FailingSelector;
impl ConstraintSelector for FailingSelector {
	fn select<'a>(
		&'a self,
		_: &'a SearchCriteria,
		_: Option<&'a str>,
		_: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Option<String>>> {
		Box::pin(async { Err(eyre::eyre!("Selector model is overloaded.")) })
	}
}

/// Fixed candidate pool, possibly empty.
pub struct FixedInventory {
	vehicles: Vec<Vehicle>,
}
impl FixedInventory {
	pub fn new(vehicles: Vec<Vehicle>) -> Self {
		Self { vehicles }
	}
}
impl InventorySample for FixedInventory {
	fn sample(&self, limit: u32) -> BoxFuture<'_, color_eyre::Result<Vec<Vehicle>>> {
		Box::pin(async move { Ok(self.vehicles.iter().take(limit as usize).cloned().collect()) })
	}
}

pub struct FailingInventory;
impl InventorySample for FailingInventory {
	fn sample(&self, _: u32) -> BoxFuture<'_, color_eyre::Result<Vec<Vehicle>>> {
		Box::pin(async { Err(eyre::eyre!("Inventory sample failed.")) })
	}
}
