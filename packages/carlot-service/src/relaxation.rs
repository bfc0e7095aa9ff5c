use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use carlot_config::{Relaxation, Search};
use carlot_domain::{CriteriaField, ExactPage, SearchCriteria};

use crate::{Backends, ConstraintSelector, Error, Result, exact};

const MAX_STEPS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelaxationRule {
	/// Raise the bound by `step_percent` per step, never past `max_percent` above the original.
	IncreasePercent { step_percent: f64, max_percent: f64 },
	/// Lower the bound by `step` per step, never more than `max_total` below the original and
	/// never under `floor`.
	DecreaseBy { step: f64, max_total: f64, floor: f64 },
	/// Remove the constraint together with the fields that depend on it.
	Drop { cascade: Vec<CriteriaField> },
}

/// One applied relaxation, in application order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxationStep {
	pub index: u32,
	pub field: CriteriaField,
	pub old_value: Option<Value>,
	pub new_value: Option<Value>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub cascaded: Vec<CriteriaField>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelaxationState {
	Success { page: ExactPage },
	Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationRun {
	pub state: RelaxationState,
	/// The last working copy; equal to the original when no step applied.
	pub criteria: SearchCriteria,
	pub history: Vec<RelaxationStep>,
}

/// Per-field relaxation rules in priority order, built once per configuration snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationPolicy {
	pub priority: Vec<CriteriaField>,
	pub max_steps: u32,
	pub selector_timeout: Duration,
	price: RelaxationRule,
	year: RelaxationRule,
}
impl RelaxationPolicy {
	pub fn from_config(cfg: &Relaxation) -> Self {
		let priority = cfg
			.priority
			.iter()
			.filter_map(|name| {
				let field = CriteriaField::parse(name).filter(|field| field.is_relaxable());

				if field.is_none() {
					tracing::warn!(field = %name, "Ignoring unknown relaxation priority entry.");
				}

				field
			})
			.collect();

		Self {
			priority,
			max_steps: cfg.max_steps.min(MAX_STEPS),
			selector_timeout: Duration::from_millis(cfg.selector_timeout_ms),
			price: RelaxationRule::IncreasePercent {
				step_percent: cfg.rules.price.increase_percent,
				max_percent: cfg.rules.price.max_increase_percent,
			},
			year: RelaxationRule::DecreaseBy {
				step: f64::from(cfg.rules.year.decrease_years),
				max_total: f64::from(cfg.rules.year.max_decrease_years),
				floor: f64::from(cfg.year_floor),
			},
		}
	}

	/// Step budget for one search. A caller-supplied value wins but is still bounded.
	pub fn step_budget(&self, requested: Option<u32>) -> u32 {
		requested.unwrap_or(self.max_steps).min(MAX_STEPS)
	}

	pub fn rule_for(&self, field: CriteriaField) -> RelaxationRule {
		match field {
			CriteriaField::MaxPrice => self.price.clone(),
			CriteriaField::MinYear => self.year.clone(),
			CriteriaField::Brand => RelaxationRule::Drop { cascade: vec![CriteriaField::Model] },
			_ => RelaxationRule::Drop { cascade: Vec::new() },
		}
	}

	/// Priority fields whose rule would still change `working`.
	pub fn eligible_fields(
		&self,
		working: &SearchCriteria,
		original: &SearchCriteria,
	) -> Vec<CriteriaField> {
		self.priority
			.iter()
			.copied()
			.filter(|field| self.apply(*field, working, original).is_some())
			.collect()
	}

	/// Relaxed copy of `working` and the fields dropped alongside `field`.
	///
	/// Numeric caps are measured against `original`, so repeated steps never compound past them.
	/// Returns `None` when the field is absent or already at its limit.
	pub fn apply(
		&self,
		field: CriteriaField,
		working: &SearchCriteria,
		original: &SearchCriteria,
	) -> Option<(SearchCriteria, Vec<CriteriaField>)> {
		match self.rule_for(field) {
			RelaxationRule::IncreasePercent { step_percent, max_percent } => {
				let (numeric, side) = field.numeric_bound()?;
				let current = working.bound(numeric, side)?;
				let base = original.bound(numeric, side)?;
				let cap = base * (1.0 + max_percent / 100.0);
				let next = (current * (1.0 + step_percent / 100.0)).round().min(cap.floor());

				if next <= current {
					return None;
				}

				let mut relaxed = working.clone();

				relaxed.set(field, &Value::from(next)).ok()?;

				Some((relaxed, Vec::new()))
			},
			RelaxationRule::DecreaseBy { step, max_total, floor } => {
				let (numeric, side) = field.numeric_bound()?;
				let current = working.bound(numeric, side)?;
				let base = original.bound(numeric, side)?;
				let lowest = (base - max_total).max(floor);
				let next = (current - step).max(lowest).ceil();

				if next >= current {
					return None;
				}

				let mut relaxed = working.clone();

				relaxed.set(field, &Value::from(next)).ok()?;

				Some((relaxed, Vec::new()))
			},
			RelaxationRule::Drop { cascade } => {
				if !working.has(field) {
					return None;
				}

				let mut relaxed = working.without(field);
				let cascaded: Vec<CriteriaField> =
					cascade.into_iter().filter(|dependent| relaxed.has(*dependent)).collect();

				for dependent in &cascaded {
					relaxed.remove(*dependent);
				}

				Some((relaxed, cascaded))
			},
		}
	}

	/// Loosens `original` one field at a time until the exact backend returns something, the
	/// step budget runs out, or nothing is left to relax.
	pub async fn relax(
		&self,
		backends: &Backends,
		search: &Search,
		original: &SearchCriteria,
		free_text: Option<&str>,
		max_steps: u32,
		cancel: &CancellationToken,
	) -> Result<RelaxationRun> {
		let mut working = original.clone();
		let mut history: Vec<RelaxationStep> = Vec::new();

		for index in 1..=max_steps {
			if cancel.is_cancelled() {
				return Err(Error::Cancelled);
			}

			let eligible = self.eligible_fields(&working, original);

			if eligible.is_empty() {
				break;
			}

			let answer = if eligible.len() > 1 {
				self.ask_selector(backends.selector.as_deref(), &working, free_text, &eligible)
					.await
			} else {
				None
			};
			let Some(field) = choose_field(&eligible, answer.as_deref()) else { break };
			let Some((relaxed, cascaded)) = self.apply(field, &working, original) else { break };
			let added = relaxed.added_constraints(original);

			if !added.is_empty() {
				let added: Vec<&str> = added.iter().map(|field| field.as_str()).collect();

				tracing::error!(
					field = field.as_str(),
					added = ?added,
					"Relaxation produced a constraint absent from the original criteria."
				);

				return Err(Error::Internal {
					message: format!("Relaxing {field} added constraints: {}.", added.join(", ")),
				});
			}

			let step = RelaxationStep {
				index,
				field,
				old_value: working.get(field),
				new_value: relaxed.get(field),
				cascaded,
			};

			tracing::info!(
				step = index,
				field = field.as_str(),
				old_value = ?step.old_value,
				new_value = ?step.new_value,
				"Relaxed search constraint."
			);

			history.push(step);

			working = relaxed;

			let page = exact::search(backends.exact.as_ref(), search, &working, free_text, cancel)
				.await?;

			if page.total > 0 {
				return Ok(RelaxationRun {
					state: RelaxationState::Success { page },
					criteria: working,
					history,
				});
			}
		}

		Ok(RelaxationRun { state: RelaxationState::Exhausted, criteria: working, history })
	}

	async fn ask_selector(
		&self,
		selector: Option<&dyn ConstraintSelector>,
		working: &SearchCriteria,
		free_text: Option<&str>,
		eligible: &[CriteriaField],
	) -> Option<String> {
		let selector = selector?;
		let candidates: Vec<String> =
			eligible.iter().map(|field| field.as_str().to_string()).collect();

		match tokio::time::timeout(
			self.selector_timeout,
			selector.select(working, free_text, &candidates),
		)
		.await
		{
			Ok(Ok(answer)) => answer,
			Ok(Err(err)) => {
				tracing::warn!(error = %err, "Constraint selector failed. Using static priority.");

				None
			},
			Err(_) => {
				let err = Error::ClassifierTimeout {
					timeout_ms: self.selector_timeout.as_millis() as u64,
				};

				tracing::warn!(error = %err, "Constraint selector timed out. Using static priority.");

				None
			},
		}
	}
}

/// Picks the selector's field when it names an eligible one, otherwise the first eligible field.
pub fn choose_field(eligible: &[CriteriaField], answer: Option<&str>) -> Option<CriteriaField> {
	let answer = answer.map(|answer| answer.trim().to_ascii_lowercase()).unwrap_or_default();

	if !answer.is_empty() {
		if let Some(field) = CriteriaField::parse(&answer).filter(|field| eligible.contains(field)) {
			return Some(field);
		}
		if let Some(field) = eligible
			.iter()
			.find(|field| answer.contains(field.as_str()) || field.as_str().contains(&answer))
		{
			return Some(*field);
		}

		tracing::info!(answer = %answer, "Selector answer names no eligible field.");
	}

	eligible.first().copied()
}
