use std::{sync::Arc, time::Duration};

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use carlot_config::Search;
use carlot_domain::{CriteriaField, ExactHit, ExactPage, SearchCriteria, SemanticHit};
use carlot_service::{Backends, Origin, SearchOutcome, SearchRequest, SearchService, exact};
use carlot_storage::memory::MemoryIndex;
use carlot_testkit::{
	inventory, memory_backends, memory_service,
	stubs::{
		CancellingExact, FailingExact, FailingInventory, FailingSelector, FailingSemantic,
		FixedExact, FixedInventory, FixedSelector, FixedSemantic, PendingExact,
	},
	test_config, vehicle,
};

fn criteria(value: Value) -> SearchCriteria {
	let (criteria, invalid) = SearchCriteria::from_json(&value);

	assert!(invalid.is_empty(), "Unexpected invalid fields: {invalid:?}");

	criteria
}

fn request(value: Value) -> SearchRequest {
	SearchRequest { criteria: criteria(value), ..Default::default() }
}

async fn run(service: &SearchService, req: SearchRequest) -> SearchOutcome {
	service.search(req, &CancellationToken::new()).await.expect("Search must not fail.")
}

fn ids(outcome: &SearchOutcome) -> Vec<u64> {
	outcome.items.iter().map(|item| item.id).collect()
}

#[tokio::test]
async fn non_empty_exact_results_match_a_direct_query() {
	let service = memory_service(inventory());
	let index = MemoryIndex::new(inventory());

	for value in [
		json!({}),
		json!({"body_type": "suv"}),
		json!({"max_price": 2_000_000, "sort": "-year"}),
		json!({"brand": "Yota", "superlative": "most expensive"}),
	] {
		let criteria = criteria(value);
		let outcome = run(
			&service,
			SearchRequest { criteria: criteria.clone(), hybrid: Some(false), ..Default::default() },
		)
		.await;
		let direct = index.search(&exact::plan(&criteria, None, &Search::default()));
		let direct_ids: Vec<u64> = direct.hits.iter().map(|hit| hit.id).collect();

		assert!(outcome.success);
		assert!(!outcome.relaxation_applied);
		assert_eq!(outcome.relaxation_steps, 0);
		assert_eq!(ids(&outcome), direct_ids);
		assert_eq!(outcome.total, direct.total);
	}
}

#[tokio::test]
async fn dropping_the_selected_brand_recovers_results() {
	let backends = memory_backends(inventory())
		.with_selector(Arc::new(FixedSelector::new(Some("brand"))));
	let service = SearchService::new(test_config(), backends);
	let outcome = run(&service, request(json!({"max_price": 1_000_000, "brand": "Zeta"}))).await;
	let relaxed = outcome.relaxed_criteria.as_ref().expect("Relaxed criteria must be returned.");

	assert!(outcome.success);
	assert!(outcome.relaxation_applied);
	assert_eq!(outcome.relaxation_steps, 1);
	assert_eq!(outcome.relaxation_history[0].field, CriteriaField::Brand);
	assert!(relaxed.brand.is_none());
	assert_eq!(relaxed.price.max, Some(1_000_000.0));
	assert!(relaxed.added_constraints(&outcome.original_criteria).is_empty());
	assert_eq!(outcome.original_criteria.brand.as_deref(), Some("Zeta"));
	assert_eq!(ids(&outcome), vec![1, 3]);
}

#[tokio::test]
async fn year_relaxes_two_steps_to_the_newest_inventory() {
	let service = memory_service(inventory());
	let outcome = run(
		&service,
		SearchRequest {
			criteria: criteria(json!({"min_year": 2023})),
			max_relax_steps: Some(5),
			..Default::default()
		},
	)
	.await;
	let years: Vec<Option<Value>> =
		outcome.relaxation_history.iter().map(|step| step.new_value.clone()).collect();

	assert!(outcome.success);
	assert_eq!(outcome.relaxation_steps, 2);
	assert_eq!(years, vec![Some(json!(2021)), Some(json!(2019))]);
	assert_eq!(ids(&outcome), vec![1, 4]);
}

#[tokio::test]
async fn empty_inventory_reports_no_inventory() {
	let service = memory_service(Vec::new());
	let outcome = run(&service, request(json!({"brand": "Zeta", "max_price": 1_000_000}))).await;
	let recommendations = outcome.recommendations.as_ref().expect("Fallback must be attached.");

	assert!(!outcome.success);
	assert!(recommendations.closest_matches.is_empty());
	assert_eq!(recommendations.message, "No inventory available.");
	assert_eq!(outcome.message.as_deref(), Some("No inventory available."));
}

#[tokio::test]
async fn hybrid_merge_keeps_the_boosted_exact_score() {
	let payload = vehicle(7, "Zeta", "suv", 1_000_000.0, 2020);
	let exact = FixedExact::new(ExactPage {
		hits: vec![ExactHit { id: 7, score: 4.0, payload: payload.clone() }],
		total: 1,
		took_ms: 1,
	});
	let exact = Arc::new(exact);
	let semantic = FixedSemantic::new(vec![SemanticHit { id: 7, similarity: 0.9, payload }]);
	let backends = Backends::new(exact.clone(), Arc::new(FixedInventory::new(Vec::new())))
		.with_semantic(Arc::new(semantic));
	let service = SearchService::new(test_config(), backends);
	let outcome = run(
		&service,
		SearchRequest {
			free_text: Some("reliable suv".to_string()),
			hybrid: Some(true),
			..Default::default()
		},
	)
	.await;

	assert_eq!(exact.calls(), 1);
	assert_eq!(outcome.items.len(), 1);
	assert_eq!(outcome.items[0].origin, Origin::Both);
	assert!((outcome.items[0].combined_score - 4.8).abs() < 1e-5);
}

#[tokio::test]
async fn price_relaxation_is_monotonic_and_capped() {
	let service = memory_service(inventory());
	let outcome = run(
		&service,
		SearchRequest {
			criteria: criteria(json!({"max_price": 100_000})),
			max_relax_steps: Some(10),
			..Default::default()
		},
	)
	.await;
	let prices: Vec<f64> = outcome
		.relaxation_history
		.iter()
		.filter_map(|step| step.new_value.as_ref().and_then(Value::as_f64))
		.collect();

	assert!(!outcome.success);
	assert_eq!(prices, vec![120_000.0, 144_000.0, 150_000.0]);
	assert!(prices.windows(2).all(|pair| pair[0] <= pair[1]));
	assert!(outcome.recommendations.is_some());
}

#[tokio::test]
async fn year_relaxation_respects_the_cap() {
	let service = memory_service(inventory());
	let outcome = run(
		&service,
		SearchRequest {
			criteria: criteria(json!({"min_year": 2030})),
			max_relax_steps: Some(10),
			..Default::default()
		},
	)
	.await;
	let years: Vec<i64> = outcome
		.relaxation_history
		.iter()
		.filter_map(|step| step.new_value.as_ref().and_then(Value::as_i64))
		.collect();

	assert!(!outcome.success);
	assert_eq!(years, vec![2028, 2026, 2025]);
	assert!(years.iter().all(|year| *year >= 2025));
}

#[tokio::test]
async fn slow_or_failing_selectors_fall_back_to_static_order() {
	let mut cfg = test_config();

	cfg.relaxation.selector_timeout_ms = 20;

	let slow = Arc::new(FixedSelector::slow(Some("brand"), Duration::from_millis(500)));
	let service =
		SearchService::new(cfg.clone(), memory_backends(inventory()).with_selector(slow.clone()));
	let outcome = run(&service, request(json!({"max_price": 1_000_000, "brand": "Zeta"}))).await;

	assert!(slow.calls() >= 1);
	assert!(outcome.success);
	assert_eq!(outcome.relaxation_history[0].field, CriteriaField::MaxPrice);
	assert_eq!(outcome.relaxation_history.last().map(|step| step.field), Some(CriteriaField::Brand));

	let service =
		SearchService::new(cfg, memory_backends(inventory()).with_selector(Arc::new(FailingSelector)));
	let outcome = run(&service, request(json!({"max_price": 1_000_000, "brand": "Zeta"}))).await;

	assert!(outcome.success);
	assert_eq!(outcome.relaxation_history[0].field, CriteriaField::MaxPrice);
}

#[tokio::test]
async fn unavailable_exact_backend_degrades() {
	let backends = Backends::new(Arc::new(FailingExact), Arc::new(FixedInventory::new(inventory())));
	let service = SearchService::new(test_config(), backends);
	let outcome = run(&service, request(json!({"brand": "Yota"}))).await;

	assert!(!outcome.success);
	assert!(outcome.degraded);
	assert!(outcome.items.is_empty());
	assert!(outcome.message.is_some());

	let semantic = FixedSemantic::new(vec![SemanticHit {
		id: 1,
		similarity: 0.7,
		payload: vehicle(1, "Yota", "suv", 850_000.0, 2019),
	}]);
	let backends = Backends::new(Arc::new(FailingExact), Arc::new(FixedInventory::new(inventory())))
		.with_semantic(Arc::new(semantic));
	let service = SearchService::new(test_config(), backends);
	let outcome = run(
		&service,
		SearchRequest {
			criteria: criteria(json!({"brand": "Yota"})),
			hybrid: Some(true),
			..Default::default()
		},
	)
	.await;

	assert!(outcome.success);
	assert!(outcome.degraded);
	assert_eq!(ids(&outcome), vec![1]);
	assert_eq!(outcome.items[0].origin, Origin::Semantic);
}

#[tokio::test]
async fn failing_semantic_backend_is_ignored() {
	let index = Arc::new(MemoryIndex::new(inventory()));
	let backends =
		Backends::new(index.clone(), index).with_semantic(Arc::new(FailingSemantic));
	let service = SearchService::new(test_config(), backends);
	let outcome = run(
		&service,
		SearchRequest {
			criteria: criteria(json!({"body_type": "suv"})),
			hybrid: Some(true),
			..Default::default()
		},
	)
	.await;

	assert!(outcome.success);
	assert!(!outcome.degraded);
	assert_eq!(ids(&outcome), vec![1, 3]);
	assert!(outcome.items.iter().all(|item| item.origin == Origin::Exact));
}

#[tokio::test]
async fn failed_inventory_sample_yields_empty_recommendations() {
	let index = Arc::new(MemoryIndex::new(inventory()));
	let service =
		SearchService::new(test_config(), Backends::new(index, Arc::new(FailingInventory)));
	let outcome = run(&service, request(json!({"city": "Nowhere"}))).await;
	let recommendations = outcome.recommendations.as_ref().expect("Fallback must be attached.");

	assert!(!outcome.success);
	assert!(recommendations.closest_matches.is_empty());
	assert_ne!(recommendations.message, "No inventory available.");
}

#[tokio::test]
async fn cancellation_resolves_to_an_outcome() {
	let backends =
		Backends::new(Arc::new(PendingExact), Arc::new(FixedInventory::new(inventory())));
	let service = SearchService::new(test_config(), backends);
	let cancel = CancellationToken::new();
	let trigger = cancel.clone();

	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(20)).await;
		trigger.cancel();
	});

	let outcome = service
		.search(request(json!({"brand": "Yota"})), &cancel)
		.await
		.expect("Cancellation must not be an error.");

	assert!(!outcome.success);
	assert_eq!(outcome.message.as_deref(), Some("Search was cancelled."));
}

#[tokio::test]
async fn cancellation_stops_relaxation_between_steps() {
	let cancel = CancellationToken::new();
	let exact = Arc::new(CancellingExact::new(cancel.clone()));
	let backends = Backends::new(exact.clone(), Arc::new(FixedInventory::new(inventory())));
	let service = SearchService::new(test_config(), backends);
	let outcome = service
		.search(request(json!({"min_year": 2030, "color": "red"})), &cancel)
		.await
		.expect("Cancellation must not be an error.");

	assert_eq!(exact.calls(), 1);
	assert!(!outcome.success);
	assert!(outcome.relaxation_history.is_empty());
	assert!(outcome.recommendations.is_none());
	assert_eq!(outcome.message.as_deref(), Some("Search was cancelled."));
}

#[tokio::test]
async fn concurrent_searches_keep_their_own_criteria() {
	let service = memory_service(inventory());
	let cancel = CancellationToken::new();
	let (relaxed, direct) = tokio::join!(
		service.search(request(json!({"min_year": 2023})), &cancel),
		service.search(request(json!({"brand": "Kappa"})), &cancel),
	);
	let relaxed = relaxed.expect("Search must not fail.");
	let direct = direct.expect("Search must not fail.");

	assert_eq!(relaxed.original_criteria.year.min, Some(2023));
	assert!(relaxed.relaxation_applied);
	assert_eq!(direct.original_criteria.brand.as_deref(), Some("Kappa"));
	assert!(!direct.relaxation_applied);
	assert_eq!(ids(&direct), vec![3, 4]);
	assert_ne!(relaxed.search_id, direct.search_id);
}
