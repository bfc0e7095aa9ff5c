pub mod stubs;

use std::sync::Arc;

use carlot_config::{
	Backends as BackendConfig, Config, ExactBackend, Providers, Recommendations, Relaxation,
	Search, SemanticBackend, Service,
};
use carlot_domain::Vehicle;
use carlot_service::{Backends, SearchService};
use carlot_storage::memory::MemoryIndex;

/// Minimal listing used across tests.
pub fn vehicle(id: u64, brand: &str, body_type: &str, price: f64, year: i32) -> Vehicle {
	Vehicle {
		id,
		brand: Some(brand.to_string()),
		body_type: Some(body_type.to_string()),
		price: Some(price),
		year: Some(year),
		..Default::default()
	}
}

/// A small lot with no "Zeta" vehicles and nothing newer than 2019.
pub fn inventory() -> Vec<Vehicle> {
	let mut lot = vec![
		vehicle(1, "Yota", "suv", 850_000.0, 2019),
		vehicle(2, "Yota", "sedan", 1_400_000.0, 2018),
		vehicle(3, "Kappa", "suv", 950_000.0, 2017),
		vehicle(4, "Kappa", "hatchback", 2_600_000.0, 2019),
		vehicle(5, "Mu", "wagon", 1_900_000.0, 2016),
	];

	lot[0].color = Some("white".to_string());
	lot[0].description = Some("white family suv with a quiet cabin".to_string());
	lot[1].color = Some("black".to_string());
	lot[2].color = Some("red".to_string());
	lot[2].features = vec!["sunroof".to_string()];
	lot[3].color = Some("white".to_string());
	lot[4].color = Some("grey".to_string());

	lot
}

/// Configuration pointing at in-memory backends, with every section at its defaults.
pub fn test_config() -> Config {
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
			semantic: Some(SemanticBackend {
				enabled: true,
				kind: "memory".to_string(),
				url: None,
				collection: None,
				inventory_path: None,
				top_k: 20,
				timeout_ms: 1_000,
			}),
		},
		providers: Providers::default(),
		search: Search::default(),
		relaxation: Relaxation::default(),
		recommendations: Recommendations::default(),
	}
}

/// Exact, semantic and inventory capabilities all served from one in-memory lot.
pub fn memory_backends(vehicles: Vec<Vehicle>) -> Backends {
	let index = Arc::new(MemoryIndex::new(vehicles));

	Backends::new(index.clone(), index.clone()).with_semantic(index)
}

pub fn memory_service(vehicles: Vec<Vehicle>) -> SearchService {
	SearchService::new(test_config(), memory_backends(vehicles))
}
