use std::sync::Arc;

use carlot_config::Config;
use carlot_service::{Backends, SearchService};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SearchService>,
}
impl AppState {
	pub fn new(config: Config) -> color_eyre::Result<Self> {
		let backends = Backends::from_config(&config)?;

		Ok(Self::from_service(SearchService::new(config, backends)))
	}

	pub fn from_service(service: SearchService) -> Self {
		Self { service: Arc::new(service) }
	}
}
