use std::sync::Arc;

use idlink_service::IdentityService;
use idlink_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<IdentityService>,
}
impl AppState {
	pub async fn new(config: idlink_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::with_service(IdentityService::new(config, Arc::new(db))))
	}

	pub fn with_service(service: IdentityService) -> Self {
		Self { service: Arc::new(service) }
	}
}
