use std::sync::Arc;

use sba_audit::AuditSink;
use sba_search::OpenSearchClient;
use sba_service::{Providers, RagService};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RagService>,
	pub audit: Arc<dyn AuditSink>,
}

impl AppState {
	pub async fn new(config: sba_config::Config) -> color_eyre::Result<Self> {
		let backend = Arc::new(OpenSearchClient::new(&config.cluster)?);
		let audit = sba_audit::from_config(config.audit.as_ref());
		let service = RagService::new(config, backend, Providers::over_http());

		// Surface network/auth/policy problems at startup, not mid-request.
		service.ping().await?;

		Ok(Self { service: Arc::new(service), audit })
	}

	pub fn with_parts(service: Arc<RagService>, audit: Arc<dyn AuditSink>) -> Self {
		Self { service, audit }
	}
}
