use std::sync::Arc;

use tokio::sync::Mutex;

use ragloop_service::Orchestrator;

#[derive(Clone)]
pub struct AppState {
	pub orchestrator: Arc<Orchestrator>,
	/// Held for the whole turn; questions are answered one at a time.
	pub turn_lock: Arc<Mutex<()>>,
}
impl AppState {
	pub fn new(config: &ragloop_config::Config) -> color_eyre::Result<Self> {
		let orchestrator = Orchestrator::from_config(config)?;

		Ok(Self::from_orchestrator(orchestrator))
	}

	pub fn from_orchestrator(orchestrator: Orchestrator) -> Self {
		Self { orchestrator: Arc::new(orchestrator), turn_lock: Arc::new(Mutex::new(())) }
	}
}
