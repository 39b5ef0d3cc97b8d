use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::{ClientDirectory, JobLedger};
use crate::workflow::RequestWorkflow;

/// Shared handler dependencies, injected per request through axum state.
/// Everything here is immutable or internally synchronized; handlers never
/// touch globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub directory: Arc<dyn ClientDirectory>,
    pub ledger: Arc<dyn JobLedger>,
    pub workflow: Arc<RequestWorkflow>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        directory: Arc<dyn ClientDirectory>,
        ledger: Arc<dyn JobLedger>,
    ) -> Self {
        let tokens = TokenService::from_config(&config.token);
        let workflow = Arc::new(RequestWorkflow::new(directory.clone(), ledger.clone()));
        Self {
            config: Arc::new(config),
            tokens,
            directory,
            ledger,
            workflow,
        }
    }
}
