// Application state shared across handlers
use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    services::{
        platform::AccessChecker, BackgroundDispatcher, FailureLedger, RecoveryCorrelator,
        SettingsStore, WebhookVerifier,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub correlator: Arc<RecoveryCorrelator>,
    pub ledger: Arc<dyn FailureLedger>,
    pub settings_store: Arc<dyn SettingsStore>,
    pub access_checker: Arc<dyn AccessChecker>,
    pub webhook_verifier: Arc<dyn WebhookVerifier>,
    pub dispatcher: BackgroundDispatcher,
}
