// Services layer: the recovery correlator and the collaborators it drives

pub mod background_tasks;
pub mod email;
pub mod ledger;
pub mod notifier;
pub mod platform;
pub mod recovery;
pub mod settings;
pub mod webhook_signature;

pub use background_tasks::BackgroundDispatcher;
pub use email::{EmailError, EmailService};
pub use ledger::{DieselFailureLedger, FailureLedger, InsertOutcome};
pub use notifier::{Notifier, RecoveryNotice};
pub use recovery::{
    FailureOutcome, NotificationOutcome, RecoveryCorrelator, RecoveryError, SkipReason,
    SuccessOutcome,
};
pub use settings::{DieselSettingsStore, SettingsStore};
pub use webhook_signature::{
    DevelopmentBypassVerifier, HmacSignatureVerifier, SignatureError, WebhookVerifier,
};
