// Notifier seam between the correlator and the email provider

use async_trait::async_trait;

use crate::models::Amount;
use crate::services::email::EmailError;

/// Everything needed to render and send one recovery email.
/// `subject`/`body` carry tenant overrides; `None` means the built-in template.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryNotice {
    pub to: String,
    pub user_name: String,
    pub amount: Amount,
    pub membership_id: String,
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_recovery_notice(&self, notice: &RecoveryNotice) -> Result<(), EmailError>;
}
