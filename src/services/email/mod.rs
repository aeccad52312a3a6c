// Email Service Module
// Coordinates builders and sender; the Resend-backed Notifier

pub mod builders;
pub mod sender;
pub mod types;

use self::types::EmailBuilder;
use crate::app_config::EmailConfig;
use crate::services::notifier::{Notifier, RecoveryNotice};
use anyhow::Result;
use async_trait::async_trait;
use builders::RecoveryEmailBuilder;
use handlebars::Handlebars;
use sender::EmailSender;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Email service for recovery notifications
#[derive(Clone)]
pub struct EmailService {
    sender: EmailSender,
    config: EmailConfig,
    templates: Arc<Handlebars<'static>>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self> {
        let mut templates = Handlebars::new();
        Self::register_templates(&mut templates)?;

        let sender =
            EmailSender::new_resend(config.resend_api_key.clone(), config.resend_api_url.clone())
                .with_max_retries(config.max_retries)
                .with_retry_delay(Duration::from_millis(config.retry_delay_ms));

        Ok(Self {
            sender,
            config,
            templates: Arc::new(templates),
        })
    }

    fn register_templates(templates: &mut Handlebars) -> Result<(), EmailError> {
        let payment_failed_template = include_str!("../../templates/email/payment_failed.html");
        templates
            .register_template_string("payment_failed", payment_failed_template)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        // Wrapper for tenant-authored bodies
        let custom_body_template = include_str!("../../templates/email/custom_body.html");
        templates
            .register_template_string("custom_body", custom_body_template)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        Ok(())
    }

    /// Render without sending
    pub fn build_recovery_email(&self, notice: &RecoveryNotice) -> Result<EmailMessage, EmailError> {
        RecoveryEmailBuilder::new(notice, &self.config, &self.templates).build()
    }
}

#[async_trait]
impl Notifier for EmailService {
    #[instrument(skip(self, notice), fields(membership_id = %notice.membership_id))]
    async fn send_recovery_notice(&self, notice: &RecoveryNotice) -> Result<(), EmailError> {
        info!("Sending recovery email to {}", notice.to);

        let message = self.build_recovery_email(notice)?;
        self.sender.send_with_retry(message).await
    }
}

pub use types::{EmailError, EmailMessage};
