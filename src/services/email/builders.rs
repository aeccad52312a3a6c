// Email Builders - recovery email in its two shapes
// Tenants either keep the built-in template or supply their own body with placeholders

use super::types::{
    CustomBodyEmailData, EmailBuilder, EmailError, EmailMessage, PaymentFailedEmailData,
};
use crate::app_config::EmailConfig;
use crate::models::{DEFAULT_EMAIL_SUBJECT, UPDATE_LINK_PLACEHOLDER};
use crate::services::notifier::RecoveryNotice;
use handlebars::{html_escape, Handlebars};
use tracing::instrument;

const NAME_PLACEHOLDER: &str = "{name}";
const AMOUNT_PLACEHOLDER: &str = "{amount}";

const UPDATE_BUTTON_STYLE: &str = "display: inline-block; background-color: #28a745; \
    color: white; text-decoration: none; padding: 15px 40px; border-radius: 6px; \
    font-size: 16px; font-weight: bold; margin: 20px 0;";

/// Substitute `{name}`, `{amount}` and `{updateLink}` into a tenant-authored body.
/// In HTML mode the body and values are escaped and the link becomes a button.
pub fn render_custom_body(
    body: &str,
    user_name: &str,
    amount: &str,
    update_url: &str,
    html: bool,
) -> String {
    if html {
        let link = format!(
            "<a href=\"{}\" style=\"{}\">Update Payment Method</a>",
            html_escape(update_url),
            UPDATE_BUTTON_STYLE
        );
        html_escape(body)
            .replace(NAME_PLACEHOLDER, &html_escape(user_name))
            .replace(AMOUNT_PLACEHOLDER, &html_escape(amount))
            .replace(UPDATE_LINK_PLACEHOLDER, &link)
    } else {
        body.replace(NAME_PLACEHOLDER, user_name)
            .replace(AMOUNT_PLACEHOLDER, amount)
            .replace(UPDATE_LINK_PLACEHOLDER, update_url)
    }
}

/// Builder for the payment recovery email
pub struct RecoveryEmailBuilder<'a> {
    notice: &'a RecoveryNotice,
    config: &'a EmailConfig,
    templates: &'a Handlebars<'a>,
}

impl<'a> RecoveryEmailBuilder<'a> {
    pub fn new(
        notice: &'a RecoveryNotice,
        config: &'a EmailConfig,
        templates: &'a Handlebars<'a>,
    ) -> Self {
        Self {
            notice,
            config,
            templates,
        }
    }

    fn user_name(&self) -> &str {
        let name = self.notice.user_name.trim();
        if name.is_empty() {
            "there"
        } else {
            name
        }
    }

    fn subject(&self) -> String {
        self.notice
            .subject
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_EMAIL_SUBJECT)
            .to_string()
    }

    fn render_default(&self, amount: &str) -> Result<(String, String), EmailError> {
        let data = PaymentFailedEmailData {
            user_name: self.user_name().to_string(),
            amount: amount.to_string(),
            update_url: self.config.update_payment_url.clone(),
            app_name: self.config.from_name.clone(),
        };

        let html = self
            .templates
            .render("payment_failed", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let text = format!(
            "Payment Failed\n\n\
            Hi {},\n\n\
            We tried to process your payment of {}, but it was declined.\n\n\
            This usually happens when:\n\
            - Your card has expired\n\
            - Your card has reached its limit\n\
            - Your bank declined the transaction\n\
            - Your billing information has changed\n\n\
            ACTION REQUIRED: Please update your payment method within 24 hours to keep your access.\n\n\
            Update your payment method here:\n\
            {}\n\n\
            If you have any questions, just reply to this email. We're here to help!\n\n\
            ---\n\
            This is an automated message from {}.",
            data.user_name, amount, data.update_url, data.app_name
        );

        Ok((html, text))
    }

    fn render_custom(&self, body: &str, amount: &str) -> Result<(String, String), EmailError> {
        let update_url = &self.config.update_payment_url;

        let data = CustomBodyEmailData {
            body_html: render_custom_body(body, self.user_name(), amount, update_url, true),
            app_name: self.config.from_name.clone(),
        };

        let html = self
            .templates
            .render("custom_body", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let text = render_custom_body(body, self.user_name(), amount, update_url, false);

        Ok((html, text))
    }
}

impl<'a> EmailBuilder for RecoveryEmailBuilder<'a> {
    #[instrument(skip(self), fields(membership_id = %self.notice.membership_id))]
    fn build(&self) -> Result<EmailMessage, EmailError> {
        if self.notice.to.trim().is_empty() || !self.notice.to.contains('@') {
            return Err(EmailError::InvalidEmail(self.notice.to.clone()));
        }

        let amount = self.notice.amount.to_string();

        let (html, text) = match self.notice.body.as_deref().filter(|b| !b.trim().is_empty()) {
            Some(body) => self.render_custom(body, &amount)?,
            None => self.render_default(&amount)?,
        };

        Ok(EmailMessage::new(
            format!("{} <{}>", self.config.from_name, self.config.from_email),
            vec![self.notice.to.clone()],
            self.subject(),
            html,
        )
        .with_text(text))
    }
}
