// Inbound webhook envelope and the event types the recovery flow consumes

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::amount::{Amount, AmountError};

pub const PAYMENT_FAILED: &str = "payment.failed";
pub const PAYMENT_SUCCEEDED: &str = "payment.succeeded";

/// `{ "action": "...", "data": { ... } }`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEnvelope {
    pub action: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAction {
    PaymentFailed,
    PaymentSucceeded,
    Other(String),
}

impl WebhookAction {
    pub fn parse(action: &str) -> Self {
        match action {
            PAYMENT_FAILED => WebhookAction::PaymentFailed,
            PAYMENT_SUCCEEDED => WebhookAction::PaymentSucceeded,
            other => WebhookAction::Other(other.to_string()),
        }
    }
}

/// Payment object carried in `data`. The platform omits or nulls fields freely.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaymentEventData {
    pub id: Option<String>,
    pub final_amount: Option<f64>,
    pub user_id: Option<String>,
    pub membership_id: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("Missing payment id")]
    MissingPaymentId,

    #[error("Missing amount")]
    MissingAmount,

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailureEvent {
    pub payment_id: String,
    pub amount: Amount,
    pub user_id: Option<String>,
    pub membership_id: Option<String>,
    pub tenant_id: Option<String>,
}

/// Correlation uses the member identifiers only; the payment id is informational
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessEvent {
    pub payment_id: Option<String>,
    pub user_id: Option<String>,
    pub membership_id: Option<String>,
    pub tenant_id: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

impl PaymentEventData {
    pub fn into_failure_event(self) -> Result<FailureEvent, EventError> {
        let payment_id = non_blank(self.id).ok_or(EventError::MissingPaymentId)?;
        let amount = Amount::from_decimal(self.final_amount.ok_or(EventError::MissingAmount)?)?;

        Ok(FailureEvent {
            payment_id,
            amount,
            user_id: non_blank(self.user_id),
            membership_id: non_blank(self.membership_id),
            tenant_id: non_blank(self.company_id),
        })
    }

    pub fn into_success_event(self) -> SuccessEvent {
        SuccessEvent {
            payment_id: non_blank(self.id),
            user_id: non_blank(self.user_id),
            membership_id: non_blank(self.membership_id),
            tenant_id: non_blank(self.company_id),
        }
    }
}
