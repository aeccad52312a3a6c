pub mod amount;
pub mod failed_payment;
pub mod tenant_settings;
pub mod webhook;

pub use amount::{Amount, AmountError};
pub use failed_payment::{
    FailureRecord, FailureRecordView, NewFailureRecord, RecoveryStatus, RecoverySummary,
    RECENT_FAILURES_LIMIT,
};
pub use tenant_settings::{
    NewTenantSettings, SettingsQuery, SettingsResponse, TenantSettings, UpdateSettingsRequest,
    DEFAULT_EMAIL_BODY, DEFAULT_EMAIL_SUBJECT, UPDATE_LINK_PLACEHOLDER,
};
pub use webhook::{
    EventError, FailureEvent, PaymentEventData, SuccessEvent, WebhookAction, WebhookEnvelope,
    PAYMENT_FAILED, PAYMENT_SUCCEEDED,
};
