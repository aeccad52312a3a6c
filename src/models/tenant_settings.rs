use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::tenant_settings;

pub const UPDATE_LINK_PLACEHOLDER: &str = "{updateLink}";

pub const DEFAULT_EMAIL_SUBJECT: &str = "⚠️ Your payment failed - Update needed";

pub const DEFAULT_EMAIL_BODY: &str = "Hi {name},

We noticed your recent payment of {amount} failed. This can happen for a few reasons:

• Your card has expired
• You've reached your card limit
• Your bank declined the charge

To keep your access, please update your payment method within 24 hours.

{updateLink}

If you have any questions, feel free to reach out. We're here to help!

Best,
The Team";

/// Per-tenant recovery email preferences
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = tenant_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TenantSettings {
    pub id: Uuid,
    pub tenant_id: String,
    pub email_enabled: bool,
    pub email_subject: String,
    pub email_body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = tenant_settings)]
pub struct NewTenantSettings {
    pub tenant_id: String,
    pub email_enabled: bool,
    pub email_subject: String,
    pub email_body: String,
}

/// What the settings API returns; falls back to built-in defaults when nothing is stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub email_enabled: bool,
    pub email_subject: String,
    pub email_body: String,
}

impl SettingsResponse {
    pub fn defaults() -> Self {
        Self {
            email_enabled: true,
            email_subject: DEFAULT_EMAIL_SUBJECT.to_string(),
            email_body: DEFAULT_EMAIL_BODY.to_string(),
        }
    }
}

impl From<TenantSettings> for SettingsResponse {
    fn from(settings: TenantSettings) -> Self {
        Self {
            email_enabled: settings.email_enabled,
            email_subject: settings.email_subject,
            email_body: settings.email_body,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    pub company_id: Option<String>,
}

/// Body of `POST /api/settings`. Every field is optional on the wire so missing
/// values produce a 400 instead of a deserialization rejection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    pub company_id: Option<String>,
    pub email_enabled: Option<bool>,
    #[validate(length(max = 255, message = "Email subject must be at most 255 characters"))]
    pub email_subject: Option<String>,
    #[validate(length(max = 20000, message = "Email body is too long"))]
    pub email_body: Option<String>,
}
