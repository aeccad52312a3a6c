use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::amount::Amount;
use crate::schema::failed_payments;

/// One failed charge, keyed by the platform's payment id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = failed_payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FailureRecord {
    pub id: Uuid,
    pub payment_id: String,
    pub membership_id: String,
    pub user_id: String,
    pub tenant_id: String,
    pub user_email: String,
    pub user_name: Option<String>,
    pub amount_cents: i64,
    pub status: String,
    pub failed_at: DateTime<Utc>,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub recovered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl FailureRecord {
    pub fn amount(&self) -> Amount {
        Amount::from_cents(self.amount_cents)
    }

    pub fn recovery_status(&self) -> Option<RecoveryStatus> {
        RecoveryStatus::from_string(&self.status)
    }
}

/// Insert shape; `failed_at`, `created_at` and `id` come from column defaults
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = failed_payments)]
pub struct NewFailureRecord {
    pub payment_id: String,
    pub membership_id: String,
    pub user_id: String,
    pub tenant_id: String,
    pub user_email: String,
    pub user_name: Option<String>,
    pub amount_cents: i64,
    pub status: String,
}

impl NewFailureRecord {
    pub fn pending(
        payment_id: impl Into<String>,
        membership_id: impl Into<String>,
        user_id: impl Into<String>,
        tenant_id: impl Into<String>,
        user_email: impl Into<String>,
        user_name: Option<String>,
        amount: Amount,
    ) -> Self {
        Self {
            payment_id: payment_id.into(),
            membership_id: membership_id.into(),
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            user_email: user_email.into(),
            user_name,
            amount_cents: amount.cents(),
            status: RecoveryStatus::Pending.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    /// Recorded, no successful notification yet
    Pending,
    /// Recovery email dispatched
    Sent,
    /// A later successful payment was correlated
    Recovered,
    /// Reserved for manual or timeout handling; never produced by webhook flows
    Lost,
}

impl RecoveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryStatus::Pending => "pending",
            RecoveryStatus::Sent => "sent",
            RecoveryStatus::Recovered => "recovered",
            RecoveryStatus::Lost => "lost",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RecoveryStatus::Pending),
            "sent" => Some(RecoveryStatus::Sent),
            "recovered" => Some(RecoveryStatus::Recovered),
            "lost" => Some(RecoveryStatus::Lost),
            _ => None,
        }
    }
}

/// Per-tenant aggregate the dashboard renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoverySummary {
    pub total_failed: usize,
    pub total_recovered: usize,
    /// Percentage with one decimal place
    pub recovery_rate: f64,
    pub total_recovered_amount: f64,
    pub recent: Vec<FailureRecordView>,
}

pub const RECENT_FAILURES_LIMIT: usize = 20;

impl RecoverySummary {
    /// Build from a tenant's records, newest first
    pub fn from_records(records: &[FailureRecord]) -> Self {
        let total_failed = records.len();
        let recovered: Vec<&FailureRecord> = records
            .iter()
            .filter(|r| r.recovery_status() == Some(RecoveryStatus::Recovered))
            .collect();
        let total_recovered = recovered.len();

        let recovery_rate = if total_failed > 0 {
            let rate = total_recovered as f64 / total_failed as f64 * 100.0;
            (rate * 10.0).round() / 10.0
        } else {
            0.0
        };

        let total_recovered_amount: Amount = recovered.iter().map(|r| r.amount()).sum();

        Self {
            total_failed,
            total_recovered,
            recovery_rate,
            total_recovered_amount: total_recovered_amount.as_decimal(),
            recent: records
                .iter()
                .take(RECENT_FAILURES_LIMIT)
                .map(FailureRecordView::from)
                .collect(),
        }
    }
}

/// API shape of a record, with the amount as a decimal value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecordView {
    pub id: Uuid,
    pub payment_id: String,
    pub membership_id: String,
    pub user_id: String,
    pub user_email: String,
    pub user_name: Option<String>,
    pub amount: f64,
    pub status: String,
    pub failed_at: DateTime<Utc>,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub recovered_at: Option<DateTime<Utc>>,
}

impl From<&FailureRecord> for FailureRecordView {
    fn from(record: &FailureRecord) -> Self {
        Self {
            id: record.id,
            payment_id: record.payment_id.clone(),
            membership_id: record.membership_id.clone(),
            user_id: record.user_id.clone(),
            user_email: record.user_email.clone(),
            user_name: record.user_name.clone(),
            amount: record.amount().as_decimal(),
            status: record.status.clone(),
            failed_at: record.failed_at,
            email_sent_at: record.email_sent_at,
            recovered_at: record.recovered_at,
        }
    }
}
