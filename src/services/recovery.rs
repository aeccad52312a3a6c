// Recovery correlator
// payment.failed → ledger record + recovery email; payment.succeeded → close the newest open failure
//
// Both entry points swallow their errors: the webhook has already been acknowledged,
// so every failure ends up in the logs and in the returned outcome.

use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::app_config::TestIdentity;
use crate::db::StoreError;
use crate::models::{FailureEvent, NewFailureRecord, SuccessEvent};
use crate::services::ledger::{FailureLedger, InsertOutcome};
use crate::services::notifier::{Notifier, RecoveryNotice};
use crate::services::platform::{
    default_company_member_id, IdentityError, IdentityResolver, MemberProfile, PlatformError,
};
use crate::services::settings::SettingsStore;

#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("Identity resolution failed: {0}")]
    Identity(#[from] IdentityError),

    #[error("Member {0} has no email address")]
    MissingEmail(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingIdentifiers,
    UnresolvedTenant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent,
    /// Tenant turned recovery emails off; the record stays `pending`
    Disabled,
    /// Notifier error; the record stays `pending`
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureOutcome {
    Skipped(SkipReason),
    Duplicate,
    Recorded {
        record_id: Uuid,
        notification: NotificationOutcome,
    },
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessOutcome {
    Skipped(SkipReason),
    NoMatch,
    Recovered { record_id: Uuid, latency: Duration },
    Aborted,
}

struct ResolvedTenant {
    tenant_id: String,
    company_member_id: Option<String>,
}

struct Recipient {
    email: String,
    name: String,
}

pub struct RecoveryCorrelator {
    ledger: Arc<dyn FailureLedger>,
    settings: Arc<dyn SettingsStore>,
    identity: Arc<dyn IdentityResolver>,
    notifier: Arc<dyn Notifier>,
    identity_bypass: Option<TestIdentity>,
}

impl RecoveryCorrelator {
    pub fn new(
        ledger: Arc<dyn FailureLedger>,
        settings: Arc<dyn SettingsStore>,
        identity: Arc<dyn IdentityResolver>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            ledger,
            settings,
            identity,
            notifier,
            identity_bypass: None,
        }
    }

    /// Replace member lookups with a fixed recipient. Callers pass
    /// `AppConfig::identity_bypass()`, which is `None` outside development.
    pub fn with_identity_bypass(mut self, identity: Option<TestIdentity>) -> Self {
        self.identity_bypass = identity;
        self
    }

    #[instrument(skip(self, event), fields(payment_id = %event.payment_id))]
    pub async fn handle_failure(&self, event: FailureEvent) -> FailureOutcome {
        match self.process_failure(event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to process payment failure: {}", e);
                FailureOutcome::Aborted
            },
        }
    }

    #[instrument(skip(self, event), fields(payment_id = ?event.payment_id))]
    pub async fn handle_success(&self, event: SuccessEvent) -> SuccessOutcome {
        match self.process_success(event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to process payment success: {}", e);
                SuccessOutcome::Aborted
            },
        }
    }

    async fn process_failure(&self, event: FailureEvent) -> Result<FailureOutcome, RecoveryError> {
        let (Some(user_id), Some(membership_id)) =
            (event.user_id.as_deref(), event.membership_id.as_deref())
        else {
            warn!("Payment failure without user or membership id, skipping");
            return Ok(FailureOutcome::Skipped(SkipReason::MissingIdentifiers));
        };

        let Some(tenant) = self
            .resolve_tenant(event.tenant_id.as_deref(), membership_id)
            .await?
        else {
            warn!(membership_id, "Could not determine company for payment failure, skipping");
            return Ok(FailureOutcome::Skipped(SkipReason::UnresolvedTenant));
        };

        let recipient = self.resolve_recipient(user_id, &tenant).await?;

        let record = NewFailureRecord::pending(
            &event.payment_id,
            membership_id,
            user_id,
            &tenant.tenant_id,
            &recipient.email,
            Some(recipient.name.clone()),
            event.amount,
        );

        let record = match self.ledger.insert_pending(record).await? {
            InsertOutcome::Inserted(record) => record,
            InsertOutcome::Duplicate => {
                info!("Payment failure already recorded, not notifying again");
                return Ok(FailureOutcome::Duplicate);
            },
        };

        info!(
            record_id = %record.id,
            tenant_id = %record.tenant_id,
            amount = %event.amount,
            "Failure recorded"
        );

        // No row means defaults: email on, built-in template
        let settings = self.settings.get(&tenant.tenant_id).await?;

        if settings.as_ref().is_some_and(|s| !s.email_enabled) {
            info!(record_id = %record.id, "Recovery emails disabled for tenant");
            return Ok(FailureOutcome::Recorded {
                record_id: record.id,
                notification: NotificationOutcome::Disabled,
            });
        }

        let notice = RecoveryNotice {
            to: recipient.email,
            user_name: recipient.name,
            amount: event.amount,
            membership_id: membership_id.to_string(),
            subject: settings.as_ref().map(|s| s.email_subject.clone()),
            body: settings.map(|s| s.email_body),
        };

        if let Err(e) = self.notifier.send_recovery_notice(&notice).await {
            error!(record_id = %record.id, "Recovery email failed, record left pending: {}", e);
            return Ok(FailureOutcome::Recorded {
                record_id: record.id,
                notification: NotificationOutcome::Failed,
            });
        }

        if !self.ledger.mark_sent(record.id).await? {
            debug!(record_id = %record.id, "Record moved on before it could be marked sent");
        }

        info!(record_id = %record.id, "Recovery email sent");
        Ok(FailureOutcome::Recorded {
            record_id: record.id,
            notification: NotificationOutcome::Sent,
        })
    }

    async fn process_success(&self, event: SuccessEvent) -> Result<SuccessOutcome, RecoveryError> {
        let (Some(user_id), Some(membership_id)) =
            (event.user_id.as_deref(), event.membership_id.as_deref())
        else {
            debug!("Payment success without user or membership id, skipping");
            return Ok(SuccessOutcome::Skipped(SkipReason::MissingIdentifiers));
        };

        let Some(tenant) = self
            .resolve_tenant(event.tenant_id.as_deref(), membership_id)
            .await?
        else {
            warn!(membership_id, "Could not determine company for payment success, skipping");
            return Ok(SuccessOutcome::Skipped(SkipReason::UnresolvedTenant));
        };

        let Some(open) = self
            .ledger
            .find_latest_unrecovered(membership_id, user_id, &tenant.tenant_id)
            .await?
        else {
            debug!("No open failure for this membership");
            return Ok(SuccessOutcome::NoMatch);
        };

        let Some(recovered) = self.ledger.mark_recovered(open.id).await? else {
            debug!(record_id = %open.id, "Failure already recovered by another delivery");
            return Ok(SuccessOutcome::NoMatch);
        };

        // Both timestamps come from the ledger's clock
        let latency = recovered
            .recovered_at
            .map(|recovered_at| recovered_at - recovered.failed_at)
            .unwrap_or_else(Duration::zero);

        info!(
            record_id = %recovered.id,
            amount = %recovered.amount(),
            "Payment recovered after {}m {}s",
            latency.num_minutes(),
            latency.num_seconds() % 60
        );

        Ok(SuccessOutcome::Recovered {
            record_id: recovered.id,
            latency,
        })
    }

    /// Event company first, then a membership lookup
    async fn resolve_tenant(
        &self,
        event_tenant: Option<&str>,
        membership_id: &str,
    ) -> Result<Option<ResolvedTenant>, RecoveryError> {
        if let Some(tenant_id) = event_tenant {
            return Ok(Some(ResolvedTenant {
                tenant_id: tenant_id.to_string(),
                company_member_id: None,
            }));
        }

        debug!(membership_id, "Event carries no company id, looking up membership");
        let details = match self.identity.lookup_membership(membership_id).await {
            Ok(details) => details,
            Err(IdentityError::NotFound(_))
            | Err(IdentityError::Platform(PlatformError::NotFound(_))) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(details.tenant_id.map(|tenant_id| ResolvedTenant {
            tenant_id,
            company_member_id: details.company_member_id,
        }))
    }

    async fn resolve_recipient(
        &self,
        user_id: &str,
        tenant: &ResolvedTenant,
    ) -> Result<Recipient, RecoveryError> {
        if let Some(identity) = &self.identity_bypass {
            debug!("Using development test identity");
            return Ok(Recipient {
                email: identity.email.clone(),
                name: identity.name.clone(),
            });
        }

        let company_member_id = tenant
            .company_member_id
            .clone()
            .unwrap_or_else(|| default_company_member_id(user_id, &tenant.tenant_id));

        let profile: MemberProfile = self
            .identity
            .lookup_member(&tenant.tenant_id, &company_member_id)
            .await?;

        let name = profile.display_name();
        let email = profile
            .email
            .ok_or_else(|| RecoveryError::MissingEmail(company_member_id))?;

        Ok(Recipient { email, name })
    }
}
