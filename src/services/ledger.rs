// Failure ledger: persisted FailureRecords and the queries the correlator needs

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    db::{check_diesel_health, DieselPool, StoreError},
    models::{FailureRecord, NewFailureRecord, RecoveryStatus},
    schema::failed_payments,
};

/// Result of an idempotent insert
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(FailureRecord),
    /// A record with the same `payment_id` already exists
    Duplicate,
}

/// Every timestamp on a record is taken from the store's own clock, the same
/// one that stamps `failed_at`, so recovery latency never goes negative.
#[async_trait]
pub trait FailureLedger: Send + Sync {
    /// Insert a pending record; a `payment_id` conflict is reported, not raised
    async fn insert_pending(&self, record: NewFailureRecord) -> Result<InsertOutcome, StoreError>;

    /// `pending` → `sent`. Returns false when the record is no longer pending.
    async fn mark_sent(&self, record_id: Uuid) -> Result<bool, StoreError>;

    /// Newest record by `failed_at` with `recovered_at IS NULL`
    async fn find_latest_unrecovered(
        &self,
        membership_id: &str,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<Option<FailureRecord>, StoreError>;

    /// Set `recovered` + `recovered_at` unless already recovered.
    /// Returns the updated row, or `None` if another writer got there first.
    async fn mark_recovered(&self, record_id: Uuid) -> Result<Option<FailureRecord>, StoreError>;

    /// All records for a tenant, newest first
    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<FailureRecord>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Postgres ledger over the shared diesel-async pool
#[derive(Clone)]
pub struct DieselFailureLedger {
    pool: DieselPool,
}

impl DieselFailureLedger {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FailureLedger for DieselFailureLedger {
    #[instrument(skip(self, record), fields(payment_id = %record.payment_id))]
    async fn insert_pending(&self, record: NewFailureRecord) -> Result<InsertOutcome, StoreError> {
        let mut conn = self.pool.get().await?;

        let inserted = diesel::insert_into(failed_payments::table)
            .values(&record)
            .on_conflict(failed_payments::payment_id)
            .do_nothing()
            .returning(FailureRecord::as_returning())
            .get_result::<FailureRecord>(&mut conn)
            .await
            .optional()?;

        Ok(match inserted {
            Some(row) => InsertOutcome::Inserted(row),
            None => {
                debug!("Failure record already present");
                InsertOutcome::Duplicate
            },
        })
    }

    #[instrument(skip(self))]
    async fn mark_sent(&self, record_id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;

        let updated = diesel::update(
            failed_payments::table
                .filter(failed_payments::id.eq(record_id))
                .filter(failed_payments::status.eq(RecoveryStatus::Pending.as_str())),
        )
        .set((
            failed_payments::status.eq(RecoveryStatus::Sent.as_str()),
            failed_payments::email_sent_at.eq(now),
        ))
        .execute(&mut conn)
        .await?;

        Ok(updated == 1)
    }

    #[instrument(skip(self))]
    async fn find_latest_unrecovered(
        &self,
        membership_id: &str,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<Option<FailureRecord>, StoreError> {
        let mut conn = self.pool.get().await?;

        let record = failed_payments::table
            .filter(failed_payments::membership_id.eq(membership_id))
            .filter(failed_payments::user_id.eq(user_id))
            .filter(failed_payments::tenant_id.eq(tenant_id))
            .filter(failed_payments::recovered_at.is_null())
            .order(failed_payments::failed_at.desc())
            .select(FailureRecord::as_select())
            .first::<FailureRecord>(&mut conn)
            .await
            .optional()?;

        Ok(record)
    }

    #[instrument(skip(self))]
    async fn mark_recovered(&self, record_id: Uuid) -> Result<Option<FailureRecord>, StoreError> {
        let mut conn = self.pool.get().await?;

        let updated = diesel::update(
            failed_payments::table
                .filter(failed_payments::id.eq(record_id))
                .filter(failed_payments::recovered_at.is_null()),
        )
        .set((
            failed_payments::status.eq(RecoveryStatus::Recovered.as_str()),
            failed_payments::recovered_at.eq(now),
        ))
        .returning(FailureRecord::as_returning())
        .get_result::<FailureRecord>(&mut conn)
        .await
        .optional()?;

        Ok(updated)
    }

    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<FailureRecord>, StoreError> {
        let mut conn = self.pool.get().await?;

        let records = failed_payments::table
            .filter(failed_payments::tenant_id.eq(tenant_id))
            .order(failed_payments::failed_at.desc())
            .select(FailureRecord::as_select())
            .load::<FailureRecord>(&mut conn)
            .await?;

        Ok(records)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        check_diesel_health(&self.pool).await
    }
}
