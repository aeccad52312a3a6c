// Tenant settings store: recovery email preferences per company

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{info, instrument};

use crate::{
    db::{DieselPool, StoreError},
    models::{NewTenantSettings, TenantSettings},
    schema::tenant_settings,
};

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, tenant_id: &str) -> Result<Option<TenantSettings>, StoreError>;

    /// Insert or replace the settings row for `settings.tenant_id`
    async fn upsert(&self, settings: NewTenantSettings) -> Result<TenantSettings, StoreError>;
}

#[derive(Clone)]
pub struct DieselSettingsStore {
    pool: DieselPool,
}

impl DieselSettingsStore {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for DieselSettingsStore {
    async fn get(&self, tenant_id: &str) -> Result<Option<TenantSettings>, StoreError> {
        let mut conn = self.pool.get().await?;

        let settings = tenant_settings::table
            .filter(tenant_settings::tenant_id.eq(tenant_id))
            .select(TenantSettings::as_select())
            .first::<TenantSettings>(&mut conn)
            .await
            .optional()?;

        Ok(settings)
    }

    #[instrument(skip(self, settings), fields(tenant_id = %settings.tenant_id))]
    async fn upsert(&self, settings: NewTenantSettings) -> Result<TenantSettings, StoreError> {
        let mut conn = self.pool.get().await?;

        let stored = diesel::insert_into(tenant_settings::table)
            .values(&settings)
            .on_conflict(tenant_settings::tenant_id)
            .do_update()
            .set((
                tenant_settings::email_enabled.eq(settings.email_enabled),
                tenant_settings::email_subject.eq(&settings.email_subject),
                tenant_settings::email_body.eq(&settings.email_body),
                tenant_settings::updated_at.eq(now),
            ))
            .returning(TenantSettings::as_returning())
            .get_result::<TenantSettings>(&mut conn)
            .await?;

        info!(email_enabled = stored.email_enabled, "Tenant settings saved");
        Ok(stored)
    }
}
