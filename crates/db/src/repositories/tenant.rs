//! Tenant directory repository.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use catalyst_shared::{Capability, CapabilitySet};

use crate::entities::{tenants, users};

/// Repository for tenant and user directory lookups.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    db: DatabaseConnection,
}

impl TenantRepository {
    /// Creates a new tenant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a tenant by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<tenants::Model>, DbErr> {
        tenants::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks whether a caller may operate within a tenant.
    ///
    /// Access is granted to users of the tenant itself, and to holders of
    /// the agency capability whose home tenant shares the target tenant's
    /// (non-null) agency.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn can_access(
        &self,
        caller_tenant_id: Uuid,
        caller_capabilities: CapabilitySet,
        tenant_id: Uuid,
    ) -> Result<bool, DbErr> {
        if caller_tenant_id == tenant_id {
            return Ok(true);
        }

        if !caller_capabilities.contains(Capability::AgencyAccess) {
            return Ok(false);
        }

        let caller_tenant = self.find_by_id(caller_tenant_id).await?;
        let target_tenant = self.find_by_id(tenant_id).await?;

        Ok(match (caller_tenant, target_tenant) {
            (Some(a), Some(b)) => match (a.agency_id, b.agency_id) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
            _ => false,
        })
    }

    /// Finds an active user within a tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_active_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(user_id)
            .filter(users::Column::TenantId.eq(tenant_id))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await
    }
}
