//! Initial database migration.
//!
//! Creates the tenant/agency hierarchy, users, programs, and the enrollment
//! directory the scope resolver reads.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(AGENCIES_SQL).await?;
        db.execute_unprepared(TENANTS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PROGRAMS_SQL).await?;
        db.execute_unprepared(ENROLLMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS enrollments, programs, users, tenants, agencies CASCADE;
             DROP TYPE IF EXISTS enrollment_role, enrollment_status, program_status;",
        )
        .await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE program_status AS ENUM ('active', 'archived');
CREATE TYPE enrollment_role AS ENUM ('learner', 'mentor', 'facilitator');
CREATE TYPE enrollment_status AS ENUM ('active', 'completed', 'withdrawn');
";

const AGENCIES_SQL: &str = r"
CREATE TABLE agencies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TENANTS_SQL: &str = r"
CREATE TABLE tenants (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    agency_id UUID REFERENCES agencies(id) ON DELETE RESTRICT,
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(100) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_tenants_agency ON tenants(agency_id) WHERE agency_id IS NOT NULL;
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    role_level INTEGER NOT NULL DEFAULT 20,
    capabilities BIGINT NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_tenant ON users(tenant_id);
";

const PROGRAMS_SQL: &str = r"
CREATE TABLE programs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    status program_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_programs_tenant ON programs(tenant_id);
";

const ENROLLMENTS_SQL: &str = r"
CREATE TABLE enrollments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    program_id UUID NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    role enrollment_role NOT NULL,
    status enrollment_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_enrollment UNIQUE (user_id, program_id, role)
);

-- The facilitator-scope derivation reads these two shapes
CREATE INDEX idx_enrollments_user_role ON enrollments(tenant_id, user_id, role) WHERE status = 'active';
CREATE INDEX idx_enrollments_program_role ON enrollments(program_id, role) WHERE status = 'active';
";
