//! Mentoring tables migration.
//!
//! Creates relationships, sessions, preps, notes, and action items. The
//! unique constraint on session_preps.session_id is the serialization point
//! for concurrent prep submissions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(RELATIONSHIPS_SQL).await?;
        db.execute_unprepared(SESSIONS_SQL).await?;
        db.execute_unprepared(PREPS_SQL).await?;
        db.execute_unprepared(NOTES_SQL).await?;
        db.execute_unprepared(ACTION_ITEMS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS action_items, session_notes, session_preps,
                 mentoring_sessions, mentoring_relationships CASCADE;
             DROP TYPE IF EXISTS relationship_status, session_status, note_visibility,
                 action_item_status, action_item_priority;",
        )
        .await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE relationship_status AS ENUM ('active', 'ended');
CREATE TYPE session_status AS ENUM (
    'scheduled', 'prep_in_progress', 'ready', 'in_progress',
    'completed', 'cancelled', 'no_show'
);
CREATE TYPE note_visibility AS ENUM ('private', 'shared');
CREATE TYPE action_item_status AS ENUM ('pending', 'in_progress', 'completed', 'cancelled');
CREATE TYPE action_item_priority AS ENUM ('low', 'medium', 'high');
";

const RELATIONSHIPS_SQL: &str = r"
CREATE TABLE mentoring_relationships (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    mentor_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    mentee_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    relationship_type VARCHAR(50) NOT NULL DEFAULT 'standard',
    status relationship_status NOT NULL DEFAULT 'active',
    started_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    ended_at TIMESTAMPTZ,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_distinct_participants CHECK (mentor_id <> mentee_id)
);

-- Participant scope lookup
CREATE INDEX idx_relationships_mentor ON mentoring_relationships(tenant_id, mentor_id);
CREATE INDEX idx_relationships_mentee ON mentoring_relationships(tenant_id, mentee_id);
CREATE INDEX idx_relationships_tenant_started ON mentoring_relationships(tenant_id, started_at DESC);
";

const SESSIONS_SQL: &str = r"
CREATE TABLE mentoring_sessions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    relationship_id UUID NOT NULL REFERENCES mentoring_relationships(id) ON DELETE CASCADE,
    scheduled_date DATE NOT NULL,
    scheduled_time TIME,
    duration_minutes INTEGER NOT NULL DEFAULT 60,
    status session_status NOT NULL DEFAULT 'scheduled',
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_duration_positive CHECK (duration_minutes > 0)
);

CREATE INDEX idx_sessions_relationship ON mentoring_sessions(relationship_id, scheduled_date DESC);
CREATE INDEX idx_sessions_status ON mentoring_sessions(status);
";

const PREPS_SQL: &str = r"
CREATE TABLE session_preps (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    session_id UUID NOT NULL UNIQUE REFERENCES mentoring_sessions(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    wins TEXT,
    challenges TEXT,
    topics_to_discuss TEXT,
    questions_for_mentor TEXT,
    submitted_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const NOTES_SQL: &str = r"
CREATE TABLE session_notes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    session_id UUID NOT NULL REFERENCES mentoring_sessions(id) ON DELETE CASCADE,
    author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    content TEXT NOT NULL,
    visibility note_visibility NOT NULL DEFAULT 'private',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_notes_session ON session_notes(session_id, created_at DESC);
";

const ACTION_ITEMS_SQL: &str = r"
CREATE TABLE action_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    relationship_id UUID NOT NULL REFERENCES mentoring_relationships(id) ON DELETE CASCADE,
    session_id UUID REFERENCES mentoring_sessions(id) ON DELETE SET NULL,
    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    description TEXT,
    status action_item_status NOT NULL DEFAULT 'pending',
    priority action_item_priority NOT NULL DEFAULT 'medium',
    due_date TIMESTAMPTZ,
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_action_items_relationship ON action_items(relationship_id, created_at DESC);
CREATE INDEX idx_action_items_open_due ON action_items(due_date) WHERE status IN ('pending', 'in_progress');
";
