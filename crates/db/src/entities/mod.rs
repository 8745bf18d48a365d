//! `SeaORM` entity definitions for the mentoring domain.

pub mod action_items;
pub mod agencies;
pub mod enrollments;
pub mod mentoring_relationships;
pub mod mentoring_sessions;
pub mod programs;
pub mod sea_orm_active_enums;
pub mod session_notes;
pub mod session_preps;
pub mod tenants;
pub mod users;
