//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Every query that touches relationship-scoped data takes
//! the resolved `RelationshipScope` as an explicit parameter.

pub mod action_item;
pub mod note;
pub mod prep;
pub mod relationship;
pub mod session;
pub mod stats;
pub mod tenant;

pub use action_item::{
    ActionItemError, ActionItemRepository, CreateActionItemInput, UpdateActionItemInput,
};
pub use note::{NoteError, NoteRepository};
pub use prep::{PrepError, PrepInput, PrepRepository};
pub use relationship::{CreateRelationshipInput, RelationshipError, RelationshipRepository};
pub use session::{
    CreateSessionInput, SessionError, SessionFilter, SessionRepository, UpdateSessionInput,
};
pub use stats::{MentoringStats, StatsRepository};
pub use tenant::TenantRepository;
