//! Authentication claim types.
//!
//! Token issuance itself lives with an external identity collaborator; this
//! module only defines the claims the scoping layer consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::CapabilitySet;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Home tenant ID of the user.
    pub tnt: Uuid,
    /// User's role level (higher = more authority).
    pub role_level: i32,
    /// Capability bits (see `CapabilitySet`).
    pub caps: i64,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        tenant_id: Uuid,
        role_level: i32,
        capabilities: CapabilitySet,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            tnt: tenant_id,
            role_level,
            caps: capabilities.bits(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the home tenant ID from claims.
    #[must_use]
    pub const fn tenant_id(&self) -> Uuid {
        self.tnt
    }

    /// Returns the capability set from claims.
    #[must_use]
    pub const fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::from_bits(self.caps)
    }
}
