//! User domain types.

use chrono::{DateTime, Utc};

use bramble_core::{Email, UserId};

/// A storefront user (domain type).
///
/// Deliberately carries no password hash: the hash stays inside the auth
/// service and repository, so a `User` can never be serialized with it.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique across users).
    pub email: Email,
    /// Whether the user holds the admin capability.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
