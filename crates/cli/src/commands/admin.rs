//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! bramble-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `BRAMBLE_DATABASE_URL` - `PostgreSQL` connection string

use thiserror::Error;

use bramble_api::db::users::{UserChanges, UserRepository};
use bramble_api::services::auth::{AuthError, AuthService};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Registration failed (invalid email, weak password, duplicate).
    #[error("Could not create user: {0}")]
    Auth(#[from] AuthError),

    /// Promoting the user to admin failed.
    #[error("Could not promote user: {0}")]
    Promote(#[from] bramble_api::db::RepositoryError),
}

/// Create a new admin user.
///
/// Registers the account through the same auth service the API uses
/// (validation and Argon2id hashing included), then sets the admin flag.
///
/// # Errors
///
/// Returns `AdminError` if registration or promotion fails.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, AdminError> {
    let database_url = super::database_url().map_err(AdminError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = bramble_api::db::create_pool(&database_url).await?;

    tracing::info!("Creating admin user: {email}");

    let user = AuthService::new(&pool).register(name, email, password).await?;

    let changes = UserChanges {
        is_admin: Some(true),
        ..UserChanges::default()
    };
    let user = UserRepository::new(&pool).update(user.id, &changes).await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id.as_i32())
}
