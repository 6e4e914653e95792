//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Resolve the database URL the CLI should operate on.
///
/// # Errors
///
/// Returns an error if neither `BRAMBLE_DATABASE_URL` nor `DATABASE_URL`
/// is set.
pub(crate) fn database_url() -> Result<SecretString, &'static str> {
    dotenvy::dotenv().ok();

    std::env::var("BRAMBLE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "BRAMBLE_DATABASE_URL not set")
}
