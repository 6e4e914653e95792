//! Authentication middleware and extractors.
//!
//! The credential is a stateless signed token in the `jwt` cookie. The
//! extractors verify it against the server-held secret, resolve the
//! subject to a user record (password hash excluded by construction),
//! and hand the user to the handler.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;
use time::Duration as CookieDuration;

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::models::user::User;
use crate::services::auth::{AuthError, token};
use crate::state::AppState;

/// Name of the credential cookie.
pub const AUTH_COOKIE: &str = "jwt";

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        Ok(Self(user))
    }
}

/// Extractor that requires an authenticated user with the admin flag.
///
/// Composes the same authentication step as [`RequireUser`], then gates
/// on the admin capability. Both failures surface as 401: a non-admin is
/// simply not authorized for the operation.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;

        if !user.is_admin {
            return Err(AppError::Unauthorized(
                "not authorized as an admin".to_owned(),
            ));
        }

        Ok(Self(user))
    }
}

/// Shared authentication step: cookie → token → user record.
async fn authenticate(parts: &mut Parts, state: &AppState) -> Result<User, AppError> {
    // CookieJar extraction is infallible; it reads the Cookie header.
    let jar = CookieJar::from_headers(&parts.headers);

    let cookie = jar.get(AUTH_COOKIE).ok_or(AuthError::MissingToken)?;

    let user_id = token::verify(cookie.value(), &state.config().jwt_secret)?;

    let user = UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await
        .map_err(AuthError::Repository)?
        .ok_or(AuthError::TokenInvalid)?;

    Ok(user)
}

/// Build the credential cookie carrying a signed token.
///
/// `ttl` is mirrored between the token expiry and the cookie's max-age,
/// so the browser drops the cookie around the time it stops verifying.
#[must_use]
pub fn auth_cookie(token: String, ttl: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(ttl.num_seconds()))
        .build()
}

/// Build an expired credential cookie, clearing the client's copy.
#[must_use]
pub fn clear_auth_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = auth_cookie("token-value".to_owned(), Duration::days(1), false);
        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(
            cookie.max_age(),
            Some(CookieDuration::seconds(24 * 60 * 60))
        );
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_auth_cookie(false);
        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }
}
