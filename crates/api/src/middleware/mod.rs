//! Request middleware and extractors.

pub mod auth;

pub use auth::{AUTH_COOKIE, RequireAdmin, RequireUser, auth_cookie, clear_auth_cookie};

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::error::AppError;

/// JSON body extractor that maps rejections onto [`AppError::Validation`].
///
/// Axum's stock `Json` rejection bypasses the central error responder;
/// this wrapper keeps malformed bodies on the same 400 + `{message}`
/// path as every other validation failure.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;

        Ok(Self(value))
    }
}
