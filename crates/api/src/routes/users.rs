//! User route handlers: registration, login, profile, admin management.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use bramble_core::{Email, UserId};

use crate::db::users::{UserChanges, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{JsonBody, RequireAdmin, RequireUser, auth_cookie, clear_auth_cookie};
use crate::models::user::User;
use crate::services::auth::{AuthError, AuthService, token};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Extends the credential lifetime from a day to a month.
    #[serde(default)]
    pub remember: bool,
}

/// Own-profile update body; omitted fields are left untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Admin user update body; omitted fields are left untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
}

/// API shape of a user. The password hash does not exist on the domain
/// type, so it cannot leak here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email.into_inner(),
            is_admin: user.is_admin,
        }
    }
}

/// Credential lifetime for a login, honoring the remember flag.
fn session_ttl(remember: bool) -> Duration {
    if remember {
        Duration::days(30)
    } else {
        Duration::days(1)
    }
}

/// Issue a credential cookie for a user.
fn issue_cookie(state: &AppState, user: &User, ttl: Duration) -> Result<CookieJar> {
    let token = token::issue(user.id, &state.config().jwt_secret, ttl)?;
    Ok(CookieJar::default().add(auth_cookie(token, ttl, state.config().cookie_secure)))
}

/// `POST /api/v1/users` — register a new account and sign it in.
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>)> {
    let user = AuthService::new(state.pool())
        .register(&body.name, &body.email, &body.password)
        .await?;

    let ttl = session_ttl(false);
    let jar = issue_cookie(&state, &user, ttl)?;

    Ok((StatusCode::CREATED, jar, Json(user.into())))
}

/// `POST /api/v1/users/login` — password login, sets the credential cookie.
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>)> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    let ttl = session_ttl(body.remember);
    let jar = issue_cookie(&state, &user, ttl)?;

    Ok((jar, Json(user.into())))
}

/// `POST /api/v1/users/logout` — clear the credential cookie.
///
/// The token is stateless, so logout is purely a client-side affair.
#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.add(clear_auth_cookie(state.config().cookie_secure));
    (jar, Json(json!({ "message": "logged out successfully" })))
}

/// `GET /api/v1/users/profile` — the caller's own profile.
#[instrument(skip_all)]
pub async fn profile(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(user.into())
}

/// `PUT /api/v1/users/profile` — update the caller's own profile.
#[instrument(skip(state, user, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    JsonBody(body): JsonBody<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(AuthError::InvalidEmail)?;

    let password_hash = body
        .password
        .as_deref()
        .map(|p| AuthService::new(state.pool()).prepare_password_change(p))
        .transpose()?;

    let changes = UserChanges {
        name: body.name,
        email,
        password_hash,
        is_admin: None,
    };

    let updated = UserRepository::new(state.pool()).update(user.id, &changes).await?;

    Ok(Json(updated.into()))
}

/// `GET /api/v1/users` — list all users (admin).
#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<UserResponse>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// `GET /api/v1/users/{id}` — one user (admin).
#[instrument(skip(state, _admin))]
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    Ok(Json(user.into()))
}

/// `PUT /api/v1/users/{id}` — update a user, including the admin flag (admin).
#[instrument(skip(state, _admin, body))]
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody<AdminUpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(AuthError::InvalidEmail)?;

    let changes = UserChanges {
        name: body.name,
        email,
        password_hash: None,
        is_admin: body.is_admin,
    };

    let updated = UserRepository::new(state.pool())
        .update(UserId::new(id), &changes)
        .await?;

    Ok(Json(updated.into()))
}

/// `DELETE /api/v1/users/{id}` — delete a user (admin).
///
/// Admin accounts cannot be deleted through the API; demote them first.
#[instrument(skip(state, _admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = UserRepository::new(state.pool());

    let user = repo
        .get_by_id(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    if user.is_admin {
        return Err(AppError::Validation(
            "cannot delete an admin user".to_owned(),
        ));
    }

    repo.delete(user.id).await?;

    Ok(Json(json!({ "message": "user removed" })))
}
