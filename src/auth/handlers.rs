use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, instrument, warn};

use crate::errors::{conflict_on_unique, ApiError};
use crate::extract::ValidJson;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::users::dto::UserProfile;
use crate::users::repo;

use super::dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest};
use super::jwt::{AuthUser, JwtKeys};
use super::password::{hash_password, verify_password};

fn token_pair(keys: &JwtKeys, user_id: uuid::Uuid) -> Result<(String, String), ApiError> {
    let access = keys.sign_access(user_id)?;
    let refresh = keys.sign_refresh(user_id)?;
    Ok((access, refresh))
}

/// POST /api/auth/register
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(mut body): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    body.email = body.email.trim().to_lowercase();
    body.username = body.username.trim().to_lowercase();
    body.full_name = body.full_name.trim().to_string();

    // Fast path; the unique indexes still catch races.
    if repo::find_by_email(&state.db, &body.email).await?.is_some() {
        warn!(email = %body.email, "email already registered");
        return Err(ApiError::conflict("Email already registered"));
    }
    if repo::find_by_username(&state.db, &body.username)
        .await?
        .is_some()
    {
        warn!(username = %body.username, "username already taken");
        return Err(ApiError::conflict("Username already taken"));
    }

    let hash = hash_password(&body.password)?;
    let user = repo::create(&state.db, &body.username, &body.email, &hash, &body.full_name)
        .await
        .map_err(|e| conflict_on_unique(e, "Username or email already in use"))?;

    let keys = JwtKeys::from_ref(&state);
    let (token, refresh_token) = token_pair(&keys, user.id)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            AuthResponse {
                token,
                refresh_token,
                user: UserProfile::from(user),
            },
            "Registration successful",
        ),
    ))
}

/// POST /api/auth/login
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(mut body): ValidJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    body.email = body.email.trim().to_lowercase();

    let user = repo::find_by_email(&state.db, &body.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %body.email, "login unknown email");
            ApiError::unauthorized("Invalid credentials")
        })?;

    if !verify_password(&body.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let (token, refresh_token) = token_pair(&keys, user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(ApiResponse::ok(AuthResponse {
        token,
        refresh_token,
        user: UserProfile::from(user),
    }))
}

/// POST /api/auth/refresh
#[instrument(skip(state, body))]
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&body.refresh_token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let user = repo::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    let (token, refresh_token) = token_pair(&keys, user.id)?;
    Ok(ApiResponse::ok(AuthResponse {
        token,
        refresh_token,
        user: UserProfile::from(user),
    }))
}

/// GET /api/auth/me
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let user = repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;
    Ok(ApiResponse::ok(UserProfile::from(user)))
}
