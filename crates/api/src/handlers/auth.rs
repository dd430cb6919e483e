//! Registration, login and the caller's own account

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{artists::ArtistProfileResponse, non_blank, timestamp};
use crate::AppState;
use arthub_common::{
    auth::{hash_password, verify_password, AuthUser},
    db::{models::User, NewUser, Repository, UserChanges},
    errors::{AppError, Result},
    response::{ok, ApiResponse},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).put(update_me))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 50, message = "Name must be 2-50 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 50, message = "Name must be 2-50 characters"))]
    pub name: Option<String>,

    /// Empty string clears the picture
    #[validate(length(max = 2048))]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: timestamp(&user.created_at),
            updated_at: timestamp(&user.updated_at),
            name: user.name,
            email: user.email,
            profile_picture: user.profile_picture,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub artist_profile: Option<ArtistProfileResponse>,
}

/// Create an account and sign it in
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let user = repo
        .create_user(NewUser {
            name: request.name,
            email: request.email,
            password_hash: hash_password(&request.password)?,
        })
        .await?;

    let token = state.jwt.generate_token(user.id)?;

    Ok((
        StatusCode::CREATED,
        ok(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// Exchange credentials for a token. Unknown email and wrong password
/// answer identically.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let user = repo
        .find_user_by_email(&request.email)
        .await?
        .filter(|user| verify_password(&request.password, &user.password_hash))
        .ok_or(AppError::InvalidCredentials)?;

    let token = state.jwt.generate_token(user.id)?;

    tracing::debug!(user_id = %user.id, "User logged in");

    Ok(ok(AuthResponse {
        user: user.into(),
        token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>> {
    let repo = Repository::new(state.db.clone());

    let user = repo
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound {
            id: auth.user_id.to_string(),
        })?;
    let profile = repo.find_artist_profile(auth.user_id).await?;

    Ok(ok(MeResponse {
        user: user.into(),
        artist_profile: profile.map(Into::into),
    }))
}

pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let user = repo
        .update_user(
            auth.user_id,
            UserChanges {
                name: request.name,
                profile_picture: request.profile_picture.map(|p| non_blank(Some(p))),
            },
        )
        .await?;

    Ok(ok(user.into()))
}
