//! Artist profiles and the seller dashboard

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{
    artworks::{listing_page, ArtworkListingResponse},
    timestamp,
};
use crate::AppState;
use arthub_common::{
    auth::{AuthUser, MaybeAuthUser},
    db::{
        models::ArtistProfile, ArtistDashboard, ArtistProfileInput, ArtworkFilter, Repository,
        UserSummary,
    },
    errors::{AppError, Result},
    response::{ok, paginated, ApiResponse, PageQuery, PaginatedResponse},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_artists).post(become_artist))
        .route("/me", axum::routing::put(update_my_profile))
        .route("/me/dashboard", get(dashboard))
        .route("/{user_id}", get(get_artist))
        .route("/{user_id}/artworks", get(artist_artworks))
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ArtistProfileRequest {
    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,

    #[validate(length(max = 50))]
    pub portfolio: Option<Vec<String>>,

    /// Object of network name to URL
    pub social_links: Option<serde_json::Value>,
}

impl ArtistProfileRequest {
    fn into_input(self) -> Result<ArtistProfileInput> {
        self.validate()?;

        if self.social_links.as_ref().is_some_and(|links| !links.is_object()) {
            return Err(AppError::validation(
                "socialLinks",
                "Social links must be an object",
            ));
        }

        Ok(ArtistProfileInput {
            bio: self.bio,
            portfolio: self.portfolio,
            social_links: self.social_links,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistListQuery {
    pub verified: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: String,
    pub portfolio: Vec<String>,
    pub social_links: serde_json::Value,
    pub verified: bool,
    pub rating: f64,
    pub total_sales: i32,
    pub total_revenue: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ArtistProfile> for ArtistProfileResponse {
    fn from(profile: ArtistProfile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            created_at: timestamp(&profile.created_at),
            updated_at: timestamp(&profile.updated_at),
            bio: profile.bio,
            portfolio: profile.portfolio.0,
            social_links: profile.social_links,
            verified: profile.verified,
            rating: profile.rating,
            total_sales: profile.total_sales,
            total_revenue: profile.total_revenue,
        }
    }
}

/// Profile with the owning user's public summary
#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    #[serde(flatten)]
    pub profile: ArtistProfileResponse,
    pub user: Option<UserSummary>,
}

/// Become an artist
pub async fn become_artist(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ArtistProfileRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ArtistProfileResponse>>)> {
    let input = request.into_input()?;

    let repo = Repository::new(state.db.clone());
    let profile = repo.create_artist_profile(auth.user_id, input).await?;

    tracing::info!(user_id = %auth.user_id, "Artist profile created");

    Ok((StatusCode::CREATED, ok(profile.into())))
}

pub async fn list_artists(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<ArtistListQuery>,
) -> Result<Json<PaginatedResponse<ArtistResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let artists = repo.list_artists(query.verified, page).await?;

    Ok(paginated(artists.map(|(profile, user)| ArtistResponse {
        profile: profile.into(),
        user: user.as_ref().map(UserSummary::from),
    })))
}

pub async fn get_artist(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ArtistResponse>>> {
    let repo = Repository::new(state.db.clone());

    let (profile, user) = repo
        .find_artist(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Artist not found"))?;

    Ok(ok(ArtistResponse {
        profile: profile.into(),
        user: Some(UserSummary::from(&user)),
    }))
}

pub async fn update_my_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ArtistProfileRequest>,
) -> Result<Json<ApiResponse<ArtistProfileResponse>>> {
    let input = request.into_input()?;

    let repo = Repository::new(state.db.clone());
    let profile = repo.update_artist_profile(auth.user_id, input).await?;

    Ok(ok(profile.into()))
}

/// Artworks listed by one artist, newest first
pub async fn artist_artworks(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(user_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<ArtworkListingResponse>>> {
    let page = page.resolve(&state.config.pagination);
    let filter = ArtworkFilter {
        artist_id: Some(user_id),
        ..Default::default()
    };

    let repo = Repository::new(state.db.clone());
    let artworks = repo.list_artworks(&filter, page).await?;

    Ok(paginated(listing_page(&repo, artworks, viewer).await?))
}

pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<ArtistDashboard>>> {
    let repo = Repository::new(state.db.clone());
    let dashboard = repo.artist_dashboard(auth.user_id).await?;

    Ok(ok(dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_social_links_must_be_an_object() {
        let request = ArtistProfileRequest {
            social_links: Some(json!(["https://example.com"])),
            ..Default::default()
        };
        let err = request.into_input().unwrap_err();
        assert!(matches!(err, AppError::Validation { field: Some(ref f), .. } if f == "socialLinks"));

        let request = ArtistProfileRequest {
            social_links: Some(json!({ "instagram": "https://instagram.com/a" })),
            ..Default::default()
        };
        assert!(request.into_input().is_ok());
    }
}
