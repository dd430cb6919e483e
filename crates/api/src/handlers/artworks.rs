//! Artwork listings

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{non_blank, timestamp, track, DeletedResponse};
use crate::AppState;
use arthub_common::{
    auth::{AuthUser, MaybeAuthUser},
    db::{
        models::{Artwork, ArtworkStatus, Medium, Style},
        ArtworkChanges, ArtworkFilter, ArtworkListing, LikeToggle, NewArtwork, NewEvent,
        Repository, UserSummary,
    },
    errors::{AppError, Result},
    metrics,
    response::{ok, paginated, ApiResponse, Page, PageQuery, PaginatedResponse},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_artworks).post(create_artwork))
        .route(
            "/{id}",
            get(get_artwork).put(update_artwork).delete(delete_artwork),
        )
        .route("/{id}/like", post(toggle_like))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtworkRequest {
    #[validate(length(min = 1, max = 200, message = "Artwork title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    pub price: f64,

    #[serde(default)]
    #[validate(length(max = 20))]
    pub images: Vec<String>,

    pub medium: Medium,

    pub style: Style,

    #[serde(default)]
    #[validate(length(max = 30))]
    pub tags: Vec<String>,

    #[validate(length(max = 100))]
    pub dimensions: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtworkRequest {
    #[validate(length(min = 1, max = 200, message = "Artwork title is required"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    pub price: Option<f64>,

    #[validate(length(max = 20))]
    pub images: Option<Vec<String>>,

    pub medium: Option<Medium>,

    pub style: Option<Style>,

    /// Only `available` and `unavailable` may be set by hand
    pub status: Option<ArtworkStatus>,

    #[validate(length(max = 30))]
    pub tags: Option<Vec<String>>,

    #[validate(length(max = 100))]
    pub dimensions: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkResponse {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub images: Vec<String>,
    pub medium: Medium,
    pub style: Style,
    pub status: ArtworkStatus,
    pub tags: Vec<String>,
    pub dimensions: Option<String>,
    pub views: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Artwork> for ArtworkResponse {
    fn from(artwork: Artwork) -> Self {
        Self {
            id: artwork.id,
            artist_id: artwork.artist_id,
            created_at: timestamp(&artwork.created_at),
            updated_at: timestamp(&artwork.updated_at),
            title: artwork.title,
            description: artwork.description,
            price: artwork.price,
            images: artwork.images.0,
            medium: artwork.medium,
            style: artwork.style,
            status: artwork.status,
            tags: artwork.tags.0,
            dimensions: artwork.dimensions,
            views: artwork.views,
        }
    }
}

/// Artwork with its artist, like count and the caller's like
#[derive(Debug, Serialize)]
pub struct ArtworkListingResponse {
    #[serde(flatten)]
    pub artwork: ArtworkResponse,
    pub artist: Option<UserSummary>,
    pub likes: u64,
    pub liked: bool,
}

impl From<ArtworkListing> for ArtworkListingResponse {
    fn from(listing: ArtworkListing) -> Self {
        Self {
            artwork: listing.artwork.into(),
            artist: listing.artist,
            likes: listing.likes,
            liked: listing.liked,
        }
    }
}

/// Enrich a page of artworks for `viewer`
pub(crate) async fn listing_page(
    repo: &Repository,
    page: Page<Artwork>,
    viewer: Option<Uuid>,
) -> Result<Page<ArtworkListingResponse>> {
    let Page {
        items,
        total,
        request,
    } = page;
    let listings = repo.artwork_listings(items, viewer).await?;

    Ok(Page::new(listings, total, request).map(ArtworkListingResponse::from))
}

pub async fn create_artwork(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateArtworkRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ArtworkResponse>>)> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let artwork = repo
        .create_artwork(
            auth.user_id,
            NewArtwork {
                title: request.title,
                description: request.description,
                price: request.price,
                images: request.images,
                medium: request.medium,
                style: request.style,
                tags: request.tags,
                dimensions: non_blank(request.dimensions),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, ok(artwork.into())))
}

pub async fn list_artworks(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<ArtworkFilter>,
) -> Result<Json<PaginatedResponse<ArtworkListingResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let artworks = repo.list_artworks(&filter, page).await?;

    Ok(paginated(listing_page(&repo, artworks, viewer).await?))
}

/// Single listing; counts as a view
pub async fn get_artwork(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ArtworkListingResponse>>> {
    let repo = Repository::new(state.db.clone());

    let artwork = repo.view_artwork(id).await?;
    track(&repo, NewEvent::artwork("artwork_view", id, viewer)).await;

    repo.artwork_listings(vec![artwork], viewer)
        .await?
        .into_iter()
        .next()
        .map(|listing| ok(listing.into()))
        .ok_or_else(|| AppError::ArtworkNotFound { id: id.to_string() })
}

pub async fn update_artwork(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateArtworkRequest>,
) -> Result<Json<ApiResponse<ArtworkResponse>>> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let artwork = repo
        .update_artwork(
            id,
            auth.user_id,
            ArtworkChanges {
                title: request.title,
                description: request.description,
                price: request.price,
                images: request.images,
                medium: request.medium,
                style: request.style,
                status: request.status,
                tags: request.tags,
                dimensions: request.dimensions,
            },
        )
        .await?;

    Ok(ok(artwork.into()))
}

pub async fn delete_artwork(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    let repo = Repository::new(state.db.clone());
    repo.delete_artwork(id, auth.user_id).await?;

    tracing::info!(artwork_id = %id, artist_id = %auth.user_id, "Artwork deleted");

    Ok(ok(DeletedResponse { id }))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LikeToggle>>> {
    let repo = Repository::new(state.db.clone());
    let toggle = repo.toggle_artwork_like(id, auth.user_id).await?;

    metrics::record_like("artwork", toggle.liked);

    Ok(ok(toggle))
}
