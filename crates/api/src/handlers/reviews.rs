//! Order reviews and artist ratings

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{timestamp, DeletedResponse};
use crate::AppState;
use arthub_common::{
    auth::AuthUser,
    db::{models::Review, NewReview, Repository, ReviewListing, UserSummary},
    errors::Result,
    response::{ok, paginated, ApiResponse, PageQuery, PaginatedResponse},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/artwork/{artwork_id}", get(artwork_reviews))
        .route("/artist/{artist_id}", get(artist_reviews))
        .route("/{id}", delete(delete_review))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub order_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub comment: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub artwork_id: Uuid,
    pub buyer_id: Uuid,
    pub order_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<UserSummary>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            artwork_id: review.artwork_id,
            buyer_id: review.buyer_id,
            order_id: review.order_id,
            rating: review.rating,
            created_at: timestamp(&review.created_at),
            updated_at: timestamp(&review.updated_at),
            comment: review.comment,
            buyer: None,
        }
    }
}

impl From<ReviewListing> for ReviewResponse {
    fn from(listing: ReviewListing) -> Self {
        Self {
            buyer: listing.buyer,
            ..listing.review.into()
        }
    }
}

pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewResponse>>)> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let review = repo
        .create_review(
            auth.user_id,
            NewReview {
                order_id: request.order_id,
                rating: request.rating,
                comment: request.comment,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, ok(review.into())))
}

pub async fn artwork_reviews(
    State(state): State<AppState>,
    Path(artwork_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<ReviewResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let reviews = repo.list_reviews_for_artwork(artwork_id, page).await?;

    Ok(paginated(reviews.map(ReviewResponse::from)))
}

pub async fn artist_reviews(
    State(state): State<AppState>,
    Path(artist_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<ReviewResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let reviews = repo.list_reviews_for_artist(artist_id, page).await?;

    Ok(paginated(reviews.map(ReviewResponse::from)))
}

pub async fn delete_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    let repo = Repository::new(state.db.clone());
    repo.delete_review(id, auth.user_id).await?;

    Ok(ok(DeletedResponse { id }))
}
