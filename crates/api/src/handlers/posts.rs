//! Community posts, comments and their likes

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
    auth::{AuthUser, MaybeAuthUser},
    db::{
        models::{Comment, Post, PostCategory},
        CommentListing, LikeToggle, NewPost, PostChanges, PostDetail, PostFilter, PostListing,
        Repository, UserSummary,
    },
    errors::{AppError, Result},
    metrics,
    response::{ok, paginated, ApiResponse, PageQuery, PaginatedResponse},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/{id}/like", post(toggle_post_like))
        .route("/{id}/comments", get(list_comments).post(add_comment))
        .route("/comments/{comment_id}", delete(delete_comment))
        .route("/comments/{comment_id}/like", post(toggle_comment_like))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: String,

    pub category: Option<PostCategory>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: Option<String>,

    pub category: Option<PostCategory>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: PostCategory,
    pub views: i32,
    pub is_pinned: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            created_at: timestamp(&post.created_at),
            updated_at: timestamp(&post.updated_at),
            title: post.title,
            content: post.content,
            category: post.category,
            views: post.views,
            is_pinned: post.is_pinned,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostListingResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub author: Option<UserSummary>,
    pub likes: u64,
    pub comments: u64,
    pub liked: bool,
}

impl From<PostListing> for PostListingResponse {
    fn from(listing: PostListing) -> Self {
        Self {
            post: listing.post.into(),
            author: listing.author,
            likes: listing.likes,
            comments: listing.comments,
            liked: listing.liked,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserSummary>,
    pub likes: u64,
    pub liked: bool,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            created_at: timestamp(&comment.created_at),
            updated_at: timestamp(&comment.updated_at),
            content: comment.content,
            author: None,
            likes: 0,
            liked: false,
        }
    }
}

impl From<CommentListing> for CommentResponse {
    fn from(listing: CommentListing) -> Self {
        Self {
            author: listing.author,
            likes: listing.likes,
            liked: listing.liked,
            ..listing.comment.into()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: PostListingResponse,
    pub comments: Vec<CommentResponse>,
}

impl From<PostDetail> for PostDetailResponse {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: detail.post.into(),
            comments: detail.comments.into_iter().map(Into::into).collect(),
        }
    }
}

pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostResponse>>)> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let post = repo
        .create_post(
            auth.user_id,
            NewPost {
                title: request.title,
                content: request.content,
                category: request.category,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, ok(post.into())))
}

/// Pinned first, then newest
pub async fn list_posts(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<PostFilter>,
) -> Result<Json<PaginatedResponse<PostListingResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let posts = repo.list_posts(&filter, viewer, page).await?;

    Ok(paginated(posts.map(PostListingResponse::from)))
}

/// Post with its comments; counts as a view
pub async fn get_post(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PostDetailResponse>>> {
    let repo = Repository::new(state.db.clone());
    let detail = repo.get_post(id, viewer).await?;

    Ok(ok(detail.into()))
}

pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<ApiResponse<PostResponse>>> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let post = repo
        .update_post(
            id,
            auth.user_id,
            PostChanges {
                title: request.title,
                content: request.content,
                category: request.category,
            },
        )
        .await?;

    Ok(ok(post.into()))
}

/// Removes the post along with its comments and likes
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    let repo = Repository::new(state.db.clone());
    repo.delete_post(id, auth.user_id).await?;

    tracing::info!(post_id = %id, author_id = %auth.user_id, "Post deleted");

    Ok(ok(DeletedResponse { id }))
}

pub async fn toggle_post_like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LikeToggle>>> {
    let repo = Repository::new(state.db.clone());
    let toggle = repo.toggle_post_like(id, auth.user_id).await?;

    metrics::record_like("post", toggle.liked);

    Ok(ok(toggle))
}

pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponse>>)> {
    request.validate()?;
    if request.content.trim().is_empty() {
        return Err(AppError::validation("content", "Comment cannot be blank"));
    }

    let repo = Repository::new(state.db.clone());
    let comment = repo.add_comment(id, auth.user_id, &request.content).await?;

    Ok((StatusCode::CREATED, ok(comment.into())))
}

/// Oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<CommentResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let comments = repo.list_comments(id, viewer, page).await?;

    Ok(paginated(comments.map(CommentResponse::from)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    let repo = Repository::new(state.db.clone());
    repo.delete_comment(comment_id, auth.user_id).await?;

    Ok(ok(DeletedResponse { id: comment_id }))
}

pub async fn toggle_comment_like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<ApiResponse<LikeToggle>>> {
    let repo = Repository::new(state.db.clone());
    let toggle = repo.toggle_comment_like(comment_id, auth.user_id).await?;

    metrics::record_like("comment", toggle.liked);

    Ok(ok(toggle))
}
