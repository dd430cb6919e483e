//! The caller's notifications

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{timestamp, DeletedResponse};
use crate::AppState;
use arthub_common::{
    auth::AuthUser,
    db::{
        models::{Notification, NotificationKind},
        Repository,
    },
    errors::Result,
    response::{ok, paginated, ApiResponse, PageQuery, PaginatedResponse},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", put(mark_all_read))
        .route("/{id}", axum::routing::delete(delete_notification))
        .route("/{id}/read", put(mark_read))
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    /// `true` limits the list to unread notifications
    #[serde(default)]
    pub unread: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            kind: notification.kind,
            created_at: timestamp(&notification.created_at),
            title: notification.title,
            message: notification.message,
            link: notification.link,
            is_read: notification.is_read,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<PaginatedResponse<NotificationResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let notifications = repo
        .list_notifications(auth.user_id, query.unread, page)
        .await?;

    Ok(paginated(notifications.map(NotificationResponse::from)))
}

pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UnreadCountResponse>>> {
    let repo = Repository::new(state.db.clone());
    let count = repo.unread_count(auth.user_id).await?;

    Ok(ok(UnreadCountResponse { count }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationResponse>>> {
    let repo = Repository::new(state.db.clone());
    let notification = repo.mark_notification_read(id, auth.user_id).await?;

    Ok(ok(notification.into()))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MarkAllReadResponse>>> {
    let repo = Repository::new(state.db.clone());
    let updated = repo.mark_all_read(auth.user_id).await?;

    Ok(ok(MarkAllReadResponse { updated }))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    let repo = Repository::new(state.db.clone());
    repo.delete_notification(id, auth.user_id).await?;

    Ok(ok(DeletedResponse { id }))
}
