//! Analytics events

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{non_blank, timestamp};
use crate::AppState;
use arthub_common::{
    auth::{AuthUser, MaybeAuthUser},
    db::{models::AnalyticsEvent, EventSummary, NewEvent, Repository},
    errors::Result,
    response::{ok, paginated, ApiResponse, PageQuery, PaginatedResponse},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(record_event))
        .route("/summary", get(summary))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[validate(length(min = 1, max = 100, message = "Event type must be 1-100 characters"))]
    pub event_type: String,

    #[validate(length(max = 50))]
    pub entity_type: Option<String>,

    pub entity_id: Option<Uuid>,

    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    pub event_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub event_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub created_at: String,
}

impl From<AnalyticsEvent> for EventResponse {
    fn from(event: AnalyticsEvent) -> Self {
        Self {
            id: event.id,
            user_id: event.user_id,
            created_at: timestamp(&event.created_at),
            event_type: event.event_type,
            entity_type: event.entity_type,
            entity_id: event.entity_id,
            metadata: event.metadata,
        }
    }
}

/// Record an event; anonymous callers are allowed
pub async fn record_event(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    Json(request): Json<EventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EventResponse>>)> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let event = repo
        .record_event(NewEvent {
            user_id,
            event_type: request.event_type,
            entity_type: non_blank(request.entity_type),
            entity_id: request.entity_id,
            metadata: request.metadata,
        })
        .await?;

    Ok((StatusCode::CREATED, ok(event.into())))
}

pub async fn list_events(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<PaginatedResponse<EventResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let events = repo
        .list_events(auth.user_id, query.event_type.as_deref(), page)
        .await?;

    Ok(paginated(events.map(EventResponse::from)))
}

pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<EventSummary>>> {
    let repo = Repository::new(state.db.clone());
    let summary = repo.event_summary(auth.user_id).await?;

    Ok(ok(summary))
}
