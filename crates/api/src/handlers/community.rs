//! Connections between users
//!
//! Posts and comments live under `/community/posts`, see [`super::posts`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{non_blank, posts, timestamp, DeletedResponse};
use crate::AppState;
use arthub_common::{
    auth::AuthUser,
    db::{
        models::{Connection, ConnectionStatus, ConnectionType},
        ConnectionListing, NewConnection, Repository, UserSummary,
    },
    errors::Result,
    response::{ok, paginated, ApiResponse, PageQuery, PaginatedResponse},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/connect", post(connect))
        .route("/requests/incoming", get(incoming_requests))
        .route("/requests/outgoing", get(outgoing_requests))
        .route("/requests/{id}/accept", put(accept_request))
        .route("/requests/{id}/reject", put(reject_request))
        .route("/requests/{id}/block", put(block))
        .route("/connections", get(connections))
        .route("/connections/{id}", delete(remove_connection))
        .nest("/posts", posts::routes())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub receiver_id: Uuid,

    pub connection_type: Option<ConnectionType>,

    #[validate(length(max = 500, message = "Message must be at most 500 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: ConnectionStatus,
    pub connection_type: ConnectionType,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
    /// The other party, on listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl From<Connection> for ConnectionResponse {
    fn from(connection: Connection) -> Self {
        Self {
            id: connection.id,
            sender_id: connection.sender_id,
            receiver_id: connection.receiver_id,
            status: connection.status,
            connection_type: connection.connection_type,
            created_at: timestamp(&connection.created_at),
            updated_at: timestamp(&connection.updated_at),
            message: connection.message,
            blocked_by: connection.blocked_by,
            user: None,
        }
    }
}

impl From<ConnectionListing> for ConnectionResponse {
    fn from(listing: ConnectionListing) -> Self {
        Self {
            user: listing.user,
            ..listing.connection.into()
        }
    }
}

pub async fn connect(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ConnectRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ConnectionResponse>>)> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let connection = repo
        .send_connection_request(
            auth.user_id,
            NewConnection {
                receiver_id: request.receiver_id,
                connection_type: request.connection_type,
                message: non_blank(request.message),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, ok(connection.into())))
}

pub async fn accept_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ConnectionResponse>>> {
    let repo = Repository::new(state.db.clone());
    let connection = repo.respond_to_request(id, auth.user_id, true).await?;

    Ok(ok(connection.into()))
}

pub async fn reject_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ConnectionResponse>>> {
    let repo = Repository::new(state.db.clone());
    let connection = repo.respond_to_request(id, auth.user_id, false).await?;

    Ok(ok(connection.into()))
}

pub async fn block(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ConnectionResponse>>> {
    let repo = Repository::new(state.db.clone());
    let connection = repo.block_connection(id, auth.user_id).await?;

    Ok(ok(connection.into()))
}

pub async fn remove_connection(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    let repo = Repository::new(state.db.clone());
    repo.remove_connection(id, auth.user_id).await?;

    Ok(ok(DeletedResponse { id }))
}

pub async fn incoming_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<ConnectionResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let requests = repo.list_incoming_requests(auth.user_id, page).await?;

    Ok(paginated(requests.map(ConnectionResponse::from)))
}

pub async fn outgoing_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<ConnectionResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let requests = repo.list_outgoing_requests(auth.user_id, page).await?;

    Ok(paginated(requests.map(ConnectionResponse::from)))
}

pub async fn connections(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<ConnectionResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let connections = repo.list_connections(auth.user_id, page).await?;

    Ok(paginated(connections.map(ConnectionResponse::from)))
}
