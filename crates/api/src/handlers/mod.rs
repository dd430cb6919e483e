//! API handlers module
//!
//! Each resource module exposes its request/response DTOs, the handler
//! functions and a `routes()` router that `create_router` nests under `/api`.

pub mod analytics;
pub mod artists;
pub mod artworks;
pub mod auth;
pub mod community;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod posts;
pub mod reviews;

use arthub_common::db::{NewEvent, Repository};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use uuid::Uuid;

/// Body of a successful delete
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

/// Best-effort analytics: a failed write is logged, never surfaced
pub(crate) async fn track(repo: &Repository, event: NewEvent) {
    let event_type = event.event_type.clone();
    if let Err(e) = repo.record_event(event).await {
        tracing::warn!(error = %e, event_type = %event_type, "Failed to record analytics event");
    }
}

pub(crate) fn timestamp(value: &DateTimeWithTimeZone) -> String {
    value.to_rfc3339()
}

/// Blank strings become `None`, everything else is trimmed
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
