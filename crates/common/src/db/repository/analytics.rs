use super::{now, Repository};
use crate::db::models::*;
use crate::errors::Result;
use crate::response::{Page, PageRequest};
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Entity type recorded for artwork events
pub const ARTWORK_ENTITY: &str = "artwork";

#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    /// `None` for anonymous visitors
    pub user_id: Option<Uuid>,
    pub event_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
}

impl NewEvent {
    pub fn artwork(event_type: &str, artwork_id: Uuid, user_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            event_type: event_type.to_string(),
            entity_type: Some(ARTWORK_ENTITY.to_string()),
            entity_id: Some(artwork_id),
            metadata: None,
        }
    }
}

/// Event counts by type
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    /// Events the user triggered
    pub own: BTreeMap<String, u64>,
    /// Events recorded against the user's artworks, by anyone
    pub on_my_artworks: BTreeMap<String, u64>,
}

impl Repository {
    pub async fn record_event(&self, new: NewEvent) -> Result<AnalyticsEvent> {
        let event = AnalyticsEventActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            event_type: Set(new.event_type.trim().to_string()),
            entity_type: Set(new.entity_type),
            entity_id: Set(new.entity_id),
            metadata: Set(new.metadata.unwrap_or_else(|| serde_json::json!({}))),
            created_at: Set(now()),
        };

        event.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// The user's own events, newest first
    pub async fn list_events(
        &self,
        user_id: Uuid,
        event_type: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<AnalyticsEvent>> {
        let mut query =
            AnalyticsEventEntity::find().filter(AnalyticsEventColumn::UserId.eq(user_id));
        if let Some(event_type) = event_type.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(AnalyticsEventColumn::EventType.eq(event_type));
        }

        let paginator = query
            .order_by_desc(AnalyticsEventColumn::CreatedAt)
            .paginate(self.read_conn(), page.limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Page::new(items, total, page))
    }

    pub async fn event_summary(&self, user_id: Uuid) -> Result<EventSummary> {
        let own = self
            .count_by_type(
                AnalyticsEventEntity::find().filter(AnalyticsEventColumn::UserId.eq(user_id)),
            )
            .await?;

        let artworks = Query::select()
            .column(ArtworkColumn::Id)
            .from(ArtworkEntity)
            .and_where(ArtworkColumn::ArtistId.eq(user_id))
            .to_owned();

        let on_my_artworks = self
            .count_by_type(
                AnalyticsEventEntity::find()
                    .filter(AnalyticsEventColumn::EntityType.eq(ARTWORK_ENTITY))
                    .filter(AnalyticsEventColumn::EntityId.in_subquery(artworks)),
            )
            .await?;

        Ok(EventSummary {
            own,
            on_my_artworks,
        })
    }

    async fn count_by_type(
        &self,
        query: Select<AnalyticsEventEntity>,
    ) -> Result<BTreeMap<String, u64>> {
        let rows: Vec<(String, i64)> = query
            .select_only()
            .column(AnalyticsEventColumn::EventType)
            .column_as(Expr::col(AnalyticsEventColumn::Id).count(), "count")
            .group_by(AnalyticsEventColumn::EventType)
            .into_tuple()
            .all(self.read_conn())
            .await?;

        Ok(rows.into_iter().map(|(t, n)| (t, n as u64)).collect())
    }
}
