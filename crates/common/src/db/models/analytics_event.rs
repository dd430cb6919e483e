//! Analytics event entity (write-mostly)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "analytics_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// `None` for anonymous visitors
    #[sea_orm(indexed)]
    pub user_id: Option<Uuid>,

    #[sea_orm(column_type = "Text", indexed)]
    pub event_type: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub entity_type: Option<String>,

    #[sea_orm(indexed)]
    pub entity_id: Option<Uuid>,

    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
