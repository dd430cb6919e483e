//! Artist profile entity, the seller-facing extension of a user

use super::types::StringList;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artist_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// At most one profile per user
    #[sea_orm(unique)]
    pub user_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub bio: String,

    /// Portfolio links
    #[sea_orm(column_type = "JsonBinary")]
    pub portfolio: StringList,

    /// Platform name to URL, e.g. `{"instagram": "https://..."}`
    #[sea_orm(column_type = "JsonBinary")]
    pub social_links: Json,

    pub verified: bool,

    /// Mean review rating over the artist's artworks, 0 when unrated
    pub rating: f64,

    pub total_sales: i32,

    pub total_revenue: f64,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
