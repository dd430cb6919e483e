//! Artwork listing entity

use super::types::StringList;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Medium {
    #[sea_orm(string_value = "painting")]
    Painting,
    #[sea_orm(string_value = "sculpture")]
    Sculpture,
    #[sea_orm(string_value = "photography")]
    Photography,
    #[sea_orm(string_value = "digital")]
    Digital,
    #[sea_orm(string_value = "drawing")]
    Drawing,
    #[sea_orm(string_value = "printmaking")]
    Printmaking,
    #[sea_orm(string_value = "mixed_media")]
    MixedMedia,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Style {
    #[sea_orm(string_value = "abstract")]
    Abstract,
    #[sea_orm(string_value = "realism")]
    Realism,
    #[sea_orm(string_value = "impressionism")]
    Impressionism,
    #[sea_orm(string_value = "expressionism")]
    Expressionism,
    #[sea_orm(string_value = "contemporary")]
    Contemporary,
    #[sea_orm(string_value = "minimalism")]
    Minimalism,
    #[sea_orm(string_value = "pop_art")]
    PopArt,
    #[sea_orm(string_value = "surrealism")]
    Surrealism,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ArtworkStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "reserved")]
    Reserved,
    #[sea_orm(string_value = "unavailable")]
    Unavailable,
}

impl ArtworkStatus {
    /// Statuses an artist may set by hand. `reserved` and `sold` follow orders.
    pub fn is_owner_settable(self) -> bool {
        matches!(self, ArtworkStatus::Available | ArtworkStatus::Unavailable)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artworks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(indexed)]
    pub artist_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub price: f64,

    /// Image URLs
    #[sea_orm(column_type = "JsonBinary")]
    pub images: StringList,

    pub medium: Medium,

    pub style: Style,

    #[sea_orm(indexed)]
    pub status: ArtworkStatus,

    #[sea_orm(column_type = "JsonBinary")]
    pub tags: StringList,

    #[sea_orm(column_type = "Text", nullable)]
    pub dimensions: Option<String>,

    pub views: i32,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ArtistId",
        to = "super::user::Column::Id"
    )]
    Artist,

    #[sea_orm(has_many = "super::artwork_like::Entity")]
    Likes,

    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artist.def()
    }
}

impl Related<super::artwork_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
