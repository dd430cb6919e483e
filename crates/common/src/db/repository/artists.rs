use super::{now, Repository};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::response::{Page, PageRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ArtistProfileInput {
    pub bio: Option<String>,
    pub portfolio: Option<Vec<String>>,
    pub social_links: Option<serde_json::Value>,
}

/// Seller overview for the artist's own dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistDashboard {
    pub artworks: u64,
    pub total_views: i64,
    pub total_likes: u64,
    pub orders_by_status: BTreeMap<String, u64>,
    pub total_sales: i32,
    pub total_revenue: f64,
    pub rating: f64,
}

const PROFILE_EXISTS: &str = "Artist profile already exists";

impl Repository {
    /// "Become an artist": at most one profile per user
    pub async fn create_artist_profile(
        &self,
        user_id: Uuid,
        input: ArtistProfileInput,
    ) -> Result<ArtistProfile> {
        if self.find_user_by_id(user_id).await?.is_none() {
            return Err(AppError::UserNotFound {
                id: user_id.to_string(),
            });
        }

        if self.find_artist_profile(user_id).await?.is_some() {
            return Err(AppError::Duplicate {
                message: PROFILE_EXISTS.to_string(),
            });
        }

        let now = now();
        let profile = ArtistProfileActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            bio: Set(input.bio.unwrap_or_default().trim().to_string()),
            portfolio: Set(input.portfolio.unwrap_or_default().into()),
            social_links: Set(input.social_links.unwrap_or_else(|| serde_json::json!({}))),
            verified: Set(false),
            rating: Set(0.0),
            total_sales: Set(0),
            total_revenue: Set(0.0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let profile = profile
            .insert(self.write_conn())
            .await
            .map_err(|e| AppError::from_unique_violation(e, PROFILE_EXISTS))?;

        tracing::info!(user_id = %user_id, profile_id = %profile.id, "Artist profile created");
        Ok(profile)
    }

    pub async fn find_artist_profile(&self, user_id: Uuid) -> Result<Option<ArtistProfile>> {
        ArtistProfileEntity::find()
            .filter(ArtistProfileColumn::UserId.eq(user_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Profile together with its user
    pub async fn find_artist(&self, user_id: Uuid) -> Result<Option<(ArtistProfile, User)>> {
        let found = ArtistProfileEntity::find()
            .find_also_related(UserEntity)
            .filter(ArtistProfileColumn::UserId.eq(user_id))
            .one(self.read_conn())
            .await?;

        Ok(found.and_then(|(profile, user)| user.map(|u| (profile, u))))
    }

    pub async fn update_artist_profile(
        &self,
        user_id: Uuid,
        input: ArtistProfileInput,
    ) -> Result<ArtistProfile> {
        let mut profile = ArtistProfileEntity::find()
            .filter(ArtistProfileColumn::UserId.eq(user_id))
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::not_found("Artist profile not found"))?
            .into_active_model();

        if let Some(bio) = input.bio {
            profile.bio = Set(bio.trim().to_string());
        }
        if let Some(portfolio) = input.portfolio {
            profile.portfolio = Set(portfolio.into());
        }
        if let Some(links) = input.social_links {
            profile.social_links = Set(links);
        }
        profile.updated_at = Set(now());

        profile.update(self.write_conn()).await.map_err(Into::into)
    }

    pub async fn list_artists(
        &self,
        verified: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<(ArtistProfile, Option<User>)>> {
        let mut query = ArtistProfileEntity::find().find_also_related(UserEntity);
        if let Some(verified) = verified {
            query = query.filter(ArtistProfileColumn::Verified.eq(verified));
        }

        let paginator = query
            .order_by_desc(ArtistProfileColumn::CreatedAt)
            .paginate(self.read_conn(), page.limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Page::new(items, total, page))
    }

    pub async fn artist_dashboard(&self, user_id: Uuid) -> Result<ArtistDashboard> {
        let profile = self
            .find_artist_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Artist profile not found"))?;

        let views: Vec<i32> = ArtworkEntity::find()
            .select_only()
            .column(ArtworkColumn::Views)
            .filter(ArtworkColumn::ArtistId.eq(user_id))
            .into_tuple()
            .all(self.read_conn())
            .await?;

        let total_likes = ArtworkLikeEntity::find()
            .inner_join(ArtworkEntity)
            .filter(ArtworkColumn::ArtistId.eq(user_id))
            .count(self.read_conn())
            .await?;

        let statuses: Vec<OrderStatus> = OrderEntity::find()
            .select_only()
            .column(OrderColumn::OrderStatus)
            .filter(OrderColumn::ArtistId.eq(user_id))
            .into_tuple()
            .all(self.read_conn())
            .await?;

        let mut orders_by_status = BTreeMap::new();
        for status in statuses {
            *orders_by_status.entry(status.as_str().to_string()).or_insert(0) += 1;
        }

        Ok(ArtistDashboard {
            artworks: views.len() as u64,
            total_views: views.iter().map(|&v| i64::from(v)).sum(),
            total_likes,
            orders_by_status,
            total_sales: profile.total_sales,
            total_revenue: profile.total_revenue,
            rating: profile.rating,
        })
    }
}
