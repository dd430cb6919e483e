use super::{contains_ci, escape_like, now, search_term, LikeToggle, Repository, UserSummary};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::response::{Page, PageRequest};
use sea_orm::{
    sea_query::{Alias, Expr, Func, LikeExpr, OnConflict},
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub struct NewArtwork {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub images: Vec<String>,
    pub medium: Medium,
    pub style: Style,
    pub tags: Vec<String>,
    pub dimensions: Option<String>,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Default)]
pub struct ArtworkChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub images: Option<Vec<String>>,
    pub medium: Option<Medium>,
    pub style: Option<Style>,
    pub status: Option<ArtworkStatus>,
    pub tags: Option<Vec<String>>,
    pub dimensions: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtworkSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    /// Most viewed first
    Popular,
}

/// Listing filters, deserialized straight from the query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkFilter {
    pub medium: Option<Medium>,
    pub style: Option<Style>,
    pub status: Option<ArtworkStatus>,
    pub artist_id: Option<Uuid>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub tag: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: ArtworkSort,
}

impl ArtworkFilter {
    fn apply(&self, mut query: Select<ArtworkEntity>) -> Select<ArtworkEntity> {
        if let Some(medium) = self.medium {
            query = query.filter(ArtworkColumn::Medium.eq(medium));
        }
        if let Some(style) = self.style {
            query = query.filter(ArtworkColumn::Style.eq(style));
        }
        if let Some(status) = self.status {
            query = query.filter(ArtworkColumn::Status.eq(status));
        }
        if let Some(artist_id) = self.artist_id {
            query = query.filter(ArtworkColumn::ArtistId.eq(artist_id));
        }
        if let Some(min) = self.min_price {
            query = query.filter(ArtworkColumn::Price.gte(min));
        }
        if let Some(max) = self.max_price {
            query = query.filter(ArtworkColumn::Price.lte(max));
        }
        if let Some(tag) = search_term(&self.tag) {
            // Tags are a JSON array; match the quoted element in its text
            // form, ignoring case
            let pattern = format!("%\"{}\"%", escape_like(&tag.to_lowercase()));
            query = query.filter(
                Expr::expr(Func::lower(
                    Expr::col(ArtworkColumn::Tags).cast_as(Alias::new("text")),
                ))
                .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        if let Some(term) = search_term(&self.search) {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(ArtworkColumn::Title, term))
                    .add(contains_ci(ArtworkColumn::Description, term)),
            );
        }

        match self.sort {
            ArtworkSort::Newest => query.order_by_desc(ArtworkColumn::CreatedAt),
            ArtworkSort::PriceAsc => query.order_by_asc(ArtworkColumn::Price),
            ArtworkSort::PriceDesc => query.order_by_desc(ArtworkColumn::Price),
            ArtworkSort::Popular => query
                .order_by_desc(ArtworkColumn::Views)
                .order_by_desc(ArtworkColumn::CreatedAt),
        }
    }
}

/// An artwork enriched for display
#[derive(Debug, Clone)]
pub struct ArtworkListing {
    pub artwork: Artwork,
    pub artist: Option<UserSummary>,
    pub likes: u64,
    /// Whether the viewer likes it; always false for anonymous viewers
    pub liked: bool,
}

const MANAGED_BY_ORDERS: &str = "Artwork status is managed by its orders";

fn check_price(price: f64) -> Result<()> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(AppError::validation("price", "Price must be greater than 0"))
    }
}

impl Repository {
    /// Only users with an artist profile may list artworks
    pub async fn create_artwork(&self, artist_id: Uuid, new: NewArtwork) -> Result<Artwork> {
        if self.find_artist_profile(artist_id).await?.is_none() {
            return Err(AppError::forbidden("Only artists can list artworks"));
        }
        check_price(new.price)?;

        let now = now();
        let artwork = ArtworkActiveModel {
            id: Set(Uuid::new_v4()),
            artist_id: Set(artist_id),
            title: Set(new.title.trim().to_string()),
            description: Set(new.description.trim().to_string()),
            price: Set(new.price),
            images: Set(new.images.into()),
            medium: Set(new.medium),
            style: Set(new.style),
            status: Set(ArtworkStatus::Available),
            tags: Set(new.tags.into()),
            dimensions: Set(new.dimensions),
            views: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let artwork = artwork.insert(self.write_conn()).await?;
        tracing::info!(artwork_id = %artwork.id, artist_id = %artist_id, "Artwork listed");
        Ok(artwork)
    }

    pub async fn find_artwork(&self, id: Uuid) -> Result<Artwork> {
        ArtworkEntity::find_by_id(id)
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::ArtworkNotFound { id: id.to_string() })
    }

    /// Fetch an artwork for display, counting the view
    pub async fn view_artwork(&self, id: Uuid) -> Result<Artwork> {
        let result = ArtworkEntity::update_many()
            .col_expr(ArtworkColumn::Views, Expr::col(ArtworkColumn::Views).add(1))
            .filter(ArtworkColumn::Id.eq(id))
            .exec(self.write_conn())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::ArtworkNotFound { id: id.to_string() });
        }

        self.find_artwork(id).await
    }

    pub async fn list_artworks(
        &self,
        filter: &ArtworkFilter,
        page: PageRequest,
    ) -> Result<Page<Artwork>> {
        let paginator = filter
            .apply(ArtworkEntity::find())
            .paginate(self.read_conn(), page.limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Page::new(items, total, page))
    }

    /// Attach artist summaries, like counts and the viewer's likes
    pub async fn artwork_listings(
        &self,
        artworks: Vec<Artwork>,
        viewer: Option<Uuid>,
    ) -> Result<Vec<ArtworkListing>> {
        if artworks.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = artworks.iter().map(|a| a.id).collect();
        let artists = self.user_summaries(artworks.iter().map(|a| a.artist_id)).await?;

        let counts: HashMap<Uuid, i64> = ArtworkLikeEntity::find()
            .select_only()
            .column(ArtworkLikeColumn::ArtworkId)
            .column_as(Expr::col(ArtworkLikeColumn::UserId).count(), "likes")
            .filter(ArtworkLikeColumn::ArtworkId.is_in(ids.clone()))
            .group_by(ArtworkLikeColumn::ArtworkId)
            .into_tuple::<(Uuid, i64)>()
            .all(self.read_conn())
            .await?
            .into_iter()
            .collect();

        let liked: HashSet<Uuid> = match viewer {
            Some(user_id) => ArtworkLikeEntity::find()
                .select_only()
                .column(ArtworkLikeColumn::ArtworkId)
                .filter(ArtworkLikeColumn::UserId.eq(user_id))
                .filter(ArtworkLikeColumn::ArtworkId.is_in(ids))
                .into_tuple::<Uuid>()
                .all(self.read_conn())
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        Ok(artworks
            .into_iter()
            .map(|artwork| ArtworkListing {
                artist: artists.get(&artwork.artist_id).cloned(),
                likes: counts.get(&artwork.id).copied().unwrap_or(0) as u64,
                liked: liked.contains(&artwork.id),
                artwork,
            })
            .collect())
    }

    /// Owner-only partial update. `reserved` and `sold` are driven by
    /// orders and cannot be set or overridden here.
    pub async fn update_artwork(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: ArtworkChanges,
    ) -> Result<Artwork> {
        let current = self.owned_artwork(id, owner_id).await?;

        if let Some(status) = changes.status {
            if !status.is_owner_settable() {
                return Err(AppError::validation(
                    "status",
                    "Status can only be set to available or unavailable",
                ));
            }
            if !current.status.is_owner_settable() {
                return Err(AppError::Conflict {
                    message: MANAGED_BY_ORDERS.to_string(),
                });
            }
        }
        if let Some(price) = changes.price {
            check_price(price)?;
        }

        let mut artwork = ArtworkActiveModel {
            updated_at: Set(now()),
            ..Default::default()
        };
        if let Some(title) = changes.title {
            artwork.title = Set(title.trim().to_string());
        }
        if let Some(description) = changes.description {
            artwork.description = Set(description.trim().to_string());
        }
        if let Some(price) = changes.price {
            artwork.price = Set(price);
        }
        if let Some(images) = changes.images {
            artwork.images = Set(images.into());
        }
        if let Some(medium) = changes.medium {
            artwork.medium = Set(medium);
        }
        if let Some(style) = changes.style {
            artwork.style = Set(style);
        }
        if let Some(tags) = changes.tags {
            artwork.tags = Set(tags.into());
        }
        if let Some(dimensions) = changes.dimensions {
            artwork.dimensions = Set(Some(dimensions));
        }

        let mut update = ArtworkEntity::update_many().filter(ArtworkColumn::Id.eq(current.id));
        if let Some(status) = changes.status {
            artwork.status = Set(status);
            // An order may have reserved it since it was read
            update = update.filter(
                ArtworkColumn::Status.is_in([ArtworkStatus::Available, ArtworkStatus::Unavailable]),
            );
        }

        let result = update.set(artwork).exec(self.write_conn()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::Conflict {
                message: MANAGED_BY_ORDERS.to_string(),
            });
        }

        ArtworkEntity::find_by_id(current.id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ArtworkNotFound { id: id.to_string() })
    }

    /// Owner-only. Artworks with order history are kept for the orders'
    /// sake and cannot be deleted.
    pub async fn delete_artwork(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let artwork = self.owned_artwork(id, owner_id).await?;

        let orders = OrderEntity::find()
            .filter(OrderColumn::ArtworkId.eq(artwork.id))
            .count(self.read_conn())
            .await?;
        if orders > 0 {
            return Err(AppError::Conflict {
                message: "Artwork has orders and cannot be deleted".to_string(),
            });
        }

        let txn = self.write_conn().begin().await?;
        ArtworkLikeEntity::delete_many()
            .filter(ArtworkLikeColumn::ArtworkId.eq(artwork.id))
            .exec(&txn)
            .await?;
        ArtworkEntity::delete_by_id(artwork.id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(artwork_id = %id, "Artwork deleted");
        Ok(())
    }

    /// Flip the caller's like on an artwork
    pub async fn toggle_artwork_like(&self, artwork_id: Uuid, user_id: Uuid) -> Result<LikeToggle> {
        self.find_artwork(artwork_id).await?;

        let txn = self.write_conn().begin().await?;
        // Insert first; a conflict means the like already existed
        let inserted = ArtworkLikeEntity::insert(ArtworkLikeActiveModel {
            artwork_id: Set(artwork_id),
            user_id: Set(user_id),
            created_at: Set(now()),
        })
        .on_conflict(
            OnConflict::columns([ArtworkLikeColumn::ArtworkId, ArtworkLikeColumn::UserId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        let liked = if inserted == 0 {
            ArtworkLikeEntity::delete_by_id((artwork_id, user_id)).exec(&txn).await?;
            false
        } else {
            true
        };

        let likes = ArtworkLikeEntity::find()
            .filter(ArtworkLikeColumn::ArtworkId.eq(artwork_id))
            .count(&txn)
            .await?;

        txn.commit().await?;
        Ok(LikeToggle { liked, likes })
    }

    async fn owned_artwork(&self, id: Uuid, owner_id: Uuid) -> Result<Artwork> {
        let artwork = self.find_artwork(id).await?;
        if artwork.artist_id != owner_id {
            return Err(AppError::forbidden("You can only modify your own artworks"));
        }
        Ok(artwork)
    }
}
