use super::notifications::{notify, NewNotification};
use super::{now, Repository, UserSummary};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::response::{Page, PageRequest};
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

pub struct NewReview {
    pub order_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct ReviewListing {
    pub review: Review,
    pub buyer: Option<UserSummary>,
}

const REVIEW_EXISTS: &str = "Review already exists for this order";

/// Recompute an artist's average rating over every review of their artworks
async fn refresh_artist_rating<C: ConnectionTrait>(conn: &C, artist_id: Uuid) -> Result<f64> {
    let ratings: Vec<i32> = ReviewEntity::find()
        .select_only()
        .column(ReviewColumn::Rating)
        .inner_join(ArtworkEntity)
        .filter(ArtworkColumn::ArtistId.eq(artist_id))
        .into_tuple()
        .all(conn)
        .await?;

    let average = if ratings.is_empty() {
        0.0
    } else {
        let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
        // Two decimal places
        ((sum as f64 / ratings.len() as f64) * 100.0).round() / 100.0
    };

    ArtistProfileEntity::update_many()
        .col_expr(ArtistProfileColumn::Rating, Expr::value(average))
        .filter(ArtistProfileColumn::UserId.eq(artist_id))
        .exec(conn)
        .await?;

    Ok(average)
}

impl Repository {
    /// One review per order, by the order's buyer
    pub async fn create_review(&self, buyer_id: Uuid, new: NewReview) -> Result<Review> {
        if !(1..=5).contains(&new.rating) {
            return Err(AppError::validation("rating", "Rating must be between 1 and 5"));
        }

        // Eligibility is decided on the primary
        let order = OrderEntity::find_by_id(new.order_id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::OrderNotFound {
                id: new.order_id.to_string(),
            })?;

        if order.buyer_id != buyer_id {
            return Err(AppError::forbidden("You can only review your own orders"));
        }
        if order.order_status == OrderStatus::Cancelled {
            return Err(AppError::validation(
                "orderId",
                "Cancelled orders cannot be reviewed",
            ));
        }

        let existing = ReviewEntity::find()
            .filter(ReviewColumn::OrderId.eq(order.id))
            .one(self.write_conn())
            .await?;
        if existing.is_some() {
            return Err(AppError::Duplicate {
                message: REVIEW_EXISTS.to_string(),
            });
        }

        let txn = self.write_conn().begin().await?;

        let Some(artwork) = ArtworkEntity::find_by_id(order.artwork_id).one(&txn).await? else {
            txn.rollback().await?;
            return Err(AppError::ArtworkNotFound {
                id: order.artwork_id.to_string(),
            });
        };

        let now = now();
        let review = ReviewActiveModel {
            id: Set(Uuid::new_v4()),
            artwork_id: Set(order.artwork_id),
            buyer_id: Set(buyer_id),
            order_id: Set(order.id),
            rating: Set(new.rating),
            comment: Set(new.comment.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // The unique index on order_id settles concurrent submissions
        let review = match review.insert(&txn).await {
            Ok(review) => review,
            Err(e) => {
                txn.rollback().await?;
                return Err(AppError::from_unique_violation(e, REVIEW_EXISTS));
            }
        };

        refresh_artist_rating(&txn, order.artist_id).await?;

        notify(
            &txn,
            NewNotification {
                user_id: order.artist_id,
                kind: NotificationKind::Review,
                title: "New review".to_string(),
                message: format!(
                    "\"{}\" received a {}-star review",
                    artwork.title, review.rating
                ),
                link: Some(format!("/artworks/{}", artwork.id)),
            },
        )
        .await?;

        txn.commit().await?;

        metrics::record_review(review.rating);
        tracing::info!(review_id = %review.id, order_id = %order.id, "Review created");

        Ok(review)
    }

    /// Newest first
    pub async fn list_reviews_for_artwork(
        &self,
        artwork_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ReviewListing>> {
        self.review_page(
            ReviewEntity::find().filter(ReviewColumn::ArtworkId.eq(artwork_id)),
            page,
        )
        .await
    }

    /// Reviews across all of an artist's artworks
    pub async fn list_reviews_for_artist(
        &self,
        artist_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ReviewListing>> {
        let artworks = Query::select()
            .column(ArtworkColumn::Id)
            .from(ArtworkEntity)
            .and_where(ArtworkColumn::ArtistId.eq(artist_id))
            .to_owned();

        self.review_page(
            ReviewEntity::find().filter(ReviewColumn::ArtworkId.in_subquery(artworks)),
            page,
        )
        .await
    }

    async fn review_page(
        &self,
        query: Select<ReviewEntity>,
        page: PageRequest,
    ) -> Result<Page<ReviewListing>> {
        let paginator = query
            .find_also_related(UserEntity)
            .order_by_desc(ReviewColumn::CreatedAt)
            .paginate(self.read_conn(), page.limit);

        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(page.index())
            .await?
            .into_iter()
            .map(|(review, buyer)| ReviewListing {
                buyer: buyer.as_ref().map(UserSummary::from),
                review,
            })
            .collect();

        Ok(Page::new(items, total, page))
    }

    /// Author-only
    pub async fn delete_review(&self, id: Uuid, actor_id: Uuid) -> Result<()> {
        let review = ReviewEntity::find_by_id(id)
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::not_found("Review not found"))?;

        if review.buyer_id != actor_id {
            return Err(AppError::forbidden("You can only delete your own reviews"));
        }

        let artwork = self.find_artwork(review.artwork_id).await?;

        let txn = self.write_conn().begin().await?;
        ReviewEntity::delete_by_id(review.id).exec(&txn).await?;
        refresh_artist_rating(&txn, artwork.artist_id).await?;
        txn.commit().await?;

        tracing::info!(review_id = %id, "Review deleted");
        Ok(())
    }
}
