use super::notifications::{notify, NewNotification};
use super::{now, Repository};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::response::{Page, PageRequest};
use rand::Rng;
use sea_orm::{
    sea_query::Expr, ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

const ORDER_SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_SUFFIX_LEN: usize = 9;

/// `ORD-<unix millis>-<9 uppercase alphanumerics>`
pub fn generate_order_number() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ORDER_SUFFIX_LEN)
        .map(|_| ORDER_SUFFIX_CHARSET[rng.gen_range(0..ORDER_SUFFIX_CHARSET.len())] as char)
        .collect();

    format!("ORD-{}-{}", chrono::Utc::now().timestamp_millis(), suffix)
}

pub struct NewOrder {
    pub artwork_id: Uuid,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    /// Caller-supplied number; generated when absent or blank
    pub order_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default)]
pub struct OrderStatusUpdate {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone)]
pub struct OrderListing {
    pub order: Order,
    pub artwork: Option<Artwork>,
}

/// Which side of the order a listing is for
#[derive(Clone, Copy)]
enum Party {
    Buyer,
    Artist,
}

const NOT_AVAILABLE: &str = "Artwork is not available";

/// Put a reserved artwork back on sale
async fn release_artwork<C: ConnectionTrait>(conn: &C, artwork_id: Uuid) -> Result<()> {
    ArtworkEntity::update_many()
        .set(ArtworkActiveModel {
            status: Set(ArtworkStatus::Available),
            updated_at: Set(now()),
            ..Default::default()
        })
        .filter(ArtworkColumn::Id.eq(artwork_id))
        .filter(ArtworkColumn::Status.eq(ArtworkStatus::Reserved))
        .exec(conn)
        .await?;
    Ok(())
}

/// Mark the artwork sold and credit the artist's profile
async fn settle_sale<C: ConnectionTrait>(conn: &C, order: &Order) -> Result<()> {
    ArtworkEntity::update_many()
        .set(ArtworkActiveModel {
            status: Set(ArtworkStatus::Sold),
            updated_at: Set(now()),
            ..Default::default()
        })
        .filter(ArtworkColumn::Id.eq(order.artwork_id))
        .exec(conn)
        .await?;

    ArtistProfileEntity::update_many()
        .col_expr(
            ArtistProfileColumn::TotalSales,
            Expr::col(ArtistProfileColumn::TotalSales).add(1),
        )
        .col_expr(
            ArtistProfileColumn::TotalRevenue,
            Expr::col(ArtistProfileColumn::TotalRevenue).add(order.price),
        )
        .filter(ArtistProfileColumn::UserId.eq(order.artist_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Write `changes` only while the order still has the status it was read
/// with. If another status change committed first, nothing is written and
/// the caller gets an invalid transition from the status that won.
async fn transition_order<C: ConnectionTrait>(
    conn: &C,
    order: &Order,
    to: OrderStatus,
    changes: OrderActiveModel,
) -> Result<Order> {
    let result = OrderEntity::update_many()
        .set(changes)
        .filter(OrderColumn::Id.eq(order.id))
        .filter(OrderColumn::OrderStatus.eq(order.order_status))
        .exec(conn)
        .await?;

    let current = OrderEntity::find_by_id(order.id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::OrderNotFound {
            id: order.id.to_string(),
        })?;

    if result.rows_affected == 0 {
        return Err(AppError::InvalidTransition {
            entity: "order",
            from: current.order_status.as_str().to_string(),
            to: to.as_str().to_string(),
        });
    }

    Ok(current)
}

fn order_link(order_id: Uuid) -> Option<String> {
    Some(format!("/orders/{}", order_id))
}

impl Repository {
    /// Place an order. The artwork is reserved by a conditional update in
    /// the same transaction, so of two concurrent buyers only one wins.
    pub async fn create_order(&self, buyer_id: Uuid, new: NewOrder) -> Result<Order> {
        let artwork = self.find_artwork(new.artwork_id).await?;

        if artwork.artist_id == buyer_id {
            return Err(AppError::validation(
                "artworkId",
                "You cannot purchase your own artwork",
            ));
        }
        if artwork.status != ArtworkStatus::Available {
            return Err(AppError::Conflict {
                message: NOT_AVAILABLE.to_string(),
            });
        }

        let order_number = new
            .order_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(generate_order_number);

        let txn = self.write_conn().begin().await?;

        let reserved = ArtworkEntity::update_many()
            .set(ArtworkActiveModel {
                status: Set(ArtworkStatus::Reserved),
                updated_at: Set(now()),
                ..Default::default()
            })
            .filter(ArtworkColumn::Id.eq(artwork.id))
            .filter(ArtworkColumn::Status.eq(ArtworkStatus::Available))
            .exec(&txn)
            .await?;

        if reserved.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::Conflict {
                message: NOT_AVAILABLE.to_string(),
            });
        }

        let now = now();
        let order = OrderActiveModel {
            id: Set(Uuid::new_v4()),
            buyer_id: Set(buyer_id),
            artwork_id: Set(artwork.id),
            artist_id: Set(artwork.artist_id),
            order_number: Set(order_number),
            price: Set(artwork.price),
            shipping_address: Set(new.shipping_address),
            payment_method: Set(new.payment_method),
            payment_status: Set(PaymentStatus::Pending),
            order_status: Set(OrderStatus::Pending),
            cancellation_reason: Set(None),
            notes: Set(new.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let order = match order.insert(&txn).await {
            Ok(order) => order,
            Err(e) => {
                txn.rollback().await?;
                return Err(AppError::from_unique_violation(e, "Order number already exists"));
            }
        };

        notify(
            &txn,
            NewNotification {
                user_id: order.artist_id,
                kind: NotificationKind::Order,
                title: "New order".to_string(),
                message: format!("\"{}\" was ordered ({})", artwork.title, order.order_number),
                link: order_link(order.id),
            },
        )
        .await?;

        txn.commit().await?;

        metrics::record_order_created(&order.payment_method.to_value());
        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            artwork_id = %order.artwork_id,
            "Order created"
        );

        Ok(order)
    }

    pub async fn list_orders_for_buyer(
        &self,
        buyer_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<OrderListing>> {
        self.list_orders(Party::Buyer, buyer_id, status, page).await
    }

    pub async fn list_orders_for_artist(
        &self,
        artist_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<OrderListing>> {
        self.list_orders(Party::Artist, artist_id, status, page).await
    }

    async fn list_orders(
        &self,
        party: Party,
        user_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<OrderListing>> {
        let column = match party {
            Party::Buyer => OrderColumn::BuyerId,
            Party::Artist => OrderColumn::ArtistId,
        };

        let mut query = OrderEntity::find()
            .find_also_related(ArtworkEntity)
            .filter(column.eq(user_id));
        if let Some(status) = status {
            query = query.filter(OrderColumn::OrderStatus.eq(status));
        }

        let paginator = query
            .order_by_desc(OrderColumn::CreatedAt)
            .paginate(self.read_conn(), page.limit);

        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(page.index())
            .await?
            .into_iter()
            .map(|(order, artwork)| OrderListing { order, artwork })
            .collect();

        Ok(Page::new(items, total, page))
    }

    /// An order as seen by its buyer or its artist
    pub async fn find_order_for_party(&self, id: Uuid, user_id: Uuid) -> Result<OrderListing> {
        let (order, artwork) = OrderEntity::find_by_id(id)
            .find_also_related(ArtworkEntity)
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::OrderNotFound { id: id.to_string() })?;

        if order.buyer_id != user_id && order.artist_id != user_id {
            return Err(AppError::forbidden("You do not have access to this order"));
        }

        Ok(OrderListing { order, artwork })
    }

    /// Read from the primary; status decisions must not see a lagging replica
    async fn find_order(&self, id: Uuid) -> Result<Order> {
        OrderEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::OrderNotFound { id: id.to_string() })
    }

    /// Artist-driven fulfilment update
    pub async fn update_order_status(
        &self,
        id: Uuid,
        actor_id: Uuid,
        update: OrderStatusUpdate,
    ) -> Result<Order> {
        let order = self.find_order(id).await?;

        if order.artist_id != actor_id {
            return Err(AppError::forbidden("Only the artist can update this order"));
        }
        if update.order_status.is_none() && update.payment_status.is_none() {
            return Err(AppError::validation("orderStatus", "Nothing to update"));
        }

        let current = order.order_status;
        let next = update.order_status.filter(|&next| next != current);
        if let Some(next) = next {
            if !current.can_transition_to(next) {
                return Err(AppError::InvalidTransition {
                    entity: "order",
                    from: current.as_str().to_string(),
                    to: next.as_str().to_string(),
                });
            }
        }

        let mut changes = OrderActiveModel {
            updated_at: Set(now()),
            ..Default::default()
        };
        if let Some(payment_status) = update.payment_status {
            changes.payment_status = Set(payment_status);
        }
        if let Some(next) = next {
            changes.order_status = Set(next);
            if next == OrderStatus::Cancelled && order.payment_status == PaymentStatus::Completed {
                changes.payment_status = Set(PaymentStatus::Refunded);
            }
        }

        let txn = self.write_conn().begin().await?;

        let updated = match transition_order(&txn, &order, next.unwrap_or(current), changes).await {
            Ok(updated) => updated,
            Err(e) => {
                txn.rollback().await?;
                return Err(e);
            }
        };

        match next {
            Some(OrderStatus::Cancelled) => release_artwork(&txn, updated.artwork_id).await?,
            Some(OrderStatus::Delivered) => settle_sale(&txn, &updated).await?,
            _ => {}
        }

        if let Some(next) = next {
            notify(
                &txn,
                NewNotification {
                    user_id: updated.buyer_id,
                    kind: NotificationKind::Order,
                    title: "Order updated".to_string(),
                    message: format!("Order {} is now {}", updated.order_number, next.as_str()),
                    link: order_link(updated.id),
                },
            )
            .await?;
        }

        txn.commit().await?;

        if let Some(next) = next {
            metrics::record_order_status(next.as_str());
            tracing::info!(
                order_id = %updated.id,
                from = current.as_str(),
                to = next.as_str(),
                "Order status changed"
            );
        }

        Ok(updated)
    }

    /// Cancel on behalf of the buyer or the artist while the order has not
    /// shipped. A completed payment is marked refunded.
    pub async fn cancel_order(
        &self,
        id: Uuid,
        actor_id: Uuid,
        reason: Option<String>,
    ) -> Result<Order> {
        let order = self.find_order(id).await?;

        if order.buyer_id != actor_id && order.artist_id != actor_id {
            return Err(AppError::forbidden("You do not have access to this order"));
        }
        if !order.order_status.is_cancellable() {
            return Err(AppError::InvalidTransition {
                entity: "order",
                from: order.order_status.as_str().to_string(),
                to: OrderStatus::Cancelled.as_str().to_string(),
            });
        }

        let mut changes = OrderActiveModel {
            order_status: Set(OrderStatus::Cancelled),
            cancellation_reason: Set(reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())),
            updated_at: Set(now()),
            ..Default::default()
        };
        if order.payment_status == PaymentStatus::Completed {
            changes.payment_status = Set(PaymentStatus::Refunded);
        }

        let txn = self.write_conn().begin().await?;

        let cancelled = match transition_order(&txn, &order, OrderStatus::Cancelled, changes).await {
            Ok(cancelled) => cancelled,
            Err(e) => {
                txn.rollback().await?;
                return Err(e);
            }
        };

        release_artwork(&txn, cancelled.artwork_id).await?;

        let recipient = if actor_id == cancelled.buyer_id {
            cancelled.artist_id
        } else {
            cancelled.buyer_id
        };
        notify(
            &txn,
            NewNotification {
                user_id: recipient,
                kind: NotificationKind::Order,
                title: "Order cancelled".to_string(),
                message: format!("Order {} was cancelled", cancelled.order_number),
                link: order_link(cancelled.id),
            },
        )
        .await?;

        txn.commit().await?;

        metrics::record_order_status(OrderStatus::Cancelled.as_str());
        tracing::info!(order_id = %cancelled.id, "Order cancelled");

        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_generated_order_number_format() {
        let pattern = regex_lite::Regex::new(r"^ORD-\d+-[A-Z0-9]{9}$").unwrap();
        for _ in 0..50 {
            let number = generate_order_number();
            assert!(pattern.is_match(&number), "bad order number {}", number);
        }
        assert_ne!(generate_order_number(), generate_order_number());
    }

    #[tokio::test]
    async fn test_order_for_500_artwork() {
        let repo = fixtures::repo().await;
        let alice = fixtures::artist(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let art = fixtures::artwork(&repo, alice.id, "Harbor", 500.0).await;

        let order = repo.create_order(bob.id, fixtures::order_for(art.id)).await.unwrap();

        let pattern = regex_lite::Regex::new(r"^ORD-\d+-[A-Z0-9]{9}$").unwrap();
        assert!(pattern.is_match(&order.order_number));
        assert_eq!(order.price, 500.0);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.order_status, OrderStatus::Pending);
        assert_eq!(order.artist_id, alice.id);

        let art = repo.find_artwork(art.id).await.unwrap();
        assert_eq!(art.status, ArtworkStatus::Reserved);

        assert_eq!(repo.unread_count(alice.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_second_buyer_loses() {
        let repo = fixtures::repo().await;
        let alice = fixtures::artist(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let carol = fixtures::user(&repo, "carol").await;
        let art = fixtures::artwork(&repo, alice.id, "Harbor", 500.0).await;

        assert_ok!(repo.create_order(bob.id, fixtures::order_for(art.id)).await);
        let err = assert_err!(repo.create_order(carol.id, fixtures::order_for(art.id)).await);

        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.to_string(), NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn test_cannot_buy_own_artwork() {
        let repo = fixtures::repo().await;
        let alice = fixtures::artist(&repo, "alice").await;
        let art = fixtures::artwork(&repo, alice.id, "Harbor", 500.0).await;

        let err = assert_err!(repo.create_order(alice.id, fixtures::order_for(art.id)).await);
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_order_number_rolls_back() {
        let repo = fixtures::repo().await;
        let alice = fixtures::artist(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let first = fixtures::artwork(&repo, alice.id, "One", 100.0).await;
        let second = fixtures::artwork(&repo, alice.id, "Two", 100.0).await;

        let mut new = fixtures::order_for(first.id);
        new.order_number = Some("ORD-CUSTOM-1".into());
        repo.create_order(bob.id, new).await.unwrap();

        let mut new = fixtures::order_for(second.id);
        new.order_number = Some("ORD-CUSTOM-1".into());
        let err = assert_err!(repo.create_order(bob.id, new).await);
        assert!(matches!(err, AppError::Duplicate { .. }));

        // The reservation was rolled back with the failed insert
        let second = repo.find_artwork(second.id).await.unwrap();
        assert_eq!(second.status, ArtworkStatus::Available);
    }

    #[tokio::test]
    async fn test_fulfilment_to_delivered() {
        let repo = fixtures::repo().await;
        let alice = fixtures::artist(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let art = fixtures::artwork(&repo, alice.id, "Harbor", 500.0).await;
        let order = repo.create_order(bob.id, fixtures::order_for(art.id)).await.unwrap();

        let err = repo
            .update_order_status(
                order.id,
                bob.id,
                OrderStatusUpdate {
                    order_status: Some(OrderStatus::Confirmed),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden { .. }));

        let shipped = repo
            .update_order_status(
                order.id,
                alice.id,
                OrderStatusUpdate {
                    order_status: Some(OrderStatus::Shipped),
                    payment_status: Some(PaymentStatus::Completed),
                },
            )
            .await
            .unwrap();
        assert_eq!(shipped.order_status, OrderStatus::Shipped);
        assert_eq!(shipped.payment_status, PaymentStatus::Completed);

        let err = repo
            .update_order_status(
                order.id,
                alice.id,
                OrderStatusUpdate {
                    order_status: Some(OrderStatus::Confirmed),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        repo.update_order_status(
            order.id,
            alice.id,
            OrderStatusUpdate {
                order_status: Some(OrderStatus::Delivered),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let art = repo.find_artwork(art.id).await.unwrap();
        assert_eq!(art.status, ArtworkStatus::Sold);

        let profile = repo.find_artist_profile(alice.id).await.unwrap().unwrap();
        assert_eq!(profile.total_sales, 1);
        assert_eq!(profile.total_revenue, 500.0);

        let err = repo.cancel_order(order.id, bob.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_cancel_releases_and_refunds() {
        let repo = fixtures::repo().await;
        let alice = fixtures::artist(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let art = fixtures::artwork(&repo, alice.id, "Harbor", 500.0).await;
        let order = repo.create_order(bob.id, fixtures::order_for(art.id)).await.unwrap();

        repo.update_order_status(
            order.id,
            alice.id,
            OrderStatusUpdate {
                payment_status: Some(PaymentStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let cancelled = repo
            .cancel_order(order.id, bob.id, Some("Changed my mind".into()))
            .await
            .unwrap();
        assert_eq!(cancelled.order_status, OrderStatus::Cancelled);
        assert_eq!(cancelled.payment_status, PaymentStatus::Refunded);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Changed my mind"));

        let art = repo.find_artwork(art.id).await.unwrap();
        assert_eq!(art.status, ArtworkStatus::Available);

        // Back on sale
        let carol = fixtures::user(&repo, "carol").await;
        repo.create_order(carol.id, fixtures::order_for(art.id)).await.unwrap();
    }

    #[tokio::test]
    async fn test_order_visibility_and_listing() {
        let repo = fixtures::repo().await;
        let alice = fixtures::artist(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let carol = fixtures::user(&repo, "carol").await;
        let art = fixtures::artwork(&repo, alice.id, "Harbor", 500.0).await;
        let order = repo.create_order(bob.id, fixtures::order_for(art.id)).await.unwrap();

        let seen = repo.find_order_for_party(order.id, alice.id).await.unwrap();
        assert_eq!(seen.artwork.map(|a| a.id), Some(art.id));

        let err = repo.find_order_for_party(order.id, carol.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden { .. }));

        let mine = repo
            .list_orders_for_buyer(bob.id, None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(mine.total, 1);

        let sales = repo
            .list_orders_for_artist(alice.id, Some(OrderStatus::Delivered), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(sales.total, 0);
    }

    async fn processing_order(repo: &Repository, title: &str) -> (Uuid, Order) {
        let alice = match repo.find_user_by_email("alice@example.com").await.unwrap() {
            Some(alice) => alice,
            None => fixtures::artist(repo, "alice").await,
        };
        let buyer = fixtures::user(repo, &format!("buyer-{}", title.to_lowercase())).await;
        let art = fixtures::artwork(repo, alice.id, title, 250.0).await;
        let order = repo.create_order(buyer.id, fixtures::order_for(art.id)).await.unwrap();

        let order = repo
            .update_order_status(
                order.id,
                alice.id,
                OrderStatusUpdate {
                    order_status: Some(OrderStatus::Processing),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (alice.id, order)
    }

    #[tokio::test]
    async fn test_concurrent_deliver_and_cancel_settle_once() {
        let repo = fixtures::repo().await;

        for round in 0..5 {
            let (artist_id, order) = processing_order(&repo, &format!("Round{}", round)).await;

            let (delivered, cancelled) = tokio::join!(
                repo.update_order_status(
                    order.id,
                    artist_id,
                    OrderStatusUpdate {
                        order_status: Some(OrderStatus::Delivered),
                        ..Default::default()
                    },
                ),
                repo.cancel_order(order.id, order.buyer_id, None),
            );
            assert_ne!(delivered.is_ok(), cancelled.is_ok(), "exactly one change wins");

            let loser = delivered.err().or(cancelled.err()).unwrap();
            assert!(matches!(loser, AppError::InvalidTransition { .. }));

            let order = repo.find_order(order.id).await.unwrap();
            let art = repo.find_artwork(order.artwork_id).await.unwrap();
            match order.order_status {
                OrderStatus::Delivered => assert_eq!(art.status, ArtworkStatus::Sold),
                OrderStatus::Cancelled => assert_eq!(art.status, ArtworkStatus::Available),
                other => panic!("unexpected status {:?}", other),
            }
        }

        // Only delivered orders were credited
        let artist_id = repo
            .find_user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap()
            .id;
        let delivered = repo
            .list_orders_for_artist(artist_id, Some(OrderStatus::Delivered), PageRequest::default())
            .await
            .unwrap();
        let profile = repo.find_artist_profile(artist_id).await.unwrap().unwrap();
        assert_eq!(profile.total_sales as u64, delivered.total);
    }

    #[tokio::test]
    async fn test_status_change_after_stale_read_is_refused() {
        let repo = fixtures::repo().await;
        let (_, order) = processing_order(&repo, "Stale").await;

        // Another request cancels between our read and our write
        repo.cancel_order(order.id, order.buyer_id, None).await.unwrap();

        let err = transition_order(
            repo.write_conn(),
            &order,
            OrderStatus::Delivered,
            OrderActiveModel {
                order_status: Set(OrderStatus::Delivered),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot change order status from cancelled to delivered"
        );

        let order = repo.find_order(order.id).await.unwrap();
        assert_eq!(order.order_status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_status_changes_read_the_primary() {
        let repo = fixtures::repo().await;
        let (artist_id, order) = processing_order(&repo, "Replica").await;
        let lagging = fixtures::behind_replica(&repo).await;

        let shipped = lagging
            .update_order_status(
                order.id,
                artist_id,
                OrderStatusUpdate {
                    order_status: Some(OrderStatus::Shipped),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(shipped.order_status, OrderStatus::Shipped);

        let err = lagging.cancel_order(order.id, order.buyer_id, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }
}
