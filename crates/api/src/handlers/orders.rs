//! Purchase orders
//!
//! Buyers place and cancel orders; the artist drives fulfilment through
//! `PUT /{id}/status`. Artwork reservation, sale settlement and the
//! notifications that go with each step happen in the repository, inside
//! the same transaction as the order change.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{artworks::ArtworkResponse, non_blank, timestamp, track};
use crate::AppState;
use arthub_common::{
    auth::AuthUser,
    db::{
        models::{Order, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress},
        NewEvent, NewOrder, OrderListing, OrderStatusUpdate, Repository,
    },
    errors::{AppError, Result},
    response::{ok, paginated, ApiResponse, PageQuery, PaginatedResponse},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_order))
        .route("/my-orders", get(my_orders))
        .route("/sales", get(my_sales))
        .route("/{id}", get(get_order))
        .route("/{id}/status", put(update_status))
        .route("/{id}/cancel", put(cancel_order))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub artwork_id: Uuid,

    pub shipping_address: ShippingAddress,

    pub payment_method: PaymentMethod,

    /// Generated when omitted
    #[validate(length(min = 1, max = 64, message = "Order number must be 1-64 characters"))]
    pub order_number: Option<String>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// `status` is accepted as an alias of `orderStatus`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    #[serde(alias = "status")]
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelOrderRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub buyer_id: Uuid,
    pub artist_id: Uuid,
    pub artwork_id: Uuid,
    pub price: f64,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork: Option<ArtworkResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            created_at: timestamp(&order.created_at),
            updated_at: timestamp(&order.updated_at),
            order_number: order.order_number,
            buyer_id: order.buyer_id,
            artist_id: order.artist_id,
            artwork_id: order.artwork_id,
            price: order.price,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            order_status: order.order_status,
            cancellation_reason: order.cancellation_reason,
            notes: order.notes,
            artwork: None,
        }
    }
}

impl From<OrderListing> for OrderResponse {
    fn from(listing: OrderListing) -> Self {
        Self {
            artwork: listing.artwork.map(Into::into),
            ..listing.order.into()
        }
    }
}

/// Required address lines must not be blank
fn check_address(address: &ShippingAddress) -> Result<()> {
    let required = [
        ("fullName", &address.full_name),
        ("street", &address.street),
        ("city", &address.city),
        ("postalCode", &address.postal_code),
        ("country", &address.country),
    ];

    match required.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(AppError::validation(
            "shippingAddress",
            format!("Shipping address {} is required", field),
        )),
        None => Ok(()),
    }
}

pub async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>)> {
    request.validate()?;
    check_address(&request.shipping_address)?;

    let repo = Repository::new(state.db.clone());
    let order = repo
        .create_order(
            auth.user_id,
            NewOrder {
                artwork_id: request.artwork_id,
                shipping_address: request.shipping_address,
                payment_method: request.payment_method,
                order_number: non_blank(request.order_number),
                notes: non_blank(request.notes),
            },
        )
        .await?;

    track(
        &repo,
        NewEvent {
            user_id: Some(auth.user_id),
            event_type: "order_created".to_string(),
            entity_type: Some("order".to_string()),
            entity_id: Some(order.id),
            metadata: Some(serde_json::json!({
                "artworkId": order.artwork_id,
                "price": order.price,
            })),
        },
    )
    .await;

    Ok((StatusCode::CREATED, ok(order.into())))
}

/// Orders the caller placed
pub async fn my_orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<PaginatedResponse<OrderResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let orders = repo
        .list_orders_for_buyer(auth.user_id, query.status, page)
        .await?;

    Ok(paginated(orders.map(OrderResponse::from)))
}

/// Orders for the caller's artworks
pub async fn my_sales(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<PaginatedResponse<OrderResponse>>> {
    let page = page.resolve(&state.config.pagination);

    let repo = Repository::new(state.db.clone());
    let orders = repo
        .list_orders_for_artist(auth.user_id, query.status, page)
        .await?;

    Ok(paginated(orders.map(OrderResponse::from)))
}

pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>> {
    let repo = Repository::new(state.db.clone());
    let order = repo.find_order_for_party(id, auth.user_id).await?;

    Ok(ok(order.into()))
}

pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>> {
    let repo = Repository::new(state.db.clone());
    let order = repo
        .update_order_status(
            id,
            auth.user_id,
            OrderStatusUpdate {
                order_status: request.order_status,
                payment_status: request.payment_status,
            },
        )
        .await?;

    Ok(ok(order.into()))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelOrderRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>> {
    request.validate()?;

    let repo = Repository::new(state.db.clone());
    let order = repo
        .cancel_order(id, auth.user_id, non_blank(request.reason))
        .await?;

    Ok(ok(order.into()))
}
