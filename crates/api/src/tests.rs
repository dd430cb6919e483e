//! Router-level tests over an in-memory SQLite database

use super::*;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use sea_orm::{ConnectOptions, Database};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app_with(config: AppConfig) -> Router {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let conn = Database::connect(opts).await.unwrap();
    schema::sync(&conn).await.unwrap();

    let state = AppState::new(config, DbPool::from_connection(conn)).unwrap();
    create_router(state)
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = Some("test-secret".to_string());
    config.rate_limit.enabled = false;
    config
}

async fn app() -> Router {
    app_with(test_config()).await
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

/// Register a user and return (id, token)
async fn register(app: &Router, name: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "password": "secret-pass"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    (
        body["data"]["user"]["id"].as_str().unwrap().to_string(),
        body["data"]["token"].as_str().unwrap().to_string(),
    )
}

/// Register an artist with one $500 listing; returns (artist id, token, artwork id)
async fn artist_with_artwork(app: &Router, name: &str) -> (String, String, String) {
    let (id, token) = register(app, name).await;

    let (status, _) = send(
        app,
        Method::POST,
        "/api/artists",
        Some(&token),
        Some(json!({ "bio": "Oil on canvas" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/artworks",
        Some(&token),
        Some(json!({
            "title": "Harbour at Dusk",
            "description": "Oil on linen",
            "price": 500.0,
            "medium": "painting",
            "style": "impressionism",
            "tags": ["sea", "oil"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let artwork_id = body["data"]["id"].as_str().unwrap().to_string();
    (id, token, artwork_id)
}

fn order_body(artwork_id: &str) -> Value {
    json!({
        "artworkId": artwork_id,
        "paymentMethod": "credit_card",
        "shippingAddress": {
            "fullName": "Ada Buyer",
            "street": "1 Main St",
            "city": "Porto",
            "postalCode": "4000-001",
            "country": "PT"
        }
    })
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "up");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = app().await;
    let (id, token) = register(&app, "Grace").await;

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["email"], "grace@example.com");
    assert!(body["data"]["artistProfile"].is_null());
    assert!(body["data"].get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "GRACE@example.com", "password": "secret-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = app().await;
    register(&app, "Grace").await;

    for email in ["grace@example.com", "nobody@example.com"] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": "wrong-pass" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["message"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = app().await;
    register(&app, "Grace").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Grace Again",
            "email": "grace@example.com",
            "password": "secret-pass"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validation_reports_field() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Al", "email": "al@example.com", "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "password");
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_only_artists_can_list_artworks() {
    let app = app().await;
    let (_, token) = register(&app, "Buyer").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/artworks",
        Some(&token),
        Some(json!({
            "title": "Sketch",
            "price": 10.0,
            "medium": "drawing",
            "style": "realism"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_artwork_listing_filters_and_pagination() {
    let app = app().await;
    let (artist_id, _, _) = artist_with_artwork(&app, "Monet").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/artworks?medium=painting&minPrice=100&search=HARBOUR&limit=500",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["pagination"]["pages"], 1);
    assert_eq!(body["data"][0]["artist"]["id"], artist_id.as_str());
    assert_eq!(body["data"][0]["likes"], 0);

    let (_, body) = send(&app, Method::GET, "/api/artworks?maxPrice=100", None, None).await;
    assert_eq!(body["pagination"]["total"], 0);

    let uri = format!("/api/artists/{}/artworks", artist_id);
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_viewing_artwork_counts_views_and_records_event() {
    let app = app().await;
    let (_, artist_token, artwork_id) = artist_with_artwork(&app, "Monet").await;
    let uri = format!("/api/artworks/{}", artwork_id);

    send(&app, Method::GET, &uri, None, None).await;
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["views"], 2);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/analytics/summary",
        Some(&artist_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["onMyArtworks"]["artwork_view"], 2);
}

#[tokio::test]
async fn test_artwork_like_toggle_restores_state() {
    let app = app().await;
    let (_, _, artwork_id) = artist_with_artwork(&app, "Monet").await;
    let (_, token) = register(&app, "Fan").await;
    let uri = format!("/api/artworks/{}/like", artwork_id);

    let (_, body) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(body["data"], json!({ "liked": true, "likes": 1 }));

    let (_, body) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(body["data"], json!({ "liked": false, "likes": 0 }));
}

#[tokio::test]
async fn test_order_lifecycle_and_review() {
    let app = app().await;
    let (_, artist_token, artwork_id) = artist_with_artwork(&app, "Monet").await;
    let (buyer_id, buyer_token) = register(&app, "Buyer").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&buyer_token),
        Some(order_body(&artwork_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order = &body["data"];
    let pattern = regex_lite::Regex::new(r"^ORD-\d+-[A-Z0-9]{9}$").unwrap();
    assert!(pattern.is_match(order["orderNumber"].as_str().unwrap()));
    assert_eq!(order["price"], 500.0);
    assert_eq!(order["orderStatus"], "pending");
    assert_eq!(order["paymentStatus"], "pending");
    assert_eq!(order["buyerId"], buyer_id.as_str());
    let order_id = order["id"].as_str().unwrap().to_string();

    // Reserved now
    let (_, other_token) = register(&app, "Latecomer").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&other_token),
        Some(order_body(&artwork_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "Artwork is not available");

    // Strangers cannot see it, the buyer can
    let uri = format!("/api/orders/{}", order_id);
    let (status, _) = send(&app, Method::GET, &uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(&app, Method::GET, &uri, Some(&buyer_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["artwork"]["status"], "reserved");

    // The buyer cannot drive fulfilment
    let status_uri = format!("/api/orders/{}/status", order_id);
    let (status, _) = send(
        &app,
        Method::PUT,
        &status_uri,
        Some(&buyer_token),
        Some(json!({ "orderStatus": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Skipping ahead is fine, going back is not
    let (status, body) = send(
        &app,
        Method::PUT,
        &status_uri,
        Some(&artist_token),
        Some(json!({ "status": "shipped", "paymentStatus": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["orderStatus"], "shipped");
    assert_eq!(body["data"]["paymentStatus"], "completed");

    let (status, body) = send(
        &app,
        Method::PUT,
        &status_uri,
        Some(&artist_token),
        Some(json!({ "orderStatus": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

    // Shipped orders can no longer be cancelled
    let cancel_uri = format!("/api/orders/{}/cancel", order_id);
    let (status, _) = send(&app, Method::PUT, &cancel_uri, Some(&buyer_token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        &status_uri,
        Some(&artist_token),
        Some(json!({ "orderStatus": "delivered" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/artists/me/dashboard", Some(&artist_token), None).await;
    assert_eq!(body["data"]["totalSales"], 1);
    assert_eq!(body["data"]["totalRevenue"], 500.0);
    assert_eq!(body["data"]["ordersByStatus"]["delivered"], 1);

    // Review once, and only once
    let review = json!({ "orderId": order_id, "rating": 5, "comment": "Stunning" });
    let (status, body) = send(&app, Method::POST, "/api/reviews", Some(&buyer_token), Some(review.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["artworkId"], artwork_id.as_str());

    let (status, body) = send(&app, Method::POST, "/api/reviews", Some(&buyer_token), Some(review)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "Review already exists for this order");

    let uri = format!("/api/reviews/artwork/{}", artwork_id);
    let (_, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["buyer"]["name"], "Buyer");

    let (_, body) = send(&app, Method::GET, "/api/auth/me", Some(&artist_token), None).await;
    assert_eq!(body["data"]["artistProfile"]["rating"], 5.0);

    // New order, then a review, landed in the artist's inbox
    let (_, body) = send(
        &app,
        Method::GET,
        "/api/notifications/unread-count",
        Some(&artist_token),
        None,
    )
    .await;
    assert_eq!(body["data"]["count"], 2);
}

#[tokio::test]
async fn test_cancel_releases_artwork() {
    let app = app().await;
    let (_, _, artwork_id) = artist_with_artwork(&app, "Monet").await;
    let (_, buyer_token) = register(&app, "Buyer").await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&buyer_token),
        Some(order_body(&artwork_id)),
    )
    .await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/orders/{}/cancel", order_id);
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&buyer_token),
        Some(json!({ "reason": "Changed my mind" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["orderStatus"], "cancelled");
    assert_eq!(body["data"]["cancellationReason"], "Changed my mind");

    let (_, body) = send(&app, Method::GET, &format!("/api/artworks/{}", artwork_id), None, None).await;
    assert_eq!(body["data"]["status"], "available");

    let (_, body) = send(&app, Method::GET, "/api/orders/my-orders?status=cancelled", Some(&buyer_token), None).await;
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_connection_requests() {
    let app = app().await;
    let (alice_id, alice_token) = register(&app, "Alice").await;
    let (bob_id, bob_token) = register(&app, "Bob").await;

    let request = json!({ "receiverId": bob_id, "message": "Love your work" });
    let (status, body) = send(&app, Method::POST, "/api/community/connect", Some(&alice_token), Some(request.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "pending");
    let connection_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, "/api/community/connect", Some(&alice_token), Some(request)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, Method::GET, "/api/community/requests/incoming", Some(&bob_token), None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["user"]["id"], alice_id.as_str());

    // Only the receiver may answer
    let uri = format!("/api/community/requests/{}/accept", connection_id);
    let (status, _) = send(&app, Method::PUT, &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::PUT, &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "accepted");

    let (_, body) = send(&app, Method::GET, "/api/community/connections", Some(&alice_token), None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["user"]["id"], bob_id.as_str());

    let uri = format!("/api/community/connections/{}", connection_id);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/community/connections", Some(&alice_token), None).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_post_lifecycle() {
    let app = app().await;
    let (_, author_token) = register(&app, "Author").await;
    let (_, reader_token) = register(&app, "Reader").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/community/posts",
        Some(&author_token),
        Some(json!({ "title": "Glazing tips", "content": "Thin layers", "category": "discussion" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let post_id = body["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/community/posts/{}/comments", post_id);
    let (status, body) = send(&app, Method::POST, &uri, Some(&reader_token), Some(json!({ "content": "Thanks!" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();

    let like_uri = format!("/api/community/posts/comments/{}/like", comment_id);
    let (_, body) = send(&app, Method::POST, &like_uri, Some(&author_token), None).await;
    assert_eq!(body["data"]["liked"], true);

    let uri = format!("/api/community/posts/{}/like", post_id);
    let (_, body) = send(&app, Method::POST, &uri, Some(&reader_token), None).await;
    assert_eq!(body["data"]["likes"], 1);

    let (_, body) = send(&app, Method::GET, "/api/community/posts?search=glazing", Some(&reader_token), None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["comments"], 1);
    assert_eq!(body["data"][0]["liked"], true);

    let uri = format!("/api/community/posts/{}", post_id);
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["post"]["views"], 1);
    assert_eq!(body["data"]["comments"][0]["likes"], 1);

    // Comment notified the author
    let (_, body) = send(&app, Method::GET, "/api/notifications?unread=true", Some(&author_token), None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["kind"], "comment");

    // Someone else's post reads as missing
    let (status, body) = send(&app, Method::DELETE, &uri, Some(&reader_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Post not found or unauthorized");

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&author_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, &like_uri, Some(&author_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notifications_mark_read() {
    let app = app().await;
    let (_, alice_token) = register(&app, "Alice").await;
    let (bob_id, bob_token) = register(&app, "Bob").await;

    send(
        &app,
        Method::POST,
        "/api/community/connect",
        Some(&alice_token),
        Some(json!({ "receiverId": bob_id })),
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/api/notifications", Some(&bob_token), None).await;
    assert_eq!(body["data"][0]["isRead"], false);
    let notification_id = body["data"][0]["id"].as_str().unwrap().to_string();

    // Not Alice's to read
    let uri = format!("/api/notifications/{}/read", notification_id);
    let (status, _) = send(&app, Method::PUT, &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::PUT, "/api/notifications/read-all", Some(&bob_token), None).await;
    assert_eq!(body["data"]["updated"], 1);

    let (_, body) = send(&app, Method::GET, "/api/notifications/unread-count", Some(&bob_token), None).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_anonymous_analytics_event() {
    let app = app().await;
    let (_, token) = register(&app, "Visitor").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/analytics/events",
        None,
        Some(json!({ "eventType": "search", "metadata": { "q": "blue" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["userId"].is_null());

    send(
        &app,
        Method::POST,
        "/api/analytics/events",
        Some(&token),
        Some(json!({ "eventType": "search" })),
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/api/analytics/events?eventType=search", Some(&token), None).await;
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let mut config = test_config();
    config.rate_limit = arthub_common::config::RateLimitConfig {
        requests_per_second: 1,
        burst: 1,
        enabled: true,
    };
    let app = app_with(config).await;

    let (status, _) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn test_missing_jwt_secret_is_a_configuration_error() {
    let conn = Database::connect("sqlite::memory:").await.unwrap();

    let err = AppState::new(AppConfig::default(), DbPool::from_connection(conn))
        .err()
        .unwrap();
    assert!(matches!(err, AppError::Configuration { .. }));
}
