//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations with proper
//! error handling and transaction support. Each resource lives in its own
//! submodule as an `impl Repository` block.

mod analytics;
mod artists;
mod artworks;
mod community;
mod notifications;
mod orders;
mod posts;
mod reviews;
mod users;

pub use analytics::{EventSummary, NewEvent};
pub use artists::{ArtistDashboard, ArtistProfileInput};
pub use artworks::{ArtworkChanges, ArtworkFilter, ArtworkListing, ArtworkSort, NewArtwork};
pub use community::{ConnectionListing, NewConnection};
pub use notifications::NewNotification;
pub use orders::{generate_order_number, NewOrder, OrderListing, OrderStatusUpdate};
pub use posts::{CommentListing, NewPost, PostChanges, PostDetail, PostFilter, PostListing};
pub use reviews::{NewReview, ReviewListing};
pub use users::{NewUser, UserChanges, UserSummary};

use crate::db::DbPool;
use crate::errors::Result;
use sea_orm::{
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr},
    DatabaseConnection,
};
use serde::Serialize;

/// Outcome of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeToggle {
    /// Whether the caller likes the target after the toggle
    pub liked: bool,
    /// Like count after the toggle
    pub likes: u64,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }
}

fn now() -> DateTimeWithTimeZone {
    chrono::Utc::now().into()
}

/// Escape LIKE wildcards in `term` so they match literally
fn escape_like(term: &str) -> String {
    term.trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Case-insensitive "contains" match of `column` against `term`
fn contains_ci<C: IntoColumnRef>(column: C, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(format!("%{}%", escape_like(&term.to_lowercase()))).escape('\\'))
}

/// Trimmed search term, `None` when blank
fn search_term(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
