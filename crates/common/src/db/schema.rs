//! Schema bootstrap: creates every table and index that is missing.
//!
//! Tables are created parents-first so foreign keys resolve on PostgreSQL.

use crate::db::models::*;
use crate::errors::Result;
use sea_orm::{
    sea_query::{Index, IndexCreateStatement},
    ConnectionTrait, EntityTrait, Schema,
};
use tracing::info;

/// Create all tables and indexes if they do not exist yet
pub async fn sync<C: ConnectionTrait>(db: &C) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, UserEntity).await?;
    create_table(db, &schema, ArtistProfileEntity).await?;
    create_table(db, &schema, ArtworkEntity).await?;
    create_table(db, &schema, ArtworkLikeEntity).await?;
    create_table(db, &schema, OrderEntity).await?;
    create_table(db, &schema, ReviewEntity).await?;
    create_table(db, &schema, ConnectionEntity).await?;
    create_table(db, &schema, PostEntity).await?;
    create_table(db, &schema, PostLikeEntity).await?;
    create_table(db, &schema, CommentEntity).await?;
    create_table(db, &schema, CommentLikeEntity).await?;
    create_table(db, &schema, AnalyticsEventEntity).await?;
    create_table(db, &schema, NotificationEntity).await?;

    for index in composite_indexes() {
        db.execute(db.get_database_backend().build(&index)).await?;
    }

    info!("Database schema is up to date");
    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait + Copy,
{
    let backend = db.get_database_backend();

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(backend.build(&table)).await?;

    // Single-column `#[sea_orm(indexed)]` indexes
    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }

    Ok(())
}

/// Multi-column indexes that entity attributes cannot express
fn composite_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("uq_connections_sender_receiver")
            .table(ConnectionEntity)
            .col(ConnectionColumn::SenderId)
            .col(ConnectionColumn::ReceiverId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_comments_post_created")
            .table(CommentEntity)
            .col(CommentColumn::PostId)
            .col(CommentColumn::CreatedAt)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_notifications_user_read")
            .table(NotificationEntity)
            .col(NotificationColumn::UserId)
            .col(NotificationColumn::IsRead)
            .if_not_exists()
            .to_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database};

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();

        sync(&db).await.unwrap();
        sync(&db).await.unwrap();
    }
}
