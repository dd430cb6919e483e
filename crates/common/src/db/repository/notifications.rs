use super::{now, Repository};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::response::{Page, PageRequest};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

/// Insert a notification on any connection, including an open transaction
pub(crate) async fn notify<C: ConnectionTrait>(
    conn: &C,
    new: NewNotification,
) -> Result<Notification> {
    let notification = NotificationActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(new.user_id),
        kind: Set(new.kind),
        title: Set(new.title),
        message: Set(new.message),
        link: Set(new.link),
        is_read: Set(false),
        created_at: Set(now()),
    };

    let notification = notification.insert(conn).await?;
    tracing::debug!(
        user_id = %notification.user_id,
        kind = ?notification.kind,
        "Notification queued"
    );
    Ok(notification)
}

impl Repository {
    pub async fn create_notification(&self, new: NewNotification) -> Result<Notification> {
        notify(self.write_conn(), new).await
    }

    /// Newest first
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<Notification>> {
        let mut query = NotificationEntity::find().filter(NotificationColumn::UserId.eq(user_id));
        if unread_only {
            query = query.filter(NotificationColumn::IsRead.eq(false));
        }

        let paginator = query
            .order_by_desc(NotificationColumn::CreatedAt)
            .paginate(self.read_conn(), page.limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Page::new(items, total, page))
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64> {
        NotificationEntity::find()
            .filter(NotificationColumn::UserId.eq(user_id))
            .filter(NotificationColumn::IsRead.eq(false))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification> {
        let notification = self.owned_notification(id, user_id).await?;
        if notification.is_read {
            return Ok(notification);
        }

        let mut active: NotificationActiveModel = notification.into();
        active.is_read = Set(true);
        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Returns how many notifications changed
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = NotificationEntity::update_many()
            .col_expr(NotificationColumn::IsRead, Expr::value(true))
            .filter(NotificationColumn::UserId.eq(user_id))
            .filter(NotificationColumn::IsRead.eq(false))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let notification = self.owned_notification(id, user_id).await?;
        NotificationEntity::delete_by_id(notification.id)
            .exec(self.write_conn())
            .await?;
        Ok(())
    }

    /// Another user's notification is reported as missing
    async fn owned_notification(&self, id: Uuid, user_id: Uuid) -> Result<Notification> {
        NotificationEntity::find_by_id(id)
            .filter(NotificationColumn::UserId.eq(user_id))
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;

    fn system(user_id: Uuid, title: &str) -> NewNotification {
        NewNotification {
            user_id,
            kind: NotificationKind::System,
            title: title.to_string(),
            message: "Hello".to_string(),
            link: None,
        }
    }

    #[tokio::test]
    async fn test_unread_tracking() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;

        let first = repo.create_notification(system(alice.id, "one")).await.unwrap();
        repo.create_notification(system(alice.id, "two")).await.unwrap();
        repo.create_notification(system(bob.id, "other")).await.unwrap();

        assert_eq!(repo.unread_count(alice.id).await.unwrap(), 2);

        let read = repo.mark_notification_read(first.id, alice.id).await.unwrap();
        assert!(read.is_read);
        assert_eq!(repo.unread_count(alice.id).await.unwrap(), 1);

        let unread = repo
            .list_notifications(alice.id, true, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(unread.total, 1);
        assert_eq!(unread.items[0].title, "two");

        assert_eq!(repo.mark_all_read(alice.id).await.unwrap(), 1);
        assert_eq!(repo.unread_count(alice.id).await.unwrap(), 0);
        assert_eq!(repo.unread_count(bob.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cannot_touch_other_users_notification() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;

        let note = repo.create_notification(system(alice.id, "private")).await.unwrap();

        let err = repo.delete_notification(note.id, bob.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        repo.delete_notification(note.id, alice.id).await.unwrap();
        let all = repo
            .list_notifications(alice.id, false, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.total, 0);
    }
}
