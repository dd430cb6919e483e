use super::notifications::{notify, NewNotification};
use super::{now, Repository, UserSummary};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::response::{Page, PageRequest};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

pub struct NewConnection {
    pub receiver_id: Uuid,
    pub connection_type: Option<ConnectionType>,
    pub message: Option<String>,
}

/// A connection together with the other party's summary
#[derive(Debug, Clone)]
pub struct ConnectionListing {
    pub connection: Connection,
    pub user: Option<UserSummary>,
}

const REQUEST_EXISTS: &str = "Connection request already exists";

impl Repository {
    pub async fn send_connection_request(
        &self,
        sender_id: Uuid,
        new: NewConnection,
    ) -> Result<Connection> {
        if sender_id == new.receiver_id {
            return Err(AppError::validation(
                "receiverId",
                "You cannot connect with yourself",
            ));
        }

        let sender = self
            .find_user_by_id(sender_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound {
                id: sender_id.to_string(),
            })?;
        if self.find_user_by_id(new.receiver_id).await?.is_none() {
            return Err(AppError::UserNotFound {
                id: new.receiver_id.to_string(),
            });
        }

        let existing = ConnectionEntity::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(ConnectionColumn::SenderId.eq(sender_id))
                            .add(ConnectionColumn::ReceiverId.eq(new.receiver_id)),
                    )
                    .add(
                        Condition::all()
                            .add(ConnectionColumn::SenderId.eq(new.receiver_id))
                            .add(ConnectionColumn::ReceiverId.eq(sender_id)),
                    ),
            )
            .all(self.write_conn())
            .await?;

        for connection in &existing {
            if connection.status == ConnectionStatus::Blocked {
                return Err(AppError::forbidden("You cannot connect with this user"));
            }
            if connection.sender_id == sender_id {
                return Err(AppError::Duplicate {
                    message: REQUEST_EXISTS.to_string(),
                });
            }
        }

        let txn = self.write_conn().begin().await?;

        let now = now();
        let connection = ConnectionActiveModel {
            id: Set(Uuid::new_v4()),
            sender_id: Set(sender_id),
            receiver_id: Set(new.receiver_id),
            status: Set(ConnectionStatus::Pending),
            connection_type: Set(new.connection_type.unwrap_or_default()),
            message: Set(new.message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty())),
            blocked_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let connection = match connection.insert(&txn).await {
            Ok(connection) => connection,
            Err(e) => {
                txn.rollback().await?;
                return Err(AppError::from_unique_violation(e, REQUEST_EXISTS));
            }
        };

        notify(
            &txn,
            NewNotification {
                user_id: connection.receiver_id,
                kind: NotificationKind::Connection,
                title: "New connection request".to_string(),
                message: format!("{} wants to connect with you", sender.name),
                link: Some("/community/requests".to_string()),
            },
        )
        .await?;

        txn.commit().await?;

        metrics::record_connection_request();
        tracing::info!(
            connection_id = %connection.id,
            sender_id = %sender_id,
            receiver_id = %connection.receiver_id,
            "Connection requested"
        );

        Ok(connection)
    }

    /// Read from the primary; permission checks must not see a lagging replica
    async fn find_connection(&self, id: Uuid) -> Result<Connection> {
        ConnectionEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::not_found("Connection not found"))
    }

    /// Accept or reject a pending request; receiver only
    pub async fn respond_to_request(
        &self,
        id: Uuid,
        actor_id: Uuid,
        accept: bool,
    ) -> Result<Connection> {
        let connection = self.find_connection(id).await?;

        if connection.receiver_id != actor_id {
            return Err(AppError::forbidden(
                "Only the receiver can respond to this request",
            ));
        }

        let next = if accept {
            ConnectionStatus::Accepted
        } else {
            ConnectionStatus::Rejected
        };
        if connection.status != ConnectionStatus::Pending {
            return Err(AppError::InvalidTransition {
                entity: "connection",
                from: connection.status.to_value(),
                to: next.to_value(),
            });
        }

        let txn = self.write_conn().begin().await?;

        let answered = ConnectionEntity::update_many()
            .set(ConnectionActiveModel {
                status: Set(next),
                updated_at: Set(now()),
                ..Default::default()
            })
            .filter(ConnectionColumn::Id.eq(id))
            .filter(ConnectionColumn::Status.eq(ConnectionStatus::Pending))
            .exec(&txn)
            .await?;

        let Some(updated) = ConnectionEntity::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Err(AppError::not_found("Connection not found"));
        };
        if answered.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::InvalidTransition {
                entity: "connection",
                from: updated.status.to_value(),
                to: next.to_value(),
            });
        }

        if accept {
            let receiver = UserEntity::find_by_id(actor_id).one(&txn).await?;
            let name = receiver.map(|u| u.name).unwrap_or_else(|| "Someone".to_string());
            notify(
                &txn,
                NewNotification {
                    user_id: updated.sender_id,
                    kind: NotificationKind::Connection,
                    title: "Connection accepted".to_string(),
                    message: format!("{} accepted your connection request", name),
                    link: Some("/community/connections".to_string()),
                },
            )
            .await?;
        }

        txn.commit().await?;

        tracing::info!(connection_id = %id, status = %next.to_value(), "Connection request answered");
        Ok(updated)
    }

    /// Either party may block, from any state. An existing block is returned
    /// as is, whoever placed it.
    pub async fn block_connection(&self, id: Uuid, actor_id: Uuid) -> Result<Connection> {
        let connection = self.find_connection(id).await?;
        if !connection.involves(actor_id) {
            return Err(AppError::not_found("Connection not found"));
        }
        if connection.status == ConnectionStatus::Blocked {
            return Ok(connection);
        }

        ConnectionEntity::update_many()
            .set(ConnectionActiveModel {
                status: Set(ConnectionStatus::Blocked),
                blocked_by: Set(Some(actor_id)),
                updated_at: Set(now()),
                ..Default::default()
            })
            .filter(ConnectionColumn::Id.eq(id))
            .filter(ConnectionColumn::Status.ne(ConnectionStatus::Blocked))
            .exec(self.write_conn())
            .await?;

        let connection = self.find_connection(id).await?;
        tracing::info!(
            connection_id = %id,
            blocked_by = ?connection.blocked_by,
            "Connection blocked"
        );
        Ok(connection)
    }

    /// Either party may remove a connection, except that a block can only
    /// be lifted by the user who placed it
    pub async fn remove_connection(&self, id: Uuid, actor_id: Uuid) -> Result<()> {
        let connection = self.find_connection(id).await?;
        if !connection.involves(actor_id) {
            return Err(AppError::not_found("Connection not found"));
        }

        let removed = ConnectionEntity::delete_many()
            .filter(ConnectionColumn::Id.eq(id))
            .filter(
                Condition::any()
                    .add(ConnectionColumn::Status.ne(ConnectionStatus::Blocked))
                    .add(ConnectionColumn::BlockedBy.eq(actor_id)),
            )
            .exec(self.write_conn())
            .await?;

        if removed.rows_affected == 0 {
            // Surfaces NotFound if the other party removed it first
            self.find_connection(id).await?;
            return Err(AppError::forbidden(
                "Only the user who blocked can remove this connection",
            ));
        }
        Ok(())
    }

    /// Pending requests addressed to the user
    pub async fn list_incoming_requests(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ConnectionListing>> {
        self.connection_page(
            user_id,
            Condition::all()
                .add(ConnectionColumn::ReceiverId.eq(user_id))
                .add(ConnectionColumn::Status.eq(ConnectionStatus::Pending)),
            page,
        )
        .await
    }

    /// Pending requests the user sent
    pub async fn list_outgoing_requests(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ConnectionListing>> {
        self.connection_page(
            user_id,
            Condition::all()
                .add(ConnectionColumn::SenderId.eq(user_id))
                .add(ConnectionColumn::Status.eq(ConnectionStatus::Pending)),
            page,
        )
        .await
    }

    /// Accepted connections in either direction
    pub async fn list_connections(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ConnectionListing>> {
        self.connection_page(
            user_id,
            Condition::all()
                .add(ConnectionColumn::Status.eq(ConnectionStatus::Accepted))
                .add(
                    Condition::any()
                        .add(ConnectionColumn::SenderId.eq(user_id))
                        .add(ConnectionColumn::ReceiverId.eq(user_id)),
                ),
            page,
        )
        .await
    }

    async fn connection_page(
        &self,
        user_id: Uuid,
        condition: Condition,
        page: PageRequest,
    ) -> Result<Page<ConnectionListing>> {
        let paginator = ConnectionEntity::find()
            .filter(condition)
            .order_by_desc(ConnectionColumn::CreatedAt)
            .paginate(self.read_conn(), page.limit);

        let total = paginator.num_items().await?;
        let connections = paginator.fetch_page(page.index()).await?;

        let users = self
            .user_summaries(connections.iter().map(|c| c.other_party(user_id)))
            .await?;

        let items = connections
            .into_iter()
            .map(|connection| ConnectionListing {
                user: users.get(&connection.other_party(user_id)).cloned(),
                connection,
            })
            .collect();

        Ok(Page::new(items, total, page))
    }
}
