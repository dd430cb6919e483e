use super::{now, Repository};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Public view of a user, embedded in other resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub profile_picture: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }
}

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the picture
    pub profile_picture: Option<Option<String>>,
}

const EMAIL_TAKEN: &str = "Email is already registered";

impl Repository {
    /// Create a user account. Emails are unique, compared case-insensitively.
    pub async fn create_user(&self, new: NewUser) -> Result<User> {
        let email = new.email.trim().to_lowercase();

        if self.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::Duplicate {
                message: EMAIL_TAKEN.to_string(),
            });
        }

        let now = now();
        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name.trim().to_string()),
            email: Set(email),
            password_hash: Set(new.password_hash),
            profile_picture: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let user = user
            .insert(self.write_conn())
            .await
            .map_err(|e| AppError::from_unique_violation(e, EMAIL_TAKEN))?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        UserEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Email.eq(email.trim().to_lowercase()))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User> {
        let mut user = UserEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::UserNotFound { id: id.to_string() })?
            .into_active_model();

        if let Some(name) = changes.name {
            user.name = Set(name.trim().to_string());
        }
        if let Some(picture) = changes.profile_picture {
            user.profile_picture = Set(picture);
        }
        user.updated_at = Set(now());

        user.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Summaries for a set of users, keyed by id. Unknown ids are skipped.
    pub async fn user_summaries(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, UserSummary>> {
        let mut ids: Vec<Uuid> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = UserEntity::find()
            .filter(UserColumn::Id.is_in(ids))
            .all(self.read_conn())
            .await?;

        Ok(users.iter().map(|u| (u.id, UserSummary::from(u))).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;

    #[tokio::test]
    async fn test_email_is_unique_case_insensitive() {
        let repo = fixtures::repo().await;
        fixtures::user(&repo, "alice").await;

        let err = repo
            .create_user(NewUser {
                name: "Alice Again".into(),
                email: "  ALICE@example.com ".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Duplicate { .. }));
        assert_eq!(err.to_string(), "Email is already registered");
    }

    #[tokio::test]
    async fn test_find_by_email_normalizes() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;

        let found = repo.find_user_by_email("Alice@Example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(alice.id));
    }

    #[tokio::test]
    async fn test_update_user() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;

        let updated = repo
            .update_user(
                alice.id,
                UserChanges {
                    name: Some(" Alice L ".into()),
                    profile_picture: Some(Some("https://img.example.com/a.png".into())),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Alice L");
        assert_eq!(updated.profile_picture.as_deref(), Some("https://img.example.com/a.png"));
        assert_eq!(updated.email, alice.email);
    }

    #[tokio::test]
    async fn test_user_summaries_skip_unknown() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;

        let summaries = repo
            .user_summaries([alice.id, bob.id, alice.id, Uuid::new_v4()])
            .await
            .unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[&bob.id].name, "bob");
    }
}
