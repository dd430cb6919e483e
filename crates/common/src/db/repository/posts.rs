use super::notifications::{notify, NewNotification};
use super::{contains_ci, now, search_term, LikeToggle, Repository, UserSummary};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::response::{Page, PageRequest};
use sea_orm::{
    sea_query::{Expr, OnConflict, Query},
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: Option<PostCategory>,
}

#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<PostCategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFilter {
    /// Matches title, content, category or author name
    pub search: Option<String>,
    pub category: Option<PostCategory>,
}

#[derive(Debug, Clone)]
pub struct PostListing {
    pub post: Post,
    pub author: Option<UserSummary>,
    pub likes: u64,
    pub comments: u64,
    pub liked: bool,
}

#[derive(Debug, Clone)]
pub struct CommentListing {
    pub comment: Comment,
    pub author: Option<UserSummary>,
    pub likes: u64,
    pub liked: bool,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostListing,
    /// Oldest first
    pub comments: Vec<CommentListing>,
}

const POST_NOT_FOUND: &str = "Post not found";
const POST_NOT_OWNED: &str = "Post not found or unauthorized";
const COMMENT_NOT_OWNED: &str = "Comment not found or unauthorized";

fn to_counts(rows: Vec<(Uuid, i64)>) -> HashMap<Uuid, u64> {
    rows.into_iter().map(|(id, n)| (id, n as u64)).collect()
}

impl Repository {
    pub async fn create_post(&self, author_id: Uuid, new: NewPost) -> Result<Post> {
        let now = now();
        let post = PostActiveModel {
            id: Set(Uuid::new_v4()),
            author_id: Set(author_id),
            title: Set(new.title.trim().to_string()),
            content: Set(new.content.trim().to_string()),
            category: Set(new.category.unwrap_or_default()),
            views: Set(0),
            is_pinned: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let post = post.insert(self.write_conn()).await?;

        metrics::record_post_created(&post.category.to_value());
        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");
        Ok(post)
    }

    /// Pinned posts first, then newest
    pub async fn list_posts(
        &self,
        filter: &PostFilter,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<PostListing>> {
        let mut query = PostEntity::find();

        if let Some(category) = filter.category {
            query = query.filter(PostColumn::Category.eq(category));
        }
        if let Some(term) = search_term(&filter.search) {
            let authors = Query::select()
                .column(UserColumn::Id)
                .from(UserEntity)
                .and_where(contains_ci(UserColumn::Name, term))
                .to_owned();

            query = query.filter(
                Condition::any()
                    .add(contains_ci(PostColumn::Title, term))
                    .add(contains_ci(PostColumn::Content, term))
                    .add(contains_ci(PostColumn::Category, term))
                    .add(PostColumn::AuthorId.in_subquery(authors)),
            );
        }

        let paginator = query
            .order_by_desc(PostColumn::IsPinned)
            .order_by_desc(PostColumn::CreatedAt)
            .paginate(self.read_conn(), page.limit);

        let total = paginator.num_items().await?;
        let posts = paginator.fetch_page(page.index()).await?;
        let items = self.post_listings(posts, viewer).await?;

        Ok(Page::new(items, total, page))
    }

    async fn post_listings(&self, posts: Vec<Post>, viewer: Option<Uuid>) -> Result<Vec<PostListing>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let authors = self.user_summaries(posts.iter().map(|p| p.author_id)).await?;

        let likes = to_counts(
            PostLikeEntity::find()
                .select_only()
                .column(PostLikeColumn::PostId)
                .column_as(Expr::col(PostLikeColumn::UserId).count(), "likes")
                .filter(PostLikeColumn::PostId.is_in(ids.clone()))
                .group_by(PostLikeColumn::PostId)
                .into_tuple()
                .all(self.read_conn())
                .await?,
        );

        let comments = to_counts(
            CommentEntity::find()
                .select_only()
                .column(CommentColumn::PostId)
                .column_as(Expr::col(CommentColumn::Id).count(), "comments")
                .filter(CommentColumn::PostId.is_in(ids.clone()))
                .group_by(CommentColumn::PostId)
                .into_tuple()
                .all(self.read_conn())
                .await?,
        );

        let liked: HashSet<Uuid> = match viewer {
            Some(user_id) => PostLikeEntity::find()
                .select_only()
                .column(PostLikeColumn::PostId)
                .filter(PostLikeColumn::UserId.eq(user_id))
                .filter(PostLikeColumn::PostId.is_in(ids))
                .into_tuple::<Uuid>()
                .all(self.read_conn())
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        Ok(posts
            .into_iter()
            .map(|post| PostListing {
                author: authors.get(&post.author_id).cloned(),
                likes: likes.get(&post.id).copied().unwrap_or(0),
                comments: comments.get(&post.id).copied().unwrap_or(0),
                liked: liked.contains(&post.id),
                post,
            })
            .collect())
    }

    async fn comment_listings(
        &self,
        comments: Vec<Comment>,
        viewer: Option<Uuid>,
    ) -> Result<Vec<CommentListing>> {
        if comments.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = comments.iter().map(|c| c.id).collect();
        let authors = self.user_summaries(comments.iter().map(|c| c.author_id)).await?;

        let likes = to_counts(
            CommentLikeEntity::find()
                .select_only()
                .column(CommentLikeColumn::CommentId)
                .column_as(Expr::col(CommentLikeColumn::UserId).count(), "likes")
                .filter(CommentLikeColumn::CommentId.is_in(ids.clone()))
                .group_by(CommentLikeColumn::CommentId)
                .into_tuple()
                .all(self.read_conn())
                .await?,
        );

        let liked: HashSet<Uuid> = match viewer {
            Some(user_id) => CommentLikeEntity::find()
                .select_only()
                .column(CommentLikeColumn::CommentId)
                .filter(CommentLikeColumn::UserId.eq(user_id))
                .filter(CommentLikeColumn::CommentId.is_in(ids))
                .into_tuple::<Uuid>()
                .all(self.read_conn())
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        Ok(comments
            .into_iter()
            .map(|comment| CommentListing {
                author: authors.get(&comment.author_id).cloned(),
                likes: likes.get(&comment.id).copied().unwrap_or(0),
                liked: liked.contains(&comment.id),
                comment,
            })
            .collect())
    }

    async fn find_post(&self, id: Uuid) -> Result<Post> {
        PostEntity::find_by_id(id)
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))
    }

    /// Post with its comments; counts the view
    pub async fn get_post(&self, id: Uuid, viewer: Option<Uuid>) -> Result<PostDetail> {
        let result = PostEntity::update_many()
            .col_expr(PostColumn::Views, Expr::col(PostColumn::Views).add(1))
            .filter(PostColumn::Id.eq(id))
            .exec(self.write_conn())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found(POST_NOT_FOUND));
        }

        let post = self.find_post(id).await?;
        let comments = CommentEntity::find()
            .filter(CommentColumn::PostId.eq(id))
            .order_by_asc(CommentColumn::CreatedAt)
            .all(self.read_conn())
            .await?;

        let post = self
            .post_listings(vec![post], viewer)
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))?;
        let comments = self.comment_listings(comments, viewer).await?;

        Ok(PostDetail { post, comments })
    }

    /// A post the caller wrote; anything else is reported as missing
    async fn authored_post(&self, id: Uuid, author_id: Uuid) -> Result<Post> {
        PostEntity::find_by_id(id)
            .filter(PostColumn::AuthorId.eq(author_id))
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::not_found(POST_NOT_OWNED))
    }

    pub async fn update_post(&self, id: Uuid, author_id: Uuid, changes: PostChanges) -> Result<Post> {
        let mut post = self.authored_post(id, author_id).await?.into_active_model();

        if let Some(title) = changes.title {
            post.title = Set(title.trim().to_string());
        }
        if let Some(content) = changes.content {
            post.content = Set(content.trim().to_string());
        }
        if let Some(category) = changes.category {
            post.category = Set(category);
        }
        post.updated_at = Set(now());

        post.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Removes the post with every comment and like attached to it
    pub async fn delete_post(&self, id: Uuid, author_id: Uuid) -> Result<()> {
        let post = self.authored_post(id, author_id).await?;

        let txn = self.write_conn().begin().await?;

        let comment_ids = Query::select()
            .column(CommentColumn::Id)
            .from(CommentEntity)
            .and_where(CommentColumn::PostId.eq(post.id))
            .to_owned();

        CommentLikeEntity::delete_many()
            .filter(CommentLikeColumn::CommentId.in_subquery(comment_ids))
            .exec(&txn)
            .await?;
        let comments = CommentEntity::delete_many()
            .filter(CommentColumn::PostId.eq(post.id))
            .exec(&txn)
            .await?;
        PostLikeEntity::delete_many()
            .filter(PostLikeColumn::PostId.eq(post.id))
            .exec(&txn)
            .await?;
        PostEntity::delete_by_id(post.id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(post_id = %id, comments = comments.rows_affected, "Post deleted");
        Ok(())
    }

    pub async fn toggle_post_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle> {
        self.find_post(post_id).await?;

        let txn = self.write_conn().begin().await?;

        // Insert first; a conflict means the like already existed
        let inserted = PostLikeEntity::insert(PostLikeActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
            created_at: Set(now()),
        })
        .on_conflict(
            OnConflict::columns([PostLikeColumn::PostId, PostLikeColumn::UserId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        let liked = if inserted == 0 {
            PostLikeEntity::delete_by_id((post_id, user_id)).exec(&txn).await?;
            false
        } else {
            true
        };

        let likes = PostLikeEntity::find()
            .filter(PostLikeColumn::PostId.eq(post_id))
            .count(&txn)
            .await?;

        txn.commit().await?;
        Ok(LikeToggle { liked, likes })
    }

    /// Comment on a post, notifying its author unless they wrote the comment
    pub async fn add_comment(&self, post_id: Uuid, author_id: Uuid, content: &str) -> Result<Comment> {
        let post = self.find_post(post_id).await?;

        let txn = self.write_conn().begin().await?;

        let now = now();
        let comment = CommentActiveModel {
            id: Set(Uuid::new_v4()),
            post_id: Set(post.id),
            author_id: Set(author_id),
            content: Set(content.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        if post.author_id != author_id {
            notify(
                &txn,
                NewNotification {
                    user_id: post.author_id,
                    kind: NotificationKind::Comment,
                    title: "New comment".to_string(),
                    message: format!("Someone commented on \"{}\"", post.title),
                    link: Some(format!("/community/posts/{}", post.id)),
                },
            )
            .await?;
        }

        txn.commit().await?;
        Ok(comment)
    }

    /// Oldest first
    pub async fn list_comments(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<CommentListing>> {
        self.find_post(post_id).await?;

        let paginator = CommentEntity::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .order_by_asc(CommentColumn::CreatedAt)
            .paginate(self.read_conn(), page.limit);

        let total = paginator.num_items().await?;
        let comments = paginator.fetch_page(page.index()).await?;
        let items = self.comment_listings(comments, viewer).await?;

        Ok(Page::new(items, total, page))
    }

    /// The comment's author or the post's author may delete it
    pub async fn delete_comment(&self, comment_id: Uuid, actor_id: Uuid) -> Result<()> {
        let (comment, post) = CommentEntity::find_by_id(comment_id)
            .find_also_related(PostEntity)
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::not_found(COMMENT_NOT_OWNED))?;

        let post_author = post.map(|p| p.author_id);
        if comment.author_id != actor_id && post_author != Some(actor_id) {
            return Err(AppError::not_found(COMMENT_NOT_OWNED));
        }

        let txn = self.write_conn().begin().await?;
        CommentLikeEntity::delete_many()
            .filter(CommentLikeColumn::CommentId.eq(comment.id))
            .exec(&txn)
            .await?;
        CommentEntity::delete_by_id(comment.id).exec(&txn).await?;
        txn.commit().await?;

        Ok(())
    }

    pub async fn toggle_comment_like(&self, comment_id: Uuid, user_id: Uuid) -> Result<LikeToggle> {
        if CommentEntity::find_by_id(comment_id)
            .one(self.read_conn())
            .await?
            .is_none()
        {
            return Err(AppError::not_found("Comment not found"));
        }

        let txn = self.write_conn().begin().await?;

        // Insert first; a conflict means the like already existed
        let inserted = CommentLikeEntity::insert(CommentLikeActiveModel {
            comment_id: Set(comment_id),
            user_id: Set(user_id),
            created_at: Set(now()),
        })
        .on_conflict(
            OnConflict::columns([CommentLikeColumn::CommentId, CommentLikeColumn::UserId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        let liked = if inserted == 0 {
            CommentLikeEntity::delete_by_id((comment_id, user_id)).exec(&txn).await?;
            false
        } else {
            true
        };

        let likes = CommentLikeEntity::find()
            .filter(CommentLikeColumn::CommentId.eq(comment_id))
            .count(&txn)
            .await?;

        txn.commit().await?;
        Ok(LikeToggle { liked, likes })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;

    fn post(title: &str, category: PostCategory) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: format!("{} body", title),
            category: Some(category),
        }
    }

    #[tokio::test]
    async fn test_delete_post_leaves_no_orphans() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;

        let doomed = repo.create_post(alice.id, post("Doomed", PostCategory::General)).await.unwrap();
        let other = repo.create_post(alice.id, post("Other", PostCategory::General)).await.unwrap();

        let comment = repo.add_comment(doomed.id, bob.id, "First!").await.unwrap();
        repo.add_comment(doomed.id, alice.id, "Thanks").await.unwrap();
        repo.add_comment(other.id, bob.id, "Stays").await.unwrap();
        repo.toggle_post_like(doomed.id, bob.id).await.unwrap();
        repo.toggle_comment_like(comment.id, alice.id).await.unwrap();

        let err = repo.delete_post(doomed.id, bob.id).await.unwrap_err();
        assert_eq!(err.to_string(), POST_NOT_OWNED);

        repo.delete_post(doomed.id, alice.id).await.unwrap();

        let conn = repo.read_conn();
        let orphans = CommentEntity::find()
            .filter(CommentColumn::PostId.eq(doomed.id))
            .count(conn)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
        assert_eq!(PostLikeEntity::find().count(conn).await.unwrap(), 0);
        assert_eq!(CommentLikeEntity::find().count(conn).await.unwrap(), 0);
        assert_eq!(CommentEntity::find().count(conn).await.unwrap(), 1);

        let err = repo.get_post(doomed.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_like_toggles_restore_state() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let p = repo.create_post(alice.id, post("Hello", PostCategory::General)).await.unwrap();
        let c = repo.add_comment(p.id, alice.id, "Me first").await.unwrap();

        assert_eq!(
            repo.toggle_post_like(p.id, bob.id).await.unwrap(),
            LikeToggle { liked: true, likes: 1 }
        );
        assert_eq!(
            repo.toggle_post_like(p.id, bob.id).await.unwrap(),
            LikeToggle { liked: false, likes: 0 }
        );

        assert!(repo.toggle_comment_like(c.id, bob.id).await.unwrap().liked);
        let back = repo.toggle_comment_like(c.id, bob.id).await.unwrap();
        assert_eq!(back, LikeToggle { liked: false, likes: 0 });
    }

    #[tokio::test]
    async fn test_simultaneous_like_toggles_both_succeed() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let p = repo.create_post(alice.id, post("Hello", PostCategory::General)).await.unwrap();
        let c = repo.add_comment(p.id, alice.id, "Me first").await.unwrap();

        let (first, second) = tokio::join!(
            repo.toggle_post_like(p.id, bob.id),
            repo.toggle_post_like(p.id, bob.id)
        );
        let (first, second) = (first.unwrap(), second.unwrap());
        assert_ne!(first.liked, second.liked);
        assert_eq!(repo.toggle_post_like(p.id, bob.id).await.unwrap().likes, 1);

        let (first, second) = tokio::join!(
            repo.toggle_comment_like(c.id, bob.id),
            repo.toggle_comment_like(c.id, bob.id)
        );
        assert_ne!(first.unwrap().liked, second.unwrap().liked);
    }

    #[tokio::test]
    async fn test_toggle_removes_a_like_recorded_elsewhere() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let p = repo.create_post(alice.id, post("Hello", PostCategory::General)).await.unwrap();

        PostLikeActiveModel {
            post_id: Set(p.id),
            user_id: Set(bob.id),
            created_at: Set(now()),
        }
        .insert(repo.write_conn())
        .await
        .unwrap();

        let toggled = repo.toggle_post_like(p.id, bob.id).await.unwrap();
        assert_eq!(toggled, LikeToggle { liked: false, likes: 0 });
    }

    #[tokio::test]
    async fn test_search_and_ordering() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;
        let zed = fixtures::user(&repo, "Zed Painter").await;

        let older = repo.create_post(alice.id, post("Gallery night", PostCategory::Event)).await.unwrap();
        repo.create_post(zed.id, post("Brushes", PostCategory::Question)).await.unwrap();
        repo.create_post(alice.id, post("Newest", PostCategory::General)).await.unwrap();

        let mut pinned = older.clone().into_active_model();
        pinned.is_pinned = Set(true);
        pinned.update(repo.write_conn()).await.unwrap();

        let all = repo
            .list_posts(&PostFilter::default(), None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.items[0].post.id, older.id);

        let by_author = repo
            .list_posts(
                &PostFilter {
                    search: Some("painter".into()),
                    ..Default::default()
                },
                None,
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_author.total, 1);
        assert_eq!(by_author.items[0].author.as_ref().map(|a| a.id), Some(zed.id));

        let by_category = repo
            .list_posts(
                &PostFilter {
                    search: Some("EVENT".into()),
                    ..Default::default()
                },
                None,
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_category.total, 1);

        let filtered = repo
            .list_posts(
                &PostFilter {
                    category: Some(PostCategory::Question),
                    ..Default::default()
                },
                None,
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(filtered.items[0].post.title, "Brushes");
    }

    #[tokio::test]
    async fn test_detail_counts_and_views() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let p = repo.create_post(alice.id, post("Hello", PostCategory::Showcase)).await.unwrap();

        let first = repo.add_comment(p.id, bob.id, "Nice").await.unwrap();
        repo.add_comment(p.id, alice.id, "Thanks").await.unwrap();
        repo.toggle_post_like(p.id, bob.id).await.unwrap();
        repo.toggle_comment_like(first.id, bob.id).await.unwrap();

        repo.get_post(p.id, None).await.unwrap();
        let detail = repo.get_post(p.id, Some(bob.id)).await.unwrap();

        assert_eq!(detail.post.post.views, 2);
        assert_eq!(detail.post.likes, 1);
        assert_eq!(detail.post.comments, 2);
        assert!(detail.post.liked);
        assert_eq!(detail.comments[0].comment.id, first.id);
        assert!(detail.comments[0].liked);
        assert_eq!(detail.comments[0].likes, 1);

        // Only bob's comment notified alice
        assert_eq!(repo.unread_count(alice.id).await.unwrap(), 1);
        assert_eq!(repo.unread_count(bob.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_comment_deletion_rights() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let carol = fixtures::user(&repo, "carol").await;
        let p = repo.create_post(alice.id, post("Hello", PostCategory::General)).await.unwrap();

        let by_bob = repo.add_comment(p.id, bob.id, "Hi").await.unwrap();
        let by_carol = repo.add_comment(p.id, carol.id, "Hey").await.unwrap();

        let err = repo.delete_comment(by_bob.id, carol.id).await.unwrap_err();
        assert_eq!(err.to_string(), COMMENT_NOT_OWNED);

        // Post author moderates, comment author removes their own
        repo.delete_comment(by_bob.id, alice.id).await.unwrap();
        repo.delete_comment(by_carol.id, carol.id).await.unwrap();

        let left = repo.list_comments(p.id, None, PageRequest::default()).await.unwrap();
        assert_eq!(left.total, 0);
    }

    #[tokio::test]
    async fn test_update_post_author_only() {
        let repo = fixtures::repo().await;
        let alice = fixtures::user(&repo, "alice").await;
        let bob = fixtures::user(&repo, "bob").await;
        let p = repo.create_post(alice.id, post("Hello", PostCategory::General)).await.unwrap();

        let err = repo
            .update_post(p.id, bob.id, PostChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        let updated = repo
            .update_post(
                p.id,
                alice.id,
                PostChanges {
                    title: Some("Hello again".into()),
                    category: Some(PostCategory::Discussion),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Hello again");
        assert_eq!(updated.category, PostCategory::Discussion);
        assert_eq!(updated.content, "Hello body");
    }
}
