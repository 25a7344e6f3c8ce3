//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use quill_core::domain::{Comment, Post, PostStatus, User};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostPage, PostQuery, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

fn query_err(e: sea_orm::DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::VerificationToken.eq(token))
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::ResetPasswordToken.eq(token))
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::JoinedAt)
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        UserEntity::find().count(&*self.db).await.map_err(query_err)
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_published(&self, query: &PostQuery) -> Result<PostPage, RepoError> {
        let mut condition =
            Condition::all().add(post::Column::Status.eq(PostStatus::Published.as_str()));

        if let Some(tag) = &query.tag {
            // JSON array containment: tags @> '["tag"]'
            condition = condition.add(Expr::cust_with_values(
                "tags @> ?",
                [serde_json::json!([tag])],
            ));
        }

        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search.to_lowercase());
            condition = condition.add(
                Condition::any()
                    .add(Expr::cust_with_values(
                        "LOWER(title) LIKE ?",
                        [pattern.clone()],
                    ))
                    .add(Expr::cust_with_values("LOWER(content) LIKE ?", [pattern])),
            );
        }

        let paginator = PostEntity::find()
            .filter(condition)
            .order_by_desc(post::Column::PublishedAt)
            .paginate(&*self.db, query.limit.max(1));

        let total = paginator.num_items().await.map_err(query_err)?;
        let models = paginator
            .fetch_page(query.page.max(1) - 1)
            .await
            .map_err(query_err)?;

        Ok(PostPage {
            posts: models.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        PostEntity::find().count(&*self.db).await.map_err(query_err)
    }

    async fn count_by_status(&self, status: PostStatus) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::Status.eq(status.as_str()))
            .count(&*self.db)
            .await
            .map_err(query_err)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(&*self.db)
            .await
            .map_err(query_err)
    }

    async fn total_views(&self) -> Result<i64, RepoError> {
        let views: Vec<i64> = PostEntity::find()
            .select_only()
            .column(post::Column::Views)
            .into_tuple()
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(views.into_iter().sum())
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let result = PostEntity::delete_many()
            .filter(post::Column::AuthorId.eq(author_id))
            .exec(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        CommentEntity::find()
            .count(&*self.db)
            .await
            .map_err(query_err)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        CommentEntity::find()
            .filter(comment::Column::AuthorId.eq(author_id))
            .count(&*self.db)
            .await
            .map_err(query_err)
    }

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let result = CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(post_id))
            .exec(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let result = CommentEntity::delete_many()
            .filter(comment::Column::AuthorId.eq(author_id))
            .exec(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected)
    }
}
