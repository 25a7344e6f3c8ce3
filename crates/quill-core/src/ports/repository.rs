use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, PostStatus, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Filter and pagination parameters for the public post listing.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub page: u64,
    pub limit: u64,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            tag: None,
            search: None,
        }
    }
}

/// One page of published posts plus the total match count.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: u64,
}

/// User repository with lookups for the auth flows.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address (exact match).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find the user holding this pending email verification token.
    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, RepoError>;

    /// Find the user holding this pending password reset token.
    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, RepoError>;

    /// All users, for the admin listing.
    async fn list_all(&self) -> Result<Vec<User>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Published posts matching the query, newest published first.
    async fn find_published(&self, query: &PostQuery) -> Result<PostPage, RepoError>;

    /// All posts by one author (drafts included), newest first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// All posts regardless of status, for the admin listing.
    async fn list_all(&self) -> Result<Vec<Post>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    async fn count_by_status(&self, status: PostStatus) -> Result<u64, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;

    /// Sum of view counters across all posts.
    async fn total_views(&self) -> Result<i64, RepoError>;

    /// Delete every post by one author, returning how many were removed.
    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on one post, oldest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;

    /// Delete every comment on one post, returning how many were removed.
    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;

    /// Delete every comment by one author, returning how many were removed.
    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}
