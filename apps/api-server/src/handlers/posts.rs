//! Post listing, reads, engagement and admin-authored mutations.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use quill_core::domain::{NewPost, Post, PostStatus, PostUpdate, User};
use quill_core::ports::PostQuery;
use quill_shared::ApiResponse;
use quill_shared::dto::{
    CreatePostRequest, LikeResponse, Pagination, PostDetailResponse, PostListResponse,
    PostResponse, PostSummaryResponse, UpdatePostRequest,
};

use crate::handlers::author_response;
use crate::middleware::auth::{AdminIdentity, Identity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    page: Option<u64>,
    limit: Option<u64>,
    tag: Option<String>,
    search: Option<String>,
}

fn summary_response(post: &Post, author: &Option<User>) -> PostSummaryResponse {
    PostSummaryResponse {
        id: post.id,
        title: post.title.clone(),
        excerpt: post.excerpt.clone(),
        slug: post.slug.clone(),
        author: author_response(author.as_ref(), post.author_id, false),
        featured_image: post.featured_image.clone(),
        tags: post.tags.clone(),
        status: post.status.as_str().to_string(),
        views: post.views,
        likes: post.likes.len(),
        read_time: post.read_time,
        published_at: post.published_at,
    }
}

fn detail_response(post: &Post, author: &Option<User>) -> PostDetailResponse {
    PostDetailResponse {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        excerpt: post.excerpt.clone(),
        slug: post.slug.clone(),
        author: author_response(author.as_ref(), post.author_id, true),
        featured_image: post.featured_image.clone(),
        tags: post.tags.clone(),
        views: post.views,
        likes: post.likes.len(),
        read_time: post.read_time,
        published_at: post.published_at,
    }
}

fn raw_response(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        excerpt: post.excerpt.clone(),
        slug: post.slug.clone(),
        author: post.author_id,
        featured_image: post.featured_image.clone(),
        tags: post.tags.clone(),
        status: post.status.as_str().to_string(),
        views: post.views,
        likes: post.likes.len(),
        read_time: post.read_time,
        published_at: post.published_at,
        created_at: post.created_at,
    }
}

/// Look up the authors for a batch of posts in one pass per distinct id.
async fn load_authors(
    state: &AppState,
    posts: &[Post],
) -> Result<HashMap<Uuid, User>, AppError> {
    let mut authors = HashMap::new();
    for post in posts {
        if !authors.contains_key(&post.author_id) {
            if let Some(user) = state.users.find_by_id(post.author_id).await? {
                authors.insert(post.author_id, user);
            }
        }
    }
    Ok(authors)
}

fn parse_status(s: &str) -> Result<PostStatus, AppError> {
    PostStatus::parse(s).ok_or_else(|| AppError::BadRequest(format!("Invalid status: {}", s)))
}

/// GET /api/posts
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let defaults = PostQuery::default();
    let post_query = PostQuery {
        page: query.page.unwrap_or(defaults.page).max(1),
        limit: query.limit.unwrap_or(defaults.limit).clamp(1, 100),
        tag: query.tag.filter(|t| !t.is_empty()),
        search: query.search.filter(|s| !s.is_empty()),
    };

    let page = state.posts.find_published(&post_query).await?;
    let authors = load_authors(&state, &page.posts).await?;

    let data: Vec<PostSummaryResponse> = page
        .posts
        .iter()
        .map(|post| {
            let author = authors.get(&post.author_id).cloned();
            summary_response(post, &author)
        })
        .collect();

    Ok(HttpResponse::Ok().json(PostListResponse {
        success: true,
        count: data.len(),
        pagination: Pagination {
            page: post_query.page,
            limit: post_query.limit,
            total: page.total,
            pages: page.total.div_ceil(post_query.limit),
        },
        data,
    }))
}

/// GET /api/posts/{slug}
///
/// Every successful fetch counts one view. Reads are not deduplicated.
pub async fn get_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let mut post = state
        .posts
        .find_by_slug(&slug)
        .await?
        .filter(|p| p.status == PostStatus::Published)
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    post.record_view();
    let post = state.posts.update(post).await?;

    let author = state.users.find_by_id(post.author_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(detail_response(&post, &author))))
}

/// GET /api/posts/user/{user_id}
pub async fn get_by_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.find_by_author(path.into_inner()).await?;
    let data: Vec<PostResponse> = posts.iter().map(raw_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}

/// POST /api/posts (admin)
pub async fn create(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    if body.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    if body.content.trim().is_empty() {
        return Err(AppError::BadRequest("Content is required".to_string()));
    }

    let status = match body.status.as_deref() {
        Some(s) => parse_status(s)?,
        None => PostStatus::Draft,
    };

    let post = Post::new(
        NewPost {
            title: body.title,
            content: body.content,
            excerpt: body.excerpt,
            featured_image: body.featured_image,
            tags: body.tags,
            status,
        },
        admin.0.user.id,
    );
    let post = state.posts.insert(post).await?;

    tracing::info!(post_id = %post.id, slug = %post.slug, "post created");

    Ok(HttpResponse::Created().json(ApiResponse::ok(raw_response(&post))))
}

/// PUT /api/posts/{id} (admin)
pub async fn update(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    let mut post = state
        .posts
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let status = match body.status.as_deref() {
        Some(s) => Some(parse_status(s)?),
        None => None,
    };

    post.apply(PostUpdate {
        title: body.title,
        content: body.content,
        excerpt: body.excerpt,
        featured_image: body.featured_image,
        tags: body.tags,
        status,
    });
    let post = state.posts.update(post).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(raw_response(&post))))
}

/// DELETE /api/posts/{id} (admin)
pub async fn delete(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    // Comments do not outlive their post.
    state.comments.delete_by_post(id).await?;
    state.posts.delete(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Post deleted")))
}

/// PUT /api/posts/{id}/publish (admin)
pub async fn publish(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut post = state
        .posts
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    post.toggle_publish();
    let post = state.posts.update(post).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(raw_response(&post))))
}

/// PUT /api/posts/{id}/like (authenticated)
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut post = state
        .posts
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let is_liked = post.toggle_like(identity.user.id);
    let post = state.posts.update(post).await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        success: true,
        is_liked,
        likes_count: post.likes.len(),
    }))
}
