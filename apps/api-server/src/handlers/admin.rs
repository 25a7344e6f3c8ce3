//! Admin-only endpoints: platform stats and user management.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use quill_core::domain::{PostStatus, Role};
use quill_shared::ApiResponse;
use quill_shared::dto::{AdminUserResponse, PostResponse, StatsResponse, UpdateRoleRequest};

use crate::handlers::user_response;
use crate::middleware::auth::AdminIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/admin/stats
pub async fn stats(state: web::Data<AppState>, _admin: AdminIdentity) -> AppResult<HttpResponse> {
    let total_users = state.users.count().await?;
    let total_posts = state.posts.count().await?;
    let published_posts = state.posts.count_by_status(PostStatus::Published).await?;
    let draft_posts = state.posts.count_by_status(PostStatus::Draft).await?;
    let total_views = state.posts.total_views().await?;
    let total_comments = state.comments.count().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(StatsResponse {
        total_users,
        total_posts,
        published_posts,
        draft_posts,
        total_views,
        total_comments,
    })))
}

/// GET /api/admin/users
pub async fn get_users(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
) -> AppResult<HttpResponse> {
    let users = state.users.list_all().await?;

    let mut data = Vec::with_capacity(users.len());
    for user in users {
        let posts_count = state.posts.count_by_author(user.id).await?;
        let comments_count = state.comments.count_by_author(user.id).await?;
        data.push(AdminUserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_string(),
            is_verified: user.is_verified,
            joined_date: user.joined_at,
            posts_count,
            comments_count,
        });
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}

/// PUT /api/admin/users/{id}/role
pub async fn update_user_role(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateRoleRequest>,
) -> AppResult<HttpResponse> {
    let role = Role::parse(&body.role)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid role: {}", body.role)))?;

    let mut user = state
        .users
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    user.role = role;
    user.updated_at = Utc::now();
    let user = state.users.update(user).await?;

    tracing::info!(user_id = %user.id, role = %user.role.as_str(), "user role updated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(&user))))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if id == admin.0.user.id {
        return Err(AppError::BadRequest(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Remove the user's content before the account: comments on each of
    // their posts, then the posts, then comments they left elsewhere.
    for post in state.posts.find_by_author(id).await? {
        state.comments.delete_by_post(post.id).await?;
    }
    state.posts.delete_by_author(id).await?;
    state.comments.delete_by_author(id).await?;
    state.users.delete(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("User deleted")))
}

/// GET /api/admin/posts
pub async fn get_all_posts(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_all().await?;

    let data: Vec<PostResponse> = posts
        .iter()
        .map(|post| PostResponse {
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
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}
