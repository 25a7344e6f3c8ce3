//! Comment listing, authoring and engagement.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{Comment, User};
use quill_shared::ApiResponse;
use quill_shared::dto::{
    CommentResponse, CommentWithAuthorResponse, CreateCommentRequest, LikeResponse,
    UpdateCommentRequest,
};

use crate::handlers::author_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn raw_response(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        content: comment.content.clone(),
        post: comment.post_id,
        author: comment.author_id,
        likes: comment.likes.len(),
        created_at: comment.created_at,
    }
}

/// GET /api/comments/post/{post_id}
pub async fn get_by_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comments = state.comments.find_by_post(path.into_inner()).await?;

    let mut authors: HashMap<Uuid, User> = HashMap::new();
    for comment in &comments {
        if !authors.contains_key(&comment.author_id) {
            if let Some(user) = state.users.find_by_id(comment.author_id).await? {
                authors.insert(comment.author_id, user);
            }
        }
    }

    let data: Vec<CommentWithAuthorResponse> = comments
        .iter()
        .map(|comment| CommentWithAuthorResponse {
            id: comment.id,
            content: comment.content.clone(),
            author: author_response(authors.get(&comment.author_id), comment.author_id, false),
            created_at: comment.created_at,
            likes: comment.likes.len(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}

/// POST /api/comments (authenticated)
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    if body.content.trim().is_empty() {
        return Err(AppError::BadRequest("Content is required".to_string()));
    }

    state
        .posts
        .find_by_id(body.post)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comment = Comment::new(body.content, body.post, identity.user.id);
    let comment = state.comments.insert(comment).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(raw_response(&comment))))
}

/// PUT /api/comments/{id} (comment author or admin)
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCommentRequest>,
) -> AppResult<HttpResponse> {
    let mut comment = state
        .comments
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    if comment.author_id != identity.user.id && !identity.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to update this comment".to_string(),
        ));
    }

    comment.edit(body.into_inner().content);
    let comment = state.comments.update(comment).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(raw_response(&comment))))
}

/// DELETE /api/comments/{id} (comment author or admin)
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let comment = state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    if comment.author_id != identity.user.id && !identity.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to delete this comment".to_string(),
        ));
    }

    state.comments.delete(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Comment deleted")))
}

/// PUT /api/comments/{id}/like (authenticated)
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut comment = state
        .comments
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    let is_liked = comment.toggle_like(identity.user.id);
    let comment = state.comments.update(comment).await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        success: true,
        is_liked,
        likes_count: comment.likes.len(),
    }))
}
