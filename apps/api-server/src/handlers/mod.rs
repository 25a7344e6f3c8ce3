//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod comments;
mod health;
mod posts;

use actix_web::web;

use quill_core::domain::User;
use quill_shared::dto::{AuthorResponse, UserResponse};

use crate::middleware::auth::CurrentUser;
use crate::middleware::rate_limit::{RateLimitMiddleware, RateLimiters};

/// Configure all application routes.
///
/// Route-group rate limits and the role requirements per route mirror the
/// API contract: public reads, authenticated engagement, admin mutations.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiters: &RateLimiters) {
    cfg.service(
        web::scope("/api")
            .wrap(RateLimitMiddleware::new(limiters.global.clone()))
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .service(
                        web::resource("/register")
                            .wrap(RateLimitMiddleware::new(limiters.registration.clone()))
                            .route(web::post().to(auth::register)),
                    )
                    .service(
                        web::resource("/login")
                            .wrap(RateLimitMiddleware::new(limiters.login.clone()))
                            .route(web::post().to(auth::login)),
                    )
                    .service(
                        web::resource("/verify-email/{token}")
                            .wrap(RateLimitMiddleware::new(limiters.verification.clone()))
                            .route(web::get().to(auth::verify_email)),
                    )
                    .service(
                        web::resource("/forgot-password")
                            .wrap(RateLimitMiddleware::new(limiters.password_reset.clone()))
                            .route(web::post().to(auth::forgot_password)),
                    )
                    .service(
                        web::resource("/reset-password/{token}")
                            .wrap(RateLimitMiddleware::new(limiters.password_reset.clone()))
                            .route(web::post().to(auth::reset_password)),
                    )
                    .route("/me", web::get().to(auth::me))
                    .route("/profile", web::put().to(auth::update_profile)),
            )
            .service(
                web::scope("/posts")
                    // Fixed segments before the slug catch-all.
                    .route("/user/{user_id}", web::get().to(posts::get_by_user))
                    .route("/{id}/like", web::put().to(posts::like))
                    .route("/{id}/publish", web::put().to(posts::publish))
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{slug}", web::get().to(posts::get_by_slug)),
            )
            .service(
                web::scope("/comments")
                    .route("/post/{post_id}", web::get().to(comments::get_by_post))
                    .route("", web::post().to(comments::create))
                    .route("/{id}/like", web::put().to(comments::like))
                    .route("/{id}", web::put().to(comments::update))
                    .route("/{id}", web::delete().to(comments::delete)),
            )
            .service(
                web::scope("/admin")
                    .route("/stats", web::get().to(admin::stats))
                    .route("/users", web::get().to(admin::get_users))
                    .route("/users/{id}/role", web::put().to(admin::update_user_role))
                    .route("/users/{id}", web::delete().to(admin::delete_user))
                    .route("/posts", web::get().to(admin::get_all_posts)),
            ),
    );
}

/// Public projection of a stored user.
pub(crate) fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        avatar: user.avatar.clone(),
        bio: user.bio.clone(),
        is_verified: user.is_verified,
        joined_date: user.joined_at,
    }
}

/// Public projection of the request's authenticated user.
pub(crate) fn current_user_response(user: &CurrentUser) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        avatar: user.avatar.clone(),
        bio: user.bio.clone(),
        is_verified: user.is_verified,
        joined_date: user.joined_at,
    }
}

/// Embedded author projection. `with_bio` matches the fuller population on
/// the post detail endpoint.
pub(crate) fn author_response(user: Option<&User>, author_id: uuid::Uuid, with_bio: bool) -> AuthorResponse {
    match user {
        Some(user) => AuthorResponse {
            id: user.id,
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            bio: with_bio.then(|| user.bio.clone()),
        },
        // Author record gone; keep the reference without a profile.
        None => AuthorResponse {
            id: author_id,
            name: String::new(),
            avatar: String::new(),
            bio: None,
        },
    }
}
