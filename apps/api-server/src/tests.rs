//! End-to-end handler tests against in-memory state.

use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, http::StatusCode, http::header, test, web};
use serde_json::{Value, json};

use quill_core::domain::{Role, User};
use quill_infra::{InMemoryMailer, JwtConfig, RateLimitConfig, one_time_token};

use crate::config::RateLimits;
use crate::handlers;
use crate::middleware::rate_limit::RateLimiters;
use crate::state::AppState;

fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        expiration_days: 7,
        issuer: "quill-api".to_string(),
    }
}

fn test_state() -> (AppState, Arc<InMemoryMailer>) {
    let mailer = Arc::new(InMemoryMailer::new());
    let state = AppState::in_memory(test_jwt(), mailer.clone());
    (state, mailer)
}

/// Limits high enough that no test trips them.
fn generous_limits() -> RateLimits {
    let config = RateLimitConfig::new(10_000, Duration::from_secs(60));
    RateLimits {
        global: config.clone(),
        login: config.clone(),
        registration: config.clone(),
        password_reset: config.clone(),
        verification: config,
    }
}

fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let limiters = RateLimiters::new(&generous_limits());
    App::new()
        .app_data(web::Data::new(state))
        .configure(move |cfg| handlers::configure_routes(cfg, &limiters))
}

/// Insert a user directly and return it with a valid bearer token.
async fn seed_user(
    state: &AppState,
    email: &str,
    password: &str,
    role: Role,
    verified: bool,
) -> (User, String) {
    let hash = state.passwords.hash(password).unwrap();
    let mut user = User::new(
        "Test User".to_string(),
        email.to_string(),
        hash,
        one_time_token(),
    );
    user.role = role;
    if verified {
        user.verify();
    }
    let user = state.users.insert(user).await.unwrap();
    let token = state.tokens.generate_token(&user).unwrap();
    (user, token)
}

fn auth(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

#[actix_web::test]
async fn registration_rejects_duplicate_email() {
    let (state, mailer) = test_state();
    let app = test::init_service(build_app(state)).await;

    let body = json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter2longer" });

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["success"], json!(true));
    assert!(json["user"].get("password").is_none());
    assert!(json["user"].get("passwordHash").is_none());

    // One verification email with the frontend link.
    let sent = mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].html.contains("/verify-email/"));

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["success"], json!(false));
}

#[actix_web::test]
async fn login_requires_verified_email() {
    let (state, _mailer) = test_state();
    let app = test::init_service(build_app(state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter2longer" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let credentials = json!({ "email": "ada@example.com", "password": "hunter2longer" });

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&credentials)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let token = state
        .users
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap()
        .verification_token
        .unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/auth/verify-email/{}", token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: Value = test::read_body_json(resp).await;
    assert!(json["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(json["user"]["isVerified"], json!(true));
}

#[actix_web::test]
async fn login_failures_are_indistinguishable() {
    let (state, _mailer) = test_state();
    seed_user(&state, "real@example.com", "correct-password", Role::User, true).await;
    let app = test::init_service(build_app(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "real@example.com", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let wrong_password: Value = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "nobody@example.com", "password": "whatever-pass" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let unknown_email: Value = test::read_body_json(resp).await;

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["message"], json!("Invalid credentials"));
}

#[actix_web::test]
async fn expired_token_is_rejected() {
    let mailer = Arc::new(InMemoryMailer::new());
    let state = AppState::in_memory(
        JwtConfig {
            expiration_days: -1,
            ..test_jwt()
        },
        mailer,
    );
    let (_user, stale_token) =
        seed_user(&state, "ada@example.com", "hunter2longer", Role::User, true).await;
    let app = test::init_service(build_app(state)).await;

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(auth(&stale_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn me_returns_current_user() {
    let (state, _mailer) = test_state();
    let (user, token) =
        seed_user(&state, "ada@example.com", "hunter2longer", Role::User, true).await;
    let app = test::init_service(build_app(state)).await;

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(auth(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["data"]["email"], json!(user.email));

    // No token at all.
    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn password_reset_token_is_single_use() {
    let (state, mailer) = test_state();
    seed_user(&state, "ada@example.com", "old-password-1", Role::User, true).await;
    let app = test::init_service(build_app(state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/forgot-password")
        .set_json(json!({ "email": "ada@example.com" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert!(mailer.sent().await.last().unwrap().html.contains("/reset-password/"));

    // Unknown email is a 404, not a silent success.
    let req = test::TestRequest::post()
        .uri("/api/auth/forgot-password")
        .set_json(json!({ "email": "nobody@example.com" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let reset_token = state
        .users
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap()
        .reset_password_token
        .unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/auth/reset-password/{}", reset_token))
        .set_json(json!({ "password": "new-password-1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // New password works.
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "ada@example.com", "password": "new-password-1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // The consumed token cannot be replayed.
    let req = test::TestRequest::post()
        .uri(&format!("/api/auth/reset-password/{}", reset_token))
        .set_json(json!({ "password": "another-pass-1" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn post_creation_is_admin_only() {
    let (state, _mailer) = test_state();
    let (_user, user_token) =
        seed_user(&state, "user@example.com", "hunter2longer", Role::User, true).await;
    let (_admin, admin_token) =
        seed_user(&state, "admin@example.com", "hunter2longer", Role::Admin, true).await;
    let app = test::init_service(build_app(state)).await;

    let body = json!({
        "title": "Hello World",
        "content": "<p>Some short content</p>",
        "status": "published"
    });

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(auth(&user_token))
        .set_json(&body)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(auth(&admin_token))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let json: Value = test::read_body_json(resp).await;
    let data = &json["data"];
    assert!(data["slug"].as_str().unwrap().starts_with("hello-world-"));
    assert_eq!(data["readTime"], json!(1));
    assert_eq!(data["excerpt"], json!("Some short content..."));
    assert!(data["publishedAt"].is_string());
}

#[actix_web::test]
async fn slug_fetch_counts_views() {
    let (state, _mailer) = test_state();
    let (_admin, admin_token) =
        seed_user(&state, "admin@example.com", "hunter2longer", Role::Admin, true).await;
    let app = test::init_service(build_app(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(auth(&admin_token))
        .set_json(json!({ "title": "Counted", "content": "body", "status": "published" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let created: Value = test::read_body_json(resp).await;
    let slug = created["data"]["slug"].as_str().unwrap().to_string();

    for expected in 1..=2 {
        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", slug))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["data"]["views"], json!(expected));
    }

    let req = test::TestRequest::get()
        .uri("/api/posts/no-such-slug")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn like_toggle_is_idempotent() {
    let (state, _mailer) = test_state();
    let (_admin, admin_token) =
        seed_user(&state, "admin@example.com", "hunter2longer", Role::Admin, true).await;
    let (_user, user_token) =
        seed_user(&state, "user@example.com", "hunter2longer", Role::User, true).await;
    let app = test::init_service(build_app(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(auth(&admin_token))
        .set_json(json!({ "title": "Likeable", "content": "body", "status": "published" }))
        .to_request();
    let created: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let like = |token: String| {
        test::TestRequest::put()
            .uri(&format!("/api/posts/{}/like", id))
            .insert_header(auth(&token))
            .to_request()
    };

    let json: Value = test::read_body_json(test::call_service(&app, like(user_token.clone())).await).await;
    assert_eq!(json["isLiked"], json!(true));
    assert_eq!(json["likesCount"], json!(1));

    let json: Value = test::read_body_json(test::call_service(&app, like(user_token)).await).await;
    assert_eq!(json["isLiked"], json!(false));
    assert_eq!(json["likesCount"], json!(0));
}

#[actix_web::test]
async fn republishing_keeps_first_published_at() {
    let (state, _mailer) = test_state();
    let (_admin, admin_token) =
        seed_user(&state, "admin@example.com", "hunter2longer", Role::Admin, true).await;
    let app = test::init_service(build_app(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(auth(&admin_token))
        .set_json(json!({ "title": "Drafted", "content": "body" }))
        .to_request();
    let created: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(created["data"]["publishedAt"].is_null());
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let toggle = || {
        test::TestRequest::put()
            .uri(&format!("/api/posts/{}/publish", id))
            .insert_header(auth(&admin_token))
            .to_request()
    };

    let published: Value = test::read_body_json(test::call_service(&app, toggle()).await).await;
    let first = published["data"]["publishedAt"].clone();
    assert!(first.is_string());

    let unpublished: Value = test::read_body_json(test::call_service(&app, toggle()).await).await;
    assert_eq!(unpublished["data"]["status"], json!("draft"));

    let republished: Value = test::read_body_json(test::call_service(&app, toggle()).await).await;
    assert_eq!(republished["data"]["publishedAt"], first);
}

#[actix_web::test]
async fn listing_filters_published_posts() {
    let (state, _mailer) = test_state();
    let (_admin, admin_token) =
        seed_user(&state, "admin@example.com", "hunter2longer", Role::Admin, true).await;
    let app = test::init_service(build_app(state)).await;

    for (title, tags, status) in [
        ("Rust Tips", json!(["rust"]), "published"),
        ("Cooking Notes", json!(["food"]), "published"),
        ("Secret Draft", json!([]), "draft"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(auth(&admin_token))
            .set_json(json!({ "title": title, "content": "body", "tags": tags, "status": status }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let json: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(json["count"], json!(2));
    assert_eq!(json["pagination"]["total"], json!(2));

    let req = test::TestRequest::get().uri("/api/posts?tag=rust").to_request();
    let json: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(json["count"], json!(1));
    assert_eq!(json["data"][0]["title"], json!("Rust Tips"));

    // Search is case-insensitive.
    let req = test::TestRequest::get()
        .uri("/api/posts?search=COOKING")
        .to_request();
    let json: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(json["count"], json!(1));
    assert_eq!(json["data"][0]["title"], json!("Cooking Notes"));
}

#[actix_web::test]
async fn comment_ownership_rules() {
    let (state, _mailer) = test_state();
    let (_admin, admin_token) =
        seed_user(&state, "admin@example.com", "hunter2longer", Role::Admin, true).await;
    let (_owner, owner_token) =
        seed_user(&state, "owner@example.com", "hunter2longer", Role::User, true).await;
    let (_other, other_token) =
        seed_user(&state, "other@example.com", "hunter2longer", Role::User, true).await;
    let app = test::init_service(build_app(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(auth(&admin_token))
        .set_json(json!({ "title": "Commentable", "content": "body", "status": "published" }))
        .to_request();
    let created: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let post_id = created["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .insert_header(auth(&owner_token))
        .set_json(json!({ "content": "first!", "post": post_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment: Value = test::read_body_json(resp).await;
    let comment_id = comment["data"]["id"].as_str().unwrap().to_string();

    // A non-author non-admin may not edit.
    let req = test::TestRequest::put()
        .uri(&format!("/api/comments/{}", comment_id))
        .insert_header(auth(&other_token))
        .set_json(json!({ "content": "hijacked" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    // Admins may edit any comment.
    let req = test::TestRequest::put()
        .uri(&format!("/api/comments/{}", comment_id))
        .insert_header(auth(&admin_token))
        .set_json(json!({ "content": "moderated" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["data"]["content"], "moderated");

    // A non-author non-admin may not delete.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/comments/{}", comment_id))
        .insert_header(auth(&other_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    // Admins may delete any comment.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/comments/{}", comment_id))
        .insert_header(auth(&admin_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn deleting_posts_and_users_removes_their_content() {
    let (state, _mailer) = test_state();
    let (_admin, admin_token) =
        seed_user(&state, "admin@example.com", "hunter2longer", Role::Admin, true).await;
    let (author, author_token) =
        seed_user(&state, "author@example.com", "hunter2longer", Role::Admin, true).await;
    let (_user, user_token) =
        seed_user(&state, "user@example.com", "hunter2longer", Role::User, true).await;
    let app = test::init_service(build_app(state.clone())).await;

    let create_post = |token: &str, title: &str| {
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(auth(token))
            .set_json(json!({ "title": title, "content": "body", "status": "published" }))
            .to_request()
    };

    // A deleted post takes its comments with it.
    let created: Value =
        test::read_body_json(test::call_service(&app, create_post(&admin_token, "Short Lived")).await)
            .await;
    let post_id = created["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .insert_header(auth(&user_token))
        .set_json(json!({ "content": "gone soon", "post": post_id }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post_id))
        .insert_header(auth(&admin_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert_eq!(state.comments.count().await.unwrap(), 0);

    // A deleted user takes their posts, comments on those posts, and
    // comments they left elsewhere.
    let created: Value = test::read_body_json(
        test::call_service(&app, create_post(&author_token, "By Author")).await,
    )
    .await;
    let authors_post = created["data"]["id"].as_str().unwrap().to_string();

    let created: Value = test::read_body_json(
        test::call_service(&app, create_post(&admin_token, "Stays Around")).await,
    )
    .await;
    let surviving_post = created["data"]["id"].as_str().unwrap().to_string();

    for (token, post) in [(&user_token, &authors_post), (&author_token, &surviving_post)] {
        let req = test::TestRequest::post()
            .uri("/api/comments")
            .insert_header(auth(token))
            .set_json(json!({ "content": "hi", "post": post }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/users/{}", author.id))
        .insert_header(auth(&admin_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    assert_eq!(state.posts.count().await.unwrap(), 1);
    assert_eq!(state.comments.count().await.unwrap(), 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/user/{}", author.id))
        .to_request();
    let json: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(json["data"], json!([]));
}

#[actix_web::test]
async fn admin_stats_reflect_content() {
    let (state, _mailer) = test_state();
    let (_admin, admin_token) =
        seed_user(&state, "admin@example.com", "hunter2longer", Role::Admin, true).await;
    let (_user, user_token) =
        seed_user(&state, "user@example.com", "hunter2longer", Role::User, true).await;
    let app = test::init_service(build_app(state)).await;

    for (title, status) in [("One", "published"), ("Two", "draft")] {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(auth(&admin_token))
            .set_json(json!({ "title": title, "content": "body", "status": status }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::get()
        .uri("/api/admin/stats")
        .insert_header(auth(&user_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::get()
        .uri("/api/admin/stats")
        .insert_header(auth(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["data"]["totalUsers"], json!(2));
    assert_eq!(json["data"]["totalPosts"], json!(2));
    assert_eq!(json["data"]["publishedPosts"], json!(1));
    assert_eq!(json["data"]["draftPosts"], json!(1));
}
