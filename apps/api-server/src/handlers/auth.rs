//! Registration, login, email verification, password reset and profile.

use actix_web::{HttpResponse, web};
use chrono::{TimeDelta, Utc};

use quill_core::domain::User;
use quill_core::ports::Email;
use quill_infra::one_time_token;
use quill_shared::ApiResponse;
use quill_shared::dto::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    ResetPasswordRequest, UpdateProfileRequest,
};

use crate::handlers::{current_user_response, user_response};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    validate_registration(&body)?;

    if state.users.find_by_email(&body.email).await?.is_some() {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }

    let password_hash = state
        .passwords
        .hash(&body.password)
        .map_err(AppError::from)?;

    let verification_token = one_time_token();
    let user = User::new(body.name, body.email, password_hash, verification_token.clone());
    let user = state.users.insert(user).await?;

    let verify_url = format!("{}/verify-email/{}", state.frontend_url, verification_token);
    let email = Email {
        to: user.email.clone(),
        subject: "Verify your email".to_string(),
        html: format!(
            "<p>Welcome, {}!</p>\
             <p>Please verify your email by clicking the link below:</p>\
             <p><a href=\"{url}\">{url}</a></p>",
            user.name,
            url = verify_url,
        ),
    };
    state
        .mailer
        .send(email)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to send verification email: {}", e)))?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(HttpResponse::Created().json(RegisterResponse {
        success: true,
        message: "Registration successful. Please check your email to verify your account."
            .to_string(),
        user: user_response(&user),
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    // Same error for unknown email and wrong password, so the response
    // does not reveal which accounts exist.
    let user = state
        .users
        .find_by_email(&body.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid = state
        .passwords
        .verify(&body.password, &user.password_hash)
        .map_err(AppError::from)?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    if !user.is_verified {
        return Err(AppError::Unauthorized(
            "Please verify your email before logging in".to_string(),
        ));
    }

    let token = state
        .tokens
        .generate_token(&user)
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        token,
        user: user_response(&user),
    }))
}

/// GET /api/auth/verify-email/{token}
pub async fn verify_email(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let token = path.into_inner();

    let mut user = state
        .users
        .find_by_verification_token(&token)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired token".to_string()))?;

    user.verify();
    state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Email verified successfully")))
}

/// GET /api/auth/me
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(current_user_response(&identity.user))))
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> AppResult<HttpResponse> {
    let mut user = state
        .users
        .find_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let reset_token = one_time_token();
    user.request_password_reset(reset_token.clone(), Utc::now() + TimeDelta::hours(1));
    let user = state.users.update(user).await?;

    let reset_url = format!("{}/reset-password/{}", state.frontend_url, reset_token);
    let email = Email {
        to: user.email.clone(),
        subject: "Password reset request".to_string(),
        html: format!(
            "<p>You requested a password reset.</p>\
             <p>Click the link below to set a new password. It expires in one hour.</p>\
             <p><a href=\"{url}\">{url}</a></p>\
             <p>If you did not request this, you can ignore this email.</p>",
            url = reset_url,
        ),
    };
    state
        .mailer
        .send(email)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to send reset email: {}", e)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Password reset email sent")))
}

/// POST /api/auth/reset-password/{token}
pub async fn reset_password(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    let token = path.into_inner();

    if body.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let mut user = state
        .users
        .find_by_reset_token(&token)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired token".to_string()))?;

    if !user.reset_token_valid(Utc::now()) {
        return Err(AppError::BadRequest("Invalid or expired token".to_string()));
    }

    let password_hash = state
        .passwords
        .hash(&body.password)
        .map_err(AppError::from)?;
    user.consume_password_reset(password_hash);
    state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Password reset successful")))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    let mut user = state
        .users
        .find_by_id(identity.user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(name) = body.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Name cannot be empty".to_string()));
        }
        user.name = name;
    }
    if let Some(avatar) = body.avatar {
        user.avatar = avatar;
    }
    if let Some(bio) = body.bio {
        user.bio = bio;
    }
    user.updated_at = Utc::now();

    let user = state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(&user))))
}
