//! Authentication and authorization extractors.
//!
//! `Identity` is the auth middleware: it verifies the bearer token and loads
//! the referenced user. `AdminIdentity` composes the role check on top, for
//! routes whose allow-list is admin-only.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use chrono::{DateTime, Utc};
use futures::future::LocalBoxFuture;
use std::sync::Arc;
use uuid::Uuid;

use quill_core::domain::{Role, User};
use quill_core::ports::{AuthError, UserRepository};

use crate::middleware::error::AppError;
use crate::state::AppState;

/// The authenticated user attached to a request. Never carries the
/// password hash.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
    pub avatar: String,
    pub bio: String,
    pub joined_at: DateTime<Utc>,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_verified: user.is_verified,
            avatar: user.avatar,
            bio: user.bio,
            joined_at: user.joined_at,
        }
    }
}

/// Authenticated identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.user.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: CurrentUser,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    Ok(token.to_string())
}

async fn authenticate(req: HttpRequest) -> Result<Identity, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| {
            tracing::error!("AppState not found in app data");
            AppError::Internal("Server configuration error".to_string())
        })?
        .clone();

    let token = bearer_token(&req)?;
    let claims = state.tokens.validate_token(&token)?;

    let users: &Arc<dyn UserRepository> = &state.users;
    let user = users
        .find_by_id(claims.user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    Ok(Identity { user: user.into() })
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(authenticate(req))
    }
}

/// Authorization on top of authentication: the request is permitted only
/// when the authenticated user's role is in the route's allow-list.
fn require_role(identity: Identity, allowed: &[Role]) -> Result<Identity, AppError> {
    if allowed.contains(&identity.user.role) {
        Ok(identity)
    } else {
        Err(AuthError::InsufficientPermissions.into())
    }
}

/// Identity restricted to admin users. 403 for any other role.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

impl FromRequest for AdminIdentity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let identity = authenticate(req).await?;
            require_role(identity, &[Role::Admin]).map(AdminIdentity)
        })
    }
}
