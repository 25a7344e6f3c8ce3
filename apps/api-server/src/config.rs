//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use quill_infra::{JwtConfig, MailConfig, RateLimitConfig};

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Frontend origin: CORS allow-origin and the base for emailed links.
    pub frontend_url: String,
    pub jwt: JwtConfig,
    pub mail: Option<MailConfig>,
    pub rate_limits: RateLimits,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
}

/// Per-route-group rate limit ceilings, keyed by client IP.
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub global: RateLimitConfig,
    pub login: RateLimitConfig,
    pub registration: RateLimitConfig,
    pub password_reset: RateLimitConfig,
    pub verification: RateLimitConfig,
}

impl Default for RateLimits {
    fn default() -> Self {
        let minutes = |n: u64| Duration::from_secs(n * 60);
        Self {
            global: RateLimitConfig::new(100, minutes(15)),
            login: RateLimitConfig::new(5, minutes(15)),
            registration: RateLimitConfig::new(3, minutes(60)),
            password_reset: RateLimitConfig::new(3, minutes(60)),
            verification: RateLimitConfig::new(3, minutes(15)),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production".to_string()),
            expiration_days: env::var("JWT_EXPIRE_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "quill-api".to_string()),
        };

        let mail = match (env::var("MAIL_API_URL"), env::var("MAIL_API_KEY")) {
            (Ok(api_url), Ok(api_key)) => Some(MailConfig {
                api_url,
                api_key,
                from: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "no-reply@quill.example".to_string()),
            }),
            _ => None,
        };

        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            jwt,
            mail,
            rate_limits: RateLimits::from_env(),
            #[cfg(feature = "postgres")]
            database,
        }
    }
}

impl RateLimits {
    fn from_env() -> Self {
        Self::default().with_global_overrides(
            env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok()),
            env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
        )
    }

    /// Apply the global-ceiling overrides. Zero values are ignored; a zero
    /// request budget or window has no valid limiter quota.
    fn with_global_overrides(mut self, max_requests: Option<u32>, window_secs: Option<u64>) -> Self {
        if let Some(max) = max_requests.filter(|m| *m > 0) {
            self.global.max_requests = max;
        }
        if let Some(secs) = window_secs.filter(|s| *s > 0) {
            self.global.window = Duration::from_secs(secs);
        }
        self
    }
}
