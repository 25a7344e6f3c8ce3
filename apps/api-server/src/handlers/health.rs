use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;

use quill_shared::ApiResponse;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(HealthStatus {
        status: "ok",
        timestamp: Utc::now(),
    }))
}
