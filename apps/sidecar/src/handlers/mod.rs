//! HTTP handlers and route configuration.

mod decision;
mod health;

use actix_web::{HttpRequest, web};

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/{collection}/{key}", web::get().to(decision::check))
        .default_service(web::to(no_route));
}

async fn no_route(req: HttpRequest) -> AppResult<actix_web::HttpResponse> {
    Err(AppError::NotFound(format!("no route for {}", req.path())))
}
