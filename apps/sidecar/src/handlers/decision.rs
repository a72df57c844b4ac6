//! Decision endpoint.

use actix_web::{HttpResponse, web};
use quotalink_shared::DecisionResponse;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Consume one unit for `key` in `collection` and report the decision.
///
/// GET /{collection}/{key}
pub async fn check(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (collection, key) = path.into_inner();
    let decision = state.limiter.check_and_consume(&collection, &key)?;

    Ok(HttpResponse::Ok().json(DecisionResponse {
        allowed: decision.allowed,
    }))
}
