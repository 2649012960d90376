/// Watch-history endpoint
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::handlers::ok;
use crate::middleware::UserId;
use crate::services::HistoryService;

/// GET /history
pub async fn get_history(
    service: web::Data<HistoryService>,
    user: UserId,
) -> Result<HttpResponse> {
    let entries = service.list_for_user(user.0).await?;
    Ok(ok(entries, "watch history fetched"))
}
