use axum::Json;

use super::MessageResponse;

/// Liveness banner.
#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    responses((status = 200, description = "API is up", body = MessageResponse))
)]
pub async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new("API is running!"))
}
