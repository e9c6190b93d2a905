use axum::response::Json;
use serde_json::json;

/// Health check endpoint handler.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
/// - **Response**: JSON object with status field
///
/// Used by load balancers, monitoring systems and container orchestrators
/// to verify service availability.
pub async fn ping() -> Json<serde_json::Value> {
    // Return a simple JSON response indicating the server is alive
    Json(json!({ "status": "pong" }))
}
