/// GET /health
/// Liveness check; always answers `OK`.
pub async fn health_handler() -> &'static str {
    "OK"
}
