use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{from_fn, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::services::ServeDir;
use tracing::debug;

/// True when any path segment names a dotfile, percent-encoded dots included.
fn is_hidden(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.starts_with('.') || segment.to_ascii_lowercase().starts_with("%2e")
    })
}

async fn hide_dotfiles(request: Request, next: Next) -> Response {
    if is_hidden(request.uri().path()) {
        debug!(path = request.uri().path(), "refusing to serve hidden file");
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}

/// Site files under `static_dir`, without dotfiles such as `.env`.
pub fn static_files(static_dir: &str) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(static_dir))
        .layer(from_fn(hide_dotfiles))
}
