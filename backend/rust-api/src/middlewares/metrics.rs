use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

const KNOWN_PATHS: [&str; 10] = [
    "/",
    "/start",
    "/submit",
    "/skip",
    "/game_over",
    "/highscores",
    "/restart",
    "/quit",
    "/health",
    "/metrics",
];

/// Records request count and latency per route
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Maps a request path onto one of the game's routes so that probes for
/// arbitrary URLs do not create a new label per path.
fn normalize_path(path: &str) -> String {
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        other => other,
    };

    if KNOWN_PATHS.contains(&trimmed) {
        trimmed.to_string()
    } else {
        "{unmatched}".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_keeps_game_routes() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/submit"), "/submit");
        assert_eq!(normalize_path("/game_over/"), "/game_over");
        assert_eq!(normalize_path("/metrics"), "/metrics");
    }

    #[test]
    fn test_normalize_path_collapses_unknown_routes() {
        assert_eq!(normalize_path("/wp-admin"), "{unmatched}");
        assert_eq!(normalize_path("/skip/123"), "{unmatched}");
        assert_eq!(normalize_path(""), "/");
    }
}
