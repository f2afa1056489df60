#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use riddle_me_this::{
    config::Config,
    create_router,
    handlers::views::escape_html,
    models::{riddle, Riddle},
    services::{score_service::ScoreStore, AppState},
};
use std::{path::PathBuf, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub scores_path: PathBuf,
    // keeps the score file alive for the duration of the test
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// `riddle_session=<id>` pair from the response, ready to send back.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|cookie| cookie.starts_with("riddle_session="))
            .and_then(|cookie| cookie.split(';').next())
            .map(|pair| pair.to_string())
    }
}

pub fn create_test_app() -> TestApp {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let scores_path = dir.path().join("high_scores.csv");

    let config = Config {
        high_scores_path: scores_path.display().to_string(),
        ..Config::default()
    };

    let app_state =
        Arc::new(AppState::new(config).expect("Failed to initialize test app state"));

    TestApp {
        router: create_router(app_state),
        scores_path,
        _dir: dir,
    }
}

impl TestApp {
    pub fn scores(&self) -> ScoreStore {
        ScoreStore::new(&self.scores_path)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap())
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).to_string(),
        }
    }

    /// Starts a game and returns the session cookie to use afterwards.
    pub async fn start_game(&self, player_name: &str) -> String {
        let response = self
            .post_form("/start", &format!("player_name={}", player_name), None)
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/"));
        response
            .session_cookie()
            .expect("start should set a session cookie")
    }
}

/// Finds the catalog riddle whose question is on the page.
pub fn riddle_on_page(body: &str) -> Riddle {
    riddle::catalog()
        .into_iter()
        .find(|r| body.contains(&escape_html(&r.question)))
        .expect("page should show a catalog riddle")
}
