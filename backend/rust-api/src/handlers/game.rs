use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::{
    config::Config,
    error::GameError,
    handlers::views,
    metrics::{record_answer, record_game_event, RIDDLES_SKIPPED_TOTAL},
    models::{
        session::normalize_player_name, GameSession, ScoreRecord, StartGameForm,
        SubmitAnswerForm,
    },
    services::{session_service::SessionService, AppState},
};

pub const SESSION_COOKIE: &str = "riddle_session";

fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty())
}

fn session_cookie(
    config: &Config,
    session_id: String,
    max_age: time::Duration,
) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Top of the leaderboard, read on the blocking pool.
async fn load_high_scores(state: &Arc<AppState>) -> Vec<ScoreRecord> {
    let state = Arc::clone(state);
    let limit = state.config.web_leaderboard_limit;

    match tokio::task::spawn_blocking(move || state.scores.top(limit)).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("High score read task failed: {}", e);
            Vec::new()
        }
    }
}

/// Appends a finished game on the blocking pool. Failures are logged and the
/// results page still renders.
async fn save_score(state: &Arc<AppState>, record: ScoreRecord) {
    let state = Arc::clone(state);

    match tokio::task::spawn_blocking(move || state.scores.append(&record)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Game over shown without saving the score: {}", e),
        Err(e) => tracing::error!("Score write task failed: {}", e),
    }
}

/// GET / - current riddle while a game is running, welcome page otherwise
pub async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> Html<String> {
    let entry = match session_id(&jar) {
        Some(id) => state.sessions.get(&id).await,
        None => None,
    };

    match entry {
        Some(entry) if !entry.game.is_complete() => Html(views::game_page(&entry.game)),
        _ => Html(views::welcome_page()),
    }
}

/// POST /start - begin a new game for the submitted player name
pub async fn start_game(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<StartGameForm>,
) -> impl IntoResponse {
    let player_name = normalize_player_name(form.player_name.as_deref().unwrap_or_default());
    // A new game always gets a server-issued id; the previous one is dropped
    if let Some(previous) = session_id(&jar) {
        state.sessions.remove(&previous).await;
    }
    let id = SessionService::new_session_id();

    state
        .sessions
        .insert(&id, GameSession::start(&player_name, &state.catalog))
        .await;
    record_game_event("started");

    tracing::info!("Game started: session={}, player={}", id, player_name);

    let max_age = time::Duration::seconds(state.config.session_ttl_seconds);
    let jar = jar.add(session_cookie(&state.config, id, max_age));
    (jar, Redirect::to("/"))
}

/// POST /submit - check an answer against the current riddle
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<SubmitAnswerForm>,
) -> Redirect {
    let Some(id) = session_id(&jar) else {
        return Redirect::to("/");
    };
    let answer = form.answer.unwrap_or_default();

    let result = state
        .sessions
        .update(&id, |entry| {
            let hint_was_visible = entry.game.hint_visible();
            entry
                .game
                .submit_answer(&answer)
                .map(|outcome| (outcome, !hint_was_visible && entry.game.hint_visible()))
        })
        .await;

    match result {
        None => {
            tracing::debug!("Answer submitted without an active game: session={}", id);
            Redirect::to("/")
        }
        Some(Err(GameError::GameComplete)) => Redirect::to("/game_over"),
        Some(Ok((outcome, hint_revealed))) => {
            record_answer(outcome.correct, hint_revealed);
            tracing::info!(
                "Answer processed: session={}, correct={}, complete={}",
                id,
                outcome.correct,
                outcome.game_complete
            );

            if outcome.game_complete {
                record_game_event("completed");
                Redirect::to("/game_over")
            } else {
                Redirect::to("/")
            }
        }
    }
}

/// GET /skip - move past the current riddle without scoring
pub async fn skip_riddle(State(state): State<Arc<AppState>>, jar: CookieJar) -> Redirect {
    let Some(id) = session_id(&jar) else {
        return Redirect::to("/");
    };

    match state.sessions.update(&id, |entry| entry.game.skip()).await {
        None => Redirect::to("/"),
        Some(Err(GameError::GameComplete)) => Redirect::to("/game_over"),
        Some(Ok(outcome)) => {
            RIDDLES_SKIPPED_TOTAL.inc();
            tracing::info!("Riddle skipped: session={}", id);

            if outcome.game_complete {
                record_game_event("completed");
                Redirect::to("/game_over")
            } else {
                Redirect::to("/")
            }
        }
    }
}

/// GET /game_over - final results; the score is written once per game
pub async fn game_over(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let Some(id) = session_id(&jar) else {
        return Redirect::to("/").into_response();
    };

    let finished = state
        .sessions
        .update(&id, |entry| {
            if !entry.game.is_complete() {
                return None;
            }
            let first_visit = !entry.score_recorded;
            entry.score_recorded = true;
            Some((entry.game.clone(), first_visit))
        })
        .await
        .flatten();

    let Some((game, first_visit)) = finished else {
        return Redirect::to("/").into_response();
    };

    if first_visit {
        save_score(&state, game.score_record()).await;
    }

    let high_scores = load_high_scores(&state).await;
    Html(views::game_over_page(
        &game,
        game.total_elapsed(),
        &high_scores,
    ))
    .into_response()
}

/// GET /highscores - leaderboard
pub async fn highscores(State(state): State<Arc<AppState>>) -> Html<String> {
    let high_scores = load_high_scores(&state).await;
    Html(views::highscores_page(&high_scores))
}

/// GET /restart - new game for the same player
pub async fn restart(State(state): State<Arc<AppState>>, jar: CookieJar) -> Redirect {
    let Some(id) = session_id(&jar) else {
        return Redirect::to("/");
    };

    if let Some(entry) = state.sessions.get(&id).await {
        let player_name = entry.game.player_name().to_string();
        state
            .sessions
            .insert(&id, GameSession::start(&player_name, &state.catalog))
            .await;
        record_game_event("restarted");
        tracing::info!("Game restarted: session={}, player={}", id, player_name);
    }

    Redirect::to("/")
}

/// GET /quit - forget the game and the session cookie
pub async fn quit_game(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(id) = session_id(&jar) {
        if state.sessions.remove(&id).await.is_some() {
            record_game_event("quit");
            tracing::info!("Game quit: session={}", id);
        }
    }

    // Clear the session cookie
    let jar = jar.add(session_cookie(
        &state.config,
        String::new(),
        time::Duration::ZERO,
    ));
    (jar, Redirect::to("/"))
}
