use chrono::{DateTime, Local, Utc};
use rand::{seq::SliceRandom, Rng};
use serde::Serialize;

use super::{riddle::Riddle, score::ScoreRecord};
use crate::error::GameError;

/// Wrong attempts on a riddle before its hint is shown.
pub const HINT_THRESHOLD: u32 = 2;

pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";
pub const MAX_PLAYER_NAME_LEN: usize = 50;

/// Trims the submitted name, falls back to `Anonymous` when nothing is left
/// and caps the length so the leaderboard columns stay readable.
pub fn normalize_player_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_PLAYER_NAME.to_string();
    }
    trimmed.chars().take(MAX_PLAYER_NAME_LEN).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub game_complete: bool,
}

/// Progress of one player through a shuffled copy of the catalog.
///
/// Fields are private: every mutation goes through [`GameSession::submit_answer`]
/// or [`GameSession::skip`], which keeps `current_index` monotonic and the
/// hint flag tied to the attempt counter.
#[derive(Debug, Clone, Serialize)]
pub struct GameSession {
    player_name: String,
    riddle_order: Vec<Riddle>,
    current_index: usize,
    score: u32,
    attempts_on_current: u32,
    hint_visible: bool,
    started_at: DateTime<Utc>,
    riddle_started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    riddle_times: Vec<f64>,
}

impl GameSession {
    pub fn start(player_name: &str, catalog: &[Riddle]) -> Self {
        Self::start_with(player_name, catalog, &mut rand::rng(), Utc::now())
    }

    pub fn start_with<R: Rng + ?Sized>(
        player_name: &str,
        catalog: &[Riddle],
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Self {
        let mut riddle_order = catalog.to_vec();
        riddle_order.shuffle(rng);

        tracing::debug!(
            "Starting game for {} with {} riddles",
            player_name,
            riddle_order.len()
        );

        Self {
            player_name: player_name.to_string(),
            riddle_order,
            current_index: 0,
            score: 0,
            attempts_on_current: 0,
            hint_visible: false,
            started_at: now,
            riddle_started_at: now,
            finished_at: if catalog.is_empty() { Some(now) } else { None },
            riddle_times: Vec::new(),
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn riddle_order(&self) -> &[Riddle] {
        &self.riddle_order
    }

    pub fn total_riddles(&self) -> usize {
        self.riddle_order.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn attempts_on_current(&self) -> u32 {
        self.attempts_on_current
    }

    pub fn hint_visible(&self) -> bool {
        self.hint_visible
    }

    pub fn riddle_times(&self) -> &[f64] {
        &self.riddle_times
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn current_riddle(&self) -> Option<&Riddle> {
        self.riddle_order.get(self.current_index)
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.riddle_order.len()
    }

    pub fn submit_answer(&mut self, raw: &str) -> Result<AnswerOutcome, GameError> {
        self.submit_answer_at(raw, Utc::now())
    }

    pub fn submit_answer_at(
        &mut self,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, GameError> {
        let riddle = self.current_riddle().ok_or(GameError::GameComplete)?;

        if riddle.is_answered_by(raw) {
            self.score += 1;
            self.advance(now);
            Ok(AnswerOutcome {
                correct: true,
                game_complete: self.is_complete(),
            })
        } else {
            self.attempts_on_current += 1;
            self.hint_visible = self.attempts_on_current >= HINT_THRESHOLD;
            Ok(AnswerOutcome {
                correct: false,
                game_complete: false,
            })
        }
    }

    pub fn skip(&mut self) -> Result<AnswerOutcome, GameError> {
        self.skip_at(Utc::now())
    }

    pub fn skip_at(&mut self, now: DateTime<Utc>) -> Result<AnswerOutcome, GameError> {
        if self.is_complete() {
            return Err(GameError::GameComplete);
        }

        self.advance(now);
        Ok(AnswerOutcome {
            correct: false,
            game_complete: self.is_complete(),
        })
    }

    pub fn total_elapsed(&self) -> f64 {
        self.total_elapsed_at(Utc::now())
    }

    /// Wall-clock seconds since the game started; stops counting once the
    /// last riddle is resolved.
    pub fn total_elapsed_at(&self, now: DateTime<Utc>) -> f64 {
        seconds_between(self.started_at, self.finished_at.unwrap_or(now))
    }

    pub fn score_record(&self) -> ScoreRecord {
        self.score_record_at(Utc::now())
    }

    pub fn score_record_at(&self, now: DateTime<Utc>) -> ScoreRecord {
        ScoreRecord {
            player_name: self.player_name.clone(),
            score: i64::from(self.score),
            elapsed_seconds: self.total_elapsed_at(now),
            recorded_at: Some(now.with_timezone(&Local).naive_local()),
        }
    }

    fn advance(&mut self, now: DateTime<Utc>) {
        self.riddle_times
            .push(seconds_between(self.riddle_started_at, now));
        self.current_index += 1;
        self.attempts_on_current = 0;
        self.hint_visible = false;

        if self.is_complete() {
            self.finished_at = Some(now);
        } else {
            self.riddle_started_at = now;
        }
    }
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from)
        .to_std()
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
