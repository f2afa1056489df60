use chrono::NaiveDateTime;
use serde::Serialize;

pub const RECORDED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub player_name: String,
    pub score: i64,
    pub elapsed_seconds: f64,
    pub recorded_at: Option<NaiveDateTime>,
}

impl ScoreRecord {
    /// Date column as written to the score file, `Unknown` when absent.
    pub fn recorded_at_display(&self) -> String {
        self.recorded_at
            .map(|at| at.format(RECORDED_AT_FORMAT).to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    Perfect,
    Great,
    Fair,
    Poor,
}

impl Performance {
    pub fn rate(score: u32, total: usize) -> Self {
        if total == 0 {
            return Performance::Poor;
        }

        let total = total as f64;
        let score = f64::from(score);
        if score >= total {
            Performance::Perfect
        } else if score >= total * 0.7 {
            Performance::Great
        } else if score >= total * 0.5 {
            Performance::Fair
        } else {
            Performance::Poor
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Performance::Perfect => "Perfect score! You're a riddle master!",
            Performance::Great => "Great job! You have an excellent mind for riddles!",
            Performance::Fair => "Not bad! You solved half or more of the riddles!",
            Performance::Poor => "Better luck next time! Riddles can be tricky.",
        }
    }
}
