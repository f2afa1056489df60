use serde::Deserialize;

pub mod riddle;
pub mod score;
pub mod session;

pub use riddle::Riddle;
pub use score::{Performance, ScoreRecord};
pub use session::{AnswerOutcome, GameSession};

#[derive(Debug, Default, Deserialize)]
pub struct StartGameForm {
    #[serde(default)]
    pub player_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitAnswerForm {
    #[serde(default)]
    pub answer: Option<String>,
}
