use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Riddle {
    pub question: String,
    pub answer: String,
    pub hint: String,
}

impl Riddle {
    pub fn new(question: &str, answer: &str, hint: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            hint: hint.to_string(),
        }
    }

    /// Case- and whitespace-insensitive comparison against the stored answer.
    pub fn is_answered_by(&self, raw: &str) -> bool {
        normalize_answer(raw) == normalize_answer(&self.answer)
    }
}

pub fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase()
}

const BUILTIN_RIDDLES: [(&str, &str, &str); 7] = [
    (
        "I speak without a mouth and hear without ears. I have no body, but I come alive with wind. What am I?",
        "echo",
        "You might hear me in mountains or empty rooms.",
    ),
    (
        "What has keys but no locks, space but no room, and you can enter but not go in?",
        "keyboard",
        "You're using me right now to play this game.",
    ),
    (
        "What gets wet while drying?",
        "towel",
        "You use me after taking a shower.",
    ),
    (
        "I have cities, but no houses. I have mountains, but no trees. I have water, but no fish. What am I?",
        "map",
        "I help you find your way when you're lost.",
    ),
    (
        "What can you break, even if you never pick it up or touch it?",
        "promise",
        "It's something you give your word on.",
    ),
    (
        "What has a head and a tail, but no body?",
        "coin",
        "You might flip me to make a decision.",
    ),
    (
        "What can travel around the world while staying in a corner?",
        "stamp",
        "I help letters reach their destination.",
    ),
];

/// The built-in riddle catalog, in its canonical order.
pub fn catalog() -> Vec<Riddle> {
    BUILTIN_RIDDLES
        .iter()
        .map(|(question, answer, hint)| Riddle::new(question, answer, hint))
        .collect()
}
