//! Server-rendered pages for the browser game.
//!
//! Every piece of player- or catalog-provided text goes through
//! [`escape_html`] before it lands in markup.

use crate::models::{GameSession, Performance, ScoreRecord};

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = "body{font-family:sans-serif;max-width:720px;margin:2rem auto;padding:0 1rem;}\
table{border-collapse:collapse;width:100%;}\
th,td{text-align:left;padding:.3rem .6rem;border-bottom:1px solid #ddd;}\
.hint{background:#fff6d5;padding:.6rem;border-radius:4px;}\
nav a{margin-right:1rem;}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - Riddle Me This</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n<h1>Riddle Me This</h1>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

pub fn welcome_page() -> String {
    let body = "<p>Welcome to 'Riddle Me This', a game of riddles and wit!</p>\n\
        <ul>\n\
        <li>You will be presented with a series of riddles</li>\n\
        <li>Each correct answer earns you 1 point</li>\n\
        <li>After 2 wrong attempts, you'll get a hint</li>\n\
        <li>Stuck? Skip the riddle and move on</li>\n\
        </ul>\n\
        <form method=\"post\" action=\"/start\">\n\
        <label>Your name <input type=\"text\" name=\"player_name\" maxlength=\"50\" autofocus></label>\n\
        <button type=\"submit\">Start game</button>\n\
        </form>\n\
        <nav><a href=\"/highscores\">High scores</a></nav>";
    layout("Welcome", body)
}

pub fn game_page(game: &GameSession) -> String {
    let Some(riddle) = game.current_riddle() else {
        return welcome_page();
    };

    let hint = if game.hint_visible() {
        format!(
            "<p class=\"hint\"><strong>Hint:</strong> {}</p>\n",
            escape_html(&riddle.hint)
        )
    } else {
        String::new()
    };

    let attempts = match game.attempts_on_current() {
        0 => String::new(),
        n => format!("<p>Sorry, that's incorrect. Wrong attempts so far: {}</p>\n", n),
    };

    let body = format!(
        "<p>Player: <strong>{player}</strong> | Score: {score}</p>\n\
         <h2>Riddle {number} of {total}</h2>\n\
         <p class=\"question\">{question}</p>\n\
         {hint}{attempts}\
         <form method=\"post\" action=\"/submit\">\n\
         <input type=\"text\" name=\"answer\" autocomplete=\"off\" autofocus>\n\
         <button type=\"submit\">Answer</button>\n\
         </form>\n\
         <nav><a href=\"/skip\">Skip</a><a href=\"/restart\">Restart</a>\
         <a href=\"/highscores\">High scores</a><a href=\"/quit\">Quit</a></nav>",
        player = escape_html(game.player_name()),
        score = game.score(),
        number = game.current_index() + 1,
        total = game.total_riddles(),
        question = escape_html(&riddle.question),
    );
    layout("Play", &body)
}

pub fn leaderboard_table(high_scores: &[ScoreRecord]) -> String {
    if high_scores.is_empty() {
        return "<p>No high scores yet!</p>".to_string();
    }

    let rows: String = high_scores
        .iter()
        .enumerate()
        .map(|(i, record)| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td></tr>\n",
                i + 1,
                escape_html(&record.player_name),
                record.score,
                record.elapsed_seconds,
                escape_html(&record.recorded_at_display()),
            )
        })
        .collect();

    format!(
        "<table>\n<thead><tr><th>Rank</th><th>Name</th><th>Score</th><th>Time</th><th>Date</th></tr></thead>\n\
         <tbody>\n{}</tbody>\n</table>",
        rows
    )
}

pub fn game_over_page(game: &GameSession, total_time: f64, high_scores: &[ScoreRecord]) -> String {
    let performance = Performance::rate(game.score(), game.total_riddles());
    let body = format!(
        "<h2>Game Over</h2>\n\
         <p>Player: <strong>{player}</strong></p>\n\
         <p>Final Score: {score} out of {total}</p>\n\
         <p>Total Time: {time:.2} seconds</p>\n\
         <p>{message}</p>\n\
         <h3>High Scores</h3>\n{table}\n\
         <nav><a href=\"/restart\">Play again</a><a href=\"/quit\">Quit</a></nav>",
        player = escape_html(game.player_name()),
        score = game.score(),
        total = game.total_riddles(),
        time = total_time,
        message = performance.message(),
        table = leaderboard_table(high_scores),
    );
    layout("Game Over", &body)
}

pub fn highscores_page(high_scores: &[ScoreRecord]) -> String {
    let body = format!(
        "<h2>High Scores</h2>\n{}\n<nav><a href=\"/\">Back to game</a></nav>",
        leaderboard_table(high_scores)
    );
    layout("High Scores", &body)
}
