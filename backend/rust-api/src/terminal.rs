//! Interactive terminal front end.
//!
//! The shell owns nothing but I/O: every rule lives in [`GameSession`]. A
//! player typing `quit`/`exit` (or closing stdin) ends the round with
//! [`RoundOutcome::Quit`], which the loop turns into the final screen.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::models::{
    session::normalize_player_name, GameSession, Performance, Riddle, ScoreRecord,
};
use crate::services::score_service::ScoreStore;

const RULE_WIDTH: usize = 60;
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    Answer(String),
    Skip,
    Quit,
}

impl PlayerInput {
    /// `None` means the input stream is closed, which counts as quitting.
    pub fn parse(line: Option<&str>) -> Self {
        let Some(line) = line else {
            return PlayerInput::Quit;
        };

        match line.trim().to_lowercase().as_str() {
            "quit" | "exit" => PlayerInput::Quit,
            "skip" => PlayerInput::Skip,
            _ => PlayerInput::Answer(line.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Completed,
    Quit,
}

pub struct TerminalShell<R, W> {
    input: R,
    output: W,
    catalog: Vec<Riddle>,
    scores: ScoreStore,
    leaderboard_limit: usize,
}

impl<R: BufRead, W: Write> TerminalShell<R, W> {
    pub fn new(
        input: R,
        output: W,
        catalog: Vec<Riddle>,
        scores: ScoreStore,
        leaderboard_limit: usize,
    ) -> Self {
        Self {
            input,
            output,
            catalog,
            scores,
            leaderboard_limit,
        }
    }

    /// Runs games until the player quits or declines a rematch.
    /// `player_name` skips the name prompt when given.
    pub fn run(&mut self, player_name: Option<&str>) -> Result<()> {
        if let Err(e) = self.scores.ensure_initialized() {
            tracing::warn!("High score file unavailable: {}", e);
        }

        self.display_welcome()?;

        let player_name = match player_name {
            Some(name) => normalize_player_name(name),
            None => match self.prompt_name()? {
                Some(name) => name,
                None => {
                    writeln!(self.output, "Thanks for stopping by! Goodbye!")?;
                    return Ok(());
                }
            },
        };

        let ready = self.prompt(&format!(
            "\nWelcome, {}! Press Enter to start the game...",
            player_name
        ))?;
        if PlayerInput::parse(ready.as_deref()) == PlayerInput::Quit {
            writeln!(self.output, "\nThanks for stopping by! Goodbye!")?;
            return Ok(());
        }

        loop {
            let mut game = GameSession::start(&player_name, &self.catalog);
            tracing::info!("Terminal game started for {}", player_name);

            let outcome = self.play(&mut game)?;
            if outcome == RoundOutcome::Quit {
                writeln!(self.output, "\nThanks for playing! Goodbye!")?;
            }

            self.display_final_score(&game)?;

            if outcome == RoundOutcome::Quit || !self.ask_play_again()? {
                break;
            }
        }

        Ok(())
    }

    fn play(&mut self, game: &mut GameSession) -> Result<RoundOutcome> {
        while let Some(riddle) = game.current_riddle().cloned() {
            self.display_riddle(game, &riddle)?;

            loop {
                let line = self.prompt("\nYour answer: ")?;

                match PlayerInput::parse(line.as_deref()) {
                    PlayerInput::Quit => return Ok(RoundOutcome::Quit),
                    PlayerInput::Skip => {
                        game.skip()?;
                        writeln!(self.output, "\nThe answer was: {}", riddle.answer)?;
                        self.display_time_taken(game)?;
                        if !self.pause()? {
                            return Ok(RoundOutcome::Quit);
                        }
                        break;
                    }
                    PlayerInput::Answer(answer) => {
                        let hint_was_visible = game.hint_visible();
                        let outcome = game.submit_answer(&answer)?;

                        if outcome.correct {
                            writeln!(self.output, "\n✓ Correct! Well done!")?;
                            self.display_time_taken(game)?;
                            if !self.pause()? {
                                return Ok(RoundOutcome::Quit);
                            }
                            break;
                        }

                        writeln!(
                            self.output,
                            "\n✗ Sorry, that's incorrect. Try again! (Attempt {})",
                            game.attempts_on_current()
                        )?;
                        if game.hint_visible() && !hint_was_visible {
                            writeln!(self.output, "\nHint: {}", riddle.hint)?;
                        }
                    }
                }
            }
        }

        Ok(RoundOutcome::Completed)
    }

    fn display_welcome(&mut self) -> Result<()> {
        write!(self.output, "{}", CLEAR_SCREEN)?;
        self.rule()?;
        writeln!(self.output, "{:^width$}", "RIDDLE ME THIS", width = RULE_WIDTH)?;
        self.rule()?;
        writeln!(
            self.output,
            "\nWelcome to 'Riddle Me This', a game of riddles and wit!"
        )?;
        writeln!(self.output, "\nInstructions:")?;
        writeln!(self.output, "- You will be presented with a series of riddles")?;
        writeln!(self.output, "- Type your answer and press Enter")?;
        writeln!(self.output, "- Each correct answer earns you 1 point")?;
        writeln!(self.output, "- After 2 wrong attempts, you'll get a hint")?;
        writeln!(self.output, "- Type 'skip' to reveal the answer and move on")?;
        writeln!(
            self.output,
            "- Type 'quit' or 'exit' at any time to end the game"
        )?;
        self.rule()
    }

    fn prompt_name(&mut self) -> Result<Option<String>> {
        let line = self.prompt("\nPlease enter your name: ")?;
        match PlayerInput::parse(line.as_deref()) {
            PlayerInput::Quit => Ok(None),
            _ => Ok(Some(normalize_player_name(line.as_deref().unwrap_or_default()))),
        }
    }

    fn display_riddle(&mut self, game: &GameSession, riddle: &Riddle) -> Result<()> {
        write!(self.output, "{}", CLEAR_SCREEN)?;
        writeln!(
            self.output,
            "Riddle {} of {}",
            game.current_index() + 1,
            game.total_riddles()
        )?;
        self.rule()?;
        writeln!(self.output, "\n{}\n", riddle.question)?;
        self.rule()
    }

    fn display_time_taken(&mut self, game: &GameSession) -> Result<()> {
        if let Some(seconds) = game.riddle_times().last() {
            writeln!(self.output, "Time taken: {:.2} seconds", seconds)?;
        }
        Ok(())
    }

    fn display_final_score(&mut self, game: &GameSession) -> Result<()> {
        write!(self.output, "{}", CLEAR_SCREEN)?;
        self.rule()?;
        writeln!(self.output, "{:^width$}", "GAME OVER", width = RULE_WIDTH)?;
        self.rule()?;

        let record = game.score_record();
        writeln!(self.output, "\nPlayer: {}", game.player_name())?;
        writeln!(
            self.output,
            "Final Score: {} out of {}",
            game.score(),
            game.total_riddles()
        )?;
        writeln!(
            self.output,
            "Total Time: {:.2} seconds",
            record.elapsed_seconds
        )?;

        let performance = Performance::rate(game.score(), game.total_riddles());
        writeln!(self.output, "\n{}", performance.message())?;

        if self.scores.append(&record).is_err() {
            writeln!(self.output, "\n(Your score could not be saved.)")?;
        }

        let high_scores = self.scores.top(self.leaderboard_limit);
        self.display_high_scores(&high_scores)?;

        writeln!(self.output, "\nThanks for playing 'Riddle Me This'!")?;
        self.rule()
    }

    fn display_high_scores(&mut self, high_scores: &[ScoreRecord]) -> Result<()> {
        if high_scores.is_empty() {
            writeln!(self.output, "\nNo high scores yet!")?;
            return Ok(());
        }

        writeln!(self.output)?;
        self.rule()?;
        writeln!(self.output, "{:^width$}", "HIGH SCORES", width = RULE_WIDTH)?;
        self.rule()?;
        writeln!(
            self.output,
            "{:<6}{:<15}{:<10}{:<10}{:<20}",
            "Rank", "Name", "Score", "Time", "Date"
        )?;
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))?;

        for (i, record) in high_scores.iter().enumerate() {
            writeln!(
                self.output,
                "{:<6}{:<15}{:<10}{:<10.2}{:<20}",
                i + 1,
                record.player_name,
                record.score,
                record.elapsed_seconds,
                record.recorded_at_display()
            )?;
        }

        Ok(())
    }

    fn ask_play_again(&mut self) -> Result<bool> {
        let line = self.prompt("\nWould you like to play again? (yes/no): ")?;
        let answer = line.unwrap_or_default().trim().to_lowercase();
        Ok(matches!(answer.as_str(), "yes" | "y"))
    }

    /// Waits for Enter between riddles; `false` when the player quits instead.
    fn pause(&mut self) -> Result<bool> {
        let line = self.prompt("\nPress Enter to continue...")?;
        Ok(PlayerInput::parse(line.as_deref()) != PlayerInput::Quit)
    }

    /// Prints `text` and reads one line. `None` once input is exhausted.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn rule(&mut self) -> Result<()> {
        writeln!(self.output, "{}", "=".repeat(RULE_WIDTH))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn echo_catalog() -> Vec<Riddle> {
        vec![Riddle::new(
            "I speak without a mouth. What am I?",
            "echo",
            "You might hear me in mountains.",
        )]
    }

    fn run_script(
        script: &str,
        catalog: Vec<Riddle>,
        player: Option<&str>,
    ) -> (String, Vec<ScoreRecord>, TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let mut output = Vec::new();

        {
            let mut shell = TerminalShell::new(
                script.as_bytes(),
                &mut output,
                catalog,
                ScoreStore::new(&path),
                5,
            );
            shell.run(player).unwrap();
        }

        let records = ScoreStore::new(&path).top(10);
        (String::from_utf8(output).unwrap(), records, dir)
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(PlayerInput::parse(Some(" QUIT ")), PlayerInput::Quit);
        assert_eq!(PlayerInput::parse(Some("Exit")), PlayerInput::Quit);
        assert_eq!(PlayerInput::parse(None), PlayerInput::Quit);
        assert_eq!(PlayerInput::parse(Some("skip")), PlayerInput::Skip);
        assert_eq!(
            PlayerInput::parse(Some(" Echo ")),
            PlayerInput::Answer(" Echo ".to_string())
        );
    }

    #[test]
    fn test_quit_at_name_prompt_records_nothing() {
        let (output, records, _dir) = run_script("exit\n", echo_catalog(), None);
        assert!(output.contains("Thanks for stopping by! Goodbye!"));
        assert!(!output.contains("GAME OVER"));
        assert!(records.is_empty());
    }

    #[test]
    fn test_full_game_with_hint() {
        let (output, records, _dir) =
            run_script("Ava\n\nwrong\nnope\nECHO\n\nno\n", echo_catalog(), None);

        assert!(output.contains("Welcome, Ava!"));
        assert!(output.contains("Riddle 1 of 1"));
        assert!(output.contains("(Attempt 1)"));
        assert!(output.contains("(Attempt 2)"));
        assert_eq!(output.matches("Hint: You might hear me in mountains.").count(), 1);
        assert!(output.contains("✓ Correct! Well done!"));
        assert!(output.contains("Final Score: 1 out of 1"));
        assert!(output.contains("Perfect score! You're a riddle master!"));
        assert!(output.contains("HIGH SCORES"));
        assert!(output.contains("Would you like to play again?"));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player_name, "Ava");
        assert_eq!(records[0].score, 1);
    }

    #[test]
    fn test_quit_mid_game_records_partial_score() {
        let (output, records, _dir) = run_script("Bo\n\nquit\n", echo_catalog(), None);

        assert!(output.contains("Thanks for playing! Goodbye!"));
        assert!(output.contains("Final Score: 0 out of 1"));
        assert!(!output.contains("Would you like to play again?"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 0);
    }

    #[test]
    fn test_closed_input_counts_as_quit() {
        let (output, records, _dir) = run_script("Bo\n\nwrong\n", echo_catalog(), None);

        assert!(output.contains("Thanks for playing! Goodbye!"));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_skip_reveals_answer_without_scoring() {
        let (output, records, _dir) = run_script("Cy\n\nskip\n\nno\n", echo_catalog(), None);

        assert!(output.contains("The answer was: echo"));
        assert!(output.contains("Final Score: 0 out of 1"));
        assert!(output.contains("Better luck next time!"));
        assert_eq!(records[0].score, 0);
    }

    #[test]
    fn test_play_again_keeps_player_name() {
        let (output, records, _dir) =
            run_script("Di\n\necho\n\ny\necho\n\nno\n", echo_catalog(), None);

        assert_eq!(output.matches("GAME OVER").count(), 2);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.player_name == "Di" && r.score == 1));
    }

    #[test]
    fn test_empty_name_becomes_anonymous() {
        let (output, records, _dir) = run_script("   \n\nquit\n", echo_catalog(), None);
        assert!(output.contains("Welcome, Anonymous!"));
        assert_eq!(records[0].player_name, "Anonymous");
    }

    #[test]
    fn test_preset_player_skips_name_prompt() {
        let (output, records, _dir) = run_script("\necho\n\nno\n", echo_catalog(), Some("Ed"));
        assert!(!output.contains("Please enter your name"));
        assert_eq!(records[0].player_name, "Ed");
    }

    #[test]
    fn test_quit_at_continue_prompt_ends_round() {
        let catalog = vec![
            Riddle::new("First?", "yes", "one"),
            Riddle::new("Second?", "yes", "two"),
            Riddle::new("Third?", "yes", "three"),
        ];
        let (output, records, _dir) = run_script("Ava\n\nyes\nquit\nno\n", catalog, None);

        assert!(!output.contains("Riddle 2 of 3"));
        assert!(output.contains("Thanks for playing! Goodbye!"));
        assert!(output.contains("Final Score: 1 out of 3"));
        assert!(!output.contains("Would you like to play again?"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 1);
    }

    #[test]
    fn test_every_riddle_visited_once() {
        // identical answers keep the script independent of shuffle order
        let catalog = vec![
            Riddle::new("First?", "yes", "one"),
            Riddle::new("Second?", "yes", "two"),
            Riddle::new("Third?", "yes", "three"),
        ];
        let (output, records, _dir) =
            run_script("Ava\n\nyes\n\nyes\n\nyes\n\nno\n", catalog, None);

        for question in ["First?", "Second?", "Third?"] {
            assert_eq!(output.matches(question).count(), 1);
        }
        assert!(output.contains("Riddle 3 of 3"));
        assert_eq!(records[0].score, 3);
    }
}
