use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use riddle_me_this::{
    config::Config, models::riddle, services::score_service::ScoreStore, terminal::TerminalShell,
};

/// Play Riddle Me This in the terminal.
#[derive(Debug, Parser)]
#[command(name = "riddle-terminal", version)]
struct Args {
    /// High score file (defaults to the configured path)
    #[arg(long, env = "HIGH_SCORES_FILE")]
    scores: Option<String>,

    /// Number of leaderboard rows shown after a game
    #[arg(long)]
    top: Option<usize>,

    /// Player name; skips the name prompt
    #[arg(long)]
    player: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the game screen
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load()?;

    let scores = ScoreStore::new(args.scores.unwrap_or(config.high_scores_path));
    let limit = args.top.unwrap_or(config.terminal_leaderboard_limit);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = TerminalShell::new(
        stdin.lock(),
        stdout.lock(),
        riddle::catalog(),
        scores,
        limit,
    );

    shell.run(args.player.as_deref())
}
