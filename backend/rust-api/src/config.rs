use serde::Deserialize;
use std::env;

pub const DEFAULT_HIGH_SCORES_FILE: &str = "high_scores.csv";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub high_scores_path: String,
    pub bind_addr: String,
    pub web_leaderboard_limit: usize,
    pub terminal_leaderboard_limit: usize,
    pub session_ttl_seconds: i64,
    pub cookie_secure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            high_scores_path: DEFAULT_HIGH_SCORES_FILE.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            web_leaderboard_limit: 10,
            terminal_leaderboard_limit: 5,
            session_ttl_seconds: 3600,
            cookie_secure: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = Config::default();

        let high_scores_path = settings
            .get_string("scores.path")
            .or_else(|_| env::var("HIGH_SCORES_FILE"))
            .unwrap_or(defaults.high_scores_path);

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or(defaults.bind_addr);

        let web_leaderboard_limit = settings
            .get_int("scores.web_limit")
            .ok()
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(defaults.web_leaderboard_limit);

        let terminal_leaderboard_limit = settings
            .get_int("scores.terminal_limit")
            .ok()
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(defaults.terminal_leaderboard_limit);

        let session_ttl_seconds = settings
            .get_int("session.ttl_seconds")
            .ok()
            .or_else(|| {
                env::var("SESSION_DURATION_SECONDS")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok())
            })
            .filter(|v| *v > 0)
            .unwrap_or(defaults.session_ttl_seconds);

        let cookie_secure = settings
            .get_bool("cookie.secure")
            .ok()
            .or_else(|| {
                env::var("COOKIE_SECURE")
                    .ok()
                    .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            })
            .unwrap_or(defaults.cookie_secure);

        Ok(Config {
            high_scores_path,
            bind_addr,
            web_leaderboard_limit,
            terminal_leaderboard_limit,
            session_ttl_seconds,
            cookie_secure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 4] = [
        "HIGH_SCORES_FILE",
        "BIND_ADDR",
        "SESSION_DURATION_SECONDS",
        "COOKIE_SECURE",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_load_uses_defaults() {
        clear_env();
        let config = Config::load().unwrap();
        assert_eq!(config.high_scores_path, DEFAULT_HIGH_SCORES_FILE);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.web_leaderboard_limit, 10);
        assert_eq!(config.terminal_leaderboard_limit, 5);
        assert_eq!(config.session_ttl_seconds, 3600);
        assert!(!config.cookie_secure);
    }

    #[test]
    #[serial]
    fn test_load_reads_env_fallbacks() {
        clear_env();
        env::set_var("HIGH_SCORES_FILE", "/tmp/riddles/scores.csv");
        env::set_var("BIND_ADDR", "127.0.0.1:9000");
        env::set_var("SESSION_DURATION_SECONDS", "120");
        env::set_var("COOKIE_SECURE", "true");

        let config = Config::load().unwrap();
        assert_eq!(config.high_scores_path, "/tmp/riddles/scores.csv");
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.session_ttl_seconds, 120);
        assert!(config.cookie_secure);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_non_positive_ttl_falls_back_to_default() {
        clear_env();
        env::set_var("SESSION_DURATION_SECONDS", "0");

        let config = Config::load().unwrap();
        assert_eq!(config.session_ttl_seconds, 3600);

        clear_env();
    }
}
