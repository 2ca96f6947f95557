use std::path::PathBuf;

const STATE_FILE_ENV: &str = "BATCHDIFF_STATE_FILE";
const HEADLESS_ENV: &str = "BATCHDIFF_HEADLESS";
const COLOR_SCHEME_ENV: &str = "BATCHDIFF_COLOR_SCHEME";
const LOG_ENV: &str = "BATCHDIFF_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub state_file: PathBuf,
    pub interactive: bool,
    pub prefers_dark: bool,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let state_file = lookup(STATE_FILE_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_state_dir(&lookup).join("state.json"));

        let interactive = !lookup(HEADLESS_ENV).as_deref().is_some_and(is_truthy);

        let prefers_dark = lookup(COLOR_SCHEME_ENV)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("dark"));

        let log_filter = lookup(LOG_ENV)
            .or_else(|| lookup("RUST_LOG"))
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());

        Config {
            state_file,
            interactive,
            prefers_dark,
            log_filter,
        }
    }
}

fn default_state_dir(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(local) = lookup("LOCALAPPDATA") {
        return PathBuf::from(local).join("BatchDiff");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("state")
}

fn is_truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
