/// Server configuration resolved from the environment and command line
///
/// Environment variables are read once at startup; CLI flags override them.

use std::env;
use std::path::PathBuf;

/// Environment variable naming the directory files go in when the caller
/// gives no `destPath`
pub const DEFAULT_TOUCH_PATH_ENV: &str = "DEFAULT_TOUCH_PATH";

/// File name of the diagnostic log
pub const LOG_FILE_NAME: &str = "touch-mcp-server.log";

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Override for the destination directory, from `DEFAULT_TOUCH_PATH`
    pub default_touch_path: Option<PathBuf>,
    /// Last-resort destination directory
    pub home_dir: Option<PathBuf>,
    /// Diagnostic log file; `None` disables file logging
    pub log_file: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok(), dirs::home_dir())
    }

    /// Resolve the configuration with an explicit variable lookup and home
    /// directory
    pub fn from_lookup<F>(lookup: F, home_dir: Option<PathBuf>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_touch_path = lookup(DEFAULT_TOUCH_PATH_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let log_file = Some(Self::log_path_in(home_dir.as_deref()));

        Self {
            default_touch_path,
            home_dir,
            log_file,
        }
    }

    /// `<home>/touch-mcp-server.log`, or under `/tmp` without a home directory
    fn log_path_in(home_dir: Option<&std::path::Path>) -> PathBuf {
        home_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(LOG_FILE_NAME)
    }

    pub fn with_default_touch_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.default_touch_path = path;
        }
        self
    }

    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.log_file = path;
        }
        self
    }

    pub fn without_log_file(mut self) -> Self {
        self.log_file = None;
        self
    }
}
