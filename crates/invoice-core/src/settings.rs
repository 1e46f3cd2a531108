use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::Level;

use crate::error::ConfigError;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Fetch invoices for a date and print monthly totals per supplier
#[derive(Parser, Debug, Clone)]
#[command(
    name = "invoice-report",
    about = "Fetch invoices for a date and print monthly totals per supplier",
    version,
    after_help = "\
Examples:
  invoice-report 2024-01-01
  API_URL=https://api.example.com/invoices/ invoice-report 2024-06-15"
)]
pub struct Settings {
    /// Date in YYYY-MM-DD format (must be within 2024)
    pub date: String,

    /// Base URL the date is appended to
    #[arg(long, env = "API_URL")]
    pub api_url: Option<String>,

    /// Basic-auth username
    #[arg(long, env = "API_USERNAME")]
    pub api_username: Option<String>,

    /// Basic-auth password
    #[arg(long, env = "API_PASSWORD", hide_env_values = true)]
    pub api_password: Option<String>,

    /// Console logging mode
    #[arg(long, env = "LOG_MODE", value_enum, default_value_t = LogMode::CleanOutput)]
    pub log_mode: LogMode,

    /// Log file path (always receives INFO and above)
    #[arg(long, default_value = "app.log")]
    pub log_file: PathBuf,

    /// Total fetch attempts
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: u32,

    /// Base back-off delay in seconds
    #[arg(long, default_value = "1")]
    pub retry_delay_secs: u64,

    /// Per-attempt request timeout in seconds
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout_secs: u64,
}

// ── LogMode ────────────────────────────────────────────────────────────────────

/// How chatty the console (stderr) is. The log file is unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogMode {
    /// INFO and above on the console.
    Normal,
    /// Errors only on the console.
    Quiet,
    /// Everything on the console.
    Debug,
    /// Errors only, keeping stdout clean for the report.
    #[value(alias = "clean_output")]
    CleanOutput,
}

impl LogMode {
    /// Most verbose level shown on the console.
    pub fn console_level(&self) -> Level {
        match self {
            LogMode::Normal => Level::INFO,
            LogMode::Quiet | LogMode::CleanOutput => Level::ERROR,
            LogMode::Debug => Level::DEBUG,
        }
    }
}

// ── ApiConfig ──────────────────────────────────────────────────────────────────

/// Validated endpoint and credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl ApiConfig {
    /// Username with everything after the first character hidden.
    pub fn masked_username(&self) -> String {
        match self.username.chars().next() {
            Some(first) => format!("{}***", first),
            None => "***".to_string(),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.masked_username())
            .field("password", &"***")
            .finish()
    }
}

/// Timing knobs for the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Collect the endpoint configuration, naming every missing variable.
    ///
    /// Blank values count as missing.
    pub fn api_config(&self) -> Result<ApiConfig, ConfigError> {
        let present = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let base_url = present(&self.api_url);
        let username = present(&self.api_username);
        let password = present(&self.api_password);

        let mut missing = Vec::new();
        if base_url.is_none() {
            missing.push("API_URL".to_string());
        }
        if username.is_none() {
            missing.push("API_USERNAME".to_string());
        }
        if password.is_none() {
            missing.push("API_PASSWORD".to_string());
        }

        match (base_url, username, password) {
            (Some(base_url), Some(username), Some(password)) => {
                let config = ApiConfig {
                    base_url,
                    username,
                    password,
                };
                tracing::debug!("API URL configured: {}", config.base_url);
                tracing::debug!(
                    "API credentials loaded: Username='{}' (masked)",
                    config.masked_username()
                );
                Ok(config)
            }
            _ => Err(ConfigError::MissingVariables(missing)),
        }
    }

    /// Retry and timeout values from the command line.
    pub fn retry_settings(&self) -> RetrySettings {
        RetrySettings {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_secs(self.retry_delay_secs),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        let mut full = vec!["invoice-report"];
        full.extend_from_slice(args);
        Settings::try_parse_from(full).expect("args parse")
    }

    fn with_credentials(extra: &[&str]) -> Settings {
        let mut args = vec![
            "--api-url",
            "https://api.example.com/invoices/",
            "--api-username",
            "alice",
            "--api-password",
            "s3cret",
        ];
        args.extend_from_slice(extra);
        args.push("2024-01-01");
        parse(&args)
    }

    #[test]
    fn test_defaults() {
        let s = with_credentials(&[]);
        assert_eq!(s.date, "2024-01-01");
        assert_eq!(s.log_file, PathBuf::from("app.log"));
        assert_eq!(s.max_attempts, 3);
        let retry = s.retry_settings();
        assert_eq!(retry.base_delay, Duration::from_secs(1));
        assert_eq!(retry.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_api_config_complete() {
        let config = with_credentials(&[]).api_config().expect("complete config");
        assert_eq!(config.base_url, "https://api.example.com/invoices/");
        assert_eq!(config.username, "alice");
        assert_eq!(config.password, "s3cret");
    }

    #[test]
    fn test_api_config_lists_all_missing() {
        let mut s = with_credentials(&[]);
        s.api_url = None;
        s.api_password = Some("   ".to_string());
        assert_eq!(
            s.api_config(),
            Err(ConfigError::MissingVariables(vec![
                "API_URL".to_string(),
                "API_PASSWORD".to_string()
            ]))
        );
    }

    #[test]
    fn test_debug_output_masks_credentials() {
        let config = with_credentials(&[]).api_config().unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("a***"));
        assert!(!rendered.contains("alice"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_log_mode_console_levels() {
        assert_eq!(LogMode::Normal.console_level(), Level::INFO);
        assert_eq!(LogMode::Quiet.console_level(), Level::ERROR);
        assert_eq!(LogMode::CleanOutput.console_level(), Level::ERROR);
        assert_eq!(LogMode::Debug.console_level(), Level::DEBUG);
    }

    #[test]
    fn test_log_mode_flag() {
        let s = with_credentials(&["--log-mode", "debug"]);
        assert_eq!(s.log_mode, LogMode::Debug);
    }

    #[test]
    fn test_max_attempts_range() {
        let result = Settings::try_parse_from(["invoice-report", "--max-attempts", "0", "2024-01-01"]);
        assert!(result.is_err());
    }
}
