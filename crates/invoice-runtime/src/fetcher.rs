//! Authenticated invoice download with bounded retries.
//!
//! [`Fetcher::fetch`] issues `GET <base_url><date>` with basic auth. Client
//! errors (4xx) end the call at once; timeouts, connection failures and other
//! non-success statuses are retried with exponential back-off until the
//! attempt budget is spent.

use std::thread;
use std::time::Duration;

use invoice_core::error::FetchFailure;
use invoice_core::models::DateRequest;
use invoice_core::settings::{ApiConfig, RetrySettings};
use tracing::{error, info};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Attempts per fetch, first try included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Back-off before the second attempt; doubles for each later one.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ── RetryPolicy ───────────────────────────────────────────────────────────────

/// Attempt budget and timing for [`Fetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl From<RetrySettings> for RetryPolicy {
    fn from(s: RetrySettings) -> Self {
        Self {
            max_attempts: s.max_attempts.max(1),
            base_delay: s.base_delay,
            timeout: s.timeout,
        }
    }
}

impl RetryPolicy {
    /// Sleep inserted before `attempt` (1-based).
    ///
    /// Zero for the first attempt, then `base_delay * 2^(attempt - 2)`:
    /// 1 s before attempt 2 and 2 s before attempt 3 with the defaults.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 2).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

// ── Fetcher ───────────────────────────────────────────────────────────────────

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

/// Blocking invoice client.
pub struct Fetcher {
    http: reqwest::blocking::Client,
    config: ApiConfig,
    policy: RetryPolicy,
    sleeper: Sleeper,
}

impl Fetcher {
    /// Build a client for `config` that sleeps with [`thread::sleep`].
    pub fn new(config: ApiConfig, policy: RetryPolicy) -> Result<Self, FetchFailure> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("invoice-report/{}", env!("CARGO_PKG_VERSION")))
            .timeout(policy.timeout)
            .build()
            .map_err(|e| FetchFailure::TransportError(e.to_string()))?;

        Ok(Self {
            http,
            config,
            policy,
            sleeper: Box::new(thread::sleep),
        })
    }

    /// Replace the back-off sleep, e.g. to record delays instead of waiting.
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// URL requested for `date`.
    pub fn url_for(&self, date: &DateRequest) -> String {
        format!("{}{}", self.config.base_url, date)
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Download the CSV body for `date`.
    ///
    /// Returns the body of the first 2xx response untouched. Fails with
    /// [`FetchFailure::ClientError`] on a 4xx, or
    /// [`FetchFailure::RetriesExhausted`] once every attempt has failed.
    pub fn fetch(&self, date: &DateRequest) -> Result<String, FetchFailure> {
        let url = self.url_for(date);
        let max = self.policy.max_attempts;
        let mut last_cause: Option<FetchFailure> = None;

        for attempt in 1..=max {
            if attempt > 1 {
                let delay = self.policy.delay_before(attempt);
                info!(
                    "Retrying in {:.1} seconds (exponential backoff)...",
                    delay.as_secs_f64()
                );
                (self.sleeper)(delay);
            }

            info!("Fetching data for {} (attempt {}/{})", date, attempt, max);
            match self.attempt(&url) {
                Ok(body) => {
                    info!("Successfully fetched data for {}", date);
                    return Ok(body);
                }
                Err(FetchFailure::ClientError(status)) => {
                    error!("HTTP error fetching data (Status code: {})", status);
                    return Err(FetchFailure::ClientError(status));
                }
                Err(cause) => {
                    error!(
                        "Error fetching data for {} (attempt {}/{}): {}",
                        date, attempt, max, cause
                    );
                    last_cause = Some(cause);
                }
            }
        }

        Err(FetchFailure::RetriesExhausted {
            attempts: max,
            last_cause: last_cause
                .map(|c| c.to_string())
                .unwrap_or_else(|| "no attempt made".to_string()),
        })
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// One GET, classified into success or a [`FetchFailure`].
    fn attempt(&self, url: &str) -> Result<String, FetchFailure> {
        let resp = self
            .http
            .get(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .map_err(classify)?;

        let status = resp.status();
        if status.is_client_error() {
            return Err(FetchFailure::ClientError(status.as_u16()));
        }
        if !status.is_success() {
            return Err(FetchFailure::ServerError(status.as_u16()));
        }

        resp.text().map_err(classify)
    }
}

fn classify(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::TransportError(e.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
