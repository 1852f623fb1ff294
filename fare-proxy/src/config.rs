//! Process-wide proxy configuration.
//!
//! Built once at startup and shared read-only with every request.

use std::net::SocketAddr;

use chrono::NaiveDate;

use crate::decode::{CandidateList, LegacyEncoding};

/// Fare search endpoint of the upstream API.
const DEFAULT_BASE_URL: &str = "https://unchinkensaku.jre-maas.com/v1/json/search/course/extreme";

/// Candidate encodings, most likely first. The upstream documents Shift_JIS.
const DEFAULT_ENCODINGS: [&str; 4] = ["shift_jis", "euc-jp", "iso-2022-jp", "utf-8"];

/// Upstream spells it this way.
const DEFAULT_TEIKI_KIND: &str = "bussiness";

const DEFAULT_MODE: &str = "fare";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Format of `date` in the upstream query string.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Errors raised while building the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment override could not be parsed
    #[error("invalid value for {var}: {message}")]
    InvalidEnv { var: &'static str, message: String },

    /// An encoding label is not known to the decoder
    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// No candidate encodings were configured
    #[error("at least one candidate encoding is required")]
    NoEncodings,
}

/// Immutable configuration for the fare proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Base URL of the upstream fare search
    pub base_url: String,
    /// Travel date sent with every query
    pub travel_date: NaiveDate,
    /// Fare category flag (`teikiKind`)
    pub teiki_kind: String,
    /// Query mode flag, fare rather than schedule
    pub mode: String,
    /// Candidate encoding labels, tried in order
    pub encodings: Vec<String>,
    /// Outbound request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum redirects followed on the outbound call
    pub max_redirects: usize,
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            travel_date: NaiveDate::from_ymd_opt(2026, 4, 10).unwrap_or_default(),
            teiki_kind: DEFAULT_TEIKI_KIND.to_string(),
            mode: DEFAULT_MODE.to_string(),
            encodings: DEFAULT_ENCODINGS.iter().map(|s| s.to_string()).collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }
}

impl ProxyConfig {
    /// Build a config from defaults plus `FARE_PROXY_*` environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from defaults plus overrides supplied by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("FARE_PROXY_BASE_URL") {
            let parsed = reqwest::Url::parse(url.trim()).map_err(|e| ConfigError::InvalidEnv {
                var: "FARE_PROXY_BASE_URL",
                message: format!("{url:?}: {e}"),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidEnv {
                    var: "FARE_PROXY_BASE_URL",
                    message: format!("{url:?}: scheme must be http or https"),
                });
            }
            config.base_url = url.trim().to_string();
        }

        if let Some(date) = lookup("FARE_PROXY_DATE") {
            config.travel_date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(
                |e| ConfigError::InvalidEnv {
                    var: "FARE_PROXY_DATE",
                    message: format!("{date:?}: {e}"),
                },
            )?;
        }

        if let Some(labels) = lookup("FARE_PROXY_ENCODINGS") {
            config.encodings = labels
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(secs) = lookup("FARE_PROXY_TIMEOUT_SECS") {
            config.timeout_secs = secs.trim().parse().map_err(|e| ConfigError::InvalidEnv {
                var: "FARE_PROXY_TIMEOUT_SECS",
                message: format!("{secs:?}: {e}"),
            })?;
            if config.timeout_secs == 0 {
                return Err(ConfigError::InvalidEnv {
                    var: "FARE_PROXY_TIMEOUT_SECS",
                    message: "timeout must be at least 1 second".to_string(),
                });
            }
        }

        if let Some(addr) = lookup("FARE_PROXY_BIND") {
            config.bind_addr = addr.trim().parse().map_err(|e| ConfigError::InvalidEnv {
                var: "FARE_PROXY_BIND",
                message: format!("{addr:?}: {e}"),
            })?;
        }

        // Resolve labels now so a typo fails at startup, not per request.
        config.candidate_list()?;

        Ok(config)
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the travel date.
    pub fn with_travel_date(mut self, date: NaiveDate) -> Self {
        self.travel_date = date;
        self
    }

    /// Set the candidate encoding labels.
    pub fn with_encodings<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.encodings = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set outbound request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the server bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Travel date as it appears in the upstream query.
    pub fn date_param(&self) -> String {
        self.travel_date.format(DATE_FORMAT).to_string()
    }

    /// Resolve the configured labels into decoders, preserving order.
    pub fn candidate_list(&self) -> Result<CandidateList, ConfigError> {
        let encodings = self
            .encodings
            .iter()
            .map(|label| {
                LegacyEncoding::for_label(label)
                    .ok_or_else(|| ConfigError::UnknownEncoding(label.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CandidateList::from_legacy(encodings).ok_or(ConfigError::NoEncodings)
    }
}
