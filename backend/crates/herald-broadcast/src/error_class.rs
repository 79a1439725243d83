use crate::BroadcastError;

/// Substrings in streaming service errors that indicate throttling.
pub const STREAMING_RATE_LIMIT_KEYWORDS: &[&str] =
    &[
        "rate exceeded",
        "rate limit",
        "rate-limit",
        "throttl",
        "quota",
        "limit exceeded",
        "too many requests",
    ];

/// Substrings in trigger API errors that indicate an exhausted plan.
pub const TRIGGER_RATE_LIMIT_KEYWORDS: &[&str] = &["quota", "limit", "exceeded", "over capacity"];

/// 402 Payment Required, 429 Too Many Requests.
pub const RATE_LIMIT_STATUS_CODES: &[u16] = &[402, 429];

/// How a recorded failure affects a broadcaster's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Quota or throttling; moves the broadcaster to `LimitReached` at once
    RateLimit,
    /// Counts toward the error threshold
    Generic,
}

impl ErrorClass {
    /// Classify raw error text plus an optional HTTP status.
    ///
    /// Keyword matching is case-insensitive.
    pub fn classify(message: &str, status: Option<u16>, keywords: &[&str]) -> Self {
        if status.is_some_and(|s| RATE_LIMIT_STATUS_CODES.contains(&s)) {
            return Self::RateLimit;
        }

        let lowered = message.to_lowercase();
        if keywords.iter().any(|k| lowered.contains(k)) {
            Self::RateLimit
        } else {
            Self::Generic
        }
    }

    pub fn of_error(error: &BroadcastError, keywords: &[&str]) -> Self {
        if matches!(error, BroadcastError::RateLimited { .. }) {
            return Self::RateLimit;
        }
        Self::classify(&error.detail(), error.status_code(), keywords)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::Generic => "generic",
        }
    }
}
