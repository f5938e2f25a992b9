//! Failures reported by hosted AI services
//!
//! Built once, where the HTTP call is made, and carried as a typed value up to
//! the API layer, which maps each kind to a status code.

use thiserror::Error;

/// Which hosted service failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Chat completions (analysis and companion chat)
    Llm,
    /// Speech-to-text
    Transcription,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm => "AI service",
            Self::Transcription => "Transcription service",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of upstream failure kinds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// 429: rate limit or exhausted credits
    #[error("{service} quota exceeded. Please check your credits or try again later.")]
    RateLimited { service: Service, detail: String },

    /// 401/403: missing or rejected API key
    #[error("{service} rejected the API key. Please check your configuration.")]
    Unauthorized { service: Service, detail: String },

    /// 502/503/504 or a transport failure (includes a model that is still loading)
    #[error("{service} is temporarily unavailable. Please try again in a few seconds.")]
    UpstreamUnavailable { service: Service, detail: String },

    /// 400/422 from upstream, or a reply we could not use
    #[error("{service} could not process the request: {detail}")]
    ValidationFailed { service: Service, detail: String },

    /// Anything else
    #[error("{service} request failed")]
    Unknown {
        service: Service,
        status: Option<u16>,
        detail: String,
    },
}

impl UpstreamError {
    /// Classify a non-success HTTP status
    pub fn from_status(service: Service, status: u16, body: &str) -> Self {
        let detail = truncate_detail(body);
        match status {
            429 => Self::RateLimited { service, detail },
            401 | 403 => Self::Unauthorized { service, detail },
            502..=504 => Self::UpstreamUnavailable { service, detail },
            400 | 422 => Self::ValidationFailed { service, detail },
            _ => Self::Unknown {
                service,
                status: Some(status),
                detail,
            },
        }
    }

    /// A request that never produced an HTTP response (connect error, timeout)
    pub fn transport(service: Service, err: &reqwest::Error) -> Self {
        Self::UpstreamUnavailable {
            service,
            detail: err.to_string(),
        }
    }

    /// Upstream answered 2xx but the payload was unusable
    pub fn invalid_reply(service: Service, detail: impl Into<String>) -> Self {
        Self::ValidationFailed {
            service,
            detail: detail.into(),
        }
    }

    /// HTTP status the API should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RateLimited { .. } => 429,
            Self::Unauthorized { .. } => 401,
            Self::UpstreamUnavailable { .. } => 503,
            Self::ValidationFailed { .. } => 400,
            Self::Unknown { .. } => 502,
        }
    }

    pub fn service(&self) -> Service {
        match self {
            Self::RateLimited { service, .. }
            | Self::Unauthorized { service, .. }
            | Self::UpstreamUnavailable { service, .. }
            | Self::ValidationFailed { service, .. }
            | Self::Unknown { service, .. } => *service,
        }
    }

    /// Raw upstream detail, for logs only
    pub fn detail(&self) -> &str {
        match self {
            Self::RateLimited { detail, .. }
            | Self::Unauthorized { detail, .. }
            | Self::UpstreamUnavailable { detail, .. }
            | Self::ValidationFailed { detail, .. }
            | Self::Unknown { detail, .. } => detail,
        }
    }
}

fn truncate_detail(body: &str) -> String {
    const MAX: usize = 300;
    let body = body.trim();
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let cases = [
            (429, 429),
            (401, 401),
            (403, 401),
            (502, 503),
            (503, 503),
            (504, 503),
            (400, 400),
            (422, 400),
            (500, 502),
            (404, 502),
        ];
        for (upstream, expected) in cases {
            let err = UpstreamError::from_status(Service::Llm, upstream, "");
            assert_eq!(err.status_code(), expected, "upstream {}", upstream);
        }
    }

    #[test]
    fn test_unknown_keeps_status() {
        match UpstreamError::from_status(Service::Transcription, 418, "teapot") {
            UpstreamError::Unknown { status, detail, .. } => {
                assert_eq!(status, Some(418));
                assert_eq!(detail, "teapot");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_messages_name_the_service() {
        let err = UpstreamError::from_status(Service::Transcription, 503, "loading");
        assert_eq!(err.service(), Service::Transcription);
        assert!(err.to_string().starts_with("Transcription service"));
        // body is not leaked into the client message
        assert!(!err.to_string().contains("loading"));
        assert_eq!(err.detail(), "loading");
    }

    #[test]
    fn test_detail_is_truncated() {
        let err = UpstreamError::from_status(Service::Llm, 500, &"x".repeat(1000));
        assert_eq!(err.detail().chars().count(), 303);
    }

    #[test]
    fn test_invalid_reply_maps_to_bad_request() {
        let err = UpstreamError::invalid_reply(Service::Llm, "missing mood");
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("missing mood"));
    }
}
