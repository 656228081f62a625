use thiserror::Error;

/// Text shown when the request could not be completed.
pub const NETWORK_ERROR_TEXT: &str = "Weather update failed";

/// Text shown when the response body did not decode into a reading.
pub const PARSE_ERROR_TEXT: &str = "Failed to parse weather data";

/// Everything that can go wrong while fetching one reading.
///
/// The variants keep the underlying cause for logging; the display only ever
/// sees the coarse [`ErrorKind`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to weather service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("weather service responded with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode weather response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("weather response contained no conditions")]
    NoConditions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
}

impl ErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::Network => NETWORK_ERROR_TEXT,
            ErrorKind::Parse => PARSE_ERROR_TEXT,
        }
    }
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Request(_) | FetchError::Status { .. } => ErrorKind::Network,
            FetchError::Decode(_) | FetchError::NoConditions => ErrorKind::Parse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_are_parse_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(FetchError::from(err).kind(), ErrorKind::Parse);
        assert_eq!(FetchError::NoConditions.kind(), ErrorKind::Parse);
    }

    #[test]
    fn bad_status_is_network_error() {
        let err = FetchError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "Invalid API key".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn kind_messages() {
        assert_eq!(ErrorKind::Network.message(), "Weather update failed");
        assert_eq!(ErrorKind::Parse.message(), "Failed to parse weather data");
    }
}
