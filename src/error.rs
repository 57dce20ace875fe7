use std::path::PathBuf;

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a call to the webhook backend.
///
/// Cloneable so it can travel inside `AppEvent`s back to the UI thread.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Network(String),

    #[error("unexpected response body: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// Stable error code, matching the backend contract (`HTTP_<status>`, `NETWORK_ERROR`).
    pub fn code(&self) -> String {
        match self {
            Self::Http { status, .. } => format!("HTTP_{status}"),
            Self::Network(_) => "NETWORK_ERROR".to_string(),
            Self::InvalidResponse(_) => "INVALID_RESPONSE".to_string(),
            Self::Rejected(_) => "REJECTED".to_string(),
        }
    }

    pub fn user_message(&self) -> String {
        format!("{} ({})", self, self.code())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown schema_version in {}: {version}", path.display())]
    UnknownSchema { path: PathBuf, version: u32 },

    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::ApiError;

    #[test]
    fn http_errors_carry_status_in_code() {
        let error = ApiError::Http {
            status: 502,
            message: "Bad gateway".to_string(),
        };
        assert_eq!(error.code(), "HTTP_502");
        assert_eq!(error.to_string(), "Bad gateway");
        assert_eq!(error.user_message(), "Bad gateway (HTTP_502)");
    }

    #[test]
    fn network_errors_use_fixed_code() {
        let error = ApiError::Network("connection refused".to_string());
        assert_eq!(error.code(), "NETWORK_ERROR");
    }
}
