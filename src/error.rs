//! Error types for signup-reconcile.

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Account API error: {0}")]
    Api(#[from] ApiError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors returned by the remote account API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("Request failed with status {status}: {title}")]
    Status {
        status: u16,
        title: String,
        /// Machine-readable error code, used as translation key.
        code: Option<String>,
        detail: Option<String>,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// HTTP status of the failure, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Error code carried by the problem body.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether this is the backend's "account does not exist" signal.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Errors from the pending-profile store or the account cache.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store {name} unavailable: {reason}")]
    Unavailable { name: String, reason: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_detection() {
        let err = ApiError::Status {
            status: 404,
            title: "Not Found".into(),
            code: None,
            detail: None,
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));

        let err = ApiError::Transport("connection refused".into());
        assert!(!err.is_not_found());
        assert_eq!(err.status(), None);
        assert_eq!(err.code(), None);
    }

    #[test]
    fn code_exposed_for_translation() {
        let err = ApiError::Status {
            status: 401,
            title: "Unauthorized".into(),
            code: Some("TOKEN_EXPIRED".into()),
            detail: None,
        };
        assert_eq!(err.code(), Some("TOKEN_EXPIRED"));
        assert_eq!(
            err.to_string(),
            "Request failed with status 401: Unauthorized"
        );
    }

    #[test]
    fn area_errors_convert_into_top_level() {
        fn read_cache() -> Result<()> {
            Err(StoreError::Unavailable {
                name: "account cache".into(),
                reason: "poisoned".into(),
            })?
        }

        let err = read_cache().unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert_eq!(
            err.to_string(),
            "Store error: Store account cache unavailable: poisoned"
        );

        let err: Error = ConfigError::MissingEnvVar("SIGNUP_RECONCILE_TOKEN".into()).into();
        assert!(matches!(err, Error::Config(ConfigError::MissingEnvVar(_))));
    }
}
