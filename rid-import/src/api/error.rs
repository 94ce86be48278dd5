//! Error taxonomy for the Redmine HTTP boundary

/// Failure from a Redmine API call
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Credentials were rejected (HTTP 401)
    Auth,
    /// The requested resource does not exist (HTTP 404)
    NotFound {
        /// Path of the missing resource, e.g. "issues/42.json"
        resource: String,
    },
    /// The server could not be reached (connect failure or timeout)
    Connectivity { message: String },
    /// The server answered but rejected the request
    Remote { status: u16, message: String },
    /// The server answered with a body we could not interpret
    Decode { message: String },
}

impl ApiError {
    /// Map a reqwest transport error onto the taxonomy
    pub fn from_transport(err: reqwest::Error) -> Self {
        ApiError::Connectivity {
            message: err.to_string(),
        }
    }

    /// Whether this error means the remote is unreachable (as opposed to
    /// it having rejected one particular request)
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Connectivity { .. })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Auth => write!(f, "Redmine rejected the credentials"),
            ApiError::NotFound { resource } => {
                write!(f, "Redmine resource not found: {}", resource)
            }
            ApiError::Connectivity { message } => {
                write!(f, "Redmine is unreachable: {}", message)
            }
            ApiError::Remote { status, message } => {
                write!(f, "Redmine rejected the request (HTTP {}): {}", status, message)
            }
            ApiError::Decode { message } => {
                write!(f, "Unexpected response from Redmine: {}", message)
            }
        }
    }
}

impl std::error::Error for ApiError {}
