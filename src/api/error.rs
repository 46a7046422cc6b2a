use std::fmt;

/// Failure of a backend call.
#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout, TLS).
    Transport(reqwest::Error),
    /// HTTP 400 with a field -> message map, already in `field: message` form.
    Validation(Vec<String>),
    /// Any other non-success status.
    Status { status: u16, message: Option<String> },
    /// The response body did not have the expected shape.
    Decode(serde_json::Error),
    /// The client could not be set up from the configuration.
    Config(String),
}

impl ApiError {
    /// Lines to show in an alert popup.
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            ApiError::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(e) => write!(f, "Network error: {}", e),
            ApiError::Validation(messages) => {
                write!(f, "Validation failed: {}", messages.join("; "))
            }
            ApiError::Status {
                status,
                message: Some(message),
            } => write!(f, "Request failed ({}): {}", status, message),
            ApiError::Status {
                status,
                message: None,
            } => write!(f, "Request failed with status {}", status),
            ApiError::Decode(e) => write!(f, "Unexpected response: {}", e),
            ApiError::Config(reason) => write!(f, "Invalid client configuration: {}", reason),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(e) => Some(e),
            ApiError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = ApiError::Validation(vec!["title: too short".to_string()]);
        assert_eq!(err.user_messages(), vec!["title: too short"]);

        let err = ApiError::Status {
            status: 404,
            message: Some("No Question found with id: 7".to_string()),
        };
        assert_eq!(
            err.user_messages(),
            vec!["Request failed (404): No Question found with id: 7"]
        );
    }
}
