//! Errors produced at the HTTP boundary.
//!
//! Every request outcome is classified into one of the console's failure
//! classes so the update loop can react uniformly: session expiry forces a
//! logout, bad requests surface a toast, everything else is logged only.

/// Errors produced by REST calls against the management backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The session token was rejected (401).
    #[error("session expired or invalid (401)")]
    Unauthorized,

    /// The server rejected the request payload (400).
    #[error("bad request (400): {body}")]
    BadRequest { body: String },

    /// Any other non-success status.
    #[error("unexpected status {status}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The HTTP client could not be built from the configuration.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest { .. })
    }

    /// Short, user-facing text for toasts.
    pub fn notice(&self) -> String {
        match self {
            Self::Unauthorized => "Session token expired. Please login again.".to_string(),
            Self::BadRequest { body } if !body.trim().is_empty() => {
                format!("Invalid request: {}", first_line(body))
            }
            Self::BadRequest { .. } => "Invalid request".to_string(),
            other => other.to_string(),
        }
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim()
}

/// Map an HTTP status and body to the console's error classes.
pub fn classify_status(status: u16, body: &str) -> Result<(), ApiError> {
    match status {
        200..=299 => Ok(()),
        401 => Err(ApiError::Unauthorized),
        400 => Err(ApiError::BadRequest {
            body: body.to_string(),
        }),
        _ => Err(ApiError::Status {
            status,
            body: body.to_string(),
        }),
    }
}
