//! Report error types
//!
//! Every terminal failure of a report request ends up as a [`ReportError`]. The request
//! boundary only ever shows [`ReportError::public_message`] and [`ReportError::status_code`];
//! the full error is logged.

use thiserror::Error;

/// Report pipeline error types
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Missing required parameter: {0}")]
    Precondition(String),

    #[error("Missing bearer credential")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream request failed (status {status:?}): {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid upstream payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("PDF encoding error: {0}")]
    Encoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

impl ReportError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        ReportError::Upstream {
            status,
            message: message.into(),
        }
    }

    /// HTTP-style status code for the request boundary
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::Precondition(_) => 400,
            ReportError::Unauthenticated => 401,
            ReportError::NotFound(_) => 404,
            ReportError::Upstream { status: Some(s), .. } if *s >= 400 => *s,
            ReportError::Upstream { .. } | ReportError::Payload(_) => 502,
            ReportError::Layout(_)
            | ReportError::Chart(_)
            | ReportError::Encoding(_)
            | ReportError::Io(_) => 500,
        }
    }

    /// Message safe to return to the caller (no internal detail)
    pub fn public_message(&self) -> String {
        match self {
            ReportError::Precondition(field) => format!("Missing required parameter: {}", field),
            ReportError::Unauthenticated => "Not authenticated".to_string(),
            ReportError::NotFound(what) => format!("{} not found", what),
            ReportError::Upstream { .. } | ReportError::Payload(_) => {
                "Error fetching report data".to_string()
            }
            _ => "Error generating report".to_string(),
        }
    }
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        ReportError::Upstream {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ReportError::Precondition("patientId".into()).status_code(), 400);
        assert_eq!(ReportError::Unauthenticated.status_code(), 401);
        assert_eq!(ReportError::NotFound("Patient".into()).status_code(), 404);
        assert_eq!(ReportError::upstream(Some(503), "down").status_code(), 503);
        assert_eq!(ReportError::upstream(None, "refused").status_code(), 502);
        assert_eq!(ReportError::Encoding("bad png".into()).status_code(), 500);
    }

    #[test]
    fn test_public_message_hides_detail() {
        let err = ReportError::Encoding("zlib stream corrupted at offset 17".into());
        assert_eq!(err.public_message(), "Error generating report");

        let err = ReportError::upstream(Some(500), "stack trace here");
        assert!(!err.public_message().contains("stack"));
    }
}
