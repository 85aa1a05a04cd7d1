use strum_macros::Display;
use thiserror::Error;

/// Failure of a single job run. Every variant is caught at the job boundary.
#[derive(Debug, Error)]
pub enum JobError {
    /// The endpoint could not be reached, answered with a non-success status
    /// or returned a body that is not JSON.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The endpoint answered but the envelope code is not 200.
    #[error("request error: api returned code {code}{}", describe_msg(.msg))]
    Domain { code: i64, msg: Option<String> },

    /// The payload is missing fields or has fewer elements than required.
    #[error("unexpected response shape: {0}")]
    Shape(String),

    /// Insert rejected by the unique key, usually a lost check-then-insert race.
    #[error("duplicate record: {0}")]
    Constraint(String),

    #[error("store failure: {0}")]
    Store(String),

    /// The job could not be wired from the configuration.
    #[error("configuration failure: {0}")]
    Config(String),
}

fn describe_msg(msg: &Option<String>) -> String {
    msg.as_deref().map(|m| format!(" ({m})")).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorCategory {
    #[strum(to_string = "transport")]
    Transport,
    #[strum(to_string = "domain")]
    Domain,
    #[strum(to_string = "shape")]
    Shape,
    #[strum(to_string = "constraint")]
    Constraint,
    #[strum(to_string = "store")]
    Store,
    #[strum(to_string = "config")]
    Config,
}

impl JobError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Domain { .. } => ErrorCategory::Domain,
            Self::Shape(_) => ErrorCategory::Shape,
            Self::Constraint(_) => ErrorCategory::Constraint,
            Self::Store(_) => ErrorCategory::Store,
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }
}

impl From<reqwest::Error> for JobError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<diesel::result::Error> for JobError {
    fn from(e: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match e {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::Constraint(info.message().to_owned())
            }
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for JobError {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        Self::Store(format!("Failed to get DB connection: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_mentions_code_and_message() {
        let err = JobError::Domain {
            code: 500,
            msg: Some("busy".to_owned()),
        };
        assert_eq!(err.to_string(), "request error: api returned code 500 (busy)");
        assert_eq!(err.category(), ErrorCategory::Domain);

        let bare = JobError::Domain { code: 404, msg: None };
        assert_eq!(bare.to_string(), "request error: api returned code 404");
    }

    #[test]
    fn category_names() {
        assert_eq!(JobError::shape("x").category().to_string(), "shape");
        assert_eq!(
            JobError::Constraint("dup".to_owned()).category().to_string(),
            "constraint"
        );
    }
}
