//! Error types and handling for the trip planning pipeline

use thiserror::Error;

use crate::polyline::DecodeError;

/// Main error type for the `tripcast` pipeline
#[derive(Error, Debug)]
pub enum TripError {
    /// Malformed polyline geometry
    #[error("Geometry decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The backend reported an error or answered with a non-success status
    #[error("Upstream error: {message}")]
    Upstream { message: String },

    /// Viewport fitting was asked to frame paths without a single coordinate
    #[error("No geometry to fit a viewport around")]
    NoGeometry,

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP transport errors
    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// Payload (de)serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TripError {
    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the pipeline degrades gracefully on this error instead of
    /// showing it to the user
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TripError::Decode(_) | TripError::NoGeometry)
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripError::Decode(_) => {
                "The route shape could not be drawn. Directions are still available.".to_string()
            }
            TripError::Upstream { message } => {
                format!("The trip planner could not plan this trip: {message}")
            }
            TripError::NoGeometry => "There is nothing to show on the map yet.".to_string(),
            TripError::Validation { message } => format!("Invalid input: {message}"),
            TripError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            TripError::Http { .. } => {
                "Unable to reach the trip planner. Please check your internet connection."
                    .to_string()
            }
            TripError::Json { .. } => {
                "The trip planner sent a response that could not be read.".to_string()
            }
            TripError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let upstream = TripError::upstream("no stops near origin");
        assert!(matches!(upstream, TripError::Upstream { .. }));

        let validation = TripError::validation("invalid mode");
        assert!(matches!(validation, TripError::Validation { .. }));

        let config = TripError::config("bad timeout");
        assert!(matches!(config, TripError::Config { .. }));
    }

    #[test]
    fn test_user_messages() {
        let upstream = TripError::upstream("No stops near origin");
        assert!(upstream.user_message().contains("No stops near origin"));

        let validation = TripError::validation("mode 'boat'");
        assert!(validation.user_message().contains("mode 'boat'"));

        assert!(TripError::NoGeometry.user_message().contains("nothing to show"));
    }

    #[test]
    fn test_recoverable_split() {
        assert!(TripError::NoGeometry.is_recoverable());
        assert!(TripError::Decode(DecodeError::Truncated { position: 3 }).is_recoverable());
        assert!(!TripError::upstream("boom").is_recoverable());
    }

    #[test]
    fn test_decode_error_conversion() {
        let err: TripError = DecodeError::Truncated { position: 0 }.into();
        assert!(matches!(err, TripError::Decode(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let trip_err: TripError = io_err.into();
        assert!(matches!(trip_err, TripError::Io { .. }));
    }
}
