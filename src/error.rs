use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionState;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot open {path}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Video selection and encoding errors
#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Please upload a valid video file.")]
    NotAVideo { content_type: Option<String> },

    #[error("Video is too large (Max {max_mb}MB). Please upload a shorter segment.")]
    TooLarge { size: u64, max_mb: u64 },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encoding task failed: {0}")]
    Encode(String),
}

/// Remote analysis errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("API key is missing. Set GEMINI_API_KEY (or API_KEY) in the environment or a .env file.")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

/// Session transition errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session is busy ({0})")]
    Busy(SessionState),

    #[error("No video selected")]
    NoVideo,

    #[error("Analysis cannot start while session is {0}")]
    AnalysisBlocked(SessionState),

    #[error("{0}")]
    InvalidVideo(VideoError),

    #[error("Failed to process video file.")]
    Encoding(#[source] VideoError),

    #[error("Failed to analyze video: {0}")]
    Analysis(#[source] AnalysisError),

    #[error("Ticket does not match the in-flight operation (session is {0})")]
    StaleTicket(SessionState),
}

/// Report export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Could not find Documents directory")]
    NoDocumentsDir,

    #[error("Analysis is empty")]
    EmptyAnalysis,

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_error_messages_are_user_facing() {
        let err = VideoError::NotAVideo {
            content_type: Some("image/png".to_string()),
        };
        assert_eq!(err.to_string(), "Please upload a valid video file.");

        let err = VideoError::TooLarge {
            size: 30 * 1024 * 1024,
            max_mb: 25,
        };
        assert_eq!(
            err.to_string(),
            "Video is too large (Max 25MB). Please upload a shorter segment."
        );
    }

    #[test]
    fn test_session_error_wraps_analysis_error() {
        let err = SessionError::Analysis(AnalysisError::ServerError {
            status: 429,
            message: "quota".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to analyze video: Server error (429): quota"
        );
    }
}
