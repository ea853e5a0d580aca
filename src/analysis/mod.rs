//! Tactical analysis of video clips by a remote multimodal model.

pub(crate) mod gemini;
pub(crate) mod prompt;

use crate::error::AnalysisError;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::sync::Arc;

/// Returned in place of an empty model response.
pub(crate) const NO_ANALYSIS_FALLBACK: &str = "No analysis generated.";

/// Everything needed for one analysis call.
#[derive(Debug, Clone)]
pub(crate) struct AnalysisRequest {
    /// Base64-encoded video bytes
    pub(crate) payload: Arc<str>,
    pub(crate) mime_type: String,
    /// Optional focus directive narrowing the analysis
    pub(crate) focus: Option<String>,
}

/// Remote analysis backend.
#[async_trait]
pub(crate) trait Analyzer: Send + Sync {
    /// Analyze a clip and return markdown-flavored text.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalysisError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// A completed analysis.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnalysisResult {
    pub(crate) markdown: String,
    pub(crate) timestamp: DateTime<Local>,
}

impl AnalysisResult {
    /// Wrap response text, substituting the fallback literal when empty.
    pub(crate) fn from_response(text: String) -> Self {
        Self {
            markdown: with_fallback(text),
            timestamp: Local::now(),
        }
    }
}

pub(crate) fn with_fallback(text: String) -> String {
    if text.is_empty() {
        NO_ANALYSIS_FALLBACK.to_string()
    } else {
        text
    }
}
