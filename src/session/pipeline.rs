//! Async pipelines driving the session
//!
//! Each pipeline is `begin` (guards, ticket) → await → `finish` (ticket +
//! outcome). The session is borrowed mutably for the whole pipeline, so a
//! second pipeline cannot overlap with the first.

use super::Session;
use crate::analysis::{AnalysisResult, Analyzer};
use crate::error::SessionError;
use crate::video::{self, SelectedFile};
use tracing::{error, info};

/// Validate, encode and attach a selected file (encode-then-confirm).
pub(crate) async fn load_video(
    session: &mut Session,
    file: SelectedFile,
) -> Result<(), SessionError> {
    let ticket = session.begin_selection(file)?;
    let result = video::encode(ticket.file().clone()).await;
    if let Err(e) = &result {
        error!("Video encoding failed: {}", e);
    }
    session.finish_encoding(ticket, result)
}

/// Run one analysis of the current video (request-then-resolve).
pub(crate) async fn run_analysis<'s, A>(
    session: &'s mut Session,
    analyzer: &A,
    focus: Option<String>,
) -> Result<&'s AnalysisResult, SessionError>
where
    A: Analyzer + ?Sized,
{
    let ticket = session.begin_analysis(focus)?;
    info!(backend = analyzer.name(), "Starting analysis");
    let result = analyzer.analyze(ticket.request()).await;
    if let Err(e) = &result {
        error!(backend = analyzer.name(), "Analysis failed: {}", e);
    }
    session.finish_analysis(ticket, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisRequest;
    use crate::error::AnalysisError;
    use crate::session::SessionState;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const MAX: u64 = 25 * 1024 * 1024;

    /// Replays a fixed outcome and records what it was asked.
    struct ScriptedAnalyzer {
        outcome: fn() -> Result<String, AnalysisError>,
        calls: AtomicUsize,
        last_request: Mutex<Option<AnalysisRequest>>,
    }

    impl ScriptedAnalyzer {
        fn new(outcome: fn() -> Result<String, AnalysisError>) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Analyzer for ScriptedAnalyzer {
        async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            (self.outcome)()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn write_clip(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> SelectedFile {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        SelectedFile::inspect(&path, None).unwrap()
    }

    #[tokio::test]
    async fn test_load_then_analyze_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(MAX);
        load_video(&mut session, write_clip(&dir, "clip.webm", b"hello"))
            .await
            .unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.video().unwrap().mime_type, "video/webm");

        let analyzer = ScriptedAnalyzer::new(|| Ok("### Analysis\n- Good pressing".to_string()));
        let result = run_analysis(&mut session, &analyzer, Some("pressing".to_string()))
            .await
            .unwrap();
        assert_eq!(result.markdown, "### Analysis\n- Good pressing");
        assert_eq!(session.state(), SessionState::Success);

        let request = analyzer.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(&*request.payload, "aGVsbG8=");
        assert_eq!(request.focus.as_deref(), Some("pressing"));
    }

    #[tokio::test]
    async fn test_remote_failure_ends_in_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(MAX);
        load_video(&mut session, write_clip(&dir, "clip.mp4", b"data"))
            .await
            .unwrap();

        let analyzer = ScriptedAnalyzer::new(|| Err(AnalysisError::MissingApiKey));
        let result = run_analysis(&mut session, &analyzer, None).await;
        assert!(matches!(
            result,
            Err(SessionError::Analysis(AnalysisError::MissingApiKey))
        ));
        assert_eq!(session.state(), SessionState::Error);
        assert!(session.analysis_text().is_none());
        assert!(session.error_message().unwrap().contains("API key is missing"));
    }

    #[tokio::test]
    async fn test_analysis_without_video_never_calls_backend() {
        let mut session = Session::new(MAX);
        let analyzer = ScriptedAnalyzer::new(|| Ok("unused".to_string()));
        let result = run_analysis(&mut session, &analyzer, None).await;
        assert!(matches!(result, Err(SessionError::NoVideo)));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_invalid_file_never_reaches_uploading() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(MAX);
        let result = load_video(&mut session, write_clip(&dir, "notes.txt", b"text")).await;
        assert!(matches!(result, Err(SessionError::InvalidVideo(_))));
        assert_eq!(session.state(), SessionState::Error);
        assert!(session.video().is_none());
    }

    #[tokio::test]
    async fn test_vanished_file_is_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_clip(&dir, "clip.mp4", b"data");
        std::fs::remove_file(&file.path).unwrap();

        let mut session = Session::new(MAX);
        let result = load_video(&mut session, file).await;
        assert!(matches!(result, Err(SessionError::Encoding(_))));
        assert_eq!(session.error_message(), Some("Failed to process video file."));
    }

    #[tokio::test]
    async fn test_error_state_blocks_until_removed() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(MAX);
        load_video(&mut session, write_clip(&dir, "clip.mp4", b"data"))
            .await
            .unwrap();

        let failing = ScriptedAnalyzer::new(|| {
            Err(AnalysisError::InvalidResponse("garbled".to_string()))
        });
        let _ = run_analysis(&mut session, &failing, None).await;

        let working = ScriptedAnalyzer::new(|| Ok("fine".to_string()));
        let blocked = run_analysis(&mut session, &working, None).await;
        assert!(matches!(blocked, Err(SessionError::AnalysisBlocked(_))));
        assert_eq!(working.calls.load(Ordering::SeqCst), 0);

        session.remove_video().unwrap();
        load_video(&mut session, write_clip(&dir, "clip2.mp4", b"more"))
            .await
            .unwrap();
        run_analysis(&mut session, &working, None).await.unwrap();
        assert_eq!(session.analysis_text(), Some("fine"));
    }
}
