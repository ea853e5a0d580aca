//! Upload → analysis session state machine
//!
//! A [`Session`] tracks one video's journey from selection to analysis. All
//! transitions are methods on the session; the two suspending steps
//! (encoding and the remote call) are split into a `begin_*` half that
//! checks the guards and hands out a ticket, and a `finish_*` half that
//! consumes the ticket together with the outcome. Tickets cannot be cloned,
//! so at most one operation is ever in flight.
//!
//! ```text
//! Idle ──select──▶ Uploading ──encoded──▶ Idle (with video) ──analyze──▶ Analyzing
//!   ▲                  │                                                  │      │
//!   │                  └──────────failed──────▶ Error ◀──────failed───────┘      │
//!   └──────────remove────────────────────────────┘        Success ◀──ok──────────┘
//! ```

pub(crate) mod pipeline;

use crate::analysis::{AnalysisRequest, AnalysisResult};
use crate::error::{AnalysisError, SessionError, VideoError};
use crate::video::{SelectedFile, VideoAsset};
use std::fmt;
use tracing::{info, warn};

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Encoding the selected file locally
    Uploading,
    /// Waiting for the remote model
    Analyzing,
    Success,
    Error,
}

impl SessionState {
    fn is_in_flight(self) -> bool {
        matches!(self, SessionState::Uploading | SessionState::Analyzing)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Uploading => "uploading",
            SessionState::Analyzing => "analyzing",
            SessionState::Success => "success",
            SessionState::Error => "error",
        };
        f.write_str(label)
    }
}

/// Permission to encode one selected file.
#[derive(Debug)]
pub(crate) struct EncodeTicket {
    file: SelectedFile,
}

impl EncodeTicket {
    pub(crate) fn file(&self) -> &SelectedFile {
        &self.file
    }
}

/// Permission to run one remote analysis.
#[derive(Debug)]
pub(crate) struct AnalysisTicket {
    request: AnalysisRequest,
}

impl AnalysisTicket {
    pub(crate) fn request(&self) -> &AnalysisRequest {
        &self.request
    }
}

/// The single client-side session.
#[derive(Debug)]
pub(crate) struct Session {
    state: SessionState,
    video: Option<VideoAsset>,
    analysis: Option<AnalysisResult>,
    error_message: Option<String>,
    max_video_bytes: u64,
}

impl Session {
    pub(crate) fn new(max_video_bytes: u64) -> Self {
        Self {
            state: SessionState::Idle,
            video: None,
            analysis: None,
            error_message: None,
            max_video_bytes,
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn video(&self) -> Option<&VideoAsset> {
        self.video.as_ref()
    }

    pub(crate) fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub(crate) fn analysis_text(&self) -> Option<&str> {
        self.analysis.as_ref().map(|a| a.markdown.as_str())
    }

    pub(crate) fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Whether a new analysis may start right now.
    pub(crate) fn can_start_analysis(&self) -> bool {
        self.video.is_some() && matches!(self.state, SessionState::Idle | SessionState::Success)
    }

    fn transition(&mut self, to: SessionState) {
        if self.state != to {
            info!(from = %self.state, to = %to, "Session transition");
        }
        self.state = to;
    }

    fn fail(&mut self, message: String) {
        warn!(message = %message, "Session failed");
        self.analysis = None;
        self.error_message = Some(message);
        self.transition(SessionState::Error);
    }

    /// Start selecting a new file.
    ///
    /// Validation failures move straight to `Error` without passing through
    /// `Uploading`. Any previous video is dropped either way.
    pub(crate) fn begin_selection(
        &mut self,
        file: SelectedFile,
    ) -> Result<EncodeTicket, SessionError> {
        if self.state.is_in_flight() {
            return Err(SessionError::Busy(self.state));
        }

        self.error_message = None;
        self.analysis = None;
        self.video = None;

        if let Err(e) = file.validate(self.max_video_bytes) {
            match &e {
                VideoError::TooLarge { size, .. } => {
                    warn!(size = *size, name = %file.name, "Rejected oversized video")
                }
                VideoError::NotAVideo { content_type } => {
                    warn!(content_type = ?content_type, name = %file.name, "Rejected non-video file")
                }
                _ => {}
            }
            self.fail(e.to_string());
            return Err(SessionError::InvalidVideo(e));
        }

        info!(name = %file.name, size = file.size, "Video selected");
        self.transition(SessionState::Uploading);
        Ok(EncodeTicket { file })
    }

    /// Complete a selection with the encoding outcome.
    pub(crate) fn finish_encoding(
        &mut self,
        _ticket: EncodeTicket,
        result: Result<VideoAsset, VideoError>,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Uploading {
            return Err(SessionError::StaleTicket(self.state));
        }

        match result {
            Ok(asset) => {
                self.video = Some(asset);
                self.transition(SessionState::Idle);
                Ok(())
            }
            Err(e) => {
                let err = SessionError::Encoding(e);
                self.fail(err.to_string());
                Err(err)
            }
        }
    }

    /// Start an analysis of the current video.
    ///
    /// Refused without any state change when no video is present or the
    /// session is uploading, analyzing or failed.
    pub(crate) fn begin_analysis(
        &mut self,
        focus: Option<String>,
    ) -> Result<AnalysisTicket, SessionError> {
        if !self.can_start_analysis() {
            return Err(match self.video {
                None => SessionError::NoVideo,
                Some(_) => SessionError::AnalysisBlocked(self.state),
            });
        }
        let Some(video) = self.video.as_ref() else {
            return Err(SessionError::NoVideo);
        };

        let request = AnalysisRequest {
            payload: video.payload.clone(),
            mime_type: video.mime_type.clone(),
            focus: focus.filter(|f| !f.trim().is_empty()),
        };

        self.analysis = None;
        self.error_message = None;
        self.transition(SessionState::Analyzing);
        Ok(AnalysisTicket { request })
    }

    /// Complete an analysis with the remote outcome.
    pub(crate) fn finish_analysis(
        &mut self,
        _ticket: AnalysisTicket,
        result: Result<String, AnalysisError>,
    ) -> Result<&AnalysisResult, SessionError> {
        if self.state != SessionState::Analyzing {
            return Err(SessionError::StaleTicket(self.state));
        }

        match result {
            Ok(text) => {
                self.transition(SessionState::Success);
                let stored = self.analysis.insert(AnalysisResult::from_response(text));
                Ok(&*stored)
            }
            Err(e) => {
                let err = SessionError::Analysis(e);
                self.fail(err.to_string());
                Err(err)
            }
        }
    }

    /// Drop the current video and return to `Idle`.
    ///
    /// Works from any settled state, including `Error`. Refused while an
    /// operation is in flight since there is no cancellation.
    pub(crate) fn remove_video(&mut self) -> Result<(), SessionError> {
        if self.state.is_in_flight() {
            return Err(SessionError::Busy(self.state));
        }
        if let Some(video) = self.video.take() {
            info!(name = %video.file.name, "Video removed");
        }
        self.analysis = None;
        self.error_message = None;
        self.transition(SessionState::Idle);
        Ok(())
    }
}
