use serde::{Deserialize, Serialize};

/// Lifecycle state of one generation attempt.
/// `Completed` and `Error` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationState {
    Processing,
    Completed,
    Error,
}

impl GenerationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationState::Completed | GenerationState::Error)
    }
}

impl std::fmt::Display for GenerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationState::Processing => write!(f, "processing"),
            GenerationState::Completed => write!(f, "completed"),
            GenerationState::Error => write!(f, "error"),
        }
    }
}

/// Status record polled by clients while a generation runs in the background
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStatus {
    pub generation_id: String,
    pub status: GenerationState,
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationStatus {
    pub fn processing(generation_id: impl Into<String>, progress: u8, message: &str) -> Self {
        Self {
            generation_id: generation_id.into(),
            status: GenerationState::Processing,
            progress: progress.min(100),
            message: message.to_string(),
            result_url: None,
            error: None,
        }
    }

    pub fn completed(
        generation_id: impl Into<String>,
        message: &str,
        result_url: impl Into<String>,
    ) -> Self {
        Self {
            generation_id: generation_id.into(),
            status: GenerationState::Completed,
            progress: checkpoints::DONE,
            message: message.to_string(),
            result_url: Some(result_url.into()),
            error: None,
        }
    }

    pub fn failed(
        generation_id: impl Into<String>,
        progress: u8,
        message: &str,
        error: impl Into<String>,
    ) -> Self {
        Self {
            generation_id: generation_id.into(),
            status: GenerationState::Error,
            progress: progress.min(100),
            message: message.to_string(),
            result_url: None,
            error: Some(error.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Fixed progress checkpoints of the generation pipeline
pub mod checkpoints {
    pub const QUEUED: u8 = 0;
    pub const GENERATING: u8 = 25;
    pub const OPTIMIZING: u8 = 75;
    pub const DONE: u8 = 100;

    pub const QUEUED_MESSAGE: &str = "Site generation queued";
    pub const GENERATING_MESSAGE: &str = "Generating site content";
    pub const OPTIMIZING_MESSAGE: &str = "Optimizing generated code";
    pub const DONE_MESSAGE: &str = "Site generation finished";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&GenerationState::Processing).unwrap(),
            "\"processing\""
        );

        let state: GenerationState = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(state, GenerationState::Error);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!GenerationState::Processing.is_terminal());
        assert!(GenerationState::Completed.is_terminal());
        assert!(GenerationState::Error.is_terminal());
    }

    #[test]
    fn test_optional_fields_omitted_on_wire() {
        let status =
            GenerationStatus::processing("abc123", checkpoints::QUEUED, checkpoints::QUEUED_MESSAGE);
        let json = serde_json::to_string(&status).unwrap();

        assert!(!json.contains("result_url"));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_completed_status_carries_url() {
        let status = GenerationStatus::completed(
            "abc123",
            checkpoints::DONE_MESSAGE,
            "/sites/abc123/index.html",
        );

        assert_eq!(status.progress, 100);
        assert_eq!(
            status.result_url.as_deref(),
            Some("/sites/abc123/index.html")
        );
    }

    #[test]
    fn test_failed_status_keeps_checkpoint_progress() {
        let status = GenerationStatus::failed(
            "abc123",
            checkpoints::GENERATING,
            "Site generation failed",
            "backend unreachable",
        );

        assert_eq!(status.status, GenerationState::Error);
        assert_eq!(status.progress, checkpoints::GENERATING);
        assert_eq!(status.error.as_deref(), Some("backend unreachable"));
        assert!(status.result_url.is_none());
    }

    #[test]
    fn test_progress_clamped_to_100() {
        let status = GenerationStatus::processing("abc123", 250, "overflow");
        assert_eq!(status.progress, 100);
    }
}
