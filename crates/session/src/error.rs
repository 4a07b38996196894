use formats::extract::ExtractError;

use crate::chat_history::ChatHistoryError;

/// Why importing a summary from a group chat did not change the form.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("chat history unavailable: {0}")]
    Network(#[from] ChatHistoryError),
    #[error("no summary found in the chat history")]
    NoSummaryFound,
    #[error("summary could not be parsed: {reason}")]
    ParseFailure { reason: String },
}

impl From<ExtractError> for ImportError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::NoSummaryFound => ImportError::NoSummaryFound,
            ExtractError::ParseFailure { reason } => ImportError::ParseFailure { reason },
        }
    }
}

impl ImportError {
    /// Sentence shown to the user. Details stay in `Display` for the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            ImportError::Network(_) => {
                "Could not reach the chat history service. Please try again."
            }
            ImportError::NoSummaryFound => "No trip summary is available for this group yet.",
            ImportError::ParseFailure { .. } => "The trip summary could not be read.",
        }
    }
}
