//! Failure taxonomy for one pipeline invocation.

use serde::Serialize;

use crate::knowledge::EmptyKnowledgeBase;
use crate::llm::LlmError;

/// Why an invocation ended in the FAILED state.
///
/// These never escape [`KnowledgeProcessor::process`](super::KnowledgeProcessor::process);
/// they are folded into the result's [`FailureReport`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    EmptyKnowledgeBase(#[from] EmptyKnowledgeBase),

    /// The caller supplied inputs that break the pipeline's preconditions.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ProcessError {
    /// Stable name used in logs and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Llm(e) => e.kind(),
            Self::EmptyKnowledgeBase(_) => "EmptyKnowledgeBase",
            Self::InvalidInput(_) => "InvalidInput",
        }
    }
}

/// Serializable form of a [`ProcessError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub kind: String,
    pub message: String,
}

impl From<&ProcessError> for FailureReport {
    fn from(err: &ProcessError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_pass_through_llm_errors() {
        let err: ProcessError = LlmError::RateLimited { retry_after_secs: None }.into();
        assert_eq!(err.kind(), "LLMRateLimited");

        let err: ProcessError = EmptyKnowledgeBase {
            rejected_rows: 2,
            warnings: vec![],
        }
        .into();
        assert_eq!(err.kind(), "EmptyKnowledgeBase");
        assert!(err.to_string().contains("2 rows rejected"));
    }

    #[test]
    fn report_carries_kind_and_message() {
        let err = ProcessError::InvalidInput("message content is empty".into());
        let report = FailureReport::from(&err);
        assert_eq!(report.kind, "InvalidInput");
        assert_eq!(report.message, "invalid input: message content is empty");
    }
}
