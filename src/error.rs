//! Error taxonomy for the generate/judge pipeline

use thiserror::Error;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or missing template/config resource
    #[error("configuration error: {0}")]
    Config(String),

    /// A record does not provide every field a template references
    #[error("template '{template}' is missing field(s): {}", fields.join(", "))]
    MissingField {
        template: String,
        fields: Vec<String>,
    },

    /// Network, auth or HTTP failure reaching the completion backend
    #[error("completion backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend answered without usable content
    #[error("completion backend returned no usable content: {0}")]
    BackendRefusal(String),

    /// Judge response did not satisfy the rating contract
    #[error("judge response rejected ({reason}): {raw}")]
    JudgeFormat { reason: String, raw: String },
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short label used in status lines and batch summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::MissingField { .. } => "missing-field",
            Self::BackendUnavailable(_) => "backend-unavailable",
            Self::BackendRefusal(_) => "backend-refusal",
            Self::JudgeFormat { .. } => "judge-format",
        }
    }
}
