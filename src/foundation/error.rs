pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// A backing engine could not be constructed or initialized.
    #[error("fatal init error in {stage}: {reason}")]
    FatalInit { stage: String, reason: String },

    /// A picture reached a consumer that cannot accept its format.
    #[error("format mismatch in {stage}: expected {expected}, got {actual}")]
    FormatMismatch {
        stage: String,
        expected: String,
        actual: String,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("engine error: {0}")]
    Engine(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn fatal_init(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FatalInit {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    pub fn format_mismatch(
        stage: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::FormatMismatch {
            stage: stage.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Re-tag an initialization failure as fatal for `stage`, keeping existing
    /// `FatalInit` errors untouched.
    pub fn into_fatal_init(self, stage: impl Into<String>) -> Self {
        match self {
            Self::FatalInit { .. } => self,
            other => Self::fatal_init(stage, other.to_string()),
        }
    }

    pub fn is_fatal_init(&self) -> bool {
        matches!(self, Self::FatalInit { .. })
    }

    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::FormatMismatch { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
