//! Error types for CommentGuard

/// Result type alias using CommentGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for CommentGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Empty or otherwise unusable submission. Recoverable, surfaced as a rejection.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Vectorizer or model used before a fitted state was loaded
    #[error("not fitted: {0}")]
    NotFitted(String),

    /// Artifact missing, corrupt, or incompatible at startup
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// Text reaching the vectorizer violates the normalized-text contract
    #[error("vectorization error: {0}")]
    Vectorization(String),

    /// Decision policy errors
    #[error("policy error: {0}")]
    Policy(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new not-fitted error
    pub fn not_fitted(msg: impl Into<String>) -> Self {
        Self::NotFitted(msg.into())
    }

    /// Create a new model load error
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a new vectorization error
    pub fn vectorization(msg: impl Into<String>) -> Self {
        Self::Vectorization(msg.into())
    }

    /// Create a new policy error
    pub fn policy(msg: impl Into<String>) -> Self {
        Self::Policy(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error must stop the process from serving requests.
    ///
    /// Only bad submissions are recoverable; everything else means the
    /// pipeline itself is broken.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidInput(_))
    }

    /// Stable machine-readable kind, used in HTTP bodies and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFitted(_) => "not_fitted",
            Self::ModelLoad(_) => "model_load",
            Self::Vectorization(_) => "vectorization",
            Self::Policy(_) => "policy",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}
