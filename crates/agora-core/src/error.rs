use thiserror::Error;

/// Errors raised while constructing core components.
///
/// The transforms themselves (scan, build, aggregate, sort, top-k) are total
/// and never return these.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid vote value: {0}")]
    InvalidVoteValue(i64),

    #[error("Invalid stance: {0}")]
    InvalidStance(String),

    #[error("Invalid moderation term {term:?}: {reason}")]
    InvalidTerm { term: String, reason: String },

    #[error("Failed to load term lists: {0}")]
    TermListLoad(String),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
