use crate::models::RootId;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for collaborator failures (loaders, resolvers)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RescopeError {
    #[error("invalid glob pattern '{pattern}': {message} near index {index}")]
    PatternSyntax {
        message: String,
        pattern: String,
        index: usize,
    },
    #[error("invalid source {}: {reason}", path.display())]
    InvalidSource { path: PathBuf, reason: String },
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("I/O error on {subject}: {source}")]
    Io {
        subject: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: BoxError,
    },
    #[error("cannot resolve '{name}' declared in {root}: {source}")]
    Resolution {
        name: String,
        root: RootId,
        #[source]
        source: BoxError,
    },
}

impl RescopeError {
    pub fn pattern_syntax(message: impl Into<String>, pattern: &str, index: usize) -> Self {
        Self::PatternSyntax {
            message: message.into(),
            pattern: pattern.to_string(),
            index,
        }
    }

    pub fn invalid_source(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidSource {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(subject: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            subject: subject.into(),
            source,
        }
    }

    /// True for errors that belong to a single streamed element rather than
    /// to the call that produced the stream.
    pub fn is_per_element(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Decode { .. } | Self::Resolution { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RescopeError>;
