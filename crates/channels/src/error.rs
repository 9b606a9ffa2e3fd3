use std::error::Error as StdError;

/// Crate-wide result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed channel errors shared across channel traits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying channel mechanism cannot be cleanly torn down (e.g. a
    /// one-shot webhook registration). Callers must treat the connection as
    /// still conceptually live and must not retry the stop.
    #[error("channel connection does not support stop")]
    StopNotSupported,

    /// Input payload or parameter is invalid.
    #[error("invalid channel input: {message}")]
    InvalidInput { message: String },

    /// A channel type with no registered adapter.
    #[error("unknown channel type: {channel_type}")]
    UnknownChannel { channel_type: String },

    /// Wrapped source error from an external dependency.
    #[error("channel operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Store query failed.
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl Error {
    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unknown_channel(channel_type: impl std::fmt::Display) -> Self {
        Self::UnknownChannel {
            channel_type: channel_type.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// True for the [`Error::StopNotSupported`] sentinel.
    #[must_use]
    pub fn is_stop_not_supported(&self) -> bool {
        matches!(self, Self::StopNotSupported)
    }
}
