use thiserror::Error;

/// Broad classes of failure, used to decide how an error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Something the action needs before it can start is missing.
    Precondition,
    /// The request never produced a usable HTTP response.
    Transport,
    /// The server answered with an `{error}` payload or an error status.
    Application,
    /// The server (or the page) handed us data we could not decode.
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("CSRF token missing, reload the page")]
    MissingCsrfToken,

    #[error("required element not found: {0}")]
    MissingElement(String),

    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("server error ({status}). {detail}")]
    Server { status: u16, detail: String },

    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response: {0}")]
    Malformed(String),

    #[error("could not read chat history: {0}")]
    InvalidHistory(String),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("title cannot be empty")]
    EmptyTitle,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::MissingCsrfToken
            | ClientError::MissingElement(_)
            | ClientError::Dom(_)
            | ClientError::InvalidConfig(_)
            | ClientError::EmptyTitle => ErrorKind::Precondition,
            ClientError::Network(_) => ErrorKind::Transport,
            ClientError::Server { .. } | ClientError::Rejected(_) => ErrorKind::Application,
            ClientError::Malformed(_) | ClientError::InvalidHistory(_) => ErrorKind::Malformed,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
