use std::fmt;

/// Why a single lookup (or library read) failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct LookupError {
    pub kind: FailureKind,
    pub message: String,
}

impl LookupError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_authorization(&self) -> bool {
        self.kind == FailureKind::Authorization
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Provider unreachable or the connection dropped.
    Connectivity,
    Timeout,
    HttpStatus(u16),
    /// Response arrived but had an unexpected shape.
    Parse,
    /// Credential or token failure.
    Authorization,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Connectivity => write!(f, "connectivity error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Parse => write!(f, "parse error"),
            FailureKind::Authorization => write!(f, "authorization error"),
        }
    }
}

/// Rejections from the batch submission surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("unknown library source {0:?}")]
    UnknownSource(String),
    #[error("unknown search provider {0:?}")]
    UnknownProvider(String),
}
