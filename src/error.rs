//! Error types for the registry.
//!
//! Every failure the registry reports maps onto a small set of
//! [`ErrorKind`] discriminants with stable string codes, so callers can
//! branch on what went wrong without matching on message text.

use thiserror::Error;

/// Error produced by a user-supplied read/write/exec handler.
///
/// The registry never inspects or rewraps these; they reach the caller
/// through [`ZieeError::Handler`] exactly as the handler produced them.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type used by user handlers.
pub type HandlerResult = std::result::Result<serde_json::Value, HandlerError>;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ZieeError>;

/// Discriminant of a [`ZieeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    ExecOnly,
    Unreadable,
    Unwritable,
    Unexecutable,
    AlreadyExists,
    InvalidArgument,
    StructuralChangeForbidden,
    Handler,
    Profile,
}

impl ErrorKind {
    /// Stable code string for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "_notfound_",
            ErrorKind::ExecOnly => "_exec_",
            ErrorKind::Unreadable => "_unreadable_",
            ErrorKind::Unwritable => "_unwritable_",
            ErrorKind::Unexecutable => "_unexecutable_",
            ErrorKind::AlreadyExists => "_exists_",
            ErrorKind::InvalidArgument => "_badarg_",
            ErrorKind::StructuralChangeForbidden => "_glued_",
            ErrorKind::Handler => "_handler_",
            ErrorKind::Profile => "_profile_",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors raised by [`Spec`](crate::Spec), [`Registry`](crate::Registry)
/// and profile loading.
#[derive(Debug, Error)]
pub enum ZieeError {
    /// A resource, spec or cluster is missing where one is required.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Read or write attempted on a resource that can only be executed.
    #[error("Resource {0} is executable only")]
    ExecOnly(String),

    /// Callback resource has no read handler.
    #[error("Resource {0} is unreadable")]
    Unreadable(String),

    /// Callback resource has no write handler.
    #[error("Resource {0} is unwritable")]
    Unwritable(String),

    /// Exec requested on a resource without an exec handler.
    #[error("Resource {0} is unexecutable")]
    Unexecutable(String),

    /// `create` on a (cluster, kind) pair that already exists.
    #[error("Spec {sid} of cluster {cid} already exists")]
    AlreadyExists { cid: String, sid: String },

    /// Malformed identifier, value, payload or argument list.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `create`/`init` after the registry has been glued to a host.
    #[error("Registry is glued to a host, cannot {0}")]
    StructuralChangeForbidden(String),

    /// Failure returned by a user handler, passed through untouched.
    #[error(transparent)]
    Handler(HandlerError),

    /// YAML parsing of a profile or directory table failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing of a profile or directory table failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error while loading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZieeError {
    /// The discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ZieeError::NotFound(_) => ErrorKind::NotFound,
            ZieeError::ExecOnly(_) => ErrorKind::ExecOnly,
            ZieeError::Unreadable(_) => ErrorKind::Unreadable,
            ZieeError::Unwritable(_) => ErrorKind::Unwritable,
            ZieeError::Unexecutable(_) => ErrorKind::Unexecutable,
            ZieeError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            ZieeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ZieeError::StructuralChangeForbidden(_) => ErrorKind::StructuralChangeForbidden,
            ZieeError::Handler(_) => ErrorKind::Handler,
            ZieeError::Yaml(_) | ZieeError::Json(_) | ZieeError::Io(_) => ErrorKind::Profile,
        }
    }

    /// Shorthand for `self.kind().code()`.
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ZieeError::InvalidArgument(message.into())
    }
}
