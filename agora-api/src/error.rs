/// Errors a server can answer with over the tagged-message stream.
///
/// These route through the dispatcher like any other inbound message. Most
/// are per-widget transient notices; `NotAuthenticated` is cross-cutting and
/// must force a logout wherever it is seen.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize, thiserror::Error)]
pub enum Error {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Rate limited")]
    RateLimited,

    #[error("Not found")]
    NotFound,

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Content must not be empty")]
    EmptyContent,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotAuthenticated => "not-authenticated",
            Error::PermissionDenied => "permission-denied",
            Error::RateLimited => "rate-limited",
            Error::NotFound => "not-found",
            Error::NullByteInString(_) => "null-byte",
            Error::EmptyContent => "empty-content",
            Error::Unknown(_) => "unknown",
        }
    }
}
