use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found")]
    NotFound,

    /// Returned to non-owners and for missing tags alike so ownership cannot be inferred.
    #[error("tag not found or not owned by caller")]
    NotFoundOrNotOwned,

    #[error("tag is already claimed")]
    AlreadyClaimed,

    #[error("tag or module is already bound")]
    AlreadyBound,

    #[error("already exists")]
    AlreadyExists,

    #[error("token lookup collision")]
    TokenLookupCollision,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("forbidden")]
    Forbidden,

    #[error("wrong password")]
    WrongPassword,

    #[error("invalid token format")]
    InvalidTokenFormat,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
