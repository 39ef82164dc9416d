use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeywardError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("activation code not found")]
    UnknownCode,

    #[error("activation code already exists")]
    DuplicateCode,

    #[error("code is already bound to another device")]
    DeviceConflict,

    #[error("invalid credential")]
    InvalidCredential,

    #[error("account locked, try again in {minutes_left} minutes")]
    AccountLocked { minutes_left: i64 },

    #[error("new password must differ from the current password")]
    SamePassword,

    #[error("weak credential: {0}")]
    WeakCredential(String),

    #[error("session expired")]
    SessionExpired,

    #[error("internal error: {0}")]
    InternalError(String),
}

pub type KeywardResult<T> = Result<T, KeywardError>;
