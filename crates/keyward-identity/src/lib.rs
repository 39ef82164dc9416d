pub mod guard;
pub mod policy;

pub use guard::{
    ADMIN_IDENTITY, authenticate, bootstrap, change_credential, logout, validate_session,
};
pub use policy::{MAX_FAILED_ATTEMPTS, MIN_PASSWORD_LEN, check_strength, lockout_duration};
