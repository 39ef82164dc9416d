pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::KeywardConfig;
pub use error::{KeywardError, KeywardResult};
pub use traits::{AdminStore, CodeStore, SessionStore};
pub use types::{ActivationCode, AdminIdentity, BindingRecord, CodeTotals, Session};
