pub mod admin_store;
pub mod code_store;
pub mod session_store;

pub use admin_store::AdminStore;
pub use code_store::CodeStore;
pub use session_store::SessionStore;
