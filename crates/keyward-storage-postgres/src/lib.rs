pub mod admin;
pub mod code;
pub mod session;

pub use admin::PostgresAdminStore;
pub use code::PostgresCodeStore;
pub use session::PostgresSessionStore;
