pub mod admin_ui;
pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::{AdminSession, Sessions};
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
