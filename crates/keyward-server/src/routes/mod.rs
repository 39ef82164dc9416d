pub mod activation;
pub mod admin;
pub mod codes;
pub mod health;

use axum::Extension;

use crate::auth::Sessions;
use crate::state::AppState;
use keyward_core::traits::*;

pub fn build_router<C, A, S>(state: AppState<C, A, S>) -> axum::Router
where
    C: CodeStore + Clone,
    A: AdminStore + Clone,
    S: SessionStore + Clone,
{
    let sessions = Sessions(state.session_store.clone());

    axum::Router::new()
        // Health
        .route("/health", axum::routing::get(health::health_check::<C, A, S>))
        // Device-facing activation
        .route(
            "/api/activate",
            axum::routing::post(activation::activate::<C, A, S>),
        )
        // Admin session lifecycle
        .route(
            "/api/admin/login",
            axum::routing::post(admin::login::<C, A, S>),
        )
        .route(
            "/api/admin/logout",
            axum::routing::post(admin::logout::<C, A, S>),
        )
        .route(
            "/api/admin/session",
            axum::routing::get(admin::get_session::<C, A, S>),
        )
        .route(
            "/api/admin/change-password",
            axum::routing::post(admin::change_password::<C, A, S>),
        )
        .route(
            "/api/admin/stats",
            axum::routing::get(admin::stats::<C, A, S>),
        )
        // Code management
        .route(
            "/api/admin/codes",
            axum::routing::get(codes::list_codes::<C, A, S>)
                .post(codes::add_code::<C, A, S>),
        )
        .route(
            "/api/admin/codes/{code}",
            axum::routing::get(codes::get_code::<C, A, S>)
                .delete(codes::delete_code::<C, A, S>),
        )
        // Fallback: the embedded admin panel owns every unclaimed path.
        .fallback(crate::admin_ui::admin_ui_handler)
        .layer(Extension(sessions))
        // CORS: the activation endpoint is called from arbitrary origins.
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
                .expose_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        // Request body size limit: activation and admin payloads are tiny.
        .layer(tower_http::limit::RequestBodyLimitLayer::new(64 * 1024))
        .with_state(state)
}
