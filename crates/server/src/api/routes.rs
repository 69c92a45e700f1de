use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{audit, fuel, handlers, mailbox, middleware::metrics_middleware, vouchers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Audit
        .route("/audit", get(audit::query_audit))
        // Fuel prices
        .route("/fuel-prices", get(fuel::list_prices))
        // Voucher acquisition
        .route("/vouchers", post(vouchers::acquire_voucher))
        // Mailbox inspection
        .route("/mailbox/{email}/messages", get(mailbox::list_messages))
        .route("/mailbox/{email}/messages/{id}", get(mailbox::read_message))
        .route(
            "/mailbox/{email}/verification-link",
            post(mailbox::click_verification_link),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
