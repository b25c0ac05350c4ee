use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    count_url_handler, create_url_handler, delete_url_handler, get_url_handler, health_handler,
};
use crate::middleware::rate_limit;
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        let limiter = state.limiter().cloned();

        let router = Router::new()
            .route("/health", get(health_handler))
            .route("/shorten", post(create_url_handler))
            .route(
                "/shorten/{code}",
                get(get_url_handler).delete(delete_url_handler),
            )
            .route("/shorten/{code}/count", get(count_url_handler))
            .with_state(state);

        let router = match limiter {
            Some(limiter) => {
                router.layer(axum::middleware::from_fn_with_state(limiter, rate_limit))
            }
            None => router,
        };

        router.layer(TraceLayer::new_for_http())
    }
}
