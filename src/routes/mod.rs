use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use asset::get_asset;
use index::index;
use market_data::get_market_data;

pub mod asset;
pub mod index;
pub mod market_data;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/dados", get(get_market_data))
        .route("/ativos/{codigo}", get(get_asset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
