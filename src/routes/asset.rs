//! Single-asset lookup: `GET /ativos/{codigo}`.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::instrument;

use crate::routes::market_data::{cached_settlement, fetch_volatility};
use crate::state::AppState;

/// Futures codes served from the settlement path.
const FUTURES_CODES: [&str; 4] = ["NQ", "ES", "YM", "RTY"];

/// Dispatches on the futures allow-list (case-insensitive, uppercased as
/// cache key and response key). Any other code is treated as a volatility
/// lookup symbol and echoed back as given; unrecognized symbols surface as
/// absent rather than an error.
#[instrument(skip(state))]
pub async fn get_asset(State(state): State<AppState>, Path(codigo): Path<String>) -> Json<Value> {
    let code = codigo.to_uppercase();

    let mut body = Map::new();
    if FUTURES_CODES.contains(&code.as_str()) {
        let price = cached_settlement(&state, &code).await;
        body.insert(code, json!({ "ajuste_diário": price }));
    } else {
        let volatility = fetch_volatility(&state, &codigo).await;
        body.insert(codigo, json!({ "volatilidade_implícita_estim": volatility }));
    }

    Json(Value::Object(body))
}
