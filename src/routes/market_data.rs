//! # Market Data Bundle Handler
//!
//! Single Axum handler for `GET /dados`: estimated implied volatility for
//! the two hardcoded index symbols plus the cached daily settlement for the
//! two hardcoded futures codes.
//!
//! Every failure class collapses to an absent field here; the endpoint
//! always answers `200 OK`. Failure causes are logged before collapsing.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::state::AppState;
use crate::upstream::futures::{settlement_price, SettlementPrice};
use crate::upstream::options::implied_volatility;

/// Index symbols as the options-chain provider knows them.
const NDX_SYMBOL: &str = "^NDX";
const SPX_SYMBOL: &str = "^GSPC";

//
// ----------- Data Structures -----------
//

#[derive(Debug, Serialize)]
pub struct VolatilityEntry {
    #[serde(rename = "volatilidade_implícita_estim")]
    pub implied_volatility: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SettlementEntry {
    #[serde(rename = "ajuste_diário")]
    pub daily_settlement: SettlementPrice,
}

#[derive(Debug, Serialize)]
pub struct SpotSection {
    #[serde(rename = "NDX")]
    pub ndx: VolatilityEntry,
    #[serde(rename = "SPX")]
    pub spx: VolatilityEntry,
}

#[derive(Debug, Serialize)]
pub struct FuturesSection {
    #[serde(rename = "NQ")]
    pub nq: SettlementEntry,
    #[serde(rename = "ES")]
    pub es: SettlementEntry,
}

#[derive(Debug, Serialize)]
pub struct MarketDataResponse {
    pub ativos_spot: SpotSection,
    pub futuros_cme: FuturesSection,
}

//
// ----------- Handlers and Logic -----------
//

#[instrument(skip(state))]
pub async fn get_market_data(State(state): State<AppState>) -> Json<MarketDataResponse> {
    info!("Assembling market data bundle.");

    let ndx = fetch_volatility(&state, NDX_SYMBOL).await;
    let spx = fetch_volatility(&state, SPX_SYMBOL).await;
    let nq = cached_settlement(&state, "NQ").await;
    let es = cached_settlement(&state, "ES").await;

    Json(MarketDataResponse {
        ativos_spot: SpotSection {
            ndx: VolatilityEntry {
                implied_volatility: ndx,
            },
            spx: VolatilityEntry {
                implied_volatility: spx,
            },
        },
        futuros_cme: FuturesSection {
            nq: SettlementEntry {
                daily_settlement: nq,
            },
            es: SettlementEntry {
                daily_settlement: es,
            },
        },
    })
}

/// Volatility goes to the provider on every request, uncached by design.
pub(crate) async fn fetch_volatility(state: &AppState, symbol: &str) -> Option<f64> {
    match implied_volatility(&state.http, &state.config, symbol).await {
        Ok(value) => value,
        Err(error) => {
            warn!(symbol = %symbol, error = %error, "Implied volatility fetch failed");
            None
        }
    }
}

/// Settlement lookups are memoized for the configured TTL. A failed fetch
/// is not cached, so the next request retries the upstream immediately.
pub(crate) async fn cached_settlement(state: &AppState, product_code: &str) -> SettlementPrice {
    let result = state
        .settlement_cache
        .get_or_fetch(product_code, || {
            settlement_price(&state.http, &state.config, product_code)
        })
        .await;

    match result {
        Ok(value) => value,
        Err(error) => {
            warn!(product_code = %product_code, error = %error, "Settlement fetch failed");
            SettlementPrice::Absent
        }
    }
}
