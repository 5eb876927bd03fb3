//! # Implied Volatility Fetcher
//!
//! Estimates implied volatility for an index symbol from the options-chain
//! provider: the call chain for the nearest expiry is retrieved and the
//! mean of its implied-volatility column is reported, rounded to 4 decimals.
//!
//! Results are not cached; every request goes to the provider.

use crate::config::AppConfig;
use axum::http::HeaderValue;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

//
// ----------- Data Structures -----------
//

/// Raw envelope returned by the options-chain provider.
#[derive(Debug, Deserialize)]
pub struct OptionChainEnvelope {
    #[serde(rename = "optionChain")]
    pub option_chain: OptionChainBody,
}

#[derive(Debug, Deserialize)]
pub struct OptionChainBody {
    #[serde(default)]
    pub result: Vec<OptionChainResult>,
}

/// Per-symbol chain data: available expiries plus the quote sets for the
/// requested expiry.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChainResult {
    #[serde(default)]
    pub expiration_dates: Vec<i64>,
    #[serde(default)]
    pub options: Vec<OptionQuoteSet>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OptionQuoteSet {
    #[serde(default)]
    pub calls: Vec<CallOption>,
}

/// A single call-option row. The provider omits the implied-volatility
/// field for illiquid strikes, so it is optional per row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOption {
    #[serde(default)]
    pub implied_volatility: Option<f64>,
}

//
// ----------- Fetching and Logic -----------
//

/// Estimated implied volatility for `symbol`, or `None` when the provider
/// reports no expiries or no usable implied-volatility figures.
///
/// Transport and decode failures surface as `Err`; the caller decides how
/// to collapse them at the API boundary.
pub async fn implied_volatility(
    client: &reqwest::Client,
    config: &AppConfig,
    symbol: &str,
) -> Result<Option<f64>, reqwest::Error> {
    let chain = fetch_chain(client, config, symbol, None).await?;

    let Some(nearest_expiry) = chain.expiration_dates.first().copied() else {
        debug!(symbol = %symbol, "no option expiries available");
        return Ok(None);
    };

    let chain = fetch_chain(client, config, symbol, Some(nearest_expiry)).await?;
    let calls = chain
        .options
        .into_iter()
        .next()
        .map(|set| set.calls)
        .unwrap_or_default();

    Ok(average_implied_volatility(&calls))
}

/// Fetch the option chain for `symbol`, optionally pinned to one expiry.
async fn fetch_chain(
    client: &reqwest::Client,
    config: &AppConfig,
    symbol: &str,
    expiry: Option<i64>,
) -> Result<OptionChainResult, reqwest::Error> {
    let mut request_url = format!(
        "{}/v7/finance/options?symbol={}",
        config.options_base_url, symbol
    );
    if let Some(expiry) = expiry {
        request_url.push_str(&format!("&date={expiry}"));
    }

    let response = client
        .get(request_url)
        .header(ACCEPT, HeaderValue::from_static("application/json"))
        .send()
        .await?
        .error_for_status()?
        .json::<OptionChainEnvelope>()
        .await?;

    Ok(response
        .option_chain
        .result
        .into_iter()
        .next()
        .unwrap_or_default())
}

/// Arithmetic mean of the implied-volatility column, rounded to 4 decimal
/// places. Rows without the field are skipped; no usable rows yields `None`.
pub fn average_implied_volatility(calls: &[CallOption]) -> Option<f64> {
    let values: Vec<f64> = calls
        .iter()
        .filter_map(|call| call.implied_volatility)
        .collect();

    if values.is_empty() {
        return None;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(round_to_4_decimals(mean))
}

fn round_to_4_decimals(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

//
// ----------- Tests -----------
//
