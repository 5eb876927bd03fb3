//! # Daily Settlement Fetcher
//!
//! Retrieves the official daily settlement price for a futures product from
//! the market-data provider. Resolution is two-step: the front-month
//! contract is looked up first, then the quotes for that contract.
//!
//! Lookups are memoized through [`crate::cache::expiring::ExpiringCache`],
//! keyed by uppercase product code.

use crate::config::AppConfig;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use tracing::debug;

//
// ----------- Data Structures -----------
//

/// Settlement value as surfaced by the API. The exchange publishes a text
/// field that is usually numeric but can hold markers such as `"N/A"`;
/// those pass through unconverted rather than being dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementPrice {
    Numeric(f64),
    Raw(String),
    Absent,
}

impl Serialize for SettlementPrice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SettlementPrice::Numeric(value) => serializer.serialize_f64(*value),
            SettlementPrice::Raw(text) => serializer.serialize_str(text),
            SettlementPrice::Absent => serializer.serialize_none(),
        }
    }
}

/// Front-month resolution response.
#[derive(Debug, Deserialize)]
struct FrontMonthResponse {
    contract: Option<String>,
}

/// Quotes response for a resolved contract.
#[derive(Debug, Deserialize)]
struct QuotesResponse {
    #[serde(default)]
    quotes: Vec<FuturesQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuturesQuote {
    #[serde(default)]
    last_settlement: Option<String>,
}

//
// ----------- Fetching and Logic -----------
//

/// Daily settlement price for `product_code`.
///
/// Returns `Absent` when the front-month contract cannot be resolved, the
/// quote list is empty, or the settlement field is missing; in the first
/// case the quotes call is not attempted. Transport and decode failures
/// surface as `Err` so the cache layer can skip storing them.
pub async fn settlement_price(
    client: &reqwest::Client,
    config: &AppConfig,
    product_code: &str,
) -> Result<SettlementPrice, reqwest::Error> {
    let Some(contract) = front_month_contract(client, config, product_code).await? else {
        debug!(product_code = %product_code, "no front-month contract resolved");
        return Ok(SettlementPrice::Absent);
    };

    let request_url = format!(
        "{}/quotes?code={}&contract={}",
        config.futures_base_url, product_code, contract
    );
    let response = client
        .get(request_url)
        .send()
        .await?
        .error_for_status()?
        .json::<QuotesResponse>()
        .await?;

    match response
        .quotes
        .into_iter()
        .next()
        .and_then(|quote| quote.last_settlement)
    {
        Some(raw) => Ok(parse_settlement(&raw)),
        None => {
            debug!(
                product_code = %product_code,
                contract = %contract,
                "no settlement field in quotes"
            );
            Ok(SettlementPrice::Absent)
        }
    }
}

/// Resolve the currently active contract identifier for `product_code`.
async fn front_month_contract(
    client: &reqwest::Client,
    config: &AppConfig,
    product_code: &str,
) -> Result<Option<String>, reqwest::Error> {
    let request_url = format!(
        "{}/front-month?code={}",
        config.futures_base_url, product_code
    );
    let response = client
        .get(request_url)
        .send()
        .await?
        .error_for_status()?
        .json::<FrontMonthResponse>()
        .await?;

    Ok(response.contract.filter(|id| !id.trim().is_empty()))
}

/// Convert the published settlement text to a number. The feed uses
/// thousands separators ("21,412.25"); anything that still fails to parse
/// passes through as the original text.
pub fn parse_settlement(raw: &str) -> SettlementPrice {
    match raw.replace(',', "").parse::<f64>() {
        Ok(value) => SettlementPrice::Numeric(value),
        Err(_) => SettlementPrice::Raw(raw.to_string()),
    }
}

//
// ----------- Tests -----------
//
