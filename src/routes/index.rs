use std::collections::BTreeMap;

use axum::Json;
use serde::{Deserialize, Serialize};

/// Capability listing returned at the root. For humans; no upstream calls.
#[derive(Serialize, Deserialize)]
pub struct IndexResponse {
    pub mensagem: String,
    pub endpoints: BTreeMap<String, String>,
}

pub async fn index() -> Json<IndexResponse> {
    let mut endpoints = BTreeMap::new();
    endpoints.insert(
        "/dados".to_owned(),
        "Volatilidade implícita estimada (NDX, SPX) e ajuste diário oficial CME (NQ, ES)."
            .to_owned(),
    );
    endpoints.insert(
        "/ativos/{codigo}".to_owned(),
        "Ajuste diário para NQ, ES, YM e RTY; volatilidade implícita para outros códigos."
            .to_owned(),
    );

    Json(IndexResponse {
        mensagem: "API Mercado Financeiro".to_owned(),
        endpoints,
    })
}
