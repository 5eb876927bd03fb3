use serde::Deserialize;

fn default_options_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_futures_base_url() -> String {
    "https://www.cmegroup.com/market-data".to_string()
}

fn default_settlement_ttl_hours() -> i64 {
    24
}

fn default_app_server_port() -> u16 {
    8080
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_options_base_url")]
    pub options_base_url: String,
    #[serde(default = "default_futures_base_url")]
    pub futures_base_url: String,
    #[serde(default = "default_settlement_ttl_hours")]
    pub settlement_ttl_hours: i64,
    #[serde(default = "default_app_server_port")]
    pub app_server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        let config = envy::from_env::<AppConfig>()?;

        if config.options_base_url.trim().is_empty() {
            return Err(envy::Error::Custom(
                "OPTIONS_BASE_URL cannot be empty.".to_string(),
            ));
        }

        if config.futures_base_url.trim().is_empty() {
            return Err(envy::Error::Custom(
                "FUTURES_BASE_URL cannot be empty.".to_string(),
            ));
        }

        if config.settlement_ttl_hours <= 0 {
            return Err(envy::Error::Custom(
                "SETTLEMENT_TTL_HOURS must be positive.".to_string(),
            ));
        }

        Ok(config)
    }
}
