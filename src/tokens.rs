//! Token catalog from the Neura analytics subgraph

use alloy::primitives::Address;
use async_trait::async_trait;
use eyre::Result;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{symbols, CATALOG_TIMEOUT_SECS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    /// True for the synthetic entry that stands for the native asset
    pub fn is_native(&self) -> bool {
        self.symbol == symbols::NATIVE
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Source of swappable tokens
#[async_trait]
pub trait TokenCatalog: Send + Sync {
    async fn fetch_tokens(&self) -> Result<Vec<Token>>;
}

const ALL_TOKENS_QUERY: &str = "query AllTokens { tokens { id symbol name decimals } }";

#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<TokensData>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TokensData {
    tokens: Vec<RawToken>,
}

/// One catalog row as the subgraph returns it
#[derive(Debug, Clone, Deserialize)]
pub struct RawToken {
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub decimals: StringOrNumber,
}

/// Subgraphs return BigInt fields as strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrNumber {
    Number(u64),
    String(String),
}

impl StringOrNumber {
    fn as_u8(&self) -> Option<u8> {
        match self {
            StringOrNumber::Number(n) => u8::try_from(*n).ok(),
            StringOrNumber::String(s) => s.trim().parse().ok(),
        }
    }
}

pub struct SubgraphCatalog {
    client: Client,
    endpoint: String,
}

impl SubgraphCatalog {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(CATALOG_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl TokenCatalog for SubgraphCatalog {
    async fn fetch_tokens(&self) -> Result<Vec<Token>> {
        info!("Fetching swappable tokens...");

        let body = serde_json::json!({
            "operationName": "AllTokens",
            "variables": {},
            "query": ALL_TOKENS_QUERY,
        });

        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;

        tracing::debug!("Catalog status: {}, body length: {}", status, text.len());

        if !status.is_success() {
            return Err(eyre::eyre!("Token catalog error: {} - {}", status, text));
        }

        let parsed: GraphResponse = serde_json::from_str(&text)
            .map_err(|e| eyre::eyre!("Failed to parse token catalog: {}. Body: {}", e, text))?;

        let data = match parsed.data {
            Some(data) => data,
            None => {
                return Err(eyre::eyre!(
                    "Token catalog returned no data: {}",
                    parsed.errors.unwrap_or_default()
                ))
            }
        };

        let tokens = build_catalog(data.tokens);
        info!("Found {} unique swappable tokens", tokens.len());
        Ok(tokens)
    }
}

/// Clean up raw catalog rows.
///
/// Symbols are uppercased and the first row per symbol wins. Rows with an
/// empty or spaced symbol, or an unusable address or decimals, are dropped.
/// A `WANKR` row also yields the native `ANKR` alias. Sorted by symbol.
pub fn build_catalog(raw: Vec<RawToken>) -> Vec<Token> {
    let mut unique: BTreeMap<String, Token> = BTreeMap::new();

    for row in raw {
        let symbol = match row.symbol.as_deref() {
            Some(s) if !s.is_empty() && !s.contains(' ') => s.to_uppercase(),
            _ => continue,
        };
        if unique.contains_key(&symbol) {
            continue;
        }

        let address = match Address::from_str(row.id.trim()) {
            Ok(address) => address,
            Err(_) => {
                warn!(symbol = %symbol, id = %row.id, "Skipping token with bad address");
                continue;
            }
        };
        let decimals = match row.decimals.as_u8() {
            Some(decimals) => decimals,
            None => {
                warn!(symbol = %symbol, decimals = ?row.decimals, "Skipping token with bad decimals");
                continue;
            }
        };

        unique.insert(
            symbol.clone(),
            Token {
                address,
                symbol,
                decimals,
            },
        );
    }

    if let Some(wrapped) = unique.get(symbols::WRAPPED_NATIVE).cloned() {
        unique.insert(
            symbols::NATIVE.to_string(),
            Token {
                symbol: symbols::NATIVE.to_string(),
                ..wrapped
            },
        );
    }

    unique.into_values().collect()
}

/// Case-insensitive lookup by symbol
pub fn find_token<'a>(tokens: &'a [Token], symbol: &str) -> Option<&'a Token> {
    let wanted = symbol.trim().to_uppercase();
    tokens.iter().find(|t| t.symbol == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn raw(id: &str, symbol: Option<&str>, decimals: &str) -> RawToken {
        RawToken {
            id: id.to_string(),
            symbol: symbol.map(str::to_string),
            name: None,
            decimals: StringOrNumber::String(decimals.to_string()),
        }
    }

    const WANKR_ID: &str = "0xbd833b6ecc30caeabf81db18bb0f1e00c6997e7a";
    const USDT_ID: &str = "0x1111111111111111111111111111111111111111";
    const USDT_DUP_ID: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn test_case_duplicates_collapse_first_wins() {
        let tokens = build_catalog(vec![
            raw(USDT_ID, Some("usdt"), "6"),
            raw(USDT_DUP_ID, Some("USDT"), "18"),
        ]);

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].symbol, "USDT");
        assert_eq!(tokens[0].address, address!("1111111111111111111111111111111111111111"));
        assert_eq!(tokens[0].decimals, 6);
    }

    #[test]
    fn test_spaced_and_empty_symbols_dropped() {
        let tokens = build_catalog(vec![
            raw(USDT_ID, Some("LP TOKEN"), "18"),
            raw(USDT_DUP_ID, Some(""), "18"),
            raw(WANKR_ID, None, "18"),
        ]);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_native_alias_synthesized() {
        let tokens = build_catalog(vec![
            raw(USDT_ID, Some("USDT"), "6"),
            raw(WANKR_ID, Some("WANKR"), "18"),
        ]);

        let symbols: Vec<&str> = tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ANKR", "USDT", "WANKR"]);

        let ankr = find_token(&tokens, "ankr").unwrap();
        let wankr = find_token(&tokens, "WANKR").unwrap();
        assert!(ankr.is_native());
        assert!(!wankr.is_native());
        assert_eq!(ankr.address, wankr.address);
        assert_eq!(ankr.decimals, wankr.decimals);
    }

    #[test]
    fn test_no_alias_without_wrapped_native() {
        let tokens = build_catalog(vec![raw(USDT_ID, Some("USDT"), "6")]);
        assert!(find_token(&tokens, "ANKR").is_none());
    }

    #[test]
    fn test_bad_rows_skipped() {
        let tokens = build_catalog(vec![
            raw("not-an-address", Some("BAD"), "18"),
            raw(USDT_ID, Some("HUGE"), "1000"),
            raw(USDT_DUP_ID, Some("OK"), "8"),
        ]);

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].symbol, "OK");
    }

    #[test]
    fn test_decimals_accept_numbers() {
        let parsed: RawToken =
            serde_json::from_str(r#"{"id":"0x1111111111111111111111111111111111111111","symbol":"X","name":"X","decimals":6}"#)
                .unwrap();
        assert_eq!(parsed.decimals.as_u8(), Some(6));

        let parsed: RawToken =
            serde_json::from_str(r#"{"id":"0x1111111111111111111111111111111111111111","symbol":"X","name":"X","decimals":"18"}"#)
                .unwrap();
        assert_eq!(parsed.decimals.as_u8(), Some(18));
    }
}
