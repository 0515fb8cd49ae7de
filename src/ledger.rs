//! Ledger RPC facade
//!
//! Thin typed client over the Endless fullnode REST API. The rest of the
//! crate only sees the [`LedgerClient`] trait, so tests drive the sync engine
//! with a scripted in-memory ledger instead of a network.
//!
//! The ledger encodes u64 fields (versions, timestamps, amounts) as JSON
//! strings; the deserializers here accept either form.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

use crate::error::LedgerError;

/// Chain tip information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerInfo {
    #[serde(deserialize_with = "u64_flex")]
    pub ledger_version: u64,
}

/// One raw transaction as returned by the ledger
///
/// Only the fields the monitor inspects are modeled; everything else in the
/// response body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(rename = "type")]
    pub tx_type: String,

    #[serde(default)]
    pub hash: String,

    #[serde(default)]
    pub sender: String,

    #[serde(default, deserialize_with = "u64_flex")]
    pub version: u64,

    /// Microseconds since epoch
    #[serde(default, rename = "timestamp", deserialize_with = "u64_flex")]
    pub timestamp_micros: u64,

    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// One event attached to a transaction
///
/// `data` stays untyped here; the parser decides per event whether the
/// payload is a swap it cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default, rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub data: serde_json::Value,
}

/// Accept a u64 encoded either as a JSON number or a decimal string
pub(crate) fn u64_flex<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flex {
        Num(u64),
        Str(String),
    }

    match Flex::deserialize(deserializer)? {
        Flex::Num(n) => Ok(n),
        Flex::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Opaque ledger access used by the sync engine and the trace tool
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current chain tip
    async fn get_ledger_info(&self) -> Result<LedgerInfo, LedgerError>;

    /// Up to `limit` transactions starting at version `offset`
    ///
    /// `None` asks the node for its most recent transactions.
    async fn get_transactions(
        &self,
        offset: Option<u64>,
        limit: u16,
    ) -> Result<Vec<RawTransaction>, LedgerError>;
}

/// HTTP implementation over the fullnode REST endpoint
pub struct HttpLedgerClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLedgerClient {
    pub fn new(base_url: &str) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn get_ledger_info(&self) -> Result<LedgerInfo, LedgerError> {
        let response = self.client.get(&self.base_url).send().await?;

        if !response.status().is_success() {
            return Err(LedgerError::Status {
                status: response.status(),
                endpoint: "ledger info".to_string(),
            });
        }

        Ok(response.json().await?)
    }

    async fn get_transactions(
        &self,
        offset: Option<u64>,
        limit: u16,
    ) -> Result<Vec<RawTransaction>, LedgerError> {
        let url = format!("{}/transactions", self.base_url);

        let mut request = self.client.get(&url).query(&[("limit", limit.to_string())]);
        if let Some(start) = offset {
            request = request.query(&[("start", start.to_string())]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(LedgerError::Status {
                status: response.status(),
                endpoint: "transactions".to_string(),
            });
        }

        Ok(response.json().await?)
    }
}
