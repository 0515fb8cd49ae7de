//! Swap event parser
//!
//! Turns one raw ledger transaction into a [`TxRecord`], or nothing.
//! "Irrelevant" is a normal outcome here, never an error: non-user
//! transactions, transactions without SliSwap events, and malformed event
//! payloads all fall through silently.

use serde::Deserialize;

use crate::ledger::{u64_flex, RawTransaction};
use crate::state::TxRecord;

/// Payload of a SliSwap swap event
///
/// Defaults keep partially-populated payloads parseable; a leg with a
/// missing amount simply contributes zero.
#[derive(Debug, Default, Deserialize)]
struct SwapEventData {
    #[serde(default)]
    token_in: String,
    #[serde(default)]
    token_out: String,
    #[serde(default, deserialize_with = "u64_flex")]
    amount_in: u64,
    #[serde(default, deserialize_with = "u64_flex")]
    amount_out: u64,
}

/// Extract the tracked token's buy/sell legs from one transaction
///
/// A single transaction may carry several swap events (multi-hop routes);
/// legs sum independently per direction, so both totals can be nonzero.
pub fn parse_transaction(
    tx: &RawTransaction,
    contract_addr: &str,
    token_id: &str,
    decimal_scale: f64,
) -> Option<TxRecord> {
    if tx.tx_type != "user_transaction" {
        return None;
    }

    let mut buy_raw: u128 = 0;
    let mut sell_raw: u128 = 0;

    for event in &tx.events {
        if !event.event_type.contains(contract_addr) || !event.event_type.contains("SwapEvent") {
            continue;
        }

        let data: SwapEventData = match serde_json::from_value(event.data.clone()) {
            Ok(data) => data,
            Err(_) => continue,
        };

        if data.token_in.contains(token_id) {
            sell_raw += data.amount_in as u128;
        } else if data.token_out.contains(token_id) {
            buy_raw += data.amount_out as u128;
        }
    }

    if buy_raw == 0 && sell_raw == 0 {
        return None;
    }

    Some(TxRecord {
        hash: tx.hash.clone(),
        sender: tx.sender.clone(),
        buy_amount: buy_raw as f64 / decimal_scale,
        sell_amount: sell_raw as f64 / decimal_scale,
        timestamp: (tx.timestamp_micros / 1_000_000) as i64,
        version: tx.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RawEvent;
    use serde_json::json;

    const CONTRACT: &str = "SwapBAzMqRdX9RBXcaBnupiPmfmk1wDcLPPQiy1mehh";
    const TOKEN: &str = "ENDLESSsssssssssssssssssssssssssssssssssssss";
    const SCALE: f64 = 100_000_000.0; // 8 decimals

    fn swap_event(token_in: &str, token_out: &str, amount_in: &str, amount_out: &str) -> RawEvent {
        RawEvent {
            event_type: format!("{}::swap::SwapEvent", CONTRACT),
            data: json!({
                "token_in": token_in,
                "token_out": token_out,
                "amount_in": amount_in,
                "amount_out": amount_out,
            }),
        }
    }

    fn user_tx(version: u64, events: Vec<RawEvent>) -> RawTransaction {
        RawTransaction {
            tx_type: "user_transaction".to_string(),
            hash: "0xfeed".to_string(),
            sender: "trader1".to_string(),
            version,
            timestamp_micros: 1_700_000_000_000_000,
            events,
        }
    }

    #[test]
    fn test_two_leg_swap_sums_per_direction() {
        // Tracked token bought for 500 and sold for 200 in one transaction
        let tx = user_tx(
            42,
            vec![
                swap_event("USDT", TOKEN, "1000", "50000000000"),
                swap_event(TOKEN, "USDT", "20000000000", "1000"),
            ],
        );

        let record = parse_transaction(&tx, CONTRACT, TOKEN, SCALE).unwrap();
        assert_eq!(record.buy_amount, 500.0);
        assert_eq!(record.sell_amount, 200.0);
        assert_eq!(record.version, 42);
        assert_eq!(record.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_non_user_transaction_rejected() {
        let mut tx = user_tx(7, vec![swap_event("USDT", TOKEN, "1", "100000000")]);
        tx.tx_type = "block_metadata_transaction".to_string();

        assert!(parse_transaction(&tx, CONTRACT, TOKEN, SCALE).is_none());
    }

    #[test]
    fn test_unrelated_events_yield_nothing() {
        let mut tx = user_tx(8, Vec::new());
        tx.events = vec![
            // Right marker, wrong contract
            RawEvent {
                event_type: "0xother::swap::SwapEvent".to_string(),
                data: json!({"token_in": TOKEN, "amount_in": "100000000"}),
            },
            // Right contract, not a swap
            RawEvent {
                event_type: format!("{}::pool::DepositEvent", CONTRACT),
                data: json!({"token_in": TOKEN, "amount_in": "100000000"}),
            },
        ];

        assert!(parse_transaction(&tx, CONTRACT, TOKEN, SCALE).is_none());
    }

    #[test]
    fn test_swap_not_touching_tracked_token_yields_nothing() {
        let tx = user_tx(9, vec![swap_event("USDT", "USDC", "1000", "990")]);
        assert!(parse_transaction(&tx, CONTRACT, TOKEN, SCALE).is_none());
    }

    #[test]
    fn test_malformed_event_data_ignored() {
        let mut tx = user_tx(10, vec![swap_event("USDT", TOKEN, "1000", "100000000")]);
        tx.events.push(RawEvent {
            event_type: format!("{}::swap::SwapEvent", CONTRACT),
            data: json!("not an object"),
        });

        // The broken event contributes nothing; the good one still counts
        let record = parse_transaction(&tx, CONTRACT, TOKEN, SCALE).unwrap();
        assert_eq!(record.buy_amount, 1.0);
        assert_eq!(record.sell_amount, 0.0);
    }

    #[test]
    fn test_repeated_legs_accumulate() {
        let tx = user_tx(
            11,
            vec![
                swap_event("USDT", TOKEN, "1", "100000000"),
                swap_event("USDC", TOKEN, "1", "200000000"),
            ],
        );

        let record = parse_transaction(&tx, CONTRACT, TOKEN, SCALE).unwrap();
        assert_eq!(record.buy_amount, 3.0);
    }
}
