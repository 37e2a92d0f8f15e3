//! Canonicalization of external transaction payloads.
//!
//! Two input shapes are accepted:
//! - canonical: `{transaction: {accountUpdates: [...]}}` or `{accountUpdates: [...]}`,
//!   whose elements already decode as [`OperationRecord`]
//! - block-explorer responses carrying `updatedAccounts` and `failures`
//!
//! Canonicalization never fails. Missing or non-list collections produce an
//! empty operation list.

pub mod explorer;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::config::AnalysisConfig;
use crate::model::OperationRecord;

/// Transaction-level facts carried next to the operation list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Fee as reported by the source, unparsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    /// Declared initiator of the transaction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_payer_address: Option<String>,
    #[serde(default)]
    pub memo: String,
}

/// A transaction in the shape the analysis engines expect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTransaction {
    pub account_updates: Vec<OperationRecord>,
    pub meta: TransactionMeta,
}

impl CanonicalTransaction {
    pub fn is_empty(&self) -> bool {
        self.account_updates.is_empty()
    }
}

/// Convert `raw` into a [`CanonicalTransaction`].
pub fn canonicalize(raw: &Json, cfg: &AnalysisConfig) -> CanonicalTransaction {
    if let Some(list) = canonical_list(raw) {
        let account_updates = list
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                match serde_json::from_value::<OperationRecord>(item.clone()) {
                    Ok(op) => Some(op),
                    Err(e) => {
                        tracing::debug!(index, error = %e, "skipping undecodable account update");
                        None
                    }
                }
            })
            .collect();
        return CanonicalTransaction {
            account_updates,
            meta: canonical_meta(raw),
        };
    }

    let tx = explorer::canonicalize_explorer(raw, cfg);
    tracing::debug!(
        account_updates = tx.account_updates.len(),
        tx_hash = ?tx.meta.tx_hash,
        "canonicalized explorer transaction"
    );
    tx
}

fn canonical_list(raw: &Json) -> Option<&Vec<Json>> {
    raw.pointer("/transaction/accountUpdates")
        .or_else(|| raw.get("accountUpdates"))
        .and_then(Json::as_array)
}

fn canonical_meta(raw: &Json) -> TransactionMeta {
    let tx = raw.get("transaction").unwrap_or(raw);
    TransactionMeta {
        tx_hash: string_field(tx, "hash").or_else(|| string_field(raw, "txHash")),
        status: string_field(tx, "status"),
        block_height: tx.get("blockHeight").and_then(Json::as_u64),
        timestamp: tx.get("timestamp").and_then(Json::as_i64),
        fee: tx.get("fee").and_then(scalar_text),
        fee_payer_address: string_field(tx, "feePayerAddress").or_else(|| {
            tx.pointer("/feePayer/body/publicKey")
                .and_then(Json::as_str)
                .map(str::to_string)
        }),
        memo: string_field(tx, "memo").unwrap_or_default(),
    }
}

pub(crate) fn string_field(raw: &Json, key: &str) -> Option<String> {
    raw.get(key).and_then(Json::as_str).map(str::to_string)
}

/// Render a string or number as text.
pub(crate) fn scalar_text(raw: &Json) -> Option<String> {
    match raw {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_input_decodes_records() {
        let raw = json!({
            "transaction": {
                "hash": "5Jabc",
                "memo": "hello",
                "accountUpdates": [
                    {"id": "1", "label": "Token.mint()", "callDepth": 1},
                    {"id": 2}
                ]
            }
        });
        let tx = canonicalize(&raw, &AnalysisConfig::default());
        assert_eq!(tx.account_updates.len(), 2);
        assert_eq!(tx.account_updates[0].call_depth, 1);
        assert_eq!(tx.account_updates[1].id, "2");
        assert_eq!(tx.meta.tx_hash.as_deref(), Some("5Jabc"));
        assert_eq!(tx.meta.memo, "hello");
    }

    #[test]
    fn test_undecodable_records_are_skipped() {
        let raw = json!({"accountUpdates": [{"id": "a"}, {"label": "no id"}, 7]});
        let tx = canonicalize(&raw, &AnalysisConfig::default());
        assert_eq!(tx.account_updates.len(), 1);
    }

    #[test]
    fn test_fee_payer_read_from_transaction_body() {
        let raw = json!({"transaction": {
            "feePayer": {"body": {"publicKey": "B62qfee"}},
            "accountUpdates": []
        }});
        let tx = canonicalize(&raw, &AnalysisConfig::default());
        assert!(tx.is_empty());
        assert_eq!(tx.meta.fee_payer_address.as_deref(), Some("B62qfee"));
    }

    #[test]
    fn test_malformed_input_is_empty() {
        for raw in [json!(null), json!(42), json!({"accountUpdates": "x"}), json!({})] {
            let tx = canonicalize(&raw, &AnalysisConfig::default());
            assert!(tx.account_updates.is_empty(), "input {} was not empty", raw);
        }
    }
}
