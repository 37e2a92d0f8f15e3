//! Block-explorer transaction responses.
//!
//! Expected fields: `txHash`, `txStatus`, `blockHeight`, `timestamp`, `fee`,
//! `feePayerAddress`, `memo`, `updatedAccounts[]` and `failures[]`. Each
//! `updatedAccounts` entry carries `accountAddress`, `callDepth`, `tokenId`,
//! `totalBalanceChange`, `callData`, `isZkappAccount`, `incrementNonce`,
//! `verificationKeyHash` and an `update` record.

use serde_json::{json, Map, Value as Json};
use std::collections::BTreeMap;

use crate::adapter::{scalar_text, string_field, CanonicalTransaction, TransactionMeta};
use crate::config::AnalysisConfig;
use crate::model::{AuthorizationKind, OperationRecord, Value};

/// Optional `update` fields copied through when present.
const PASSTHROUGH_UPDATE_FIELDS: &[&str] =
    &["tokenSymbol", "delegatee", "timing", "votingFor", "zkappUri"];

/// Nanomina per MINA.
const NANO_DIGITS: usize = 9;

pub(crate) fn canonicalize_explorer(raw: &Json, cfg: &AnalysisConfig) -> CanonicalTransaction {
    let meta = explorer_meta(raw);
    let failures = failure_positions(raw, cfg);
    let tx_hash = meta.tx_hash.clone().unwrap_or_default();

    let account_updates = raw
        .get("updatedAccounts")
        .and_then(Json::as_array)
        .map(|accounts| {
            accounts
                .iter()
                .enumerate()
                .map(|(index, account)| {
                    operation_from_account(account, index, &tx_hash, failures.get(&index), cfg)
                })
                .collect()
        })
        .unwrap_or_default();

    CanonicalTransaction {
        account_updates,
        meta,
    }
}

fn explorer_meta(raw: &Json) -> TransactionMeta {
    TransactionMeta {
        tx_hash: string_field(raw, "txHash"),
        status: string_field(raw, "txStatus"),
        block_height: raw.get("blockHeight").and_then(Json::as_u64),
        timestamp: raw.get("timestamp").and_then(Json::as_i64),
        fee: raw.get("fee").and_then(scalar_text),
        fee_payer_address: string_field(raw, "feePayerAddress"),
        memo: string_field(raw, "memo").unwrap_or_default(),
    }
}

/// Map list positions to failure reasons.
///
/// Indices outside the configured base are dropped.
fn failure_positions(raw: &Json, cfg: &AnalysisConfig) -> BTreeMap<usize, Option<String>> {
    let mut out = BTreeMap::new();
    let Some(failures) = raw.get("failures").and_then(Json::as_array) else {
        return out;
    };
    for failure in failures {
        let Some(index) = failure.get("index").and_then(Json::as_i64) else {
            continue;
        };
        if let Some(position) = cfg.failure_index_base.to_position(index) {
            out.entry(position)
                .or_insert_with(|| string_field(failure, "failureReason"));
        }
    }
    out
}

/// Build one canonical record from an explorer account entry.
pub fn operation_from_account(
    account: &Json,
    index: usize,
    tx_hash: &str,
    failure: Option<&Option<String>>,
    cfg: &AnalysisConfig,
) -> OperationRecord {
    let address = account
        .get("accountAddress")
        .and_then(Json::as_str)
        .unwrap_or_default();
    let update = account.get("update").filter(|u| u.is_object());
    let permission = |name: &str| {
        update
            .and_then(|u| u.pointer(&format!("/permissions/{}", name)))
            .and_then(Json::as_str)
    };

    let authorization = if permission("editState") == Some("proof")
        || permission("send") == Some("proof")
    {
        AuthorizationKind::Proof
    } else if permission("incrementNonce") == Some("signature")
        || permission("setDelegate") == Some("signature")
    {
        AuthorizationKind::Signature
    } else {
        AuthorizationKind::None
    };

    let is_zkapp = account
        .get("isZkappAccount")
        .and_then(Json::as_bool)
        .unwrap_or(false);
    let has_vk = update
        .and_then(|u| u.get("verificationKey"))
        .is_some_and(|vk| !vk.is_null());
    let is_contract = is_zkapp || has_vk || authorization == AuthorizationKind::Proof;

    let short: String = address.chars().take(8).collect();
    let label = if is_contract {
        format!("Contract-{}", short)
    } else {
        format!("Account-{}", short)
    };

    let resource_id = account
        .get("tokenId")
        .and_then(Json::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or(cfg.default_resource_id.as_str())
        .to_string();

    let call_depth = account
        .get("callDepth")
        .and_then(Json::as_u64)
        .and_then(|d| u32::try_from(d).ok())
        .unwrap_or(0);

    let mut record = OperationRecord::new(format!("{}-{}", tx_hash, index), label)
        .with_call_depth(call_depth)
        .with_resource_id(resource_id)
        .with_authorization(authorization)
        .with_body(build_body(account, address, update, is_zkapp));

    if let Some(reason) = failure {
        record.label = format!("{}{}", cfg.failure_label_prefix, record.label);
        record = record.with_failure(reason.clone());
    }
    record
}

fn build_body(account: &Json, address: &str, update: Option<&Json>, is_zkapp: bool) -> Value {
    let app_state: Vec<Json> = update
        .and_then(|u| u.get("appState"))
        .and_then(Json::as_array)
        .map(|slots| {
            slots
                .iter()
                .map(|s| if s.is_null() { json!("0") } else { s.clone() })
                .collect()
        })
        .unwrap_or_default();

    let mut update_out = Map::new();
    update_out.insert("appState".to_string(), Json::Array(app_state));
    update_out.insert(
        "permissions".to_string(),
        update
            .and_then(|u| u.get("permissions"))
            .filter(|p| p.is_object())
            .cloned()
            .unwrap_or_else(|| json!({})),
    );
    update_out.insert(
        "verificationKey".to_string(),
        json!({
            "hash": account.get("verificationKeyHash").cloned().unwrap_or(Json::Null),
            "data": update.and_then(|u| u.get("verificationKey")).cloned().unwrap_or(Json::Null),
        }),
    );
    for field in PASSTHROUGH_UPDATE_FIELDS {
        if let Some(v) = update.and_then(|u| u.get(*field)).filter(|v| !v.is_null()) {
            update_out.insert((*field).to_string(), v.clone());
        }
    }

    let mut body = Map::new();
    body.insert("publicKey".to_string(), json!(address));
    body.insert(
        "tokenId".to_string(),
        account.get("tokenId").cloned().unwrap_or(Json::Null),
    );
    body.insert("isZkappAccount".to_string(), json!(is_zkapp));
    body.insert(
        "incrementNonce".to_string(),
        json!(account.get("incrementNonce").and_then(Json::as_bool).unwrap_or(false)),
    );
    if let Some(call_data) = account.get("callData").and_then(scalar_text) {
        body.insert("callData".to_string(), json!(call_data));
    }
    body.insert("update".to_string(), Json::Object(update_out));

    let mut value = Value::from_json(&Json::Object(body));
    if let Value::Record(map) = &mut value {
        let balance = account
            .get("totalBalanceChange")
            .and_then(parse_balance)
            .unwrap_or(0);
        map.insert("balanceChange".to_string(), Value::integer(balance));
    }
    value
}

/// Parse a balance into nanomina.
///
/// Integers are taken as nanomina. Decimal amounts (`"-1.5"`, `0.25`) are
/// taken as MINA and scaled; digits past the ninth fractional place are
/// dropped.
pub fn parse_balance(raw: &Json) -> Option<i128> {
    let text = match raw {
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i128::from(i));
            }
            n.to_string()
        }
        Json::String(s) => s.trim().to_string(),
        _ => return None,
    };
    if let Ok(i) = text.parse::<i128>() {
        return Some(i);
    }
    parse_decimal_mina(&text)
}

fn parse_decimal_mina(text: &str) -> Option<i128> {
    if text.contains(['e', 'E']) {
        let f: f64 = text.parse().ok()?;
        return Some((f * 1e9).round() as i128);
    }
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, frac) = unsigned.split_once('.')?;
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    let whole: i128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut frac_digits: String = frac.chars().take(NANO_DIGITS).collect();
    while frac_digits.len() < NANO_DIGITS {
        frac_digits.push('0');
    }
    let frac: i128 = frac_digits.parse().ok()?;
    let magnitude = whole.checked_mul(1_000_000_000)?.checked_add(frac)?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailureIndexBase;

    fn sample() -> Json {
        json!({
            "txHash": "5Jtx",
            "txStatus": "failed",
            "blockHeight": 100,
            "feePayerAddress": "B62qfeepayer0000",
            "memo": "m",
            "updatedAccounts": [
                {
                    "accountAddress": "B62qfeepayer0000",
                    "callDepth": 0,
                    "tokenId": "wSHV2S4qX9jFsLjQo8r1BsMLH2ZRKsZx6EJd1sbozGPieEC4Jf",
                    "totalBalanceChange": -0.1,
                    "update": {"permissions": {"incrementNonce": "signature"}, "verificationKey": null}
                },
                {
                    "accountAddress": "B62qzkapp00000000",
                    "callDepth": 1,
                    "isZkappAccount": true,
                    "totalBalanceChange": "2",
                    "callData": "12345",
                    "update": {
                        "appState": ["7", null],
                        "permissions": {"editState": "proof"},
                        "tokenSymbol": "TKN"
                    }
                }
            ],
            "failures": [{"index": 2, "failureReason": "Cancelled"}]
        })
    }

    #[test]
    fn test_explorer_accounts_become_records() {
        let tx = canonicalize_explorer(&sample(), &AnalysisConfig::default());
        assert_eq!(tx.account_updates.len(), 2);

        let first = &tx.account_updates[0];
        assert_eq!(first.id, "5Jtx-0");
        assert_eq!(first.label, "Account-B62qfeep");
        assert_eq!(first.authorization_kind, AuthorizationKind::Signature);
        assert_eq!(first.balance_change(), Some(-100_000_000));
        assert!(!first.failed);

        let second = &tx.account_updates[1];
        assert_eq!(second.label, "[FAILED] Contract-B62qzkap");
        assert!(second.failed);
        assert_eq!(second.failure_reason.as_deref(), Some("Cancelled"));
        assert_eq!(second.authorization_kind, AuthorizationKind::Proof);
        assert_eq!(second.call_depth, 1);
        assert_eq!(second.resource_id, "default");
        assert_eq!(second.token_symbol(), Some("TKN"));
        assert_eq!(second.call_data(), Some("12345"));
        assert_eq!(second.app_state(), &[Value::str("7"), Value::str("0")]);
    }

    #[test]
    fn test_meta_is_extracted() {
        let tx = canonicalize_explorer(&sample(), &AnalysisConfig::default());
        assert_eq!(tx.meta.status.as_deref(), Some("failed"));
        assert_eq!(tx.meta.block_height, Some(100));
        assert_eq!(tx.meta.fee_payer_address.as_deref(), Some("B62qfeepayer0000"));
    }

    #[test]
    fn test_zero_based_failure_indices() {
        let cfg = AnalysisConfig {
            failure_index_base: FailureIndexBase::Zero,
            ..AnalysisConfig::default()
        };
        let mut raw = sample();
        raw["failures"] = json!([{"index": 0, "failureReason": "Overflow"}]);
        let tx = canonicalize_explorer(&raw, &cfg);
        assert!(tx.account_updates[0].failed);
        assert!(!tx.account_updates[1].failed);
    }

    #[test]
    fn test_out_of_range_failure_is_ignored() {
        let mut raw = sample();
        raw["failures"] = json!([{"index": 9}, {"index": 0}]);
        let tx = canonicalize_explorer(&raw, &AnalysisConfig::default());
        assert!(tx.account_updates.iter().all(|op| !op.failed));
    }

    #[test]
    fn test_extreme_failure_index_is_ignored() {
        let raw = json!({
            "txHash": "h",
            "updatedAccounts": [{"accountAddress": "B62q"}],
            "failures": [{"index": i64::MIN, "failureReason": "x"}, {"index": i64::MAX}]
        });
        for base in [FailureIndexBase::One, FailureIndexBase::Zero] {
            let cfg = AnalysisConfig {
                failure_index_base: base,
                ..AnalysisConfig::default()
            };
            let tx = crate::adapter::canonicalize(&raw, &cfg);
            assert_eq!(tx.account_updates.len(), 1);
            assert!(!tx.account_updates[0].failed);
        }
    }

    #[test]
    fn test_parse_balance_forms() {
        assert_eq!(parse_balance(&json!(5)), Some(5));
        assert_eq!(parse_balance(&json!("-1.5")), Some(-1_500_000_000));
        assert_eq!(parse_balance(&json!(".25")), Some(250_000_000));
        assert_eq!(parse_balance(&json!("0.0000000019")), Some(1));
        assert_eq!(parse_balance(&json!("abc")), None);
        assert_eq!(parse_balance(&json!(null)), None);
    }
}
