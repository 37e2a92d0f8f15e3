//! Canonical account-update (operation) record.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::DEFAULT_RESOURCE_ID;
use crate::model::value::Value;

/// Label given to operations that arrive without one.
pub const UNNAMED_LABEL: &str = "Unnamed Update";

/// How an operation is authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationKind {
    #[default]
    None,
    Signature,
    Proof,
}

impl AuthorizationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationKind::None => "none",
            AuthorizationKind::Signature => "signature",
            AuthorizationKind::Proof => "proof",
        }
    }
}

/// One node of a transaction.
///
/// Records are created once per analysis call and never mutated afterwards;
/// every call produces a fresh list.
///
/// The `body` follows the layout produced by the canonicalization adapter:
/// `publicKey`, `tokenId`, `balanceChange`, `callData`, `incrementNonce` and
/// an `update` record holding `appState`, `permissions`, `verificationKey`,
/// `tokenSymbol`, `delegatee`, `timing`, `votingFor` and `zkappUri`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    /// Stable join key for diffing and graphing
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default = "default_label")]
    pub label: String,

    #[serde(default)]
    pub call_depth: u32,

    #[serde(default = "default_resource_id")]
    pub resource_id: String,

    #[serde(default)]
    pub authorization_kind: AuthorizationKind,

    #[serde(default)]
    pub failed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    #[serde(default = "Value::empty_record")]
    pub body: Value,
}

fn default_label() -> String {
    UNNAMED_LABEL.to_string()
}

fn default_resource_id() -> String {
    DEFAULT_RESOURCE_ID.to_string()
}

/// Ids arrive as strings from explorers and as integers from local builders.
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    match raw {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "operation id must be a string or number, got {}",
            other
        ))),
    }
}

impl OperationRecord {
    /// Create a top-level, non-failed record on the default resource.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            call_depth: 0,
            resource_id: default_resource_id(),
            authorization_kind: AuthorizationKind::None,
            failed: false,
            failure_reason: None,
            body: Value::empty_record(),
        }
    }

    pub fn with_call_depth(mut self, depth: u32) -> Self {
        self.call_depth = depth;
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = resource_id.into();
        self
    }

    pub fn with_authorization(mut self, kind: AuthorizationKind) -> Self {
        self.authorization_kind = kind;
        self
    }

    /// Mark the record failed with an optional reason.
    pub fn with_failure(mut self, reason: Option<String>) -> Self {
        self.failed = true;
        self.failure_reason = reason;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// The record as one tree, which is what the diff engine walks.
    ///
    /// Keys use the same camelCase names as the serialized form so change-log
    /// paths read `accountUpdate[1].body.update.permissions.send`.
    pub fn to_tree(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("id".to_string(), Value::str(self.id.clone()));
        map.insert("label".to_string(), Value::str(self.label.clone()));
        map.insert("callDepth".to_string(), Value::int(i64::from(self.call_depth)));
        map.insert("resourceId".to_string(), Value::str(self.resource_id.clone()));
        map.insert(
            "authorizationKind".to_string(),
            Value::str(self.authorization_kind.as_str()),
        );
        map.insert("failed".to_string(), Value::bool(self.failed));
        map.insert(
            "failureReason".to_string(),
            self.failure_reason
                .as_ref()
                .map(|r| Value::str(r.clone()))
                .unwrap_or(Value::Null),
        );
        map.insert("body".to_string(), self.body.clone());
        Value::Record(map)
    }

    /// Encoded account key from `body.publicKey`.
    pub fn public_key(&self) -> Option<&str> {
        self.body.get("publicKey").and_then(Value::as_str)
    }

    /// Signed balance change in the smallest unit.
    ///
    /// Accepts a plain integer or an o1js-style `{magnitude, sgn}` record.
    pub fn balance_change(&self) -> Option<i128> {
        let raw = self.body.get("balanceChange")?;
        if let Some(i) = raw.as_i128() {
            return Some(i);
        }
        let magnitude = raw.get("magnitude").and_then(Value::as_i128)?;
        let negative = raw
            .get("sgn")
            .and_then(Value::as_str)
            .map(|s| s.eq_ignore_ascii_case("negative"))
            .unwrap_or(false);
        Some(if negative { magnitude.saturating_neg() } else { magnitude })
    }

    /// Application-state slots from `body.update.appState`.
    pub fn app_state(&self) -> &[Value] {
        self.body
            .get_path("update.appState")
            .and_then(Value::as_list)
            .unwrap_or(&[])
    }

    /// Call-data payload from `body.callData`.
    pub fn call_data(&self) -> Option<&str> {
        self.body.get("callData").and_then(Value::as_str)
    }

    /// Token symbol set by this update, if any.
    pub fn token_symbol(&self) -> Option<&str> {
        self.body
            .get_path("update.tokenSymbol")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// True if the update carries verification-key data.
    pub fn has_verification_key(&self) -> bool {
        self.body
            .get_path("update.verificationKey.data")
            .map(|v| !v.is_null())
            .unwrap_or(false)
    }
}
