//! Analysis configuration.
//!
//! Every knob has a default matching the behaviour of the reference tracer,
//! so an empty TOML document yields the default configuration.
//!
//! # Example
//!
//! ```toml
//! default_resource_id = "wSHV2S4qX9jFsLjQo8r1BsMLH2ZRKsZx6EJd1sbozGPieEC4Jf"
//! path_root = "accountUpdate"
//! proof_truncate_len = 50
//! failure_index_base = "one"
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{AutraceError, Result};

/// Sentinel resource identifier used when an operation names no token/resource.
pub const DEFAULT_RESOURCE_ID: &str = "default";

/// Token id of the native currency on Mina networks.
pub const NATIVE_TOKEN_ID: &str = "wSHV2S4qX9jFsLjQo8r1BsMLH2ZRKsZx6EJd1sbozGPieEC4Jf";

/// How indices in an explorer `failures` list map onto `updatedAccounts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureIndexBase {
    /// `failures[].index == 0` refers to `updatedAccounts[0]`
    Zero,
    /// `failures[].index == 1` refers to `updatedAccounts[0]`
    One,
}

impl FailureIndexBase {
    /// Convert an explorer failure index into a list position.
    pub fn to_position(self, index: i64) -> Option<usize> {
        let adjusted = match self {
            FailureIndexBase::Zero => index,
            FailureIndexBase::One => index.checked_sub(1)?,
        };
        usize::try_from(adjusted).ok()
    }
}

/// Tunables shared by the canonicalization adapter and the analysis engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Resource id treated as "no shared resource" by orphan linking and token chains
    pub default_resource_id: String,
    /// Root segment of every change-log path (`accountUpdate[2].body...`)
    pub path_root: String,
    /// Added `proof` strings longer than this are truncated
    pub proof_truncate_len: usize,
    /// Appended to truncated proof strings
    pub truncation_marker: String,
    /// Prepended to the label of failed operations
    pub failure_label_prefix: String,
    /// Indexing convention of explorer failure lists
    pub failure_index_base: FailureIndexBase,
    /// Token id that counts as the default resource alongside the sentinel
    pub native_token_id: String,
    /// Symbol reported for operations on the default resource
    pub native_token_symbol: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_resource_id: DEFAULT_RESOURCE_ID.to_string(),
            path_root: "accountUpdate".to_string(),
            proof_truncate_len: 50,
            truncation_marker: "...".to_string(),
            failure_label_prefix: "[FAILED] ".to_string(),
            failure_index_base: FailureIndexBase::One,
            native_token_id: NATIVE_TOKEN_ID.to_string(),
            native_token_symbol: "MINA".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from TOML text.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig`: the text is not valid TOML or a value has the wrong type
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AutraceError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    /// True if `resource_id` is the default sentinel or the native token id.
    pub fn is_default_resource(&self, resource_id: &str) -> bool {
        resource_id == self.default_resource_id || resource_id == self.native_token_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let cfg = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_given_keys() {
        let cfg = AnalysisConfig::from_toml_str(
            "proof_truncate_len = 10\nfailure_index_base = \"zero\"\n",
        )
        .unwrap();
        assert_eq!(cfg.proof_truncate_len, 10);
        assert_eq!(cfg.failure_index_base, FailureIndexBase::Zero);
        assert_eq!(cfg.path_root, "accountUpdate");
    }

    #[test]
    fn test_malformed_toml_is_invalid_config() {
        let err = AnalysisConfig::from_toml_str("proof_truncate_len = \"many\"").unwrap_err();
        assert!(matches!(err, AutraceError::InvalidConfig { .. }));
    }

    #[test]
    fn test_native_token_counts_as_default_resource() {
        let cfg = AnalysisConfig::default();
        assert!(cfg.is_default_resource(DEFAULT_RESOURCE_ID));
        assert!(cfg.is_default_resource(NATIVE_TOKEN_ID));
        assert!(!cfg.is_default_resource("xTokenId"));
    }

    #[test]
    fn test_failure_index_base_positions() {
        assert_eq!(FailureIndexBase::One.to_position(1), Some(0));
        assert_eq!(FailureIndexBase::One.to_position(0), None);
        assert_eq!(FailureIndexBase::Zero.to_position(0), Some(0));
        assert_eq!(FailureIndexBase::Zero.to_position(-1), None);
        assert_eq!(FailureIndexBase::One.to_position(i64::MIN), None);
        assert_eq!(FailureIndexBase::Zero.to_position(i64::MIN), None);
    }
}
