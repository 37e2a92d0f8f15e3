//! Lifecycle phases at which a transaction can be snapshotted.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::AutraceError;

/// A transaction lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Transaction built (contract deployment or method call assembled)
    Deploy,
    /// Authorized by proof
    Prove,
    /// Authorized by signature
    Sign,
    /// Submitted to the network
    Send,
}

impl Phase {
    /// All phases in lifecycle order.
    pub const ALL: [Phase; 4] = [Phase::Deploy, Phase::Prove, Phase::Sign, Phase::Send];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Deploy => "deploy",
            Phase::Prove => "prove",
            Phase::Sign => "sign",
            Phase::Send => "send",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = AutraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| AutraceError::UnknownPhase {
                label: s.to_string(),
            })
    }
}
