//! CLI commands and the file plumbing they share.

pub mod analyze;
pub mod diff;
pub mod flow;

use std::path::{Path, PathBuf};

use autrace_core::errors::{AutraceError, ExError};
use autrace_core::AnalysisConfig;
use serde::Serialize;

pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub cfg: AnalysisConfig,
    pub output: Option<PathBuf>,
}

impl Context {
    pub fn load(config: Option<&Path>, output: Option<PathBuf>) -> CommandResult<Self> {
        let cfg = match config {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
                AnalysisConfig::from_toml_str(&text)
                    .map_err(|e| ExError::from(e).with_op("load_config"))?
            }
            None => AnalysisConfig::default(),
        };
        Ok(Self { cfg, output })
    }

    /// Print `value` as pretty JSON to the output file or stdout.
    pub fn emit<T: Serialize>(&self, value: &T) -> CommandResult {
        let text = serde_json::to_string_pretty(value).map_err(AutraceError::from)?;
        match &self.output {
            Some(path) => std::fs::write(path, text + "\n").map_err(|e| io_error(path, e))?,
            None => println!("{}", text),
        }
        Ok(())
    }
}

/// Read a transaction payload. The top level must be a JSON object.
pub fn read_transaction(path: &Path) -> Result<serde_json::Value, ExError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let raw: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| ExError::from(AutraceError::from(e)).with_op("read_transaction"))?;
    if !raw.is_object() {
        return Err(ExError::from(AutraceError::InvalidTransaction {
            reason: format!("{} does not contain a JSON object", path.display()),
        })
        .with_op("read_transaction"));
    }
    Ok(raw)
}

fn io_error(path: &Path, err: std::io::Error) -> ExError {
    ExError::from(AutraceError::Io {
        message: format!("{}: {}", path.display(), err),
    })
}
