use thiserror::Error;

/// Result type alias using AutraceError
pub type Result<T> = std::result::Result<T, AutraceError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that external adapters (CLI,
/// visualizers) can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidTransaction,
    UnknownPhase,

    // Configuration
    InvalidConfig,

    // Integration/IO
    Io,
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidTransaction => "ERR_INVALID_TRANSACTION",
            ExErrorKind::UnknownPhase => "ERR_UNKNOWN_PHASE",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    operation_id: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            operation_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add account-update id context
    pub fn with_operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the account-update id context, if any
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(id) = &self.operation_id {
            write!(f, " (operation_id: {})", id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for autrace boundary operations
///
/// The analysis algorithms themselves are infallible; these errors only
/// arise when decoding external input, configuration or phase labels.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AutraceError {
    /// Phase label is not one of deploy, prove, sign, send
    #[error("Unknown lifecycle phase: {label}")]
    UnknownPhase { label: String },

    /// Transaction payload could not be interpreted at all
    #[error("Invalid transaction payload: {reason}")]
    InvalidTransaction { reason: String },

    /// Configuration text could not be parsed
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Serialization or deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Filesystem error raised by an adapter
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl From<AutraceError> for ExError {
    fn from(err: AutraceError) -> Self {
        let kind = match &err {
            AutraceError::UnknownPhase { .. } => ExErrorKind::UnknownPhase,
            AutraceError::InvalidTransaction { .. } => ExErrorKind::InvalidTransaction,
            AutraceError::InvalidConfig { .. } => ExErrorKind::InvalidConfig,
            AutraceError::Serialization { .. } => ExErrorKind::Serialization,
            AutraceError::Io { .. } => ExErrorKind::Io,
        };
        ExError::new(kind).with_message(err.to_string())
    }
}

impl From<serde_json::Error> for AutraceError {
    fn from(err: serde_json::Error) -> Self {
        AutraceError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AutraceError {
    fn from(err: std::io::Error) -> Self {
        AutraceError::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes_are_stable() {
        assert_eq!(ExErrorKind::UnknownPhase.code(), "ERR_UNKNOWN_PHASE");
        assert_eq!(ExErrorKind::InvalidConfig.code(), "ERR_INVALID_CONFIG");
        assert_eq!(ExErrorKind::Serialization.code(), "ERR_SERIALIZATION");
    }

    #[test]
    fn test_autrace_error_maps_to_kind() {
        let err = AutraceError::UnknownPhase {
            label: "mint".to_string(),
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::UnknownPhase);
        assert!(ex.message().contains("mint"));
    }

    #[test]
    fn test_ex_error_display_includes_context() {
        let ex = ExError::new(ExErrorKind::InvalidTransaction)
            .with_op("take_snapshot")
            .with_operation_id("au-3")
            .with_message("bad payload");
        let text = ex.to_string();
        assert!(text.starts_with("[ERR_INVALID_TRANSACTION]"));
        assert!(text.contains("take_snapshot"));
        assert!(text.contains("au-3"));
    }

    #[test]
    fn test_serde_json_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: AutraceError = parse.unwrap_err().into();
        assert!(matches!(err, AutraceError::Serialization { .. }));
    }
}
