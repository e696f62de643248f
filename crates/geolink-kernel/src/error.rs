//! Error types for Geolink kernel operations.
//!
//! Policy verdicts (PASS/WARN/FAIL) are data, never errors; they travel
//! through [`crate::gate::GateOutcome`]. The variants here cover the cases
//! where an input or the configuration itself is broken.

/// Errors arising from malformed inputs or invalid engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Input JSON does not match the expected shape. Carries the offending
    /// path or key where feasible.
    #[error("input shape error at {context}: {message}")]
    InputShape { context: String, message: String },

    /// The policy itself is broken (missing field, out-of-range threshold,
    /// warn/fail ordering), as opposed to the measured graph.
    #[error("configuration error: {0}")]
    Config(String),

    /// A pipeline step identifier has no registered handler.
    #[error("unknown pipeline step: {0}")]
    UnknownStep(String),

    /// Reading or writing a file failed.
    #[error("I/O error: {path}: {message}")]
    Io { path: String, message: String },
}

impl EngineError {
    /// Shape error with the offending path/key.
    pub fn input_shape(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputShape {
            context: context.into(),
            message: message.into(),
        }
    }

    /// I/O error tagged with the file path.
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }
}
