//! Error types for gasmon

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Gasmon error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Configuration serialization failed: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Inbound wire record failed validation
    ///
    /// Carries the offending line so the consumer can log exactly what the
    /// producer sent.
    #[error("Malformed record ({reason}): {line:?}")]
    MalformedRecord {
        /// The rejected line, trimmed of trailing newline
        line: String,
        /// What the strict scanner tripped on
        reason: &'static str,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
