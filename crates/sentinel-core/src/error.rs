//! Error types for the simulation core.

use sentinel_types::SessionMode;

/// Errors raised by session transition functions.
///
/// These mark rejected player actions, not faults: the session is always
/// left exactly as it was.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// The requested transition is not legal in the current mode.
    #[error("operation not valid in mode {0:?}")]
    InvalidMode(SessionMode),

    /// A case generation request is already in flight.
    #[error("case generation already in flight")]
    GenerationInFlight,

    /// The referenced citizen does not exist in the roster.
    #[error("unknown citizen: {0}")]
    UnknownCitizen(String),
}

/// Errors raised while loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying io error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yml::Error,
    },
}
