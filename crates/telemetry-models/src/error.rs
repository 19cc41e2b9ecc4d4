//! Error types for the `telemetry-models` crate.
//!
//! All fallible constructors and `FromStr` implementations in this crate
//! return variants of [`ModelError`].

/// Errors produced when parsing or validating model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// An identifier was empty or whitespace only.
    #[error("invalid {kind} id \"{value}\": must not be blank")]
    InvalidIdentifier {
        /// Which identifier failed (`"project"` or `"application"`).
        kind: &'static str,
        /// The value that failed validation.
        value: String,
    },

    /// A workflow stage tag outside the known set.
    #[error("unknown workflow step \"{value}\"")]
    UnknownStep {
        /// The tag that failed to parse.
        value: String,
    },
}
