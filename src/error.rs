//! Error types shared by the parameter registry and the generators.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Type alias for results across the crate
pub type AutotestResult<T> = Result<T, AutotestError>;

/// Every failure the registry, the parameter protocol and the generators can report.
///
/// None of these are transient: callers are expected to propagate them to the
/// process boundary and re-run with corrected parameters.
#[derive(Debug, thiserror::Error)]
pub enum AutotestError {
    #[error("Multiple params registered for: '{name}'")]
    DuplicateParameter { name: String },

    #[error("Missing required param: '{name}' (specs dumped to {})", dump_path.display())]
    MissingParameter { name: String, dump_path: PathBuf },

    #[error("Value '{value}' for param '{name}' out of bounds [{min}, {max}]")]
    OutOfBounds {
        name: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("Value '{value}' for param '{name}' not amongst choices {choices:?}")]
    InvalidChoice {
        name: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Value '{value}' for param '{name}' is not a valid {kind}")]
    UnparsableValue {
        name: String,
        value: String,
        kind: &'static str,
    },

    #[error("Invalid bounds declared for param '{name}'")]
    InvalidBounds { name: String },

    #[error("Invalid param name: '{name}'")]
    InvalidName { name: String },

    #[error("Invalid choice label '{label}' for param '{name}'")]
    InvalidChoiceLabel { name: String, label: String },

    #[error("Kumaraswamy shapes must be finite and positive (a={a}, b={b})")]
    InvalidShape { a: f64, b: f64 },

    #[error("Cannot partition {total} into zero parts")]
    EmptyPartition { total: u64 },

    #[error("No response for param '{name}' after {waited:?}")]
    InteractiveTimeout { name: String, waited: Duration },

    #[error("Input closed while waiting for param '{name}'")]
    InteractiveInputClosed { name: String },

    #[error("Malformed spec table: {reason}")]
    MalformedSpecTable { reason: String },

    #[error("Unrecognized option: '{option}'")]
    UnrecognizedOption { option: String },

    #[error("Option '{option}' expects a value")]
    MissingOptionValue { option: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
