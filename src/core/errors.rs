//! Shared error types for the library

use thiserror::Error;

/// Main error type for func2widgets operations
#[derive(Debug, Error)]
pub enum Error {
    /// The reflection target is not something we can describe
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The reflection target does not exist in the given source
    #[error("no function, method or class named '{0}'")]
    TargetNotFound(String),

    /// Python source failed to parse
    #[error("Python parse error: {0}")]
    PythonParse(String),

    /// Structural failure inside the widget configs block (strict mode only)
    #[error("failed to parse widget configs block: {0}")]
    WidgetConfigs(String),

    /// Validation errors (renaming guard, value-domain checks)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A widget type was registered twice
    #[error("widget type '{0}' already registered")]
    AlreadyRegistered(String),

    /// A widget type was looked up or unregistered without being registered
    #[error("widget type '{0}' not registered")]
    NotRegistered(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
