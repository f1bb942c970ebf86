//! Error types for OneRingDB
//!
//! A single error enum shared by the store, the ORQL pipeline and the engine.

use thiserror::Error;

/// The main error type for OneRingDB operations
#[derive(Error, Debug)]
pub enum Error {
    // ========== Graph Errors ==========
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Edge not found: {0}")]
    EdgeNotFound(String),

    /// An edge names an endpoint that is not in the node index
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    // ========== Query Errors ==========
    #[error("Syntax error in `{line}`: {reason}")]
    Syntax { line: String, reason: String },

    /// Failure raised while resolving or dispatching one line of a batch
    #[error("Line {line_no} (`{line}`) failed: {source}")]
    AtLine {
        line_no: usize,
        line: String,
        #[source]
        source: Box<Error>,
    },

    // ========== Validation Errors ==========
    #[error("Validation error: {0}")]
    Validation(String),

    // ========== Serialization Errors ==========
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ========== IO Errors ==========
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========== Configuration Errors ==========
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for OneRingDB operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a syntax error for the given query line
    pub fn syntax<L: Into<String>, R: Into<String>>(line: L, reason: R) -> Self {
        Error::Syntax {
            line: line.into(),
            reason: reason.into(),
        }
    }

    /// Attach batch position to a failure. Syntax errors already name their line
    /// and are returned unchanged.
    pub fn at_line(self, line_no: usize, line: &str) -> Self {
        match self {
            Error::Syntax { .. } | Error::AtLine { .. } => self,
            other => Error::AtLine {
                line_no,
                line: line.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, looking through the batch line wrapper
    pub fn root(&self) -> &Error {
        match self {
            Error::AtLine { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns true if a query line failed grammar or header validation
    pub fn is_syntax(&self) -> bool {
        matches!(self.root(), Error::Syntax { .. })
    }

    /// Returns true if a lookup named an unknown node or edge
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.root(),
            Error::NodeNotFound(_) | Error::EdgeNotFound(_)
        )
    }

    /// Returns true if an edge endpoint did not exist
    pub fn is_reference(&self) -> bool {
        matches!(self.root(), Error::InvalidReference(_))
    }

    /// Returns true if an update named a field outside its allowed set
    pub fn is_validation(&self) -> bool {
        matches!(self.root(), Error::Validation(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Deserialization(err.to_string())
    }
}
