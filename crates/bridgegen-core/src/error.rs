//! Error types for binding, extraction and traversal

use thiserror::Error;

/// Errors raised while rendering a model entity to Java source
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BindError {
    /// A name could not be turned into a legal Java identifier
    #[error("Invalid identifier `{identifier}` for {entity}")]
    InvalidIdentifier {
        /// Rendered identifier that was rejected
        identifier: String,
        /// Description of the offending entity
        entity: String,
    },

    /// A function failed to bind
    #[error("Failed to bind function `{function}`: {source}")]
    Function {
        /// Source name of the function
        function: String,
        /// Underlying failure
        #[source]
        source: Box<BindError>,
    },

    /// A class failed to bind
    #[error("Failed to bind class `{class}`: {source}")]
    Class {
        /// Interface name of the class
        class: String,
        /// Underlying failure
        #[source]
        source: Box<BindError>,
    },
}

/// Errors raised while reading reflected members
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractError {
    /// The runtime could not introspect a function's signature
    #[error("Cannot introspect `{name}`: {reason}")]
    Signature {
        /// Function name
        name: String,
        /// Runtime-reported reason
        reason: String,
    },

    /// The runtime could not list a class's members
    #[error("Cannot introspect members of class `{name}`: {reason}")]
    Members {
        /// Class name
        name: String,
        /// Runtime-reported reason
        reason: String,
    },
}

/// Errors raised while loading an introspection snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Failed to read the snapshot file
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON
    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two modules share a qualname
    #[error("Duplicate module in snapshot: {0}")]
    DuplicateModule(String),
}

/// Errors raised while traversing and emitting a module
#[derive(Debug, Error)]
pub enum TraversalError {
    /// Rendering failed
    #[error("Failed to bind module `{module}`: {source}")]
    Bind {
        /// Module being emitted
        module: String,
        /// Underlying failure
        #[source]
        source: BindError,
    },

    /// The output sink failed
    #[error("Failed to write `{unit}`: {source}")]
    Output {
        /// Qualified name of the output unit
        unit: String,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// The root module of a traversal is unknown to the loader
    #[error("Module not found: {0}")]
    ModuleNotFound(String),
}
