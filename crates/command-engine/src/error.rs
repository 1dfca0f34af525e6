//! Parsing, conversion and registration errors.

use thiserror::Error;

/// Error produced by a callable backing a command, constructor or method.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for invocation-time operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Malformed input: bad delimiters, unmatched aliases, missing tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FormatError {
    /// Human readable description.
    pub message: String,
    /// The fragment of input the error refers to.
    pub fragment: String,
}

impl FormatError {
    pub fn new(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fragment: fragment.into(),
        }
    }

    pub fn alias_mismatch(expected: &str, found: &str) -> Self {
        Self::new(
            format!("Expected the alias {} but got {}", expected, found),
            found,
        )
    }
}

/// Errors raised while matching raw input against a compiled command.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Input is malformed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A substring did not satisfy the grammar of the expected type.
    #[error("Expected {expected} but found '{found}'")]
    Conversion { expected: String, found: String },

    /// No constructor or reflective method accepted the arguments.
    #[error("There seems to have been an error when constructing the {alias}")]
    Construction { alias: String },

    /// Input remained after every token was consumed.
    #[error("There appears to be too many parameters for this command: '{remaining}'")]
    TrailingInput { remaining: String },

    /// The host did not supply an out-of-band value.
    #[error("No source value available for {0}")]
    MissingSource(String),

    /// The backing callable returned an error or panicked.
    #[error("Invoking '{command}' failed: {source}")]
    Invocation {
        command: String,
        #[source]
        source: BoxError,
    },

    /// A placeholder token failed with no default to fall back on.
    #[error("Parameter {index} could not be parsed at position {position}: {source}")]
    Token {
        index: usize,
        position: usize,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    pub fn conversion(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Conversion {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// The innermost error, skipping token wrappers.
    pub fn root(&self) -> &EngineError {
        match self {
            EngineError::Token { source, .. } => source.root(),
            other => other,
        }
    }

    /// Index of the failing token, if the error is attached to one.
    pub fn token_index(&self) -> Option<usize> {
        match self {
            EngineError::Token { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Registration-time errors. These never occur during invocation.
#[derive(Error, Debug)]
pub enum CompileError {
    /// A parseable parameter has no position in the template.
    #[error("All command parameters must be specified in the command '{command}': '{parameter}' is missing")]
    UnboundParameter { command: String, parameter: String },

    /// A template word names a parameter out of order.
    #[error("Command '{command}' expected the alias {expected} but the template names {found}")]
    AliasMismatch {
        command: String,
        expected: String,
        found: String,
    },

    /// The template itself is malformed.
    #[error("Invalid template for '{command}': {source}")]
    InvalidTemplate {
        command: String,
        #[source]
        source: FormatError,
    },

    /// A referenced enum or composite type was never declared.
    #[error("Unknown type '{0}'")]
    UnknownType(String),

    /// A remaining-input parameter is followed by other tokens.
    #[error("Parameter '{parameter}' of '{command}' consumes the remaining input and must be last")]
    RemainingNotLast { command: String, parameter: String },

    /// A default value does not parse with the parameter's converter.
    #[error("Default value '{text}' of '{parameter}' in '{command}' is invalid: {source}")]
    InvalidDefault {
        command: String,
        parameter: String,
        text: String,
        #[source]
        source: Box<EngineError>,
    },

    /// A reflective member or constructor declaration is unusable.
    #[error("Invalid member '{member}' on {type_name}: {reason}")]
    InvalidMember {
        type_name: String,
        member: String,
        reason: String,
    },

    /// A command was declared without a callable.
    #[error("Command '{0}' has no handler")]
    MissingHandler(String),

    /// A command was declared without any alias.
    #[error("Commands must declare at least one alias")]
    MissingAlias,
}
