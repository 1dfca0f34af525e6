//! Compiled command tokens.

use crate::registry::Converter;
use crate::types::{Annotation, TypeRef, Value};
use std::sync::Arc;

/// One step of a compiled command.
#[derive(Debug, Clone)]
pub enum Token {
    Literal(LiteralToken),
    Placeholder(PlaceholderToken),
}

/// Fixed text the input must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralToken {
    pub text: String,
    pub case_insensitive: bool,
    /// Skipped silently when absent.
    pub optional: bool,
}

/// A parameter position, bound to its converter at compile time.
#[derive(Debug, Clone)]
pub struct PlaceholderToken {
    /// Index into the command's declared parameters.
    pub parameter: usize,
    pub name: String,
    pub type_alias: String,
    pub ty: TypeRef,
    /// Annotations still active after converter selection.
    pub annotations: Vec<Annotation>,
    /// Present only for optional parameters.
    pub default: Option<Value>,
    pub(crate) converter: Arc<Converter>,
}

impl PlaceholderToken {
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }
}

impl Token {
    pub fn as_placeholder(&self) -> Option<&PlaceholderToken> {
        match self {
            Token::Placeholder(placeholder) => Some(placeholder),
            Token::Literal(_) => None,
        }
    }
}
