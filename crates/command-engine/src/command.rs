//! Command declarations and their compiled form.

use crate::error::BoxError;
use crate::registry::Converter;
use crate::token::{PlaceholderToken, Token};
use crate::types::{Annotation, Arguments, ParameterSpec, TypeRef, Value};
use std::fmt;
use std::sync::Arc;

/// Callable backing a command, constructor or reflective method.
#[cfg_attr(test, mockall::automock)]
pub trait Invokable: Send + Sync {
    /// Run with converted arguments in declared parameter order.
    fn invoke(&self, args: &Arguments) -> Result<Value, BoxError>;
}

/// Adapts a closure to [`Invokable`].
pub struct FnInvokable<F>(pub F);

impl<F> Invokable for FnInvokable<F>
where
    F: Fn(&Arguments) -> Result<Value, BoxError> + Send + Sync,
{
    fn invoke(&self, args: &Arguments) -> Result<Value, BoxError> {
        (self.0)(args)
    }
}

/// Declaration of a command before compilation.
#[derive(Clone, Default)]
pub struct CommandSpec {
    pub(crate) aliases: Vec<String>,
    pub(crate) description: String,
    pub(crate) template: Option<String>,
    pub(crate) parameters: Vec<ParameterSpec>,
    pub(crate) reflections: Vec<String>,
    pub(crate) invokable: Option<Arc<dyn Invokable>>,
}

impl CommandSpec {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            aliases: vec![alias.into()],
            ..Self::default()
        }
    }

    /// Add another alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Command text, e.g. `"Integer <to> Integer [please]"`.
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Allow `Alias.member` sub-invocations of a declared type.
    pub fn reflect(mut self, type_name: impl Into<String>) -> Self {
        self.reflections.push(type_name.into());
        self
    }

    pub fn handler<F>(self, handler: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.invokable(Arc::new(FnInvokable(handler)))
    }

    pub fn invokable(mut self, invokable: Arc<dyn Invokable>) -> Self {
        self.invokable = Some(invokable);
        self
    }

    pub fn name(&self) -> &str {
        self.aliases.first().map_or("", String::as_str)
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

/// How a declared parameter receives its value.
#[derive(Debug, Clone)]
pub enum ParameterBinding {
    /// Parsed by the placeholder token at this index.
    Token(usize),
    /// Supplied out-of-band by a source converter.
    Source {
        ty: TypeRef,
        annotations: Vec<Annotation>,
        converter: Arc<Converter>,
    },
}

/// A compiled command, immutable and shareable across invocations.
#[derive(Clone)]
pub struct CommandContext {
    pub(crate) aliases: Vec<String>,
    pub(crate) description: String,
    pub(crate) parameters: Vec<ParameterSpec>,
    pub(crate) tokens: Vec<Token>,
    pub(crate) bindings: Vec<ParameterBinding>,
    pub(crate) reflections: Vec<String>,
    pub(crate) invokable: Arc<dyn Invokable>,
}

impl CommandContext {
    pub fn name(&self) -> &str {
        self.aliases.first().map_or("", String::as_str)
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    pub fn reflections(&self) -> &[String] {
        &self.reflections
    }

    pub(crate) fn invokable(&self) -> &dyn Invokable {
        self.invokable.as_ref()
    }

    /// Usage by type, e.g. `<Integer> [Integer[]]`.
    pub fn usage(&self) -> String {
        self.render_usage(|placeholder| placeholder.type_alias.as_str())
    }

    /// Usage by parameter name, e.g. `<num> [numbers]`.
    pub fn name_usage(&self) -> String {
        self.render_usage(|placeholder| placeholder.name.as_str())
    }

    fn render_usage<'s>(&'s self, label: impl Fn(&'s PlaceholderToken) -> &'s str) -> String {
        self.tokens
            .iter()
            .map(|token| match token {
                Token::Literal(literal) if literal.optional => format!("[{}]", literal.text),
                Token::Literal(literal) if literal.case_insensitive => {
                    format!("<{}>", literal.text)
                }
                Token::Literal(literal) => literal.text.clone(),
                Token::Placeholder(placeholder) if placeholder.is_optional() => {
                    format!("[{}]", label(placeholder))
                }
                Token::Placeholder(placeholder) => format!("<{}>", label(placeholder)),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("aliases", &self.aliases)
            .field("tokens", &self.tokens)
            .field("reflections", &self.reflections)
            .finish_non_exhaustive()
    }
}
