//! Invocation dispatcher: walks compiled tokens over raw input and calls
//! the backing callable.

use crate::command::{CommandContext, ParameterBinding};
use crate::context::InvocationContext;
use crate::engine::Engine;
use crate::error::{EngineError, EngineResult, FormatError};
use crate::token::Token;
use crate::types::{Arguments, SourceValues, Value};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// A callable panicked instead of returning an error.
#[derive(Error, Debug)]
#[error("callable panicked: {0}")]
pub struct CallablePanicked(pub String);

/// Dispatcher for top-level command invocations.
pub struct Dispatcher<'e> {
    engine: &'e Engine,
}

impl<'e> Dispatcher<'e> {
    pub fn new(engine: &'e Engine) -> Self {
        Self { engine }
    }

    /// Parse `input` against `command` and invoke it.
    pub fn invoke(
        &self,
        command: &CommandContext,
        input: &str,
        sources: &SourceValues,
    ) -> EngineResult<Value> {
        let name = command.name();
        debug!(command = %name, input = %input, "Dispatching command");

        let mut ctx = InvocationContext::new(self.engine, input, sources, command.reflections());
        let args = match parse_arguments(command, &mut ctx) {
            Ok(args) => args,
            Err(e) => {
                debug!(command = %name, error = %e, "Input rejected");
                return Err(e);
            }
        };

        let result = call(command, &args);
        match &result {
            Ok(_) => info!(command = %name, "Command executed successfully"),
            Err(e) => warn!(command = %name, error = %e, "Command execution failed"),
        }
        result
    }
}

/// Parse the arguments of a constructor or reflective method inside an
/// enclosing invocation, using that command's own reflection allow-list.
pub(crate) fn parse_nested<'a>(
    command: &'a CommandContext,
    ctx: &mut InvocationContext<'a>,
) -> EngineResult<Arguments> {
    ctx.with_reflections(command.reflections(), |ctx| parse_arguments(command, ctx))
}

/// Invoke the callable, turning errors and panics into [`EngineError::Invocation`].
pub(crate) fn call(command: &CommandContext, args: &Arguments) -> EngineResult<Value> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| command.invokable().invoke(args)));
    let source = match outcome {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(source)) => source,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Box::new(CallablePanicked(message))
        }
    };
    Err(EngineError::Invocation {
        command: command.name().to_string(),
        source,
    })
}

/// No input is left for this parse: the end of the line, or the `)` closing
/// a constructor or reflective method.
fn is_missing(ctx: &InvocationContext<'_>) -> bool {
    !ctx.cursor().has_next() || (ctx.can_leave_trailing() && ctx.cursor().peek() == Some(')'))
}

fn parse_arguments(
    command: &CommandContext,
    ctx: &mut InvocationContext<'_>,
) -> EngineResult<Arguments> {
    let mut values: Vec<Option<Value>> = vec![None; command.parameters().len()];

    for (index, token) in command.tokens().iter().enumerate() {
        match token {
            Token::Literal(literal) => {
                let matched = ctx
                    .cursor_mut()
                    .next_literal(&literal.text, literal.case_insensitive);
                if !matched && !literal.optional {
                    let cursor = ctx.cursor();
                    return Err(EngineError::Token {
                        index,
                        position: cursor.position(),
                        source: Box::new(
                            FormatError::new(
                                format!("Expected '{}'", literal.text),
                                cursor.fragment(),
                            )
                            .into(),
                        ),
                    });
                }
            }
            Token::Placeholder(placeholder) => {
                let position = ctx.cursor().position();
                let converted = ctx.convert_with(
                    &placeholder.converter,
                    &placeholder.ty,
                    &placeholder.annotations,
                );
                let value = match (converted, &placeholder.default) {
                    (Ok(value), _) => value,
                    // Only a missing argument falls back to its default.
                    (Err(_), Some(default)) if is_missing(ctx) => {
                        trace!(token = index, parameter = %placeholder.name, "Using default value");
                        default.clone()
                    }
                    (Err(source), _) => {
                        return Err(EngineError::Token {
                            index,
                            position,
                            source: Box::new(source),
                        })
                    }
                };
                values[placeholder.parameter] = Some(value);
            }
        }
    }

    if !ctx.can_leave_trailing() && ctx.cursor().has_next() {
        return Err(EngineError::TrailingInput {
            remaining: ctx.cursor().rest().trim_end().to_string(),
        });
    }

    for (parameter, binding) in command.bindings().iter().enumerate() {
        if let ParameterBinding::Source {
            ty,
            annotations,
            converter,
        } = binding
        {
            values[parameter] = Some(ctx.convert_with(converter, ty, annotations)?);
        }
    }

    Ok(Arguments::new(
        values
            .into_iter()
            .map(|value| value.unwrap_or(Value::None))
            .collect(),
    ))
}
