//! Compiles command declarations into token sequences.
//!
//! Template grammar, one item per whitespace-separated word:
//!
//! - `<text>`: required literal, matched case-insensitively
//! - `[text]`: optional literal
//! - the alias of the next parameter's type: that parameter's placeholder
//! - anything else: literal matched verbatim
//!
//! Without a template every parseable parameter becomes a placeholder in
//! declaration order. Source-bound parameters never appear in the tokens.

use crate::command::{CommandContext, CommandSpec, ParameterBinding};
use crate::context::InvocationContext;
use crate::cursor::Cursor;
use crate::engine::Engine;
use crate::error::{CompileError, EngineError, FormatError};
use crate::registry::Resolved;
use crate::token::{LiteralToken, PlaceholderToken, Token};
use crate::types::{sort_annotations, Annotation, DefaultValue, ParameterSpec, SourceValues, TypeRef, Value};
use std::sync::Arc;
use tracing::debug;

enum Slot {
    Literal(LiteralToken),
    Parameter(usize),
}

/// Compiler bound to the engine whose registry and catalog it resolves against.
pub struct TemplateCompiler<'e> {
    engine: &'e Engine,
}

impl<'e> TemplateCompiler<'e> {
    pub fn new(engine: &'e Engine) -> Self {
        Self { engine }
    }

    pub fn compile(&self, spec: &CommandSpec) -> Result<CommandContext, CompileError> {
        let command = spec.name();
        if command.is_empty() {
            return Err(CompileError::MissingAlias);
        }
        let invokable = spec
            .invokable
            .clone()
            .ok_or_else(|| CompileError::MissingHandler(command.to_string()))?;

        let catalog = self.engine.catalog();
        for parameter in &spec.parameters {
            catalog.validate(&parameter.ty)?;
        }
        if let Some(unknown) = spec.reflections.iter().find(|r| catalog.object(r).is_none()) {
            return Err(CompileError::UnknownType(unknown.clone()));
        }

        let resolved: Vec<Resolved> = spec
            .parameters
            .iter()
            .map(|parameter| {
                let mut annotations = parameter.annotations.clone();
                sort_annotations(&mut annotations);
                self.engine
                    .registry()
                    .lookup(&parameter.ty, &annotations, catalog)
            })
            .collect();
        let parseable: Vec<bool> = resolved.iter().map(|r| !r.converter.is_source()).collect();

        let slots = match &spec.template {
            Some(template) => self.layout(command, template, &spec.parameters, &parseable)?,
            None => (0..spec.parameters.len())
                .filter(|&i| parseable[i])
                .map(Slot::Parameter)
                .collect(),
        };

        let mut tokens = Vec::with_capacity(slots.len());
        let mut bindings: Vec<Option<ParameterBinding>> = vec![None; spec.parameters.len()];
        for slot in slots {
            match slot {
                Slot::Literal(literal) => tokens.push(Token::Literal(literal)),
                Slot::Parameter(index) => {
                    let parameter = &spec.parameters[index];
                    let default = self.default_value(command, parameter, &resolved[index])?;
                    bindings[index] = Some(ParameterBinding::Token(tokens.len()));
                    tokens.push(Token::Placeholder(PlaceholderToken {
                        parameter: index,
                        name: parameter.name.clone(),
                        type_alias: catalog.alias_of(&parameter.ty),
                        ty: parameter.ty.clone(),
                        annotations: resolved[index].remaining.clone(),
                        default,
                        converter: Arc::clone(&resolved[index].converter),
                    }));
                }
            }
        }

        let bindings = bindings
            .into_iter()
            .zip(&spec.parameters)
            .zip(resolved)
            .map(|((binding, parameter), resolved)| {
                binding.unwrap_or_else(|| ParameterBinding::Source {
                    ty: parameter.ty.clone(),
                    annotations: resolved.remaining,
                    converter: resolved.converter,
                })
            })
            .collect::<Vec<_>>();

        check_remaining_is_last(command, &spec.parameters, &tokens)?;

        debug!(
            command = %command,
            tokens = tokens.len(),
            parameters = spec.parameters.len(),
            "Compiled command"
        );

        Ok(CommandContext {
            aliases: spec.aliases.clone(),
            description: spec.description.clone(),
            parameters: spec.parameters.clone(),
            tokens,
            bindings,
            reflections: spec.reflections.clone(),
            invokable,
        })
    }

    fn layout(
        &self,
        command: &str,
        template: &str,
        parameters: &[ParameterSpec],
        parseable: &[bool],
    ) -> Result<Vec<Slot>, CompileError> {
        let catalog = self.engine.catalog();
        let aliases: Vec<String> = parameters.iter().map(|p| catalog.alias_of(&p.ty)).collect();
        let invalid = |source: FormatError| CompileError::InvalidTemplate {
            command: command.to_string(),
            source,
        };
        let skip_sources = |mut next: usize| {
            while next < parseable.len() && !parseable[next] {
                next += 1;
            }
            next
        };

        let mut cursor = Cursor::new(template);
        let mut next = skip_sources(0);
        let mut slots = Vec::new();

        while cursor.has_next() {
            if cursor.is_next('<', false) {
                let text = cursor.next_surrounded('<', '>', true).map_err(invalid)?;
                slots.push(Slot::Literal(LiteralToken {
                    text: text.trim().to_string(),
                    case_insensitive: true,
                    optional: false,
                }));
                continue;
            }
            if cursor.is_next('[', false) {
                let text = cursor.next_surrounded('[', ']', true).map_err(invalid)?;
                slots.push(Slot::Literal(LiteralToken {
                    text: text.trim().to_string(),
                    case_insensitive: true,
                    optional: true,
                }));
                continue;
            }

            let word = cursor.next_word().map_err(invalid)?;
            if next < parameters.len() && word.eq_ignore_ascii_case(&aliases[next]) {
                slots.push(Slot::Parameter(next));
                next = skip_sources(next + 1);
                continue;
            }

            let out_of_order = (next..parameters.len())
                .filter(|&i| parseable[i])
                .any(|i| word.eq_ignore_ascii_case(&aliases[i]));
            if out_of_order {
                return Err(CompileError::AliasMismatch {
                    command: command.to_string(),
                    expected: aliases[next].clone(),
                    found: word.to_string(),
                });
            }

            slots.push(Slot::Literal(LiteralToken {
                text: word.to_string(),
                case_insensitive: false,
                optional: false,
            }));
        }

        if next < parameters.len() {
            return Err(CompileError::UnboundParameter {
                command: command.to_string(),
                parameter: parameters[next].name.clone(),
            });
        }
        Ok(slots)
    }

    /// Parse a declared default with the parameter's own converter.
    /// String defaults are taken verbatim.
    fn default_value(
        &self,
        command: &str,
        parameter: &ParameterSpec,
        resolved: &Resolved,
    ) -> Result<Option<Value>, CompileError> {
        let text = match &parameter.default {
            None => return Ok(None),
            Some(DefaultValue::None) => return Ok(Some(Value::None)),
            Some(DefaultValue::Text(text)) if parameter.ty == TypeRef::Str => {
                return Ok(Some(Value::str(text)))
            }
            Some(DefaultValue::Text(text)) => text,
        };

        let sources = SourceValues::new();
        let reflections: Vec<String> = Vec::new();
        let mut ctx = InvocationContext::new(self.engine, text, &sources, &reflections);
        ctx.convert_with(&resolved.converter, &parameter.ty, &resolved.remaining)
            .and_then(|value| match ctx.cursor().has_next() {
                true => Err(EngineError::TrailingInput {
                    remaining: ctx.cursor().rest().to_string(),
                }),
                false => Ok(Some(value)),
            })
            .map_err(|source| CompileError::InvalidDefault {
                command: command.to_string(),
                parameter: parameter.name.clone(),
                text: text.clone(),
                source: Box::new(source),
            })
    }
}

fn check_remaining_is_last(
    command: &str,
    parameters: &[ParameterSpec],
    tokens: &[Token],
) -> Result<(), CompileError> {
    for (position, token) in tokens.iter().enumerate() {
        let Token::Placeholder(placeholder) = token else {
            continue;
        };
        let parameter = &parameters[placeholder.parameter];
        if parameter.has(Annotation::Remaining) && position + 1 != tokens.len() {
            return Err(CompileError::RemainingNotLast {
                command: command.to_string(),
                parameter: parameter.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeDecl;

    fn engine() -> Engine {
        Engine::builder()
            .object(TypeDecl::new("Vector3"))
            .build()
            .unwrap()
    }

    fn spec(alias: &str) -> CommandSpec {
        CommandSpec::new(alias).handler(|_| Ok(Value::None))
    }

    #[test]
    fn test_compile_without_template() {
        let engine = engine();
        let command = engine
            .compile(
                &spec("contains")
                    .parameter(ParameterSpec::new("num", TypeRef::Int))
                    .parameter(ParameterSpec::new("numbers", TypeRef::array(TypeRef::Int)).unrequired("[]")),
            )
            .unwrap();

        assert_eq!(command.tokens().len(), 2);
        assert_eq!(command.usage(), "<Integer> [Integer[]]");
        assert_eq!(command.name_usage(), "<num> [numbers]");
        let default = command.tokens()[1].as_placeholder().unwrap().default.clone();
        assert_eq!(default, Some(Value::Array(vec![])));
    }

    #[test]
    fn test_compile_template_with_literals() {
        let engine = engine();
        let command = engine
            .compile(
                &spec("move")
                    .template("<from> Integer to Integer [please]")
                    .parameter(ParameterSpec::new("start", TypeRef::Int))
                    .parameter(ParameterSpec::new("end", TypeRef::Int)),
            )
            .unwrap();

        assert_eq!(command.usage(), "<from> <Integer> to <Integer> [please]");
        assert!(matches!(&command.tokens()[2], Token::Literal(l) if !l.case_insensitive && l.text == "to"));
    }

    #[test]
    fn test_source_parameters_excluded_from_tokens() {
        let engine = engine();
        let command = engine
            .compile(
                &spec("greet")
                    .parameter(ParameterSpec::new("user", TypeRef::source("User")))
                    .parameter(ParameterSpec::new("name", TypeRef::Str))
                    .parameter(ParameterSpec::new("channel", TypeRef::Str).source()),
            )
            .unwrap();

        assert_eq!(command.usage(), "<String>");
        assert!(matches!(command.bindings()[0], ParameterBinding::Source { .. }));
        assert!(matches!(command.bindings()[1], ParameterBinding::Token(0)));
        assert!(matches!(command.bindings()[2], ParameterBinding::Source { .. }));
    }

    #[test]
    fn test_unbound_parameter_rejected() {
        let engine = engine();
        let result = engine.compile(
            &spec("move")
                .template("Integer <to>")
                .parameter(ParameterSpec::new("start", TypeRef::Int))
                .parameter(ParameterSpec::new("end", TypeRef::Int)),
        );
        assert!(matches!(result, Err(CompileError::UnboundParameter { parameter, .. }) if parameter == "end"));
    }

    #[test]
    fn test_out_of_order_alias_rejected() {
        let engine = engine();
        let result = engine.compile(
            &spec("mixed")
                .template("Vector3 Integer")
                .parameter(ParameterSpec::new("count", TypeRef::Int))
                .parameter(ParameterSpec::new("at", TypeRef::object("Vector3"))),
        );
        assert!(matches!(result, Err(CompileError::AliasMismatch { expected, found, .. })
            if expected == "Integer" && found == "Vector3"));
    }

    #[test]
    fn test_unbalanced_template_rejected() {
        let engine = engine();
        let result = engine.compile(&spec("broken").template("<oops"));
        assert!(matches!(result, Err(CompileError::InvalidTemplate { .. })));
    }

    #[test]
    fn test_remaining_must_be_last() {
        let engine = engine();
        let result = engine.compile(
            &spec("say")
                .parameter(ParameterSpec::new("text", TypeRef::Str).remaining())
                .parameter(ParameterSpec::new("times", TypeRef::Int)),
        );
        assert!(matches!(result, Err(CompileError::RemainingNotLast { .. })));
    }

    #[test]
    fn test_invalid_default_rejected() {
        let engine = engine();
        let result = engine.compile(
            &spec("count").parameter(ParameterSpec::new("n", TypeRef::Int).unrequired("many")),
        );
        assert!(matches!(result, Err(CompileError::InvalidDefault { .. })));
    }

    #[test]
    fn test_unknown_types_rejected() {
        let engine = engine();
        let result = engine.compile(&spec("draw").parameter(ParameterSpec::new("s", TypeRef::object("Hexagon"))));
        assert!(matches!(result, Err(CompileError::UnknownType(name)) if name == "Hexagon"));

        let result = engine.compile(&spec("draw").reflect("Hexagon"));
        assert!(matches!(result, Err(CompileError::UnknownType(_))));

        let result = engine.compile(&CommandSpec::new("nohandler"));
        assert!(matches!(result, Err(CompileError::MissingHandler(_))));
    }
}
