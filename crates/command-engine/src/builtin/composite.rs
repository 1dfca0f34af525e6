//! Composite objects written as `Alias(arg arg ...)`.

use crate::context::InvocationContext;
use crate::dispatcher;
use crate::error::{EngineError, EngineResult, FormatError};
use crate::registry::{Converter, TypeMatcher};
use crate::types::{Annotation, Priority, TypeRef, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

static ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s()\[\]]+").expect("alias pattern is valid"));

fn is_object(ty: &TypeRef) -> bool {
    matches!(ty, TypeRef::Object(_))
}

/// The generic composite converter, used when no other converter matches.
pub(crate) fn object_converter() -> Converter {
    Converter::builder("object", TypeMatcher::predicate("is object", is_object))
        .priority(Priority::Last)
        .convert(construct)
}

pub(super) fn converters() -> Vec<Converter> {
    vec![
        Converter::builder("children", TypeMatcher::predicate("is object", is_object))
            .annotation(Annotation::Children)
            .priority(Priority::Last)
            .convert(construct_child),
    ]
}

/// Read the alias, then try each declared constructor against the
/// parenthesised arguments. The first constructor whose arguments all convert
/// and are followed by `)` wins.
fn construct(ctx: &mut InvocationContext<'_>) -> EngineResult<Value> {
    let engine = ctx.engine();
    let ty = ctx.expected().clone();
    let TypeRef::Object(name) = &ty else {
        let alias = engine.catalog().alias_of(&ty);
        return Err(EngineError::conversion(alias, ctx.cursor().fragment()));
    };
    let decl = engine
        .catalog()
        .object(name)
        .ok_or_else(|| EngineError::conversion(name.as_str(), ctx.cursor().fragment()))?;

    let found = ctx.cursor_mut().next_matching(&ALIAS).map_err(|_| {
        FormatError::new(format!("Missing the alias {}", decl.alias), "")
    })?;
    if !found.eq_ignore_ascii_case(&decl.alias) {
        return Err(FormatError::alias_mismatch(&decl.alias, found).into());
    }
    ctx.cursor_mut().assert_next('(')?;
    ctx.allow_trailing_input();

    let start = ctx.cursor().position();
    for (index, constructor) in engine.constructors(name).iter().enumerate() {
        ctx.cursor_mut().restore(start);
        let args = match dispatcher::parse_nested(constructor, ctx) {
            Ok(args) => args,
            Err(err) => {
                trace!(object = %decl.alias, constructor = index, error = %err, "Constructor rejected arguments");
                continue;
            }
        };
        if !ctx.cursor_mut().is_next(')', true) {
            trace!(object = %decl.alias, constructor = index, "Constructor left arguments unconsumed");
            continue;
        }
        match dispatcher::call(constructor, &args) {
            Ok(value) => return Ok(value),
            Err(err) => {
                trace!(object = %decl.alias, constructor = index, error = %err, "Constructor failed");
            }
        }
    }

    Err(EngineError::Construction {
        alias: decl.alias.clone(),
    })
}

/// Try the declared type itself, then each sealed child in declaration order.
fn construct_child(ctx: &mut InvocationContext<'_>) -> EngineResult<Value> {
    let engine = ctx.engine();
    let ty = ctx.expected().clone();
    let annotations = ctx.annotations().to_vec();
    let fallback = engine.registry().fallback();

    let mut error = match ctx.convert_with(fallback, &ty, &annotations) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let children: &[String] = match &ty {
        TypeRef::Object(name) => engine
            .catalog()
            .object(name)
            .map(|decl| decl.children.as_slice())
            .unwrap_or_default(),
        _ => &[],
    };
    for child in children {
        match ctx.convert_with(fallback, &TypeRef::object(child.as_str()), &annotations) {
            Ok(value) => return Ok(value),
            Err(err) => error = err,
        }
    }
    Err(error)
}
