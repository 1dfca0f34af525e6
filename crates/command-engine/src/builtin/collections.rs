//! Lists, sets and arrays, bracketed or implicit.

use crate::context::InvocationContext;
use crate::error::{EngineError, EngineResult, FormatError};
use crate::registry::{Converter, TypeMatcher};
use crate::types::{Annotation, Priority, TypeKey, TypeRef, Value};

pub(super) fn converters() -> Vec<Converter> {
    vec![
        Converter::builder("list", TypeMatcher::exact(TypeKey::List))
            .convert(|ctx| explicit_items(ctx).map(Value::List)),
        Converter::builder("implicit list", TypeMatcher::exact(TypeKey::List))
            .annotation(Annotation::Implicit)
            .priority(Priority::Last)
            .convert(|ctx| implicit_items(ctx).map(Value::List)),
        Converter::builder("unmodifiable list", TypeMatcher::exact(TypeKey::List))
            .annotation(Annotation::Unmodifiable)
            .priority(Priority::Early)
            .convert(frozen),
        Converter::builder("set", TypeMatcher::exact(TypeKey::Set)).convert(|ctx| {
            let items = delegate_to_list(ctx)?;
            let mut unique: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if !unique.contains(&item) {
                    unique.push(item);
                }
            }
            Ok(Value::Set(unique))
        }),
        Converter::builder("unmodifiable set", TypeMatcher::exact(TypeKey::Set))
            .annotation(Annotation::Unmodifiable)
            .priority(Priority::Early)
            .convert(frozen),
        Converter::builder(
            "array",
            TypeMatcher::predicate("is array", |ty| matches!(ty, TypeRef::Array(_))),
        )
        .convert(|ctx| delegate_to_list(ctx).map(Value::Array)),
    ]
}

fn element_type(ctx: &InvocationContext<'_>) -> EngineResult<TypeRef> {
    ctx.expected()
        .element()
        .cloned()
        .ok_or_else(|| EngineError::conversion("a collection", ctx.cursor().fragment()))
}

/// `[a b c]`. Any element failure fails the whole collection.
fn explicit_items(ctx: &mut InvocationContext<'_>) -> EngineResult<Vec<Value>> {
    let element = element_type(ctx)?;
    let annotations = ctx.annotations().to_vec();
    if !ctx.cursor_mut().is_next('[', true) {
        let expected = format!("[{}...]", ctx.engine().catalog().alias_of(&element));
        return Err(EngineError::conversion(expected, ctx.cursor().fragment()));
    }

    let mut items = Vec::new();
    loop {
        if ctx.cursor_mut().is_next(']', true) {
            return Ok(items);
        }
        if !ctx.cursor().has_next() {
            return Err(FormatError::new("Missing the ending ']'", "").into());
        }
        let before = ctx.cursor().position();
        items.push(ctx.convert(&element, &annotations)?);
        if ctx.cursor().position() == before {
            return Err(FormatError::new(
                "Collection element consumed no input",
                ctx.cursor().fragment(),
            )
            .into());
        }
    }
}

/// The bracketed form if present, otherwise one or more bare elements,
/// stopping at the first one that does not convert.
fn implicit_items(ctx: &mut InvocationContext<'_>) -> EngineResult<Vec<Value>> {
    if let Ok(items) = ctx.attempt(explicit_items) {
        return Ok(items);
    }

    let element = element_type(ctx)?;
    let annotations = ctx.annotations().to_vec();
    let mut items = vec![ctx.convert(&element, &annotations)?];

    while ctx.cursor().has_next() {
        let before = ctx.cursor().position();
        match ctx.convert(&element, &annotations) {
            Ok(item) if ctx.cursor().position() > before => items.push(item),
            Ok(_) => {
                ctx.cursor_mut().restore(before);
                break;
            }
            Err(_) => break,
        }
    }
    Ok(items)
}

/// Sets and arrays parse as a list of the same element type, keeping
/// any annotations not yet consumed.
fn delegate_to_list(ctx: &mut InvocationContext<'_>) -> EngineResult<Vec<Value>> {
    let list = TypeRef::list(element_type(ctx)?);
    let annotations = ctx.annotations().to_vec();
    match ctx.convert(&list, &annotations)? {
        Value::List(items) => Ok(items),
        Value::Frozen(inner) => match *inner {
            Value::List(items) => Ok(items),
            other => Err(EngineError::conversion("a list", other.to_string())),
        },
        other => Err(EngineError::conversion("a list", other.to_string())),
    }
}

fn frozen(ctx: &mut InvocationContext<'_>) -> EngineResult<Value> {
    let ty = ctx.expected().clone();
    let annotations = ctx.annotations().to_vec();
    let value = ctx.convert(&ty, &annotations)?;
    Ok(Value::Frozen(Box::new(value)))
}
