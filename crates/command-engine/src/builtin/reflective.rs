//! `Alias.method(args)` and `Alias.CONSTANT` sub-expressions.
//!
//! Only types named in the active reflection allow-list are reachable, and
//! only through the members their declaration lists.

use crate::catalog::TypeDecl;
use crate::context::InvocationContext;
use crate::dispatcher;
use crate::error::{EngineError, EngineResult};
use crate::types::{TypeRef, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

static MEMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)")
        .expect("member pattern is valid")
});

/// Convert a reflective expression at the cursor, if there is one.
///
/// Returns `None` without moving the cursor when the input does not start
/// with `Alias.member` for an allowed type, or when no member of that name
/// produces the expected type. A collection expecting `Vector3[]` therefore
/// leaves `Vector3.ZERO` to its element converter.
pub(crate) fn try_convert(ctx: &mut InvocationContext<'_>) -> Option<EngineResult<Value>> {
    let reflections = ctx.reflections();
    if reflections.is_empty() {
        return None;
    }

    let captures = MEMBER.captures(ctx.cursor().rest())?;
    let catalog = ctx.engine().catalog();
    let decl = reflections
        .iter()
        .filter_map(|name| catalog.object(name))
        .find(|decl| decl.alias.eq_ignore_ascii_case(&captures[1]))?;
    let member = captures[2].to_string();
    if !has_candidate(ctx, decl, &member) {
        return None;
    }

    let start = ctx.cursor().position();
    ctx.cursor_mut().next_matching(&MEMBER).ok()?;

    let result = if ctx.cursor_mut().is_next('(', true) {
        invoke_method(ctx, decl, &member)
    } else {
        read_constant(ctx, decl, &member)
    };
    if result.is_err() {
        ctx.cursor_mut().restore(start);
    }
    Some(result)
}

fn has_candidate(ctx: &InvocationContext<'_>, decl: &TypeDecl, member: &str) -> bool {
    let engine = ctx.engine();
    let expected = ctx.expected();
    let constant = decl
        .find_constant(member)
        .is_some_and(|constant| engine.catalog().is_assignable(&constant.ty, expected));
    constant
        || engine.methods(&decl.name).iter().any(|method| {
            method.name().eq_ignore_ascii_case(member)
                && engine.catalog().is_assignable(method.returns(), expected)
        })
}

fn invoke_method(
    ctx: &mut InvocationContext<'_>,
    decl: &TypeDecl,
    member: &str,
) -> EngineResult<Value> {
    let engine = ctx.engine();
    let expected = ctx.expected().clone();
    ctx.allow_trailing_input();

    let start = ctx.cursor().position();
    let candidates = engine
        .methods(&decl.name)
        .iter()
        .filter(|method| method.name().eq_ignore_ascii_case(member))
        .filter(|method| engine.catalog().is_assignable(method.returns(), &expected));

    for method in candidates {
        ctx.cursor_mut().restore(start);
        let Ok(args) = dispatcher::parse_nested(method.command(), ctx) else {
            continue;
        };
        if !ctx.cursor_mut().is_next(')', true) {
            continue;
        }
        match dispatcher::call(method.command(), &args) {
            Ok(value) => return Ok(value),
            Err(err) => {
                trace!(object = %decl.alias, method = %member, error = %err, "Reflective method failed");
            }
        }
    }

    Err(EngineError::Construction {
        alias: format!("{}.{}", decl.alias, member),
    })
}

fn read_constant(
    ctx: &InvocationContext<'_>,
    decl: &TypeDecl,
    member: &str,
) -> EngineResult<Value> {
    let expected = ctx.expected();
    let catalog = ctx.engine().catalog();
    decl.find_constant(member)
        .filter(|constant| catalog.is_assignable(&constant.ty, expected))
        .map(|constant| constant.value.clone())
        .ok_or_else(|| {
            EngineError::conversion(
                format!("a {} constant of {}", catalog.alias_of(expected), decl.alias),
                member,
            )
        })
}
