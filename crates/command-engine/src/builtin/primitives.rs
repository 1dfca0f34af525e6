//! Numbers, booleans, characters, strings and enums.

use crate::context::InvocationContext;
use crate::error::{EngineError, EngineResult};
use crate::registry::{Converter, TypeMatcher};
use crate::types::{Annotation, Priority, TypeKey, TypeRef, Value};
use once_cell::sync::Lazy;
use regex::Regex;

static INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d+").expect("integer pattern is valid"));
static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d+(?:\.\d*)?").expect("decimal pattern is valid"));
static BOOLEAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:true|false|yes|no|t|f|y|n|1|0)").expect("boolean pattern is valid")
});
static CHARACTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S").expect("char pattern is valid"));
// Stops before a closing delimiter so words nest inside `[..]` and `(..)`.
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s)\]]+").expect("word pattern is valid"));

const TRUTHY: [&str; 5] = ["true", "yes", "t", "y", "1"];

pub(super) fn converters() -> Vec<Converter> {
    vec![
        integer(TypeKey::Byte, "Byte", i8::MIN.into(), i8::MAX.into()),
        integer(TypeKey::Short, "Short", i16::MIN.into(), i16::MAX.into()),
        integer(TypeKey::Int, "Integer", i32::MIN.into(), i32::MAX.into()),
        integer(TypeKey::Long, "Long", i64::MIN, i64::MAX),
        decimal(TypeKey::Float, "Float", f64::from(f32::MAX)),
        decimal(TypeKey::Double, "Double", f64::MAX),
        Converter::builder("boolean", TypeMatcher::exact(TypeKey::Bool)).convert(|ctx| {
            let text = token(ctx, &BOOLEAN, "Boolean")?;
            Ok(Value::Bool(TRUTHY.contains(&text.to_lowercase().as_str())))
        }),
        Converter::builder("character", TypeMatcher::exact(TypeKey::Char)).convert(|ctx| {
            let text = token(ctx, &CHARACTER, "Character")?;
            text.chars()
                .next()
                .map(Value::Char)
                .ok_or_else(|| EngineError::conversion("Character", text))
        }),
        Converter::builder("string", TypeMatcher::exact(TypeKey::Str))
            .convert(|ctx| word(ctx, "String").map(Value::str)),
        Converter::builder("remaining string", TypeMatcher::exact(TypeKey::Str))
            .annotation(Annotation::Remaining)
            .priority(Priority::Early)
            .convert(|ctx| Ok(Value::str(ctx.cursor_mut().remaining()?))),
        Converter::builder("explicit string", TypeMatcher::exact(TypeKey::Str))
            .annotation(Annotation::Explicit)
            .priority(Priority::Early)
            .convert(|ctx| {
                if ctx.cursor_mut().is_next('"', false) {
                    let quoted = ctx.cursor_mut().next_surrounded('"', '"', true)?;
                    Ok(Value::str(quoted))
                } else {
                    word(ctx, "String").map(Value::str)
                }
            }),
        Converter::builder(
            "enum",
            TypeMatcher::predicate("is enum", |ty| matches!(ty, TypeRef::Enum(_))),
        )
        .convert(enumeration),
    ]
}

fn integer(key: TypeKey, alias: &'static str, min: i64, max: i64) -> Converter {
    Converter::builder(alias.to_lowercase(), TypeMatcher::exact(key)).convert(move |ctx| {
        let text = token(ctx, &INTEGER, alias)?;
        text.trim_start_matches('+')
            .parse::<i64>()
            .ok()
            .filter(|value| (min..=max).contains(value))
            .map(Value::Int)
            .ok_or_else(|| EngineError::conversion(alias, text))
    })
}

fn decimal(key: TypeKey, alias: &'static str, limit: f64) -> Converter {
    Converter::builder(alias.to_lowercase(), TypeMatcher::exact(key)).convert(move |ctx| {
        let text = token(ctx, &DECIMAL, alias)?;
        text.trim_start_matches('+')
            .parse::<f64>()
            .ok()
            .filter(|value| value.abs() <= limit)
            .map(Value::Float)
            .ok_or_else(|| EngineError::conversion(alias, text))
    })
}

fn enumeration(ctx: &mut InvocationContext<'_>) -> EngineResult<Value> {
    let TypeRef::Enum(name) = ctx.expected().clone() else {
        return Err(EngineError::conversion("an enum", ctx.cursor().fragment()));
    };
    let catalog = ctx.engine().catalog();
    let decl = catalog
        .enumeration(&name)
        .ok_or_else(|| EngineError::conversion(name.as_str(), ctx.cursor().fragment()))?;

    let text = word(ctx, &name)?;
    let constant = decl
        .constant(text)
        .ok_or_else(|| EngineError::conversion(format!("a {}", name), text))?;
    Ok(Value::Enum {
        type_name: name.clone(),
        constant: constant.to_string(),
    })
}

/// A whole token matching `pattern`, reported as a conversion failure otherwise.
fn token<'a>(
    ctx: &mut InvocationContext<'a>,
    pattern: &Regex,
    expected: &str,
) -> EngineResult<&'a str> {
    let fragment = ctx.cursor().fragment();
    ctx.cursor_mut()
        .next_matching_token(pattern)
        .map_err(|_| EngineError::conversion(expected, fragment))
}

fn word<'a>(ctx: &mut InvocationContext<'a>, expected: &str) -> EngineResult<&'a str> {
    token_prefix(ctx, &WORD, expected)
}

fn token_prefix<'a>(
    ctx: &mut InvocationContext<'a>,
    pattern: &Regex,
    expected: &str,
) -> EngineResult<&'a str> {
    let fragment = ctx.cursor().fragment();
    ctx.cursor_mut()
        .next_matching(pattern)
        .map_err(|_| EngineError::conversion(expected, fragment))
}

#[cfg(test)]
mod tests {
    use crate::catalog::EnumDecl;
    use crate::context::InvocationContext;
    use crate::engine::Engine;
    use crate::error::EngineError;
    use crate::types::{Annotation, SourceValues, TypeRef, Value};

    fn convert(input: &str, ty: TypeRef, annotations: &[Annotation]) -> Result<Value, EngineError> {
        let engine = Engine::builder()
            .enumeration(EnumDecl::new("Operation", ["Add", "Subtract"]))
            .build()
            .unwrap();
        let sources = SourceValues::new();
        let mut ctx = InvocationContext::new(&engine, input, &sources, &[]);
        ctx.convert(&ty, annotations)
    }

    #[test]
    fn test_integers() {
        assert_eq!(convert("-12", TypeRef::Int, &[]).unwrap(), Value::Int(-12));
        assert_eq!(convert("+7)", TypeRef::Long, &[]).unwrap(), Value::Int(7));
        assert!(convert("1.0", TypeRef::Int, &[]).is_err());
        assert!(convert("12abc", TypeRef::Int, &[]).is_err());
        assert!(convert("300", TypeRef::Byte, &[]).is_err());
        assert!(convert("99999999999", TypeRef::Int, &[]).is_err());
    }

    #[test]
    fn test_decimals() {
        assert_eq!(convert("2.5", TypeRef::Double, &[]).unwrap(), Value::Float(2.5));
        assert_eq!(convert("3.", TypeRef::Float, &[]).unwrap(), Value::Float(3.0));
        assert_eq!(convert("-4", TypeRef::Double, &[]).unwrap(), Value::Float(-4.0));
        assert!(convert(".5", TypeRef::Double, &[]).is_err());
    }

    #[test]
    fn test_booleans() {
        for (input, expected) in [("YES", true), ("t", true), ("1", true), ("no", false), ("F", false)] {
            assert_eq!(convert(input, TypeRef::Bool, &[]).unwrap(), Value::Bool(expected));
        }
        assert!(convert("maybe", TypeRef::Bool, &[]).is_err());
        assert!(convert("nope", TypeRef::Bool, &[]).is_err());
    }

    #[test]
    fn test_characters() {
        assert_eq!(convert("x", TypeRef::Char, &[]).unwrap(), Value::Char('x'));
        assert!(convert("xy", TypeRef::Char, &[]).is_err());
    }

    #[test]
    fn test_strings() {
        assert_eq!(convert("hello there", TypeRef::Str, &[]).unwrap(), Value::str("hello"));
        assert_eq!(convert("end]", TypeRef::Str, &[]).unwrap(), Value::str("end"));
        assert_eq!(
            convert("hello there  ", TypeRef::Str, &[Annotation::Remaining]).unwrap(),
            Value::str("hello there")
        );
        assert!(convert("", TypeRef::Str, &[Annotation::Remaining]).is_err());
        assert_eq!(
            convert("\"hello there\" x", TypeRef::Str, &[Annotation::Explicit]).unwrap(),
            Value::str("hello there")
        );
        assert_eq!(
            convert("plain x", TypeRef::Str, &[Annotation::Explicit]).unwrap(),
            Value::str("plain")
        );
    }

    #[test]
    fn test_enums_are_case_insensitive() {
        let value = convert("sUbTrAcT", TypeRef::enumeration("Operation"), &[]).unwrap();
        assert_eq!(
            value,
            Value::Enum {
                type_name: "Operation".into(),
                constant: "Subtract".into()
            }
        );
        assert!(convert("divide", TypeRef::enumeration("Operation"), &[]).is_err());
    }
}
