//! Type descriptors, annotations and converted values.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Declared type of a command parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Bool,
    Str,
    List(Box<TypeRef>),
    Set(Box<TypeRef>),
    Array(Box<TypeRef>),
    /// An enum declared in the type catalog.
    Enum(String),
    /// A composite type declared in the type catalog.
    Object(String),
    /// A host-supplied value such as the invoking user.
    Source(String),
    /// Universal supertype.
    Any,
}

impl TypeRef {
    pub fn list(element: TypeRef) -> Self {
        TypeRef::List(Box::new(element))
    }

    pub fn set(element: TypeRef) -> Self {
        TypeRef::Set(Box::new(element))
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn object(name: impl Into<String>) -> Self {
        TypeRef::Object(name.into())
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        TypeRef::Enum(name.into())
    }

    pub fn source(name: impl Into<String>) -> Self {
        TypeRef::Source(name.into())
    }

    /// Element type of a collection.
    pub fn element(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::List(e) | TypeRef::Set(e) | TypeRef::Array(e) => Some(e),
            _ => None,
        }
    }

    /// Registry key with element types erased.
    pub fn key(&self) -> TypeKey {
        match self {
            TypeRef::Byte => TypeKey::Byte,
            TypeRef::Short => TypeKey::Short,
            TypeRef::Int => TypeKey::Int,
            TypeRef::Long => TypeKey::Long,
            TypeRef::Float => TypeKey::Float,
            TypeRef::Double => TypeKey::Double,
            TypeRef::Char => TypeKey::Char,
            TypeRef::Bool => TypeKey::Bool,
            TypeRef::Str => TypeKey::Str,
            TypeRef::List(_) => TypeKey::List,
            TypeRef::Set(_) => TypeKey::Set,
            TypeRef::Array(_) => TypeKey::Array,
            TypeRef::Enum(name) => TypeKey::Enum(name.clone()),
            TypeRef::Object(name) => TypeKey::Object(name.clone()),
            TypeRef::Source(name) => TypeKey::Source(name.clone()),
            TypeRef::Any => TypeKey::Any,
        }
    }

    /// Name shown to users for built-in types. Composite aliases live in the catalog.
    pub(crate) fn builtin_alias(&self) -> Option<&'static str> {
        Some(match self {
            TypeRef::Byte => "Byte",
            TypeRef::Short => "Short",
            TypeRef::Int => "Integer",
            TypeRef::Long => "Long",
            TypeRef::Float => "Float",
            TypeRef::Double => "Double",
            TypeRef::Char => "Character",
            TypeRef::Bool => "Boolean",
            TypeRef::Str => "String",
            TypeRef::List(_) => "List",
            TypeRef::Set(_) => "Set",
            TypeRef::Any => "Object",
            _ => return None,
        })
    }
}

/// Registry lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Bool,
    Str,
    List,
    Set,
    Array,
    Enum(String),
    Object(String),
    Source(String),
    Any,
}

/// Parameter markers that select specialised converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Consume all remaining input.
    Remaining,
    /// Collection without surrounding brackets.
    Implicit,
    /// Wrap the collection as read-only.
    Unmodifiable,
    /// Supplied by the host, never parsed.
    Source,
    /// Try the declared child types of a sealed composite.
    Children,
    /// Accept a quoted string.
    Explicit,
}

impl Annotation {
    fn precedence(self) -> u8 {
        match self {
            Annotation::Source => 0,
            Annotation::Unmodifiable => 1,
            Annotation::Remaining => 2,
            Annotation::Explicit => 3,
            Annotation::Children => 4,
            Annotation::Implicit => 5,
        }
    }
}

/// Order annotations so wrapping converters are resolved before the ones they wrap.
pub fn sort_annotations(annotations: &mut Vec<Annotation>) {
    annotations.sort_by_key(|a| a.precedence());
    annotations.dedup();
}

/// Converter priority. Lower variants are tried first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    First,
    Early,
    #[default]
    Default,
    Late,
    Last,
}

/// A converted value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    Enum { type_name: String, constant: String },
    List(Vec<Value>),
    Set(Vec<Value>),
    Array(Vec<Value>),
    /// A read-only view of a collection.
    Frozen(Box<Value>),
    Record(Record),
}

impl Value {
    pub fn str(text: impl Into<String>) -> Self {
        Value::Str(text.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Constant name of an enum value.
    pub fn as_constant(&self) -> Option<&str> {
        match self {
            Value::Enum { constant, .. } => Some(constant),
            _ => None,
        }
    }

    /// Elements of any collection, looking through read-only wrappers.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) | Value::Array(items) => Some(items),
            Value::Frozen(inner) => inner.as_items(),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, Value::Frozen(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::Enum { constant, .. } => write!(f, "{}", constant),
            Value::List(items) | Value::Set(items) | Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Frozen(inner) => write!(f, "{}", inner),
            Value::Record(record) => write!(f, "{}", record),
        }
    }
}

/// Named fields produced by a composite constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Numeric field, widening integers.
    pub fn float(&self, name: &str) -> Result<f64, ArgumentError> {
        self.get(name)
            .ok_or_else(|| ArgumentError::MissingField(name.to_string()))?
            .as_f64()
            .ok_or_else(|| ArgumentError::FieldType {
                field: name.to_string(),
                expected: "a number",
            })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, ")")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("type", &self.type_name)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Failure to read a converted argument as the expected shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Missing argument {0}")]
    Missing(usize),

    #[error("Argument {index} is not {expected}")]
    WrongType { index: usize, expected: &'static str },

    #[error("Missing field '{0}'")]
    MissingField(String),

    #[error("Field '{field}' is not {expected}")]
    FieldType { field: String, expected: &'static str },
}

/// Converted arguments, in declared parameter order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Value, ArgumentError> {
        self.values.get(index).ok_or(ArgumentError::Missing(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }

    pub fn int(&self, index: usize) -> Result<i64, ArgumentError> {
        self.typed(index, "an integer", Value::as_i64)
    }

    pub fn float(&self, index: usize) -> Result<f64, ArgumentError> {
        self.typed(index, "a number", Value::as_f64)
    }

    pub fn bool(&self, index: usize) -> Result<bool, ArgumentError> {
        self.typed(index, "a boolean", Value::as_bool)
    }

    pub fn char(&self, index: usize) -> Result<char, ArgumentError> {
        self.typed(index, "a character", Value::as_char)
    }

    pub fn str(&self, index: usize) -> Result<&str, ArgumentError> {
        self.typed(index, "a string", Value::as_str)
    }

    pub fn constant(&self, index: usize) -> Result<&str, ArgumentError> {
        self.typed(index, "an enum constant", Value::as_constant)
    }

    pub fn items(&self, index: usize) -> Result<&[Value], ArgumentError> {
        self.typed(index, "a collection", Value::as_items)
    }

    pub fn record(&self, index: usize) -> Result<&Record, ArgumentError> {
        self.typed(index, "a record", Value::as_record)
    }

    fn typed<'v, T>(
        &'v self,
        index: usize,
        expected: &'static str,
        read: impl FnOnce(&'v Value) -> Option<T>,
    ) -> Result<T, ArgumentError> {
        read(self.get(index)?).ok_or(ArgumentError::WrongType { index, expected })
    }
}

/// Out-of-band values supplied by the host for each invocation, keyed by
/// source name (`User`, `Channel`, ...).
#[derive(Debug, Clone, Default)]
pub struct SourceValues {
    values: HashMap<String, Value>,
}

impl SourceValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// Value used when an optional parameter is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// Parsed with the parameter's own converter when the command is compiled.
    Text(String),
    /// [`Value::None`].
    None,
}

/// Declared parameter of a command, constructor or reflective method.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub ty: TypeRef,
    pub annotations: Vec<Annotation>,
    pub default: Option<DefaultValue>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
            default: None,
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn implicit(self) -> Self {
        self.annotated(Annotation::Implicit)
    }

    pub fn remaining(self) -> Self {
        self.annotated(Annotation::Remaining)
    }

    pub fn unmodifiable(self) -> Self {
        self.annotated(Annotation::Unmodifiable)
    }

    pub fn source(self) -> Self {
        self.annotated(Annotation::Source)
    }

    pub fn children(self) -> Self {
        self.annotated(Annotation::Children)
    }

    pub fn explicit(self) -> Self {
        self.annotated(Annotation::Explicit)
    }

    /// Optional, defaulting to `text` parsed as this parameter's type.
    pub fn unrequired(mut self, text: impl Into<String>) -> Self {
        self.default = Some(DefaultValue::Text(text.into()));
        self
    }

    /// Optional, defaulting to [`Value::None`].
    pub fn unrequired_none(mut self) -> Self {
        self.default = Some(DefaultValue::None);
        self
    }

    pub fn has(&self, annotation: Annotation) -> bool {
        self.annotations.contains(&annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotations_sorted_by_precedence() {
        let mut annotations = vec![
            Annotation::Implicit,
            Annotation::Unmodifiable,
            Annotation::Implicit,
        ];
        sort_annotations(&mut annotations);
        assert_eq!(annotations, vec![Annotation::Unmodifiable, Annotation::Implicit]);
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::First < Priority::Early);
        assert!(Priority::Early < Priority::Default);
        assert!(Priority::Late < Priority::Last);
    }

    #[test]
    fn test_display() {
        let value = Value::List(vec![Value::Int(1), Value::Frozen(Box::new(Value::Set(vec![])))]);
        assert_eq!(value.to_string(), "[1, []]");

        let record = Record::new("Vector3")
            .with("x", Value::Float(1.5))
            .with("y", Value::Int(2));
        assert_eq!(record.to_string(), "Vector3(x: 1.5, y: 2)");
    }

    #[test]
    fn test_record_serializes_as_map() {
        let record = Record::new("Circle").with("radius", Value::Float(2.0));
        let json = serde_json::to_value(Value::Record(record)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Circle", "radius": 2.0}));
    }

    #[test]
    fn test_arguments_accessors() {
        let args = Arguments::new(vec![
            Value::Int(4),
            Value::Frozen(Box::new(Value::List(vec![Value::Int(1)]))),
        ]);
        assert_eq!(args.int(0), Ok(4));
        assert_eq!(args.float(0), Ok(4.0));
        assert_eq!(args.items(1).map(|i| i.len()), Ok(1));
        assert_eq!(
            args.str(0),
            Err(ArgumentError::WrongType { index: 0, expected: "a string" })
        );
        assert_eq!(args.int(5), Err(ArgumentError::Missing(5)));
    }
}
