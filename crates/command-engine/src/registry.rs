//! Converter registry with annotation-aware, priority-ordered lookup.

use crate::builtin;
use crate::catalog::TypeCatalog;
use crate::context::InvocationContext;
use crate::error::EngineResult;
use crate::types::{Annotation, Priority, TypeKey, TypeRef, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Conversion function run against the invocation context.
pub type ConvertFn = dyn Fn(&mut InvocationContext<'_>) -> EngineResult<Value> + Send + Sync;

/// Type test for predicate converters.
pub type TypePredicate = dyn Fn(&TypeRef) -> bool + Send + Sync;

/// Which types a converter applies to.
#[derive(Clone)]
pub enum TypeMatcher {
    Exact(TypeKey),
    Predicate {
        description: &'static str,
        test: Arc<TypePredicate>,
    },
}

impl TypeMatcher {
    pub fn exact(key: TypeKey) -> Self {
        TypeMatcher::Exact(key)
    }

    pub fn predicate<F>(description: &'static str, test: F) -> Self
    where
        F: Fn(&TypeRef) -> bool + Send + Sync + 'static,
    {
        TypeMatcher::Predicate {
            description,
            test: Arc::new(test),
        }
    }

    pub fn matches(&self, ty: &TypeRef) -> bool {
        match self {
            TypeMatcher::Exact(key) => *key == ty.key(),
            TypeMatcher::Predicate { test, .. } => test(ty),
        }
    }
}

impl fmt::Debug for TypeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeMatcher::Exact(key) => write!(f, "Exact({:?})", key),
            TypeMatcher::Predicate { description, .. } => write!(f, "Predicate({})", description),
        }
    }
}

/// Whether a converter reads input or supplies a host value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterKind {
    Parsing,
    Source,
}

/// A registered conversion from input text to a [`Value`].
pub struct Converter {
    name: String,
    matcher: TypeMatcher,
    annotation: Option<Annotation>,
    priority: Priority,
    kind: ConverterKind,
    convert: Arc<ConvertFn>,
}

impl Converter {
    pub fn builder(name: impl Into<String>, matcher: TypeMatcher) -> ConverterBuilder {
        ConverterBuilder {
            name: name.into(),
            matcher,
            annotation: None,
            priority: Priority::Default,
            kind: ConverterKind::Parsing,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matcher(&self) -> &TypeMatcher {
        &self.matcher
    }

    pub fn annotation(&self) -> Option<Annotation> {
        self.annotation
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn kind(&self) -> ConverterKind {
        self.kind
    }

    pub fn is_source(&self) -> bool {
        self.kind == ConverterKind::Source
    }

    pub(crate) fn convert(&self, ctx: &mut InvocationContext<'_>) -> EngineResult<Value> {
        (self.convert)(ctx)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("name", &self.name)
            .field("matcher", &self.matcher)
            .field("annotation", &self.annotation)
            .field("priority", &self.priority)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Builder for [`Converter`].
pub struct ConverterBuilder {
    name: String,
    matcher: TypeMatcher,
    annotation: Option<Annotation>,
    priority: Priority,
    kind: ConverterKind,
}

impl ConverterBuilder {
    /// Only selected when the parameter carries `annotation`.
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Mark as a source converter: its parameters never consume input.
    pub fn source(mut self) -> Self {
        self.kind = ConverterKind::Source;
        self
    }

    pub fn convert<F>(self, convert: F) -> Converter
    where
        F: Fn(&mut InvocationContext<'_>) -> EngineResult<Value> + Send + Sync + 'static,
    {
        Converter {
            name: self.name,
            matcher: self.matcher,
            annotation: self.annotation,
            priority: self.priority,
            kind: self.kind,
            convert: Arc::new(convert),
        }
    }
}

/// Outcome of a registry lookup.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub converter: Arc<Converter>,
    /// Input annotations minus the one the converter consumed, if any.
    pub remaining: Vec<Annotation>,
}

/// Registry of converters. Built once, then read-only.
pub struct ConverterRegistry {
    exact: HashMap<TypeKey, Vec<Arc<Converter>>>,
    predicates: Vec<Arc<Converter>>,
    fallback: Arc<Converter>,
}

impl ConverterRegistry {
    /// Create a registry holding only the composite-object fallback.
    pub fn new() -> Self {
        Self {
            exact: HashMap::new(),
            predicates: Vec::new(),
            fallback: Arc::new(builtin::object_converter()),
        }
    }

    /// Create a registry with the built-in converters registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        builtin::register_defaults(&mut registry);
        registry
    }

    /// Register a converter. Equal priorities keep registration order.
    pub fn register(&mut self, converter: Converter) {
        let converter = Arc::new(converter);
        let list = match converter.matcher() {
            TypeMatcher::Exact(key) => self.exact.entry(key.clone()).or_default(),
            TypeMatcher::Predicate { .. } => &mut self.predicates,
        };
        let index = list
            .iter()
            .position(|existing| existing.priority() > converter.priority())
            .unwrap_or(list.len());
        list.insert(index, converter);
    }

    /// Number of registered converters, excluding the fallback.
    pub fn len(&self) -> usize {
        self.exact.values().map(Vec::len).sum::<usize>() + self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generic composite-object converter used when nothing else matches.
    pub fn fallback(&self) -> &Arc<Converter> {
        &self.fallback
    }

    /// Select the converter for `ty`. Always succeeds.
    ///
    /// Order: a converter requiring one of `annotations` (exact type, then
    /// supertypes, then predicates); an exact-type converter; a supertype
    /// converter; a predicate converter; an `Any` converter; the fallback.
    pub fn lookup(
        &self,
        ty: &TypeRef,
        annotations: &[Annotation],
        catalog: &TypeCatalog,
    ) -> Resolved {
        let mut lineage = vec![ty.key()];
        lineage.extend(catalog.supertypes(ty));

        for (position, annotation) in annotations.iter().enumerate() {
            let found = self
                .lineage_converters(&lineage)
                .chain(self.predicates_for(ty))
                .find(|c| c.annotation() == Some(*annotation));
            if let Some(converter) = found {
                let mut remaining = annotations.to_vec();
                remaining.remove(position);
                return Resolved {
                    converter: Arc::clone(converter),
                    remaining,
                };
            }
        }

        let plain = self
            .lineage_converters(&lineage)
            .chain(self.predicates_for(ty))
            .chain(self.exact.get(&TypeKey::Any).into_iter().flatten())
            .find(|c| c.annotation().is_none())
            .unwrap_or(&self.fallback);

        Resolved {
            converter: Arc::clone(plain),
            remaining: annotations.to_vec(),
        }
    }

    fn lineage_converters<'r>(
        &'r self,
        lineage: &'r [TypeKey],
    ) -> impl Iterator<Item = &'r Arc<Converter>> + 'r {
        lineage
            .iter()
            .filter_map(|key| self.exact.get(key))
            .flatten()
    }

    fn predicates_for<'r>(&'r self, ty: &'r TypeRef) -> impl Iterator<Item = &'r Arc<Converter>> + 'r {
        self.predicates.iter().filter(move |c| c.matcher().matches(ty))
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
