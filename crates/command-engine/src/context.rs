//! Per-invocation state threaded through converters.

use crate::builtin::reflective;
use crate::cursor::Cursor;
use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::registry::{Converter, ConverterKind};
use crate::types::{Annotation, SourceValues, TypeRef, Value};

/// What the current converter is being asked to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextState {
    pub expected: TypeRef,
    pub annotations: Vec<Annotation>,
    pub can_leave_trailing: bool,
}

/// Saved cursor position and state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    position: usize,
    state: ContextState,
}

/// Mutable context for one invocation. Never shared between invocations.
pub struct InvocationContext<'a> {
    engine: &'a Engine,
    cursor: Cursor<'a>,
    sources: &'a SourceValues,
    reflections: &'a [String],
    state: ContextState,
}

impl<'a> InvocationContext<'a> {
    pub fn new(
        engine: &'a Engine,
        input: &'a str,
        sources: &'a SourceValues,
        reflections: &'a [String],
    ) -> Self {
        Self {
            engine,
            cursor: Cursor::new(input),
            sources,
            reflections,
            state: ContextState {
                expected: TypeRef::Any,
                annotations: Vec::new(),
                can_leave_trailing: false,
            },
        }
    }

    pub fn engine(&self) -> &'a Engine {
        self.engine
    }

    pub fn cursor(&self) -> &Cursor<'a> {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }

    pub fn expected(&self) -> &TypeRef {
        &self.state.expected
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.state.annotations
    }

    pub fn can_leave_trailing(&self) -> bool {
        self.state.can_leave_trailing
    }

    /// Let the enclosing parse stop before the end of input.
    pub fn allow_trailing_input(&mut self) {
        self.state.can_leave_trailing = true;
    }

    pub fn reflections(&self) -> &'a [String] {
        self.reflections
    }

    /// Host value for `key`.
    pub fn source(&self, key: &str) -> EngineResult<Value> {
        self.sources
            .get(key)
            .cloned()
            .ok_or_else(|| EngineError::MissingSource(key.to_string()))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            position: self.cursor.position(),
            state: self.state.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.cursor.restore(snapshot.position);
        self.state = snapshot.state;
    }

    /// Run `f`, rewinding the cursor if it fails. State is always restored.
    pub fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let snapshot = self.snapshot();
        let result = f(self);
        if result.is_err() {
            self.cursor.restore(snapshot.position);
        }
        self.state = snapshot.state;
        result
    }

    /// Convert the next input as `ty`, selecting the converter from the registry.
    pub fn convert(&mut self, ty: &TypeRef, annotations: &[Annotation]) -> EngineResult<Value> {
        let resolved = self
            .engine
            .registry()
            .lookup(ty, annotations, self.engine.catalog());
        self.convert_with(&resolved.converter, ty, &resolved.remaining)
    }

    /// Convert the next input as `ty` with a specific converter.
    ///
    /// Parsing converters first give a reflective `Alias.member` expression
    /// the chance to supply the value. If the expression fails, the converter
    /// still runs, and the reflective error is kept when it fails too.
    pub fn convert_with(
        &mut self,
        converter: &Converter,
        ty: &TypeRef,
        annotations: &[Annotation],
    ) -> EngineResult<Value> {
        self.attempt(|ctx| {
            ctx.state.expected = ty.clone();
            ctx.state.annotations = annotations.to_vec();

            let mut reflected = None;
            if converter.kind() == ConverterKind::Parsing {
                match reflective::try_convert(ctx) {
                    Some(Ok(value)) => return Ok(value),
                    Some(Err(err)) => reflected = Some(err),
                    None => {}
                }
            }
            converter.convert(ctx).map_err(|err| reflected.unwrap_or(err))
        })
    }

    /// Run `f` with a different reflection allow-list.
    pub(crate) fn with_reflections<T>(
        &mut self,
        reflections: &'a [String],
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = std::mem::replace(&mut self.reflections, reflections);
        let result = f(self);
        self.reflections = saved;
        result
    }
}
