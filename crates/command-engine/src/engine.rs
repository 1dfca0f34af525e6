//! The engine: converter registry, type catalog and compiled members.

use crate::catalog::{EnumDecl, TypeCatalog, TypeDecl};
use crate::command::{CommandContext, CommandSpec};
use crate::compiler::TemplateCompiler;
use crate::dispatcher::Dispatcher;
use crate::error::{CompileError, EngineResult};
use crate::registry::{Converter, ConverterRegistry};
use crate::types::{SourceValues, TypeRef, Value};
use std::collections::HashMap;
use tracing::debug;

/// A reflective method compiled against its declaring type.
#[derive(Debug, Clone)]
pub struct CompiledMethod {
    name: String,
    returns: TypeRef,
    command: CommandContext,
}

impl CompiledMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn returns(&self) -> &TypeRef {
        &self.returns
    }

    pub fn command(&self) -> &CommandContext {
        &self.command
    }
}

/// Read-only after [`EngineBuilder::build`]; share it behind an `Arc` to
/// invoke commands from several threads.
pub struct Engine {
    registry: ConverterRegistry,
    catalog: TypeCatalog,
    constructors: HashMap<String, Vec<CommandContext>>,
    methods: HashMap<String, Vec<CompiledMethod>>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Compiled constructors of a composite type, in declaration order.
    pub fn constructors(&self, type_name: &str) -> &[CommandContext] {
        self.constructors.get(type_name).map_or(&[], Vec::as_slice)
    }

    /// Compiled reflective methods of a composite type.
    pub fn methods(&self, type_name: &str) -> &[CompiledMethod] {
        self.methods.get(type_name).map_or(&[], Vec::as_slice)
    }

    /// Compile a command declaration against this engine.
    pub fn compile(&self, spec: &CommandSpec) -> Result<CommandContext, CompileError> {
        TemplateCompiler::new(self).compile(spec)
    }

    /// Parse `input` for `command` and invoke its callable.
    pub fn invoke(
        &self,
        command: &CommandContext,
        input: &str,
        sources: &SourceValues,
    ) -> EngineResult<Value> {
        Dispatcher::new(self).invoke(command, input, sources)
    }
}

/// Collects converters and type declarations before the engine is frozen.
pub struct EngineBuilder {
    registry: ConverterRegistry,
    catalog: TypeCatalog,
}

impl EngineBuilder {
    /// Start from the built-in converters.
    pub fn new() -> Self {
        Self {
            registry: ConverterRegistry::with_defaults(),
            catalog: TypeCatalog::new(),
        }
    }

    /// Replace the registry, e.g. with [`ConverterRegistry::new`] for no built-ins.
    pub fn registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn converter(mut self, converter: Converter) -> Self {
        self.registry.register(converter);
        self
    }

    pub fn object(mut self, decl: TypeDecl) -> Self {
        self.catalog.declare_object(decl);
        self
    }

    pub fn enumeration(mut self, decl: EnumDecl) -> Self {
        self.catalog.declare_enum(decl);
        self
    }

    /// Check the catalog and compile every constructor and method.
    pub fn build(self) -> Result<Engine, CompileError> {
        self.catalog.check()?;

        let mut engine = Engine {
            registry: self.registry,
            catalog: self.catalog,
            constructors: HashMap::new(),
            methods: HashMap::new(),
        };

        let mut constructors = HashMap::new();
        let mut methods = HashMap::new();
        for decl in engine.catalog.objects() {
            let compiled = decl
                .constructors
                .iter()
                .map(|spec| engine.compile(spec))
                .collect::<Result<Vec<_>, _>>()?;
            constructors.insert(decl.name.clone(), compiled);

            let compiled = decl
                .methods
                .iter()
                .map(|method| {
                    Ok(CompiledMethod {
                        name: method.spec.name().to_string(),
                        returns: method.returns.clone(),
                        command: engine.compile(&method.spec)?,
                    })
                })
                .collect::<Result<Vec<_>, CompileError>>()?;
            methods.insert(decl.name.clone(), compiled);
        }

        engine.constructors = constructors;
        engine.methods = methods;
        debug!(
            converters = engine.registry.len(),
            types = engine.constructors.len(),
            "Engine built"
        );
        Ok(engine)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
