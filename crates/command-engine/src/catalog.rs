//! Declared enums and composite types.
//!
//! Composite types carry their own capability table: constructors, the
//! methods that may be invoked reflectively as `Alias.method(args)` and the
//! constants reachable as `Alias.CONSTANT`. Nothing is discovered at runtime;
//! a member is reachable only if it was declared here.

use crate::command::{CommandSpec, Invokable};
use crate::error::{BoxError, CompileError};
use crate::types::{Arguments, ParameterSpec, TypeKey, TypeRef, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// An enum type whose values are matched by constant name.
#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub constants: Vec<String>,
}

impl EnumDecl {
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        }
    }

    /// Declared spelling of `text`, matched case-insensitively.
    pub fn constant(&self, text: &str) -> Option<&str> {
        self.constants
            .iter()
            .find(|c| c.eq_ignore_ascii_case(text))
            .map(String::as_str)
    }
}

/// A method callable through `Alias.method(args)`.
#[derive(Clone)]
pub struct MethodDecl {
    pub returns: TypeRef,
    pub spec: CommandSpec,
}

/// A value reachable through `Alias.CONSTANT`.
#[derive(Debug, Clone)]
pub struct ConstantDecl {
    pub name: String,
    pub ty: TypeRef,
    pub value: Value,
}

/// A composite type built from nested arguments, `Alias(arg arg ...)`.
#[derive(Clone)]
pub struct TypeDecl {
    pub name: String,
    pub alias: String,
    pub parent: Option<String>,
    /// Sealed subtypes, tried in this order.
    pub children: Vec<String>,
    pub constructors: Vec<CommandSpec>,
    pub methods: Vec<MethodDecl>,
    pub constants: Vec<ConstantDecl>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
            parent: None,
            children: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Name users type before the opening parenthesis. Defaults to the type name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn child(mut self, child: impl Into<String>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Add a constructor. Constructors are tried in declaration order.
    pub fn constructor<F>(mut self, parameters: Vec<ParameterSpec>, handler: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        let mut spec = CommandSpec::new(self.name.clone()).handler(handler);
        for parameter in parameters {
            spec = spec.parameter(parameter);
        }
        self.constructors.push(spec);
        self
    }

    /// Add a constructor with a template and its own reflection allow-list.
    pub fn constructor_spec(mut self, spec: CommandSpec) -> Self {
        self.constructors.push(spec);
        self
    }

    pub fn method<F>(
        mut self,
        name: impl Into<String>,
        returns: TypeRef,
        parameters: Vec<ParameterSpec>,
        handler: F,
    ) -> Self
    where
        F: Fn(&Arguments) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        let mut spec = CommandSpec::new(name).handler(handler);
        for parameter in parameters {
            spec = spec.parameter(parameter);
        }
        self.methods.push(MethodDecl { returns, spec });
        self
    }

    pub fn method_with(mut self, returns: TypeRef, spec: CommandSpec, invokable: Arc<dyn Invokable>) -> Self {
        self.methods.push(MethodDecl {
            returns,
            spec: spec.invokable(invokable),
        });
        self
    }

    pub fn constant(mut self, name: impl Into<String>, ty: TypeRef, value: Value) -> Self {
        self.constants.push(ConstantDecl {
            name: name.into(),
            ty,
            value,
        });
        self
    }

    /// Constant matched case-insensitively by name.
    pub fn find_constant(&self, name: &str) -> Option<&ConstantDecl> {
        self.constants
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// All declared enums and composite types.
#[derive(Clone, Default)]
pub struct TypeCatalog {
    objects: HashMap<String, TypeDecl>,
    enums: HashMap<String, EnumDecl>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_object(&mut self, decl: TypeDecl) {
        self.objects.insert(decl.name.clone(), decl);
    }

    pub fn declare_enum(&mut self, decl: EnumDecl) {
        self.enums.insert(decl.name.clone(), decl);
    }

    pub fn object(&self, name: &str) -> Option<&TypeDecl> {
        self.objects.get(name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.get(name)
    }

    pub fn objects(&self) -> impl Iterator<Item = &TypeDecl> {
        self.objects.values()
    }

    /// User-facing name of a type, as written in templates and usage strings.
    pub fn alias_of(&self, ty: &TypeRef) -> String {
        if let Some(alias) = ty.builtin_alias() {
            return alias.to_string();
        }
        match ty {
            TypeRef::Array(element) => format!("{}[]", self.alias_of(element)),
            TypeRef::Object(name) => self
                .objects
                .get(name)
                .map_or_else(|| name.clone(), |decl| decl.alias.clone()),
            TypeRef::Enum(name) | TypeRef::Source(name) => name.clone(),
            _ => String::new(),
        }
    }

    /// Registry keys of the declared ancestors of `ty`, nearest first.
    pub fn supertypes(&self, ty: &TypeRef) -> Vec<TypeKey> {
        let TypeRef::Object(name) = ty else {
            return Vec::new();
        };
        let mut seen = HashSet::from([name.as_str()]);
        let mut chain = Vec::new();
        let mut current = self.objects.get(name).and_then(|d| d.parent.as_deref());
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            chain.push(TypeKey::Object(parent.to_string()));
            current = self.objects.get(parent).and_then(|d| d.parent.as_deref());
        }
        chain
    }

    /// Whether a value of type `from` can be used where `to` is expected.
    pub fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        from == to
            || *to == TypeRef::Any
            || matches!(to, TypeRef::Object(name) if self.supertypes(from).contains(&TypeKey::Object(name.clone())))
    }

    /// Whether `value` has the shape of `ty`.
    pub fn conforms(&self, value: &Value, ty: &TypeRef) -> bool {
        match (value, ty) {
            (Value::None, _) | (_, TypeRef::Any) => true,
            (Value::Frozen(inner), _) => self.conforms(inner, ty),
            (Value::Int(_), TypeRef::Byte | TypeRef::Short | TypeRef::Int | TypeRef::Long) => true,
            (Value::Float(_), TypeRef::Float | TypeRef::Double) => true,
            (Value::Bool(_), TypeRef::Bool) => true,
            (Value::Char(_), TypeRef::Char) => true,
            (Value::Str(_), TypeRef::Str) => true,
            (Value::Enum { type_name, .. }, TypeRef::Enum(name)) => type_name == name,
            (Value::List(items), TypeRef::List(e))
            | (Value::Set(items), TypeRef::Set(e))
            | (Value::Array(items), TypeRef::Array(e)) => {
                items.iter().all(|item| self.conforms(item, e))
            }
            (Value::Record(record), TypeRef::Object(_)) => self.is_assignable(
                &TypeRef::Object(record.type_name().to_string()),
                ty,
            ),
            _ => false,
        }
    }

    /// Fail if `ty` references an undeclared enum or composite type.
    pub fn validate(&self, ty: &TypeRef) -> Result<(), CompileError> {
        match ty {
            TypeRef::List(e) | TypeRef::Set(e) | TypeRef::Array(e) => self.validate(e),
            TypeRef::Enum(name) if !self.enums.contains_key(name) => {
                Err(CompileError::UnknownType(name.clone()))
            }
            TypeRef::Object(name) if !self.objects.contains_key(name) => {
                Err(CompileError::UnknownType(name.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Check parents, children and constants of every declared type.
    pub(crate) fn check(&self) -> Result<(), CompileError> {
        for decl in self.objects.values() {
            for related in decl.parent.iter().chain(&decl.children) {
                if !self.objects.contains_key(related) {
                    return Err(CompileError::UnknownType(related.clone()));
                }
            }

            for constant in &decl.constants {
                self.validate(&constant.ty)?;
                if !self.conforms(&constant.value, &constant.ty) {
                    return Err(CompileError::InvalidMember {
                        type_name: decl.name.clone(),
                        member: constant.name.clone(),
                        reason: format!(
                            "value {} is not a {}",
                            constant.value,
                            self.alias_of(&constant.ty)
                        ),
                    });
                }
            }

            for method in &decl.methods {
                self.validate(&method.returns)?;
                if method.spec.name().is_empty() {
                    return Err(CompileError::InvalidMember {
                        type_name: decl.name.clone(),
                        member: String::new(),
                        reason: "methods must be named".into(),
                    });
                }
            }
        }
        Ok(())
    }
}
