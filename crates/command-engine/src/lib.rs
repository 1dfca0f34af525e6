//! Command template engine: compiles typed command declarations into token
//! sequences and dispatches raw text input against them.

mod builtin;
mod catalog;
mod command;
mod compiler;
mod context;
mod cursor;
mod dispatcher;
mod engine;
mod error;
mod registry;
mod token;
mod types;

pub use catalog::{ConstantDecl, EnumDecl, MethodDecl, TypeCatalog, TypeDecl};
pub use command::{CommandContext, CommandSpec, FnInvokable, Invokable, ParameterBinding};
pub use compiler::TemplateCompiler;
pub use context::{ContextState, InvocationContext, Snapshot};
pub use cursor::Cursor;
pub use dispatcher::{CallablePanicked, Dispatcher};
pub use engine::{CompiledMethod, Engine, EngineBuilder};
pub use error::{BoxError, CompileError, EngineError, EngineResult, FormatError};
pub use registry::{
    ConvertFn, Converter, ConverterBuilder, ConverterKind, ConverterRegistry, Resolved,
    TypeMatcher, TypePredicate,
};
pub use token::{LiteralToken, PlaceholderToken, Token};
pub use types::*;
