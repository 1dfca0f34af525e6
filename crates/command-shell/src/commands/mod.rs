//! Command modules offered by the shell.

mod numbers;
mod shapes;
mod text;
mod vector;

pub use numbers::NumberCommands;
pub use shapes::ShapeCommands;
pub use text::TextCommands;
pub use vector::VectorCommands;

use command_engine::{CommandSpec, EnumDecl, TypeDecl};

/// A group of commands together with the types they declare.
pub trait CommandModule: Send + Sync {
    /// Module name, used in logs.
    fn name(&self) -> &str;

    /// Composite types this module's commands use.
    fn types(&self) -> Vec<TypeDecl> {
        Vec::new()
    }

    /// Enums this module's commands use.
    fn enums(&self) -> Vec<EnumDecl> {
        Vec::new()
    }

    fn commands(&self) -> Vec<CommandSpec>;
}

/// Every built-in module.
pub fn all() -> Vec<Box<dyn CommandModule>> {
    vec![
        Box::new(NumberCommands),
        Box::new(VectorCommands),
        Box::new(ShapeCommands),
        Box::new(TextCommands),
    ]
}
