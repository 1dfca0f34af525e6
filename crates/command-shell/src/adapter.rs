//! Routes prefixed lines to compiled commands.

use crate::commands::CommandModule;
use crate::config::ShellConfig;
use crate::error::AppResult;
use crate::message::Message;
use command_engine::{CommandContext, Engine, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const HELP: &str = "help";

/// Outcome of handling one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The command ran and returned a value.
    Value(Value),
    /// Informational text, such as help output.
    Text(String),
    /// The line was a command but could not be run.
    Error(String),
}

/// Owns the engine and every compiled command, keyed by lowercase alias.
pub struct CommandAdapter {
    engine: Arc<Engine>,
    commands: Vec<CommandContext>,
    aliases: HashMap<String, usize>,
    prefix: String,
    preserve_whitespace: bool,
}

impl CommandAdapter {
    /// Declare every module's types, then compile its commands.
    pub fn new(modules: &[Box<dyn CommandModule>], settings: &ShellConfig) -> AppResult<Self> {
        let mut builder = Engine::builder();
        for module in modules {
            for decl in module.types() {
                builder = builder.object(decl);
            }
            for decl in module.enums() {
                builder = builder.enumeration(decl);
            }
        }
        let engine = Arc::new(builder.build()?);

        let mut adapter = Self {
            engine,
            commands: Vec::new(),
            aliases: HashMap::new(),
            prefix: settings.prefix.clone(),
            preserve_whitespace: settings.preserve_whitespace,
        };
        for module in modules {
            let specs = module.commands();
            debug!(module = module.name(), commands = specs.len(), "Registering module");
            for spec in specs {
                let command = adapter.engine.compile(&spec)?;
                adapter.register(command);
            }
        }

        info!("Registered {} commands", adapter.commands.len());
        Ok(adapter)
    }

    fn register(&mut self, command: CommandContext) {
        let index = self.commands.len();
        let mut bound = 0;
        for alias in command.aliases() {
            let key = alias.to_lowercase();
            if key == HELP || self.aliases.contains_key(&key) {
                warn!(command = command.name(), alias = %alias, "Alias already taken, skipping");
                continue;
            }
            self.aliases.insert(key, index);
            bound += 1;
        }
        if bound > 0 {
            self.commands.push(command);
        } else {
            warn!(command = command.name(), "Command has no free alias and was not registered");
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn commands(&self) -> &[CommandContext] {
        &self.commands
    }

    /// Command registered under `alias`, ignoring case.
    pub fn find(&self, alias: &str) -> Option<&CommandContext> {
        self.aliases
            .get(&alias.to_lowercase())
            .map(|&index| &self.commands[index])
    }

    /// Handle a line. Returns `None` when it is not addressed to the shell.
    pub fn handle(&self, message: &Message) -> Option<Reply> {
        let body = message.text.trim_start().strip_prefix(self.prefix.as_str())?;
        let body = if self.preserve_whitespace {
            body.trim().to_string()
        } else {
            body.split_whitespace().collect::<Vec<_>>().join(" ")
        };
        if body.is_empty() {
            return None;
        }

        let (alias, input) = body
            .split_once(char::is_whitespace)
            .unwrap_or((body.as_str(), ""));
        if alias.eq_ignore_ascii_case(HELP) {
            return Some(self.help(input.trim()));
        }

        let Some(command) = self.find(alias) else {
            debug!(alias = %alias, "Unknown command");
            return Some(Reply::Error(format!(
                "Unknown command '{}'. Try {}{}",
                alias, self.prefix, HELP
            )));
        };

        let reply = match self.engine.invoke(command, input, &message.sources()) {
            Ok(value) => Reply::Value(value),
            Err(err) => Reply::Error(format!(
                "{}\nUsage: {}{} {}",
                err,
                self.prefix,
                command.name(),
                command.usage()
            )),
        };
        Some(reply)
    }

    /// All commands, or the one named by `topic`.
    pub fn help(&self, topic: &str) -> Reply {
        if !topic.is_empty() {
            return match self.find(topic) {
                Some(command) => Reply::Text(self.describe(command, true)),
                None => Reply::Error(format!("No command named '{}'", topic)),
            };
        }

        let mut lines = vec!["Commands:".to_string()];
        lines.extend(self.commands.iter().map(|command| self.describe(command, false)));
        Reply::Text(lines.join("\n"))
    }

    fn describe(&self, command: &CommandContext, detailed: bool) -> String {
        let usage = format!("{}{} {}", self.prefix, command.name(), command.usage());
        let mut text = format!("{} - {}", usage.trim_end(), command.description());
        if detailed {
            if command.aliases().len() > 1 {
                text.push_str(&format!("\nAliases: {}", command.aliases()[1..].join(", ")));
            }
            let names = command.name_usage();
            if !names.is_empty() {
                text.push_str(&format!("\nParameters: {}", names));
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{self, CommandModule};
    use crate::config::{IdentityConfig, ShellConfig};
    use command_engine::{CommandSpec, ParameterSpec, TypeRef};

    struct Clashing;

    impl CommandModule for Clashing {
        fn name(&self) -> &str {
            "clashing"
        }

        fn commands(&self) -> Vec<CommandSpec> {
            vec![
                CommandSpec::new("first")
                    .alias("same")
                    .handler(|_| Ok(Value::Int(1))),
                CommandSpec::new("SAME")
                    .alias("second")
                    .parameter(ParameterSpec::new("n", TypeRef::Int))
                    .handler(|args| Ok(Value::Int(args.int(0)?))),
                CommandSpec::new("help").handler(|_| Ok(Value::None)),
            ]
        }
    }

    fn line(text: &str) -> Message {
        Message::new(text, &IdentityConfig::default())
    }

    #[test]
    fn test_alias_collisions_are_skipped() {
        let modules: Vec<Box<dyn CommandModule>> = vec![Box::new(Clashing)];
        let adapter = CommandAdapter::new(&modules, &ShellConfig::default()).unwrap();

        assert_eq!(adapter.commands().len(), 2);
        assert_eq!(adapter.find("SAME").unwrap().name(), "first");
        assert_eq!(adapter.handle(&line("!second 4")), Some(Reply::Value(Value::Int(4))));
        assert!(matches!(adapter.handle(&line("!help")), Some(Reply::Text(_))));
    }

    #[test]
    fn test_prefix_and_whitespace() {
        let adapter = CommandAdapter::new(&commands::all(), &ShellConfig::default()).unwrap();

        assert_eq!(adapter.handle(&line("sum [1 2]")), None);
        assert_eq!(adapter.handle(&line("!")), None);
        assert_eq!(
            adapter.handle(&line("  !SUM   [1    2]  ")),
            Some(Reply::Value(Value::Int(3)))
        );
        assert!(matches!(adapter.handle(&line("!nope 1")), Some(Reply::Error(e)) if e.contains("Unknown command 'nope'")));
    }

    #[test]
    fn test_preserved_whitespace_reaches_remaining_text() {
        let settings = ShellConfig {
            preserve_whitespace: true,
            ..ShellConfig::default()
        };
        let adapter = CommandAdapter::new(&commands::all(), &settings).unwrap();

        assert_eq!(
            adapter.handle(&line("!echo a   b")),
            Some(Reply::Value(Value::str("a   b")))
        );
    }

    #[test]
    fn test_error_reply_includes_usage() {
        let adapter = CommandAdapter::new(&commands::all(), &ShellConfig::default()).unwrap();

        let Some(Reply::Error(text)) = adapter.handle(&line("!contains x")) else {
            panic!("expected an error reply");
        };
        assert!(text.ends_with("Usage: !contains <Integer> [Integer[]]"), "{}", text);
    }

    #[test]
    fn test_help_for_one_command() {
        let adapter = CommandAdapter::new(&commands::all(), &ShellConfig::default()).unwrap();

        let Reply::Text(text) = adapter.help("total") else {
            panic!("expected help text");
        };
        assert!(text.starts_with("!sum <List> - Sum a list of numbers"), "{}", text);
        assert!(text.contains("Aliases: total"));
        assert!(text.contains("Parameters: <numbers>"));
        assert!(matches!(adapter.help("missing"), Reply::Error(_)));
    }
}
