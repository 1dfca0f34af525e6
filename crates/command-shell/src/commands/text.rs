//! Text commands, including ones that read who sent the line.

use crate::commands::CommandModule;
use command_engine::{CommandSpec, ParameterSpec, TypeDecl, TypeRef, Value};

pub struct TextCommands;

const MAX_REPEAT: i64 = 20;

impl CommandModule for TextCommands {
    fn name(&self) -> &str {
        "text"
    }

    /// Events are only ever supplied by the host.
    fn types(&self) -> Vec<TypeDecl> {
        vec![TypeDecl::new("Event")]
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("echo")
                .description("Repeat the rest of the line")
                .parameter(ParameterSpec::new("text", TypeRef::Str).remaining())
                .handler(|args| Ok(Value::str(args.str(0)?))),
            CommandSpec::new("repeat")
                .description("Repeat a word or \"quoted text\"")
                .parameter(ParameterSpec::new("text", TypeRef::Str).explicit())
                .parameter(ParameterSpec::new("times", TypeRef::Int).unrequired("2"))
                .handler(|args| {
                    let times = args.int(1)?;
                    if !(1..=MAX_REPEAT).contains(&times) {
                        return Err(format!("times must be between 1 and {}", MAX_REPEAT).into());
                    }
                    let text = args.str(0)?;
                    let copies: Vec<&str> = (0..times).map(|_| text).collect();
                    Ok(Value::str(copies.join(" ")))
                }),
            CommandSpec::new("greet")
                .alias("hi")
                .description("Greet someone, or whoever is typing")
                .parameter(ParameterSpec::new("user", TypeRef::source("User")))
                .parameter(ParameterSpec::new("name", TypeRef::Str).unrequired_none())
                .handler(|args| {
                    let name = match args.get(1)? {
                        Value::None => args.str(0)?,
                        other => other.as_str().ok_or("a name is text")?,
                    };
                    Ok(Value::str(format!("Hello, {}!", name)))
                }),
            CommandSpec::new("whoami")
                .description("Show the user and channel")
                .parameter(ParameterSpec::new("user", TypeRef::source("User")))
                .parameter(ParameterSpec::new("channel", TypeRef::source("Channel")))
                .handler(|args| Ok(Value::str(format!("{} in {}", args.str(0)?, args.str(1)?)))),
            CommandSpec::new("event")
                .description("Show the event that triggered this command")
                .parameter(ParameterSpec::new("event", TypeRef::object("Event")).source())
                .handler(|args| Ok(args.get(0)?.clone())),
            CommandSpec::new("grade")
                .description("Describe a letter grade")
                .parameter(ParameterSpec::new("letter", TypeRef::Char))
                .handler(|args| {
                    let letter = args.char(0)?.to_ascii_uppercase();
                    let meaning = match letter {
                        'A' => "excellent",
                        'B' => "good",
                        'C' => "satisfactory",
                        'D' => "poor",
                        'F' => "failing",
                        _ => return Err(format!("{} is not a grade", letter).into()),
                    };
                    Ok(Value::str(format!("{}: {}", letter, meaning)))
                }),
        ]
    }
}
