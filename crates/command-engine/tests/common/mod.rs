//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use command_engine::{
    Arguments, BoxError, CommandContext, CommandSpec, Engine, EnumDecl, ParameterSpec, Record,
    SourceValues, TypeDecl, TypeRef, Value,
};

pub fn vector(x: f64, y: f64, z: f64) -> Value {
    Value::Record(
        Record::new("Vector3")
            .with("x", Value::Float(x))
            .with("y", Value::Float(y))
            .with("z", Value::Float(z)),
    )
}

fn components(args: &Arguments) -> Result<(f64, f64, f64), BoxError> {
    Ok((args.float(0)?, args.float(1)?, args.float(2)?))
}

fn coordinate(name: &str) -> ParameterSpec {
    ParameterSpec::new(name, TypeRef::Double)
}

/// `Vector3` with a three and a two component constructor, a `unit` method
/// and a `ZERO` constant. `Shape` is sealed over `Rectangle` and `Circle`.
pub fn engine() -> Engine {
    Engine::builder()
        .object(
            TypeDecl::new("Vector3")
                .constructor(
                    vec![coordinate("x"), coordinate("y"), coordinate("z")],
                    |args| {
                        let (x, y, z) = components(args)?;
                        Ok(vector(x, y, z))
                    },
                )
                .constructor(vec![coordinate("x"), coordinate("y")], |args| {
                    Ok(vector(args.float(0)?, args.float(1)?, 0.0))
                })
                .method(
                    "unit",
                    TypeRef::object("Vector3"),
                    vec![coordinate("x"), coordinate("y"), coordinate("z")],
                    |args| {
                        let (x, y, z) = components(args)?;
                        let length = (x * x + y * y + z * z).sqrt();
                        if length == 0.0 {
                            return Err("cannot normalise a zero vector".into());
                        }
                        Ok(vector(x / length, y / length, z / length))
                    },
                )
                .constant("ZERO", TypeRef::object("Vector3"), vector(0.0, 0.0, 0.0)),
        )
        .object(TypeDecl::new("Shape").child("Rectangle").child("Circle"))
        .object(
            TypeDecl::new("Rectangle")
                .parent("Shape")
                .constructor(vec![coordinate("width"), coordinate("height")], |args| {
                    Ok(Value::Record(
                        Record::new("Rectangle")
                            .with("area", Value::Float(args.float(0)? * args.float(1)?)),
                    ))
                }),
        )
        .object(
            TypeDecl::new("Circle")
                .parent("Shape")
                .constructor(vec![coordinate("radius")], |args| {
                    let radius = args.float(0)?;
                    Ok(Value::Record(
                        Record::new("Circle")
                            .with("area", Value::Float(std::f64::consts::PI * radius * radius)),
                    ))
                }),
        )
        .enumeration(EnumDecl::new("Color", ["RED", "GREEN", "BLUE"]))
        .build()
        .expect("fixture engine builds")
}

/// Compile a command that returns its converted arguments as a list.
pub fn echo(engine: &Engine, spec: CommandSpec) -> CommandContext {
    engine
        .compile(&spec.handler(|args| Ok(Value::List(args.clone().into_vec()))))
        .expect("command compiles")
}

/// Invoke `command` with no source values and return the argument list.
pub fn run(engine: &Engine, command: &CommandContext, input: &str) -> Result<Vec<Value>, String> {
    match engine.invoke(command, input, &SourceValues::new()) {
        Ok(Value::List(values)) => Ok(values),
        Ok(other) => Ok(vec![other]),
        Err(err) => Err(err.to_string()),
    }
}

pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}
