//! Vector maths over the `Vector3` composite type.

use crate::commands::CommandModule;
use command_engine::{
    Arguments, BoxError, CommandSpec, ParameterSpec, Record, TypeDecl, TypeRef, Value,
};

pub struct VectorCommands;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Vector3 {
    x: f64,
    y: f64,
    z: f64,
}

impl Vector3 {
    fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn from_record(record: &Record) -> Result<Self, BoxError> {
        Ok(Self::new(record.float("x")?, record.float("y")?, record.float("z")?))
    }

    fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    fn into_value(self) -> Value {
        Value::Record(
            Record::new("Vector3")
                .with("x", Value::Float(self.x))
                .with("y", Value::Float(self.y))
                .with("z", Value::Float(self.z)),
        )
    }
}

fn vector_arg(args: &Arguments, index: usize) -> Result<Vector3, BoxError> {
    Vector3::from_record(args.record(index)?)
}

fn coordinates(names: &[&str]) -> Vec<ParameterSpec> {
    names
        .iter()
        .map(|name| ParameterSpec::new(*name, TypeRef::Double))
        .collect()
}

fn vector_parameter(name: &str) -> ParameterSpec {
    ParameterSpec::new(name, TypeRef::object("Vector3"))
}

impl CommandModule for VectorCommands {
    fn name(&self) -> &str {
        "vector"
    }

    fn types(&self) -> Vec<TypeDecl> {
        vec![TypeDecl::new("Vector3")
            .constructor(coordinates(&["x", "y", "z"]), |args| {
                Ok(Vector3::new(args.float(0)?, args.float(1)?, args.float(2)?).into_value())
            })
            .constructor(coordinates(&["x", "y"]), |args| {
                Ok(Vector3::new(args.float(0)?, args.float(1)?, 0.0).into_value())
            })
            .method(
                "unit",
                TypeRef::object("Vector3"),
                coordinates(&["x", "y", "z"]),
                |args| {
                    let vector = Vector3::new(args.float(0)?, args.float(1)?, args.float(2)?);
                    let length = vector.length();
                    if length == 0.0 {
                        return Err("a zero vector has no direction".into());
                    }
                    Ok(Vector3::new(vector.x / length, vector.y / length, vector.z / length)
                        .into_value())
                },
            )
            .constant("ZERO", TypeRef::object("Vector3"), Vector3::new(0.0, 0.0, 0.0).into_value())
            .constant("UP", TypeRef::object("Vector3"), Vector3::new(0.0, 0.0, 1.0).into_value())]
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("vadd")
                .description("Add two vectors")
                .parameter(vector_parameter("a"))
                .parameter(vector_parameter("b"))
                .reflect("Vector3")
                .handler(|args| Ok(vector_arg(args, 0)?.add(vector_arg(args, 1)?).into_value())),
            CommandSpec::new("length")
                .alias("len")
                .description("Length of a vector")
                .parameter(vector_parameter("v"))
                .reflect("Vector3")
                .handler(|args| Ok(Value::Float(vector_arg(args, 0)?.length()))),
            CommandSpec::new("dot")
                .description("Dot product of two vectors")
                .parameter(vector_parameter("a"))
                .parameter(vector_parameter("b"))
                .reflect("Vector3")
                .handler(|args| Ok(Value::Float(vector_arg(args, 0)?.dot(vector_arg(args, 1)?)))),
            CommandSpec::new("cross")
                .description("Cross product of two vectors")
                .parameter(vector_parameter("a"))
                .parameter(vector_parameter("b"))
                .reflect("Vector3")
                .handler(|args| Ok(vector_arg(args, 0)?.cross(vector_arg(args, 1)?).into_value())),
            CommandSpec::new("scale")
                .description("Multiply a vector by a factor")
                .template("Vector3 <by> Double")
                .parameter(vector_parameter("v"))
                .parameter(ParameterSpec::new("factor", TypeRef::Double))
                .reflect("Vector3")
                .handler(|args| Ok(vector_arg(args, 0)?.scale(args.float(1)?).into_value())),
        ]
    }
}
