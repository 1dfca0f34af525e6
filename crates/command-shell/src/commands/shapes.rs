//! A sealed `Shape` hierarchy resolved through its children.

use crate::commands::CommandModule;
use command_engine::{BoxError, CommandSpec, ParameterSpec, Record, TypeDecl, TypeRef, Value};
use std::f64::consts::PI;

pub struct ShapeCommands;

fn shape(kind: &str, area: f64, perimeter: f64) -> Value {
    Value::Record(
        Record::new(kind)
            .with("area", Value::Float(area))
            .with("perimeter", Value::Float(perimeter)),
    )
}

fn positive(value: f64, name: &str) -> Result<f64, BoxError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{} must be positive", name).into())
    }
}

fn measure(shapes: &[Value], field: &str) -> Result<f64, BoxError> {
    let mut total = 0.0;
    for shape in shapes {
        total += shape.as_record().ok_or("expected a shape")?.float(field)?;
    }
    Ok(total)
}

impl CommandModule for ShapeCommands {
    fn name(&self) -> &str {
        "shapes"
    }

    fn types(&self) -> Vec<TypeDecl> {
        let length = |name: &str| ParameterSpec::new(name, TypeRef::Double);
        vec![
            TypeDecl::new("Shape")
                .child("Rectangle")
                .child("Square")
                .child("Circle"),
            TypeDecl::new("Rectangle").parent("Shape").alias("Rect").constructor(
                vec![length("width"), length("height")],
                |args| {
                    let width = positive(args.float(0)?, "width")?;
                    let height = positive(args.float(1)?, "height")?;
                    Ok(shape("Rectangle", width * height, 2.0 * (width + height)))
                },
            ),
            TypeDecl::new("Square").parent("Shape").constructor(vec![length("side")], |args| {
                let side = positive(args.float(0)?, "side")?;
                Ok(shape("Square", side * side, 4.0 * side))
            }),
            TypeDecl::new("Circle").parent("Shape").constructor(vec![length("radius")], |args| {
                let radius = positive(args.float(0)?, "radius")?;
                Ok(shape("Circle", PI * radius * radius, 2.0 * PI * radius))
            }),
        ]
    }

    fn commands(&self) -> Vec<CommandSpec> {
        let shapes = || {
            ParameterSpec::new("shapes", TypeRef::array(TypeRef::object("Shape")))
                .implicit()
                .children()
        };
        vec![
            CommandSpec::new("area")
                .description("Total area of one or more shapes")
                .parameter(shapes())
                .handler(|args| Ok(Value::Float(measure(args.items(0)?, "area")?))),
            CommandSpec::new("perimeter")
                .description("Total perimeter of one or more shapes")
                .parameter(shapes())
                .handler(|args| Ok(Value::Float(measure(args.items(0)?, "perimeter")?))),
            CommandSpec::new("describe")
                .description("Show a single shape")
                .parameter(ParameterSpec::new("shape", TypeRef::object("Shape")).children())
                .handler(|args| Ok(args.get(0)?.clone())),
        ]
    }
}
