//! Integer commands: collections, defaults and enums.

use crate::commands::CommandModule;
use command_engine::{BoxError, CommandSpec, EnumDecl, ParameterSpec, TypeRef, Value};

pub struct NumberCommands;

const MAX_RANGE: i64 = 1000;

fn integers(values: &[Value]) -> Result<Vec<i64>, BoxError> {
    values
        .iter()
        .map(|value| {
            value
                .as_i64()
                .ok_or_else(|| BoxError::from(format!("{} is not an integer", value)))
        })
        .collect()
}

fn reduce(operation: &str, values: &[i64]) -> Result<i64, BoxError> {
    let result = match operation {
        "SUM" => values.iter().try_fold(0i64, |acc, v| acc.checked_add(*v)),
        "PRODUCT" => values.iter().try_fold(1i64, |acc, v| acc.checked_mul(*v)),
        "MIN" => values.iter().copied().min(),
        "MAX" => values.iter().copied().max(),
        other => return Err(format!("unknown operation {}", other).into()),
    };
    result.ok_or_else(|| format!("{} overflowed or had no values", operation.to_lowercase()).into())
}

impl CommandModule for NumberCommands {
    fn name(&self) -> &str {
        "numbers"
    }

    fn enums(&self) -> Vec<EnumDecl> {
        vec![EnumDecl::new("Operation", ["SUM", "PRODUCT", "MIN", "MAX"])]
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("contains")
                .description("Whether a number appears in an array")
                .parameter(ParameterSpec::new("num", TypeRef::Int))
                .parameter(ParameterSpec::new("numbers", TypeRef::array(TypeRef::Int)).unrequired("[]"))
                .handler(|args| {
                    let num = args.int(0)?;
                    Ok(Value::Bool(integers(args.items(1)?)?.contains(&num)))
                }),
            CommandSpec::new("sum")
                .alias("total")
                .description("Sum a list of numbers")
                .parameter(ParameterSpec::new("numbers", TypeRef::list(TypeRef::Int)))
                .handler(|args| Ok(Value::Int(reduce("SUM", &integers(args.items(0)?)?)?))),
            CommandSpec::new("implicit")
                .description("A number, an unbracketed array, then a word")
                .parameter(ParameterSpec::new("num", TypeRef::Int))
                .parameter(ParameterSpec::new("values", TypeRef::array(TypeRef::Int)).implicit())
                .parameter(ParameterSpec::new("stop", TypeRef::Str))
                .handler(|args| {
                    Ok(Value::str(format!(
                        "{} - {} - {}",
                        args.get(0)?,
                        args.get(1)?,
                        args.get(2)?
                    )))
                }),
            CommandSpec::new("unique")
                .description("Distinct numbers in first-seen order")
                .parameter(
                    ParameterSpec::new("numbers", TypeRef::set(TypeRef::Int))
                        .implicit()
                        .unmodifiable(),
                )
                .handler(|args| Ok(args.get(0)?.clone())),
            CommandSpec::new("reduce")
                .description("Combine numbers with an operation")
                .parameter(ParameterSpec::new("operation", TypeRef::enumeration("Operation")))
                .parameter(ParameterSpec::new("values", TypeRef::array(TypeRef::Long)).implicit())
                .handler(|args| {
                    let values = integers(args.items(1)?)?;
                    Ok(Value::Int(reduce(args.constant(0)?, &values)?))
                }),
            CommandSpec::new("range")
                .description("Numbers from start to end")
                .template("Integer <to> Integer [by] Integer")
                .parameter(ParameterSpec::new("start", TypeRef::Int))
                .parameter(ParameterSpec::new("end", TypeRef::Int))
                .parameter(ParameterSpec::new("step", TypeRef::Int).unrequired("1"))
                .handler(|args| {
                    let (start, end, step) = (args.int(0)?, args.int(1)?, args.int(2)?);
                    if step <= 0 {
                        return Err("step must be positive".into());
                    }
                    if (end - start) / step > MAX_RANGE {
                        return Err(format!("ranges are limited to {} values", MAX_RANGE).into());
                    }
                    let step = usize::try_from(step)?;
                    let values = (start..=end).step_by(step).map(Value::Int).collect();
                    Ok(Value::List(values))
                }),
            CommandSpec::new("parity")
                .description("Check a yes/no answer against a number's parity")
                .parameter(ParameterSpec::new("num", TypeRef::Long))
                .parameter(ParameterSpec::new("even", TypeRef::Bool).unrequired("true"))
                .handler(|args| {
                    let even = args.int(0)? % 2 == 0;
                    Ok(Value::Bool(even == args.bool(1)?))
                }),
        ]
    }
}
