//! Property tests for collection parsing and backtracking.

mod common;

use command_engine::{
    Annotation, CommandSpec, InvocationContext, ParameterSpec, SourceValues, TypeRef, Value,
};
use common::{echo, engine, ints, run};
use proptest::prelude::*;

fn bracketed(values: &[i64]) -> String {
    let items: Vec<String> = values.iter().map(i64::to_string).collect();
    format!("[{}]", items.join(" "))
}

proptest! {
    #[test]
    fn explicit_list_keeps_length_and_order(values in prop::collection::vec(any::<i32>(), 0..20)) {
        let values: Vec<i64> = values.into_iter().map(i64::from).collect();
        let engine = engine();
        let command = echo(
            &engine,
            CommandSpec::new("list").parameter(ParameterSpec::new("values", TypeRef::list(TypeRef::Int))),
        );

        let parsed = run(&engine, &command, &bracketed(&values)).unwrap();
        prop_assert_eq!(parsed, vec![Value::List(ints(&values))]);
    }

    #[test]
    fn failed_conversion_leaves_cursor_in_place(
        prefix in "[a-z]{1,8}",
        tail in "( [0-9]{1,3}){0,4}",
    ) {
        let engine = engine();
        let sources = SourceValues::new();
        let reflections: Vec<String> = Vec::new();
        let input = format!("{prefix}{tail}");

        for (ty, annotations) in [
            (TypeRef::Int, vec![]),
            (TypeRef::list(TypeRef::Int), vec![]),
            (TypeRef::list(TypeRef::Int), vec![Annotation::Implicit]),
            (TypeRef::object("Vector3"), vec![]),
            (TypeRef::object("Shape"), vec![Annotation::Children]),
        ] {
            let mut ctx = InvocationContext::new(&engine, &input, &sources, &reflections);
            let before = ctx.cursor().position();
            prop_assert!(ctx.convert(&ty, &annotations).is_err());
            prop_assert_eq!(ctx.cursor().position(), before);
        }
    }

    #[test]
    fn default_substitution_consumes_nothing(first in any::<i32>()) {
        let engine = engine();
        let command = echo(
            &engine,
            CommandSpec::new("pair")
                .parameter(ParameterSpec::new("a", TypeRef::Int))
                .parameter(ParameterSpec::new("b", TypeRef::Int).unrequired("7")),
        );

        let parsed = run(&engine, &command, &first.to_string()).unwrap();
        prop_assert_eq!(parsed, ints(&[i64::from(first), 7]));
    }

    #[test]
    fn implicit_list_stops_before_first_word(values in prop::collection::vec(0i64..1000, 1..10)) {
        let engine = engine();
        let command = echo(
            &engine,
            CommandSpec::new("collect")
                .parameter(ParameterSpec::new("values", TypeRef::list(TypeRef::Int)).implicit())
                .parameter(ParameterSpec::new("stop", TypeRef::Str)),
        );
        let numbers: Vec<String> = values.iter().map(i64::to_string).collect();
        let input = format!("{} end", numbers.join(" "));

        let parsed = run(&engine, &command, &input).unwrap();
        prop_assert_eq!(parsed, vec![Value::List(ints(&values)), Value::str("end")]);
    }
}
