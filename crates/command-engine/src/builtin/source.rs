//! Host-supplied values that never consume input.

use crate::registry::{Converter, TypeMatcher};
use crate::types::{Annotation, Priority, TypeRef};

pub(super) fn converters() -> Vec<Converter> {
    vec![
        Converter::builder(
            "source",
            TypeMatcher::predicate("is source", |ty| matches!(ty, TypeRef::Source(_))),
        )
        .source()
        .convert(|ctx| match ctx.expected() {
            TypeRef::Source(key) => ctx.source(key),
            other => ctx.source(&ctx.engine().catalog().alias_of(other)),
        }),
        // Any type can be marked as host-supplied; it is keyed by its alias.
        Converter::builder("annotated source", TypeMatcher::predicate("any type", |_| true))
            .annotation(Annotation::Source)
            .priority(Priority::Early)
            .source()
            .convert(|ctx| {
                let key = ctx.engine().catalog().alias_of(ctx.expected());
                ctx.source(&key)
            }),
    ]
}
