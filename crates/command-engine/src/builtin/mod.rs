//! Built-in converters.

mod collections;
mod composite;
mod primitives;
pub(crate) mod reflective;
mod source;

use crate::registry::{Converter, ConverterRegistry};

pub(crate) use composite::object_converter;

/// Register every built-in converter except the composite fallback,
/// which the registry owns directly.
pub(crate) fn register_defaults(registry: &mut ConverterRegistry) {
    for converter in defaults() {
        registry.register(converter);
    }
}

fn defaults() -> Vec<Converter> {
    let mut converters = primitives::converters();
    converters.extend(collections::converters());
    converters.extend(composite::converters());
    converters.extend(source::converters());
    converters
}
