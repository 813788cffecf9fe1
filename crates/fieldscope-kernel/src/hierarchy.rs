//! Walking a value's type hierarchy.
//!
//! The walk starts at the instance's concrete type and follows
//! [`Introspector::ancestor`] until the top of the hierarchy. Fields are
//! enumerated per type and concatenated, so every field of a descendant
//! precedes every field of its ancestors. Fields are never merged by name:
//! a field shadowed by a descendant still appears under its declaring type.

use crate::enumerate::declared_fields;
use crate::introspect::Introspector;
use tracing::trace;

/// The concrete type of `instance` followed by each of its ancestors,
/// most-derived first.
pub fn type_chain<'i, I: Introspector>(
    introspector: &'i I,
    instance: &I::Instance,
) -> impl Iterator<Item = I::Type> + use<'i, I> {
    std::iter::successors(Some(introspector.type_of(instance)), move |ty| {
        introspector.ancestor(ty)
    })
}

/// Every formattable field of `instance`, in output order.
pub fn hierarchy_fields<'i, I: Introspector>(
    introspector: &'i I,
    instance: &I::Instance,
) -> impl Iterator<Item = I::Member> + use<'i, I> {
    type_chain(introspector, instance).flat_map(move |ty| {
        trace!(type_name = %introspector.type_name(&ty), "enumerating declared fields");
        declared_fields(introspector, &ty)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{ClassDef, ClassRegistry, DynObject, FieldDef, Runtime};
    use crate::introspect::Member;

    fn registry() -> ClassRegistry {
        ClassRegistry::new(vec![
            ClassDef::new("Animal")
                .field(FieldDef::new("name"))
                .field(FieldDef::new("legs")),
            ClassDef::new("Dog")
                .parent("Animal")
                .field(FieldDef::new("name"))
                .field(FieldDef::new("breed")),
            ClassDef::new("Puppy").parent("Dog"),
        ])
        .unwrap()
    }

    #[test]
    fn chain_runs_most_derived_first() {
        let registry = registry();
        let runtime = Runtime::new(&registry);
        let puppy = DynObject::new("Puppy");
        let chain: Vec<String> = type_chain(&runtime, &puppy)
            .map(|ty| registry.class(ty).unwrap().name.clone())
            .collect();
        assert_eq!(chain, ["Puppy", "Dog", "Animal", "Object"]);
    }

    #[test]
    fn descendant_fields_precede_ancestor_fields() {
        let registry = registry();
        let runtime = Runtime::new(&registry);
        let dog = DynObject::new("Dog");
        let fields: Vec<String> = hierarchy_fields(&runtime, &dog)
            .map(|m| format!("{}.{}", m.owner(), m.name()))
            .collect();
        assert_eq!(
            fields,
            ["Dog.breed", "Dog.name", "Animal.legs", "Animal.name"]
        );
    }
}
