//! A class-based runtime whose types are only known at run time.
//!
//! Classes have single inheritance, static fields, private fields and
//! annotations; the annotation [`SKIP_FIELD`] opts a field out of
//! formatting. Reading a private field goes through an access override
//! that the runtime can refuse, per field (`sealed`) or wholesale
//! ([`Runtime::without_access_override`]).
//!
//! Every hierarchy ends in the implicit [`ROOT_CLASS`], which declares no
//! fields.
//!
//! ## Documents
//!
//! A [`World`] bundles classes, an object and options as JSON:
//!
//! ```json
//! {
//!   "classes": [
//!     {"name": "Base", "fields": [{"name": "y"}]},
//!     {"name": "Derived", "parent": "Base", "fields": [{"name": "x"}]}
//!   ],
//!   "object": {"class": "Derived", "fields": {"Derived": {"x": 1}, "Base": {"y": 2}}}
//! }
//! ```

mod model;
mod value;

pub use model::{
    ClassDef, ClassId, ClassRegistry, FieldDef, ROOT_CLASS, SKIP_FIELD, ToStringHook, Visibility,
};
pub use value::{DynObject, DynValue};

use crate::error::{AccessError, FormatError, ModelError};
use crate::formatter::Formatter;
use crate::introspect::{Introspector, Member, Shape};
use crate::options::FormatOptions;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static NULL: DynValue = DynValue::Null;

/// A field of a registered class, together with the class that declares it.
#[derive(Debug, Clone, Copy)]
pub struct DynMember<'r> {
    owner: &'r ClassDef,
    def: &'r FieldDef,
}

impl<'r> DynMember<'r> {
    /// Name of the declaring class.
    pub fn owner(&self) -> &'r str {
        &self.owner.name
    }

    /// The field's definition.
    pub fn def(&self) -> &'r FieldDef {
        self.def
    }
}

impl Member for DynMember<'_> {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn is_static(&self) -> bool {
        self.def.is_static
    }

    fn is_excluded(&self) -> bool {
        self.def.has_annotation(SKIP_FIELD)
    }
}

/// Introspection over a [`ClassRegistry`].
#[derive(Debug, Clone)]
pub struct Runtime<'r> {
    registry: &'r ClassRegistry,
    allow_access_override: bool,
    options: FormatOptions,
}

impl<'r> Runtime<'r> {
    /// A runtime over `registry` that allows access overrides.
    ///
    /// Prefer [`format`](Self::format) over a raw [`Formatter`] built on
    /// this runtime: only `format` checks the object against the registry.
    pub fn new(registry: &'r ClassRegistry) -> Self {
        Self {
            registry,
            allow_access_override: true,
            options: FormatOptions::default(),
        }
    }

    /// Refuse every access override: private fields become unreadable.
    pub fn without_access_override(mut self) -> Self {
        self.allow_access_override = false;
        self
    }

    /// Options used by [`format`](Self::format), including for nested
    /// objects whose class renders reflectively.
    pub fn with_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    /// The classes this runtime resolves against.
    pub fn registry(&self) -> &'r ClassRegistry {
        self.registry
    }

    /// Validate `object` against the registry, then format it.
    pub fn format(&self, object: Option<&DynObject>) -> Result<String, ModelError> {
        if let Some(object) = object {
            self.registry.validate(object)?;
        }
        Ok(self.formatter().format(object))
    }

    /// Strict variant of [`format`](Self::format): unreadable fields are
    /// errors.
    pub fn try_format(&self, object: Option<&DynObject>) -> Result<String, FormatError> {
        if let Some(object) = object {
            self.registry.validate(object)?;
        }
        self.formatter().try_format(object)
    }

    fn formatter(&self) -> Formatter<'_, Self> {
        Formatter::with_options(self, self.options.clone())
    }

    fn object_text(&self, object: &DynObject) -> String {
        let Some(class) = self.registry.lookup(&object.class) else {
            warn!(class = %object.class, "nested object of unregistered class");
            return format!("{}@{:x}", object.class, object.id);
        };
        match self.registry.class(class).map(|c| &c.to_string) {
            Some(ToStringHook::Fixed(text)) => text.clone(),
            Some(ToStringHook::Reflective) => self.formatter().format(Some(object)),
            Some(ToStringHook::Identity) | None => format!("{}@{:x}", object.class, object.id),
        }
    }
}

/// Raw introspection does not validate. An object of an unregistered class
/// is treated as an instance of [`ROOT_CLASS`] and its slots are not
/// printed; [`Runtime::format`] and [`Runtime::try_format`] reject such
/// objects instead.
impl<'r> Introspector for Runtime<'r> {
    type Instance = DynObject;
    type Value = DynValue;
    type Type = ClassId;
    type Member = DynMember<'r>;

    fn type_of(&self, instance: &DynObject) -> ClassId {
        self.registry.lookup(&instance.class).unwrap_or_else(|| {
            warn!(class = %instance.class, "unregistered class, treating as root");
            self.registry.root()
        })
    }

    fn type_name(&self, ty: &ClassId) -> String {
        self.registry
            .class(*ty)
            .map_or_else(|| format!("{ty:?}"), |class| class.name.clone())
    }

    fn ancestor(&self, ty: &ClassId) -> Option<ClassId> {
        self.registry.parent(*ty)
    }

    fn declared_members(&self, ty: &ClassId) -> Vec<DynMember<'r>> {
        let Some(owner) = self.registry.class(*ty) else {
            return Vec::new();
        };
        owner
            .fields
            .iter()
            .map(|def| DynMember { owner, def })
            .collect()
    }

    fn read_member<'v>(
        &self,
        instance: &'v DynObject,
        member: &DynMember<'r>,
    ) -> Result<&'v DynValue, AccessError> {
        if member.def.visibility == Visibility::Private {
            let refusal = if !self.allow_access_override {
                Some("access override disabled")
            } else if member.def.sealed {
                Some("access override refused for sealed field")
            } else {
                None
            };
            if let Some(reason) = refusal {
                return Err(AccessError::Inaccessible {
                    type_name: member.owner.name.clone(),
                    field: member.def.name.clone(),
                    reason: reason.to_string(),
                });
            }
            debug!(
                class = %member.owner.name,
                field = %member.def.name,
                "overriding access to private field"
            );
        }
        Ok(instance
            .get(&member.owner.name, &member.def.name)
            .unwrap_or(&NULL))
    }

    fn inspect<'v>(&self, value: &'v DynValue) -> Shape<'v, DynValue> {
        match value {
            DynValue::Null => Shape::Null,
            DynValue::Bool(b) => Shape::Text(b.to_string()),
            DynValue::Int(i) => Shape::Text(i.to_string()),
            DynValue::UInt(u) => Shape::Text(u.to_string()),
            DynValue::Float(f) => Shape::Text(f.to_string()),
            DynValue::Str(s) => Shape::Text(s.clone()),
            DynValue::Array(elements) => Shape::Array(elements.iter().collect()),
            DynValue::Object(object) => Shape::Text(self.object_text(object)),
        }
    }
}

/// Classes, an object and options in one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub classes: Vec<ClassDef>,

    /// The object to format; `null` formats as `null`.
    #[serde(default)]
    pub object: Option<DynObject>,

    #[serde(default)]
    pub options: FormatOptions,

    #[serde(default = "default_access_override")]
    pub access_override: bool,
}

fn default_access_override() -> bool {
    true
}

impl World {
    /// Parse a world document.
    pub fn from_json_str(s: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Build the registry and format the object.
    pub fn render(&self) -> Result<String, ModelError> {
        let registry = ClassRegistry::new(self.classes.clone())?;
        let mut runtime = Runtime::new(&registry).with_options(self.options.clone());
        if !self.access_override {
            runtime = runtime.without_access_override();
        }
        runtime.format(self.object.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_registry() -> ClassRegistry {
        ClassRegistry::new(vec![
            ClassDef::new("Person")
                .field(FieldDef::new("name"))
                .field(FieldDef::new("age")),
        ])
        .unwrap()
    }

    #[test]
    fn fieldless_object() {
        let registry = ClassRegistry::new(vec![ClassDef::new("Empty")]).unwrap();
        let runtime = Runtime::new(&registry);
        assert_eq!(runtime.format(Some(&DynObject::new("Empty"))).unwrap(), "{}");
    }

    #[test]
    fn alphabetical_within_a_class() {
        let registry = person_registry();
        let al = DynObject::new("Person")
            .set("Person", "name", "Al")
            .set("Person", "age", 5);
        let out = Runtime::new(&registry).format(Some(&al)).unwrap();
        assert_eq!(out, "{age: 5, name: Al}");
    }

    #[test]
    fn unset_field_reads_as_null() {
        let registry = person_registry();
        let out = Runtime::new(&registry)
            .format(Some(&DynObject::new("Person").set("Person", "age", 1)))
            .unwrap();
        assert_eq!(out, "{age: 1, name: null}");
    }

    #[test]
    fn derived_first_then_ancestors() {
        let registry = ClassRegistry::new(vec![
            ClassDef::new("Base").field(FieldDef::new("a")),
            ClassDef::new("Derived").parent("Base").field(FieldDef::new("z")),
        ])
        .unwrap();
        let obj = DynObject::new("Derived")
            .set("Derived", "z", 26)
            .set("Base", "a", 1);
        let out = Runtime::new(&registry).format(Some(&obj)).unwrap();
        assert_eq!(out, "{z: 26, a: 1}");
    }

    #[test]
    fn shadowed_field_appears_per_declaring_class() {
        let registry = ClassRegistry::new(vec![
            ClassDef::new("Base").field(FieldDef::new("id").private()),
            ClassDef::new("Derived").parent("Base").field(FieldDef::new("id")),
        ])
        .unwrap();
        let obj = DynObject::new("Derived")
            .set("Derived", "id", "outer")
            .set("Base", "id", "inner");
        let out = Runtime::new(&registry).format(Some(&obj)).unwrap();
        assert_eq!(out, "{id: outer, id: inner}");
    }

    #[test]
    fn private_fields_need_the_override() {
        let registry = ClassRegistry::new(vec![
            ClassDef::new("Account")
                .field(FieldDef::new("balance").private())
                .field(FieldDef::new("holder")),
        ])
        .unwrap();
        let obj = DynObject::new("Account")
            .set("Account", "balance", 10)
            .set("Account", "holder", "Al");

        let open = Runtime::new(&registry);
        assert_eq!(open.format(Some(&obj)).unwrap(), "{balance: 10, holder: Al}");

        let closed = Runtime::new(&registry).without_access_override();
        assert_eq!(
            closed.format(Some(&obj)).unwrap(),
            "{balance: <unreadable>, holder: Al}"
        );
        assert!(matches!(
            closed.try_format(Some(&obj)),
            Err(FormatError::Unreadable(AccessError::Inaccessible { .. }))
        ));
    }

    #[test]
    fn nested_objects_use_their_class_hook() {
        let registry = ClassRegistry::new(vec![
            ClassDef::new("Point")
                .field(FieldDef::new("x"))
                .field(FieldDef::new("y"))
                .to_string_hook(ToStringHook::Reflective),
            ClassDef::new("Tag").to_string_hook(ToStringHook::Fixed("#tag".into())),
            ClassDef::new("Opaque"),
            ClassDef::new("Shape")
                .field(FieldDef::new("origin"))
                .field(FieldDef::new("tag"))
                .field(FieldDef::new("handle")),
        ])
        .unwrap();
        let shape = DynObject::new("Shape")
            .set(
                "Shape",
                "origin",
                DynObject::new("Point").set("Point", "x", 1).set("Point", "y", 2),
            )
            .set("Shape", "tag", DynObject::new("Tag"))
            .set("Shape", "handle", DynObject::new("Opaque").with_id(0x2a));
        let out = Runtime::new(&registry).format(Some(&shape)).unwrap();
        assert_eq!(out, "{handle: Opaque@2a, origin: {x: 1, y: 2}, tag: #tag}");
    }

    #[test]
    fn format_rejects_unregistered_class() {
        let registry = person_registry();
        let err = Runtime::new(&registry)
            .format(Some(&DynObject::new("Robot")))
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownClass(_)));
    }

    #[test]
    fn strict_format_rejects_unregistered_class_with_slots() {
        let registry = person_registry();
        let ghost = DynObject::new("Ghost").set("Ghost", "x", 1);
        let runtime = Runtime::new(&registry);
        let err = runtime.try_format(Some(&ghost)).unwrap_err();
        assert!(matches!(err, FormatError::Model(ModelError::UnknownClass(ref c)) if c == "Ghost"));
        assert_eq!(Formatter::new(&runtime).format(Some(&ghost)), "{}");
    }

    #[test]
    fn integers_beyond_i64_keep_their_digits() {
        let world = World::from_json_str(
            r#"{
                "classes": [{"name": "P", "fields": [{"name": "n"}, {"name": "m"}]}],
                "object": {"class": "P", "fields": {"P": {"n": 18446744073709551615, "m": -1}}}
            }"#,
        )
        .unwrap();
        assert_eq!(world.render().unwrap(), "{m: -1, n: 18446744073709551615}");
    }

    #[test]
    fn world_document_round_trip_through_render() {
        let world = World::from_json_str(
            r#"{
                "classes": [{"name": "P", "fields": [{"name": "nums"}]}],
                "object": {"class": "P", "fields": {"P": {"nums": [3, 1, 2]}}}
            }"#,
        )
        .unwrap();
        assert_eq!(world.render().unwrap(), "{nums: [3, 1, 2]}");
    }

    #[test]
    fn world_without_object_renders_null() {
        let world = World::from_json_str(r#"{"classes": []}"#).unwrap();
        assert_eq!(world.render().unwrap(), "null");
    }
}
