//! The formatter: enumerate, render, assemble.

use crate::assemble::{NULL_TEXT, assemble, fragment};
use crate::error::{AccessError, FormatError};
use crate::hierarchy::hierarchy_fields;
use crate::introspect::{Introspector, Member};
use crate::options::FormatOptions;
use crate::render::render_value;
use tracing::{debug, trace, warn};

/// Formats instances of one host runtime.
///
/// Borrows the introspector; holds no state between calls, so formatting
/// the same unmodified value twice yields the same text.
pub struct Formatter<'i, I: Introspector> {
    introspector: &'i I,
    options: FormatOptions,
}

impl<'i, I: Introspector> Formatter<'i, I> {
    /// A formatter with default [`FormatOptions`].
    ///
    /// The formatter trusts the introspector; hosts that validate instances
    /// (such as [`Runtime::format`](crate::dynamic::Runtime::format)) do so
    /// before formatting.
    pub fn new(introspector: &'i I) -> Self {
        Self::with_options(introspector, FormatOptions::default())
    }

    /// A formatter using `options` for unreadable fields.
    pub fn with_options(introspector: &'i I, options: FormatOptions) -> Self {
        Self {
            introspector,
            options,
        }
    }

    /// The options in effect.
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Format `instance` as `{name: value, ...}`, or `null` when absent.
    ///
    /// Fields that cannot be read are printed according to
    /// [`FormatOptions::unreadable`]; they are never dropped.
    pub fn format(&self, instance: Option<&I::Instance>) -> String {
        let Some(instance) = instance else {
            return NULL_TEXT.to_string();
        };
        self.log_start(instance);
        assemble(
            hierarchy_fields(self.introspector, instance).map(|member| {
                match self.introspector.read_member(instance, &member) {
                    Ok(value) => self.render_field(&member, value),
                    Err(err) => {
                        warn!(%err, "substituting unreadable field");
                        fragment(member.name(), self.options.unreadable_text())
                    }
                }
            }),
        )
    }

    /// Like [`format`](Self::format), but fails on the first unreadable field.
    pub fn try_format(&self, instance: Option<&I::Instance>) -> Result<String, FormatError> {
        let Some(instance) = instance else {
            return Ok(NULL_TEXT.to_string());
        };
        self.log_start(instance);
        let fragments = hierarchy_fields(self.introspector, instance)
            .map(|member| {
                let value = self.introspector.read_member(instance, &member)?;
                Ok(self.render_field(&member, value))
            })
            .collect::<Result<Vec<_>, AccessError>>()?;
        Ok(assemble(fragments))
    }

    fn render_field(&self, member: &I::Member, value: &I::Value) -> String {
        let rendered = fragment(member.name(), &render_value(self.introspector, value));
        trace!(fragment = %rendered, "rendered field");
        rendered
    }

    fn log_start(&self, instance: &I::Instance) {
        let ty = self.introspector.type_of(instance);
        debug!(type_name = %self.introspector.type_name(&ty), "formatting instance");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{ClassDef, ClassRegistry, DynObject, DynValue, FieldDef, Runtime};
    use crate::options::UnreadablePolicy;

    fn guarded() -> ClassRegistry {
        ClassRegistry::new(vec![
            ClassDef::new("Vault")
                .field(FieldDef::new("label"))
                .field(FieldDef::new("key").private().sealed())
                .field(FieldDef::new("owner").private()),
        ])
        .unwrap()
    }

    fn vault() -> DynObject {
        DynObject::new("Vault")
            .set("Vault", "label", "main")
            .set("Vault", "key", "hunter2")
            .set("Vault", "owner", "Al")
    }

    #[test]
    fn null_input_short_circuits() {
        let registry = guarded();
        let runtime = Runtime::new(&registry);
        let formatter = Formatter::new(&runtime);
        assert_eq!(formatter.format(None), "null");
        assert_eq!(formatter.try_format(None).unwrap(), "null");
    }

    #[test]
    fn sealed_field_gets_sentinel_by_default() {
        let registry = guarded();
        let runtime = Runtime::new(&registry);
        let out = Formatter::new(&runtime).format(Some(&vault()));
        assert_eq!(out, "{key: <unreadable>, label: main, owner: Al}");
    }

    #[test]
    fn null_policy_reproduces_silent_null() {
        let registry = guarded();
        let runtime = Runtime::new(&registry);
        let options = FormatOptions {
            unreadable: UnreadablePolicy::Null,
            ..FormatOptions::default()
        };
        let out = Formatter::with_options(&runtime, options).format(Some(&vault()));
        assert_eq!(out, "{key: null, label: main, owner: Al}");
    }

    #[test]
    fn strict_format_reports_the_field() {
        let registry = guarded();
        let runtime = Runtime::new(&registry);
        let err = Formatter::new(&runtime)
            .try_format(Some(&vault()))
            .unwrap_err();
        match err {
            FormatError::Unreadable(access) => assert_eq!(access.field(), "key"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn strict_format_matches_lenient_when_everything_reads() {
        let registry = ClassRegistry::new(vec![
            ClassDef::new("P")
                .field(FieldDef::new("name"))
                .field(FieldDef::new("age")),
        ])
        .unwrap();
        let runtime = Runtime::new(&registry);
        let p = DynObject::new("P")
            .set("P", "name", "Al")
            .set("P", "age", 5);
        let formatter = Formatter::new(&runtime);
        assert_eq!(formatter.format(Some(&p)), "{age: 5, name: Al}");
        assert_eq!(formatter.try_format(Some(&p)).unwrap(), "{age: 5, name: Al}");
    }

    #[test]
    fn idempotent() {
        let registry = guarded();
        let runtime = Runtime::new(&registry);
        let formatter = Formatter::new(&runtime);
        let v = vault().set("Vault", "label", DynValue::Null);
        assert_eq!(formatter.format(Some(&v)), formatter.format(Some(&v)));
    }
}
