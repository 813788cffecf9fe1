//! The introspection capability a host runtime provides to the formatter.
//!
//! The formatter never touches a concrete reflection facility. Everything it
//! needs to know about a value is asked through [`Introspector`]:
//!
//! 1. the concrete type of an instance, and that type's direct ancestor,
//! 2. the members a type declares directly, with their name and whether they
//!    are type-level (static) or opted out of formatting,
//! 3. the value of a member on an instance,
//! 4. the shape of a value: absent, an array of further values, or text.
//!
//! Access escalation (reading state a type would normally encapsulate) is
//! confined to [`Introspector::read_member`]. Callers never request it.

use crate::error::AccessError;

/// A member declared on a type.
pub trait Member {
    /// The member's name as it appears in formatted output.
    fn name(&self) -> &str;

    /// Whether the member belongs to the type rather than to instances.
    fn is_static(&self) -> bool;

    /// Whether the member carries the host's "exclude from formatting" marker.
    fn is_excluded(&self) -> bool;
}

/// How a value presents itself to the renderer.
#[derive(Debug)]
pub enum Shape<'v, V: ?Sized> {
    /// The absence-of-value sentinel.
    Null,

    /// An array; elements are rendered with the same rules, in order.
    Array(Vec<&'v V>),

    /// Anything else, already converted with the value's own textual form.
    Text(String),
}

/// A host runtime's introspection facility.
pub trait Introspector {
    /// What gets formatted: an object whose fields are walked.
    type Instance: ?Sized;

    /// What a field holds.
    type Value: ?Sized;

    /// Handle to a type in the host's hierarchy.
    type Type: Clone;

    /// Handle to a member declared on a type.
    type Member: Member;

    /// The concrete runtime type of an instance.
    fn type_of(&self, instance: &Self::Instance) -> Self::Type;

    /// Display name of a type, used for logging and errors.
    fn type_name(&self, ty: &Self::Type) -> String;

    /// The direct ancestor of a type, `None` at the top of the hierarchy.
    fn ancestor(&self, ty: &Self::Type) -> Option<Self::Type>;

    /// Members declared directly on `ty`, in declaration order, inherited
    /// members excluded. Static and excluded members are included here; the
    /// enumerator filters them.
    fn declared_members(&self, ty: &Self::Type) -> Vec<Self::Member>;

    /// Read `member` off `instance`, overriding visibility if the host
    /// requires it.
    fn read_member<'v>(
        &self,
        instance: &'v Self::Instance,
        member: &Self::Member,
    ) -> Result<&'v Self::Value, AccessError>;

    /// Classify a value for rendering.
    fn inspect<'v>(&self, value: &'v Self::Value) -> Shape<'v, Self::Value>;
}
