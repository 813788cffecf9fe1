//! Introspection over plain Rust values.
//!
//! Rust keeps no field metadata at run time, so types describe themselves:
//! [`Typed`] hands out a `'static` [`TypeInfo`], and [`Reflect`] reads field
//! values by their index in that descriptor. `#[derive(Reflect)]` writes
//! both impls.
//!
//! Inheritance is composition. A field marked `#[reflect(base)]` holds the
//! ancestor value; its type becomes [`TypeInfo::parent`] and
//! [`Reflect::base`] returns it. The base field itself is not a member.
//!
//! ```
//! use fieldscope_kernel::Reflect;
//!
//! #[derive(Reflect)]
//! struct Base {
//!     y: i32,
//! }
//!
//! #[derive(Reflect)]
//! struct Derived {
//!     #[reflect(base)]
//!     base: Base,
//!     x: i32,
//!     #[reflect(skip)]
//!     cache: std::cell::Cell<u64>,
//! }
//!
//! let value = Derived { base: Base { y: 2 }, x: 1, cache: Default::default() };
//! assert_eq!(fieldscope_kernel::format(&value), "{x: 1, y: 2}");
//! ```
//!
//! ## What the derive rejects
//!
//! Only non-generic structs with named fields (or no fields) can derive
//! [`Reflect`]. Each of the following is a compile error:
//!
//! ```compile_fail
//! #[derive(fieldscope_kernel::Reflect)]
//! enum Color {
//!     Red,
//! }
//! ```
//!
//! ```compile_fail
//! #[derive(fieldscope_kernel::Reflect)]
//! union Bits {
//!     word: u32,
//! }
//! ```
//!
//! ```compile_fail
//! #[derive(fieldscope_kernel::Reflect)]
//! struct Pair(i32, i32);
//! ```
//!
//! ```compile_fail
//! #[derive(fieldscope_kernel::Reflect)]
//! struct Wrapper<T> {
//!     inner: T,
//! }
//! ```
//!
//! ```compile_fail
//! #[derive(fieldscope_kernel::Reflect)]
//! struct A {
//!     a: i32,
//! }
//!
//! #[derive(fieldscope_kernel::Reflect)]
//! struct TwoBases {
//!     #[reflect(base)]
//!     first: A,
//!     #[reflect(base)]
//!     second: A,
//! }
//! ```
//!
//! ```compile_fail
//! #[derive(fieldscope_kernel::Reflect)]
//! #[reflect(display, verbose)]
//! struct Loud {
//!     level: u8,
//! }
//!
//! impl std::fmt::Display for Loud {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{}", self.level)
//!     }
//! }
//! ```
//!
//! ```compile_fail
//! #[derive(fieldscope_kernel::Reflect)]
//! struct Odd {
//!     #[reflect(hidden)]
//!     value: i32,
//! }
//! ```

use crate::error::AccessError;
use crate::formatter::Formatter;
use crate::introspect::{Introspector, Member, Shape};
use crate::options::FormatOptions;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Whether a field lives on instances or on the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Instance,
    Static,
}

/// A field declared by a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Opted out of formatting.
    pub excluded: bool,
}

impl FieldInfo {
    pub const fn instance(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Instance,
            excluded: false,
        }
    }

    pub const fn type_level(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Static,
            excluded: false,
        }
    }

    pub const fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }
}

/// Static description of a type.
#[derive(Debug)]
pub struct TypeInfo {
    pub name: &'static str,
    /// Fields in declaration order; [`Reflect::field`] indexes into this.
    pub fields: &'static [FieldInfo],
    pub parent: Option<fn() -> &'static TypeInfo>,
}

/// Types with a static descriptor.
pub trait Typed {
    fn type_info() -> &'static TypeInfo;
}

/// An instance whose fields can be read by descriptor index.
pub trait Reflect: 'static {
    /// Descriptor of the concrete type.
    fn reflected_type(&self) -> &'static TypeInfo;

    /// Value of the field at `index` in [`TypeInfo::fields`].
    ///
    /// `None` for indices out of range and for fields that have no instance
    /// value (static or excluded fields).
    fn field(&self, index: usize) -> Option<&dyn ReflectValue>;

    /// The ancestor part of this value.
    fn base(&self) -> Option<&dyn Reflect> {
        None
    }
}

/// A value that can appear in a field.
pub trait ReflectValue: 'static {
    fn shape(&self) -> Shape<'_, dyn ReflectValue>;
}

// ─── Field values ───────────────────────────────────────────────────────────

macro_rules! text_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ReflectValue for $ty {
                fn shape(&self) -> Shape<'_, dyn ReflectValue> {
                    Shape::Text(self.to_string())
                }
            }
        )*
    };
}

text_values!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, str,
    String,
);

impl<T: ReflectValue> ReflectValue for Option<T> {
    fn shape(&self) -> Shape<'_, dyn ReflectValue> {
        match self {
            Some(value) => value.shape(),
            None => Shape::Null,
        }
    }
}

impl<T: ReflectValue + ?Sized> ReflectValue for &'static T {
    fn shape(&self) -> Shape<'_, dyn ReflectValue> {
        (**self).shape()
    }
}

impl<T: ReflectValue + ?Sized> ReflectValue for Box<T> {
    fn shape(&self) -> Shape<'_, dyn ReflectValue> {
        (**self).shape()
    }
}

impl<T: ReflectValue + ?Sized> ReflectValue for Rc<T> {
    fn shape(&self) -> Shape<'_, dyn ReflectValue> {
        (**self).shape()
    }
}

impl<T: ReflectValue + ?Sized> ReflectValue for Arc<T> {
    fn shape(&self) -> Shape<'_, dyn ReflectValue> {
        (**self).shape()
    }
}

fn elements<'v, T: ReflectValue>(
    items: impl Iterator<Item = &'v T>,
) -> Shape<'v, dyn ReflectValue> {
    Shape::Array(items.map(|item| item as &dyn ReflectValue).collect())
}

impl<T: ReflectValue> ReflectValue for [T] {
    fn shape(&self) -> Shape<'_, dyn ReflectValue> {
        elements(self.iter())
    }
}

impl<T: ReflectValue, const N: usize> ReflectValue for [T; N] {
    fn shape(&self) -> Shape<'_, dyn ReflectValue> {
        elements(self.iter())
    }
}

impl<T: ReflectValue> ReflectValue for Vec<T> {
    fn shape(&self) -> Shape<'_, dyn ReflectValue> {
        elements(self.iter())
    }
}

impl<T: ReflectValue> ReflectValue for VecDeque<T> {
    fn shape(&self) -> Shape<'_, dyn ReflectValue> {
        elements(self.iter())
    }
}

// ─── Introspector ───────────────────────────────────────────────────────────

/// The descriptor of a type at some depth below the concrete type.
#[derive(Debug, Clone, Copy)]
pub struct NativeType {
    pub info: &'static TypeInfo,
    /// How many [`Reflect::base`] hops separate it from the instance.
    pub depth: usize,
}

/// A field of a [`NativeType`].
#[derive(Debug, Clone, Copy)]
pub struct NativeField {
    pub owner: &'static str,
    pub info: &'static FieldInfo,
    pub index: usize,
    pub depth: usize,
}

impl Member for NativeField {
    fn name(&self) -> &str {
        self.info.name
    }

    fn is_static(&self) -> bool {
        self.info.kind == FieldKind::Static
    }

    fn is_excluded(&self) -> bool {
        self.info.excluded
    }
}

/// The [`Introspector`] for [`Reflect`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Native;

impl Introspector for Native {
    type Instance = dyn Reflect;
    type Value = dyn ReflectValue;
    type Type = NativeType;
    type Member = NativeField;

    fn type_of(&self, instance: &dyn Reflect) -> NativeType {
        NativeType {
            info: instance.reflected_type(),
            depth: 0,
        }
    }

    fn type_name(&self, ty: &NativeType) -> String {
        ty.info.name.to_string()
    }

    fn ancestor(&self, ty: &NativeType) -> Option<NativeType> {
        ty.info.parent.map(|parent| NativeType {
            info: parent(),
            depth: ty.depth + 1,
        })
    }

    fn declared_members(&self, ty: &NativeType) -> Vec<NativeField> {
        ty.info
            .fields
            .iter()
            .enumerate()
            .map(|(index, info)| NativeField {
                owner: ty.info.name,
                info,
                index,
                depth: ty.depth,
            })
            .collect()
    }

    fn read_member<'v>(
        &self,
        instance: &'v dyn Reflect,
        member: &NativeField,
    ) -> Result<&'v dyn ReflectValue, AccessError> {
        let missing = || AccessError::Missing {
            type_name: member.owner.to_string(),
            field: member.info.name.to_string(),
        };
        let mut target = instance;
        for _ in 0..member.depth {
            target = target.base().ok_or_else(missing)?;
        }
        target.field(member.index).ok_or_else(missing)
    }

    fn inspect<'v>(&self, value: &'v dyn ReflectValue) -> Shape<'v, dyn ReflectValue> {
        value.shape()
    }
}

/// Format a value as `{name: value, ...}`.
pub fn format(value: &dyn Reflect) -> String {
    Formatter::new(&Native).format(Some(value))
}

/// Format an optional value; `None` gives `null`.
pub fn format_opt<T: Reflect>(value: Option<&T>) -> String {
    Formatter::new(&Native).format(value.map(|v| v as &dyn Reflect))
}

/// Format with explicit options.
pub fn format_with(value: &dyn Reflect, options: &FormatOptions) -> String {
    Formatter::with_options(&Native, options.clone()).format(Some(value))
}

/// Displays the wrapped value the way [`format`] does.
///
/// ```
/// use fieldscope_kernel::{Reflect, Reflected};
///
/// #[derive(Reflect)]
/// struct Job {
///     id: u32,
/// }
///
/// assert_eq!(Reflected(&Job { id: 7 }).to_string(), "{id: 7}");
/// ```
pub struct Reflected<'a, T: Reflect>(pub &'a T);

impl<T: Reflect> fmt::Display for Reflected<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self.0))
    }
}
