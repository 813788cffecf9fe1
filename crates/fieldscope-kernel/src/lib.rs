//! # fieldscope kernel
//!
//! Deterministic, schema-free object-to-text formatting: given any value,
//! list its fields and their values as `{name: value, ...}`.
//!
//! This crate is **runtime-agnostic**: it does not prescribe how a host
//! discovers fields. It only prescribes which fields are listed, in what
//! order, and how their values are rendered.
//!
//! ## Architecture
//!
//! ```text
//! Introspector          ← Host capability: types, ancestors, members, reads
//!     │
//! declared_fields       ← One type: drop static/excluded, sort by name
//!     │
//! hierarchy_fields      ← Concrete type first, then each ancestor
//!     │
//! render_value          ← null, [arrays, recursively], or the value's own text
//!     │
//! assemble              ← {name: value, ...}
//! ```
//!
//! Two hosts ship with the kernel: [`native`] for Rust structs described by
//! `#[derive(Reflect)]`, and [`dynamic`] for classes and objects built at
//! run time.
//!
//! The output is for people and logs. There is no escaping and no parser.

pub mod assemble;
pub mod dynamic;
pub mod enumerate;
pub mod error;
pub mod formatter;
pub mod hierarchy;
pub mod introspect;
pub mod native;
pub mod options;
pub mod render;

pub use error::{AccessError, FormatError, ModelError};
pub use formatter::Formatter;
pub use introspect::{Introspector, Member, Shape};
pub use native::{
    FieldInfo, FieldKind, Native, Reflect, ReflectValue, Reflected, TypeInfo, Typed, format,
    format_opt, format_with,
};
pub use options::{FormatOptions, UnreadablePolicy};

#[cfg(feature = "derive")]
pub use fieldscope_derive::Reflect;
