//! Field enumeration for a single type.
//!
//! Lists the fields a type declares directly, drops type-level members and
//! members carrying the exclusion marker, and orders the rest by name. The
//! ordering compares names bytewise, so `Zeta` sorts before `alpha`.

use crate::introspect::{Introspector, Member};

/// Fields declared directly on `ty` that take part in formatting, sorted by
/// name.
///
/// The sort is stable: a host that reports two members with the same name on
/// one type gets them back in declaration order.
pub fn declared_fields<I: Introspector>(
    introspector: &I,
    ty: &I::Type,
) -> impl Iterator<Item = I::Member> + use<I> {
    let mut fields: Vec<I::Member> = introspector
        .declared_members(ty)
        .into_iter()
        .filter(|member| !member.is_static() && !member.is_excluded())
        .collect();
    fields.sort_by(|a, b| a.name().cmp(b.name()));
    fields.into_iter()
}
