//! Rendering a single field value to text.

use crate::assemble::{NULL_TEXT, SEPARATOR};
use crate::introspect::{Introspector, Shape};

/// Render `value` with the introspector's view of its shape.
///
/// Arrays render as `[e0, e1, ...]` with every element rendered by the same
/// rule, so nested arrays become nested brackets. Everything else is the
/// value's own textual form; nested objects are not walked here.
pub fn render_value<I: Introspector>(introspector: &I, value: &I::Value) -> String {
    let mut out = String::new();
    write_value(introspector, value, &mut out);
    out
}

fn write_value<I: Introspector>(introspector: &I, value: &I::Value, out: &mut String) {
    match introspector.inspect(value) {
        Shape::Null => out.push_str(NULL_TEXT),
        Shape::Text(text) => out.push_str(&text),
        Shape::Array(elements) => {
            out.push('[');
            for (i, element) in elements.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(SEPARATOR);
                }
                write_value(introspector, element, out);
            }
            out.push(']');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{ClassRegistry, DynValue, Runtime};

    fn render(value: &DynValue) -> String {
        let registry = ClassRegistry::new(Vec::new()).unwrap();
        render_value(&Runtime::new(&registry), value)
    }

    #[test]
    fn scalars_use_their_own_text() {
        assert_eq!(render(&DynValue::from(5)), "5");
        assert_eq!(render(&DynValue::from("Al")), "Al");
        assert_eq!(render(&DynValue::from(true)), "true");
        assert_eq!(render(&DynValue::from(2.5)), "2.5");
    }

    #[test]
    fn null_renders_literally() {
        assert_eq!(render(&DynValue::Null), "null");
    }

    #[test]
    fn arrays_keep_element_order() {
        let nums = DynValue::Array(vec![3.into(), 1.into(), 2.into()]);
        assert_eq!(render(&nums), "[3, 1, 2]");
    }

    #[test]
    fn empty_array_is_bare_brackets() {
        assert_eq!(render(&DynValue::Array(Vec::new())), "[]");
    }

    #[test]
    fn null_elements_and_nested_arrays() {
        let value = DynValue::Array(vec![
            DynValue::Null,
            DynValue::Array(vec![1.into(), 2.into()]),
            DynValue::Array(Vec::new()),
            DynValue::from("s"),
        ]);
        assert_eq!(render(&value), "[null, [1, 2], [], s]");
    }
}
