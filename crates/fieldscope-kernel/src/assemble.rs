//! Joining rendered fields into the final text.

/// Text of an absent value, both for a null field and a null input.
pub const NULL_TEXT: &str = "null";

/// Separator between fragments and between array elements.
pub const SEPARATOR: &str = ", ";

/// A single `name: value` fragment.
pub fn fragment(name: &str, rendered: &str) -> String {
    format!("{name}: {rendered}")
}

/// Wrap fragments in braces, comma-separated. No fragments gives `{}`.
pub fn assemble<S: AsRef<str>>(fragments: impl IntoIterator<Item = S>) -> String {
    let mut out = String::from("{");
    for (i, fragment) in fragments.into_iter().enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        out.push_str(fragment.as_ref());
    }
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_fragments() {
        assert_eq!(assemble(Vec::<String>::new()), "{}");
    }

    #[test]
    fn joins_without_trailing_separator() {
        let parts = [fragment("age", "5"), fragment("name", "Al")];
        assert_eq!(assemble(&parts), "{age: 5, name: Al}");
    }
}
