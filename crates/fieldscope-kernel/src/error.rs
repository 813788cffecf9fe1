//! Error types for fieldscope kernel operations.

/// A field value could not be read off an instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The host refused access, even after an access override was requested.
    #[error("field `{field}` of `{type_name}` is inaccessible: {reason}")]
    Inaccessible {
        type_name: String,
        field: String,
        reason: String,
    },

    /// The field is declared on the type but the instance has no value for it.
    #[error("field `{field}` of `{type_name}` has no readable value")]
    Missing { type_name: String, field: String },
}

impl AccessError {
    /// Name of the field that could not be read.
    pub fn field(&self) -> &str {
        match self {
            AccessError::Inaccessible { field, .. } | AccessError::Missing { field, .. } => field,
        }
    }
}

/// Errors surfaced by strict formatting.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// A field passed the filter but its value could not be read.
    #[error("unreadable field: {0}")]
    Unreadable(#[from] AccessError),

    /// Formatting options could not be parsed.
    #[error("invalid format options: {0}")]
    Options(#[from] serde_json::Error),

    /// The object does not fit the runtime's model.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors arising from an ill-formed dynamic object model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A class or object names a class that was never registered.
    #[error("unknown class `{0}`")]
    UnknownClass(String),

    /// Two classes share a name.
    #[error("duplicate class `{0}`")]
    DuplicateClass(String),

    /// A class declares the same field name twice.
    #[error("class `{class}` declares field `{field}` twice")]
    DuplicateField { class: String, field: String },

    /// Following parents from a class leads back to it.
    #[error("cyclic ancestry through class `{0}`")]
    CyclicAncestry(String),

    /// An object carries a slot for a field its hierarchy does not declare.
    #[error("object of class `{class}` sets undeclared field `{owner}.{field}`")]
    UndeclaredSlot {
        class: String,
        owner: String,
        field: String,
    },

    /// The model document could not be parsed.
    #[error("malformed model document: {0}")]
    Parse(#[from] serde_json::Error),
}
