//! Class definitions and the registry that resolves them.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::value::{DynObject, DynValue};

/// Name of the implicit root class every hierarchy ends in.
pub const ROOT_CLASS: &str = "Object";

/// Annotation that opts a field out of formatting.
pub const SKIP_FIELD: &str = "SkipField";

/// Who may read a field without an access override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// A field declared on a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,

    /// Type-level field; never part of an instance.
    #[serde(default, rename = "static")]
    pub is_static: bool,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub annotations: Vec<String>,

    /// The host refuses access overrides on this field.
    #[serde(default)]
    pub sealed: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            visibility: Visibility::Public,
            annotations: Vec::new(),
            sealed: false,
        }
    }

    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.iter().any(|a| a == annotation)
    }
}

/// How an instance of a class renders when it is itself a field value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToStringHook {
    /// `ClassName@<hex id>`.
    #[default]
    Identity,

    /// The formatter's own `{name: value, ...}` form.
    Reflective,

    /// A fixed text.
    Fixed(String),
}

/// A class: a name, an optional parent and the fields it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,

    /// Parent class; [`ROOT_CLASS`] when absent.
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldDef>,

    #[serde(default)]
    pub to_string: ToStringHook,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            to_string: ToStringHook::Identity,
        }
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn to_string_hook(mut self, hook: ToStringHook) -> Self {
        self.to_string = hook;
        self
    }

    fn declares(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }
}

/// Index of a class in a [`ClassRegistry`].
///
/// Only meaningful for the registry that issued it; another registry
/// answers `None` or names a different class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

/// A validated set of classes.
///
/// Construction resolves every parent name and rejects duplicate classes,
/// duplicate fields and cyclic ancestry, so walking parents from any class
/// always reaches [`ROOT_CLASS`].
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    classes: Vec<ClassDef>,
    parents: Vec<Option<ClassId>>,
    by_name: HashMap<String, ClassId>,
}

impl ClassRegistry {
    /// Register `classes` under the implicit [`ROOT_CLASS`] and validate them.
    pub fn new(classes: Vec<ClassDef>) -> Result<Self, ModelError> {
        let mut all = Vec::with_capacity(classes.len() + 1);
        all.push(ClassDef::new(ROOT_CLASS));
        all.extend(classes);

        let mut by_name = HashMap::with_capacity(all.len());
        for (i, class) in all.iter().enumerate() {
            if by_name.insert(class.name.clone(), ClassId(i)).is_some() {
                return Err(ModelError::DuplicateClass(class.name.clone()));
            }
            for (j, field) in class.fields.iter().enumerate() {
                if class.fields[..j].iter().any(|f| f.name == field.name) {
                    return Err(ModelError::DuplicateField {
                        class: class.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        let mut parents = Vec::with_capacity(all.len());
        for (i, class) in all.iter().enumerate() {
            let parent = match (&class.parent, i) {
                (_, 0) => None,
                (None, _) => Some(ClassId(0)),
                (Some(name), _) => Some(
                    *by_name
                        .get(name)
                        .ok_or_else(|| ModelError::UnknownClass(name.clone()))?,
                ),
            };
            parents.push(parent);
        }

        let registry = Self {
            classes: all,
            parents,
            by_name,
        };
        registry.check_acyclic()?;
        Ok(registry)
    }

    /// Parse a JSON array of class definitions.
    pub fn from_json_str(s: &str) -> Result<Self, ModelError> {
        Self::new(serde_json::from_str(s)?)
    }

    fn check_acyclic(&self) -> Result<(), ModelError> {
        for start in 0..self.classes.len() {
            let mut steps = 0;
            let mut current = Some(ClassId(start));
            while let Some(id) = current {
                if steps > self.classes.len() {
                    return Err(ModelError::CyclicAncestry(self.classes[start].name.clone()));
                }
                steps += 1;
                current = self.parent(id);
            }
        }
        Ok(())
    }

    /// Id of the class named `name`.
    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Id of [`ROOT_CLASS`].
    pub fn root(&self) -> ClassId {
        ClassId(0)
    }

    /// Definition of `id`, or `None` for an id this registry never issued.
    pub fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.0)
    }

    /// Parent of `id`; `None` for the root and for foreign ids.
    pub fn parent(&self, id: ClassId) -> Option<ClassId> {
        self.parents.get(id.0).copied().flatten()
    }

    /// Check that `object`, and every object nested in its fields, names a
    /// registered class and only sets fields its hierarchy declares.
    pub fn validate(&self, object: &DynObject) -> Result<(), ModelError> {
        let class = self
            .lookup(&object.class)
            .ok_or_else(|| ModelError::UnknownClass(object.class.clone()))?;
        for (owner, fields) in &object.fields {
            let declaring = std::iter::successors(Some(class), |id| self.parent(*id))
                .filter_map(|id| self.class(id))
                .find(|c| &c.name == owner);
            for (field, value) in fields {
                if !declaring.is_some_and(|c| c.declares(field)) {
                    return Err(ModelError::UndeclaredSlot {
                        class: object.class.clone(),
                        owner: owner.clone(),
                        field: field.clone(),
                    });
                }
                self.validate_value(value)?;
            }
        }
        Ok(())
    }

    fn validate_value(&self, value: &DynValue) -> Result<(), ModelError> {
        match value {
            DynValue::Object(nested) => self.validate(nested),
            DynValue::Array(elements) => elements.iter().try_for_each(|e| self.validate_value(e)),
            _ => Ok(()),
        }
    }
}
