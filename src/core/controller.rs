//! Form controller - current values, dirty state and errors for one form
//!
//! Fields are addressed by dotted path (`recurrentPrice.frequency`). The set
//! of fields is fixed by the form's defaults: writes to unknown paths or to
//! whole groups are refused, and scalars are coerced toward the default's
//! JSON type so text typed into a prompt lands as the right kind of value.

use serde_json::Value;
use std::collections::BTreeSet;
use std::marker::PhantomData;
use thiserror::Error;

use crate::forms::Form;
use crate::schema::validator::{coerce_scalars, path_to_pointer, FieldErrors};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{0}' is a group; set its fields individually")]
    NotALeaf(String),

    #[error("Field '{path}' expects {expected}, got {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: String,
    },
}

/// In-memory state of a form being edited
#[derive(Debug, Clone)]
pub struct FormController<F: Form> {
    defaults: Value,
    values: Value,
    errors: FieldErrors,
    dirty: BTreeSet<String>,
    _form: PhantomData<F>,
}

impl<F: Form> FormController<F> {
    /// A controller holding the form's defaults
    pub fn new() -> Self {
        let defaults = F::defaults();
        Self {
            values: defaults.clone(),
            defaults,
            errors: FieldErrors::new(),
            dirty: BTreeSet::new(),
            _form: PhantomData,
        }
    }

    /// Current value of a field (or group)
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.pointer(&path_to_pointer(path))
    }

    /// Declared default of a field (or group)
    pub fn default_of(&self, path: &str) -> Option<&Value> {
        self.defaults.pointer(&path_to_pointer(path))
    }

    /// Write a field. Clears that field's error.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), ControllerError> {
        let pointer = path_to_pointer(path);
        let default = self
            .defaults
            .pointer(&pointer)
            .filter(|_| !path.is_empty())
            .ok_or_else(|| ControllerError::UnknownField(path.to_string()))?;

        let mut value = value.into();
        coerce_scalars(&mut value, default);

        let expected = match default {
            Value::Object(_) | Value::Array(_) => {
                return Err(ControllerError::NotALeaf(path.to_string()));
            }
            Value::String(_) if !value.is_string() => Some("text"),
            Value::Number(_) if !value.is_i64() && !value.is_u64() => Some("a whole number"),
            Value::Bool(_) if !value.is_boolean() => Some("true or false"),
            _ => None,
        };
        if let Some(expected) = expected {
            return Err(ControllerError::TypeMismatch {
                path: path.to_string(),
                expected,
                found: value.to_string(),
            });
        }

        if &value == default {
            self.dirty.remove(path);
        } else {
            self.dirty.insert(path.to_string());
        }

        let slot = self
            .values
            .pointer_mut(&pointer)
            .ok_or_else(|| ControllerError::UnknownField(path.to_string()))?;
        *slot = value;
        self.errors.remove(path);
        Ok(())
    }

    /// Write a field from raw text, as typed by the user
    pub fn set_str(&mut self, path: &str, raw: &str) -> Result<(), ControllerError> {
        self.set(path, Value::String(raw.to_string()))
    }

    /// Binding for a single field
    pub fn field(&mut self, path: &str) -> FieldBinding<'_, F> {
        FieldBinding {
            controller: self,
            path: path.to_string(),
        }
    }

    /// Apply every leaf of a record (e.g. a parsed draft file)
    ///
    /// All or nothing: if any field can't be written the controller is left
    /// as it was. Returns the number of fields written.
    pub fn load(&mut self, record: &Value) -> Result<usize, ControllerError> {
        let mut leaves = Vec::new();
        collect_leaves(record, String::new(), &mut leaves);

        let saved = (self.values.clone(), self.errors.clone(), self.dirty.clone());
        for (path, value) in &leaves {
            if let Err(e) = self.set(path, value.clone()) {
                (self.values, self.errors, self.dirty) = saved;
                return Err(e);
            }
        }
        Ok(leaves.len())
    }

    /// Dotted paths of every field, in declaration order
    pub fn field_paths(&self) -> Vec<String> {
        let mut leaves = Vec::new();
        collect_leaves(&self.defaults, String::new(), &mut leaves);
        leaves.into_iter().map(|(path, _)| path).collect()
    }

    pub fn error(&self, path: &str) -> Option<&str> {
        self.errors.get(path)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Replace the error state (e.g. after a rejected submission)
    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    pub fn clear_errors(&mut self) {
        self.errors = FieldErrors::new();
    }

    /// Whether a field differs from its default
    pub fn is_dirty(&self, path: &str) -> bool {
        self.dirty.contains(path)
    }

    pub fn is_form_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Copy of the current values, as submitted
    pub fn snapshot(&self) -> Value {
        self.values.clone()
    }

    /// Back to defaults with no errors and nothing dirty
    pub fn reset(&mut self) {
        self.values = self.defaults.clone();
        self.errors = FieldErrors::new();
        self.dirty.clear();
    }
}

impl<F: Form> Default for FormController<F> {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_leaves(value: &Value, prefix: String, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(fields) => {
            for (key, field) in fields {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                collect_leaves(field, path, out);
            }
        }
        _ if !prefix.is_empty() => out.push((prefix, value.clone())),
        // A bare scalar at the root has no field to land in
        _ => out.push((String::new(), value.clone())),
    }
}

/// Read/write access to one field without knowledge of its siblings
pub struct FieldBinding<'a, F: Form> {
    controller: &'a mut FormController<F>,
    path: String,
}

impl<F: Form> FieldBinding<'_, F> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> Option<&Value> {
        self.controller.get(&self.path)
    }

    /// Current value as text (numbers are rendered)
    pub fn text(&self) -> String {
        match self.value() {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn set(&mut self, value: impl Into<Value>) -> Result<(), ControllerError> {
        let path = self.path.clone();
        self.controller.set(&path, value)
    }

    pub fn set_str(&mut self, raw: &str) -> Result<(), ControllerError> {
        let path = self.path.clone();
        self.controller.set_str(&path, raw)
    }

    pub fn error(&self) -> Option<&str> {
        self.controller.error(&self.path)
    }

    pub fn is_dirty(&self) -> bool {
        self.controller.is_dirty(&self.path)
    }
}
