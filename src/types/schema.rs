//! Field metadata supplied by a source catalog.

use crate::expression::{ExpressionError, ExpressionResult};
use crate::types::ElementType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered set of uniquely named, typed fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: IndexMap<String, ElementType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from `(name, type)` pairs, rejecting duplicate names
    pub fn from_fields<I, S>(fields: I) -> ExpressionResult<Self>
    where
        I: IntoIterator<Item = (S, ElementType)>,
        S: Into<String>,
    {
        let mut schema = Schema::new();
        for (name, data_type) in fields {
            schema.push(name, data_type)?;
        }
        Ok(schema)
    }

    /// Build a schema from parallel name and type lists
    pub fn from_lists<S: Into<String>>(
        names: Vec<S>,
        types: Vec<ElementType>,
    ) -> ExpressionResult<Self> {
        if names.len() != types.len() {
            return Err(ExpressionError::ArgumentCount {
                operator: "schema".to_string(),
                expected: format!("{} types", names.len()),
                actual: types.len(),
            });
        }
        Self::from_fields(names.into_iter().zip(types))
    }

    pub fn push(&mut self, name: impl Into<String>, data_type: ElementType) -> ExpressionResult<()> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(ExpressionError::DuplicateField { name });
        }
        self.fields.insert(name, data_type);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ElementType> {
        self.fields.get(name).copied()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ElementType)> {
        self.fields.iter().map(|(name, t)| (name.as_str(), *t))
    }
}
