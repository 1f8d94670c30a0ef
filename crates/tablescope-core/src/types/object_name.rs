//! Two-part (schema, name) object names.

use crate::error::ResolveError;
use crate::naming::unquoted_parts;
use crate::normalize::homogenize;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// An object name with an optional schema qualifier.
///
/// Equality and hashing use the homogenized (case-folded) parts, so
/// `dbo.Users` and `DBO.users` are the same name. An empty schema is the same
/// as no schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

impl ObjectName {
    pub fn new(schema: Option<impl Into<String>>, name: impl Into<String>) -> Self {
        let schema = schema.map(Into::into).filter(|s| !s.is_empty());
        Self {
            schema,
            name: name.into(),
        }
    }

    /// Creates a name without a schema qualifier.
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// Parses `schema.name` or `name`.
    ///
    /// Quoted parts are unquoted. More than one separator is an
    /// [`ResolveError::InvalidFormat`] error, as is an empty name part.
    pub fn parse(text: &str) -> Result<Self, ResolveError> {
        let invalid = || ResolveError::InvalidFormat {
            text: text.to_string(),
        };

        let mut parts = unquoted_parts(text);
        match parts.len() {
            1 => Ok(Self::unqualified(parts.remove(0))),
            2 => {
                let name = parts.pop().ok_or_else(invalid)?;
                if name.is_empty() {
                    return Err(invalid());
                }
                Ok(Self::new(parts.pop(), name))
            }
            _ => Err(invalid()),
        }
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_qualified(&self) -> bool {
        self.schema.is_some()
    }

    /// Returns the same name qualified with `schema` unless it already has one.
    pub fn or_schema(self, schema: &str) -> Self {
        if self.schema.is_some() || schema.is_empty() {
            self
        } else {
            Self {
                schema: Some(schema.to_string()),
                name: self.name,
            }
        }
    }

    fn homogenized_schema(&self) -> Option<String> {
        self.schema
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(homogenize)
    }
}

impl PartialEq for ObjectName {
    fn eq(&self, other: &Self) -> bool {
        homogenize(&self.name) == homogenize(&other.name)
            && self.homogenized_schema() == other.homogenized_schema()
    }
}

impl Eq for ObjectName {}

impl Hash for ObjectName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.homogenized_schema().hash(state);
        homogenize(&self.name).hash(state);
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
