//! Lookup of finding, entity and issue fields by name.
//!
//! Renderers that emit fields generically (templated reports, custom
//! columns) use [`Attributes::find_attribute`] instead of matching on the
//! concrete type. Each concrete type declares one static
//! [`AttributeRegistry`] listing the fields it exposes.

use serde::Serialize;
use std::fmt;

/// A field value returned by an attribute lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Text value.
    Text(String),
    /// Integral value (lines, columns, offsets, counts).
    Integer(i64),
    /// Floating point value (metrics).
    Number(f64),
    /// Sequence of values.
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Creates a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates an integer value from an unsigned count or position.
    #[must_use]
    pub fn count(value: usize) -> Self {
        Self::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }

    /// Returns the text if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as `i64` if it is an integer.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Reads one field of `T`.
pub type Getter<T> = fn(&T) -> AttributeValue;

/// Name-to-getter table for one concrete type.
pub struct AttributeRegistry<T: 'static> {
    entries: &'static [(&'static str, Getter<T>)],
}

impl<T> AttributeRegistry<T> {
    /// Creates a registry from a static table.
    #[must_use]
    pub const fn new(entries: &'static [(&'static str, Getter<T>)]) -> Self {
        Self { entries }
    }

    /// Reads the named field of `target`, or `None` if it is not registered.
    #[must_use]
    pub fn get(&self, target: &T, name: &str) -> Option<AttributeValue> {
        self.entries
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, getter)| getter(target))
    }

    /// Names of all registered fields, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

/// Types whose fields can be read by name.
pub trait Attributes {
    /// Reads the named field, or `None` for unknown names.
    fn find_attribute(&self, name: &str) -> Option<AttributeValue>;
}
