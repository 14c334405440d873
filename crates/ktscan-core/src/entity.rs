//! The named code element a finding is attached to.

use crate::attributes::{AttributeRegistry, AttributeValue, Attributes};
use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What was flagged: a file, class, function or property, independent of the rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// Short name (identifier or expression text).
    pub name: String,
    /// Qualified signature, stable across runs for unchanged input.
    pub signature: String,
    /// Innermost enclosing class name, empty if top-level.
    pub class_name: String,
    /// Where the entity is.
    pub location: Location,
}

static ENTITY_ATTRIBUTES: AttributeRegistry<Entity> = AttributeRegistry::new(&[
    ("name", |e: &Entity| AttributeValue::text(&e.name)),
    ("signature", |e: &Entity| AttributeValue::text(&e.signature)),
    ("className", |e: &Entity| AttributeValue::text(&e.class_name)),
    ("file", |e: &Entity| {
        AttributeValue::text(e.location.file.to_string_lossy())
    }),
    ("location", |e: &Entity| AttributeValue::text(e.location.compact())),
    ("line", |e: &Entity| AttributeValue::count(e.location.start.line)),
    ("column", |e: &Entity| AttributeValue::count(e.location.start.column)),
    ("startOffset", |e: &Entity| AttributeValue::count(e.location.text.start)),
    ("endOffset", |e: &Entity| AttributeValue::count(e.location.text.end)),
]);

impl Entity {
    /// Creates an entity.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        signature: impl Into<String>,
        class_name: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            class_name: class_name.into(),
            location,
        }
    }

    /// Short name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Enclosing class name, empty if top-level.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Location of the entity.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// File containing the entity.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.location.file
    }

    /// `[name] at file:line:column`.
    #[must_use]
    pub fn compact(&self) -> String {
        format!("[{}] at {}", self.name, self.location.compact())
    }
}

impl Attributes for Entity {
    fn find_attribute(&self, name: &str) -> Option<AttributeValue> {
        ENTITY_ATTRIBUTES.get(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{SourceLocation, TextRange};

    fn entity() -> Entity {
        Entity::new(
            "bar",
            "Foo.kt$Foo$fun bar()",
            "Foo",
            Location::new(
                "src/Foo.kt",
                SourceLocation::new(4, 5),
                SourceLocation::new(6, 6),
                TextRange::new(40, 80),
            ),
        )
    }

    #[test]
    fn compact_names_entity_and_position() {
        assert_eq!(entity().compact(), "[bar] at src/Foo.kt:4:5");
    }

    #[test]
    fn accessors_forward_to_location() {
        let e = entity();
        assert_eq!(e.file(), Path::new("src/Foo.kt"));
        assert_eq!(e.class_name(), "Foo");
        assert_eq!(e.location().start.line, 4);
    }

    #[test]
    fn attributes_by_name() {
        let e = entity();
        assert_eq!(
            e.find_attribute("className"),
            Some(AttributeValue::text("Foo"))
        );
        assert_eq!(
            e.find_attribute("line").and_then(|v| v.as_integer()),
            Some(4)
        );
        assert!(e.find_attribute("nope").is_none());
    }
}
