//! Attribute system for model and view nodes
//!
//! Attributes are plain ordered key-value pairs. Model elements use them for
//! things like `containerClass`; view elements use them for HTML attributes,
//! where `class` holds a whitespace-separated class list.

use compact_str::CompactString;

/// Node attributes as ordered key-value pairs
pub type Attrs = Vec<(CompactString, CompactString)>;

/// Name of the HTML class attribute on view elements.
pub const CLASS_ATTR: &str = "class";

/// Extension trait for attribute operations on Attrs
pub trait AttrsExt {
    /// Get an attribute value by name
    fn get_attr(&self, name: &str) -> Option<&str>;

    /// Check if an attribute exists
    fn has_attr(&self, name: &str) -> bool;

    /// Set an attribute value (insert or update)
    fn set_attr(&mut self, name: impl Into<CompactString>, value: impl Into<CompactString>);

    /// Remove an attribute by name, returning the old value if present
    fn remove_attr(&mut self, name: &str) -> Option<CompactString>;

    /// Iterate over the names in the `class` attribute
    ///
    /// Yields nothing when the attribute is missing or blank.
    fn class_names(&self) -> ClassNames<'_>;
}

impl AttrsExt for Attrs {
    fn get_attr(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_attr(&self, name: &str) -> bool {
        self.iter().any(|(k, _)| k == name)
    }

    fn set_attr(&mut self, name: impl Into<CompactString>, value: impl Into<CompactString>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.iter_mut().find(|(k, _)| k == &name) {
            attr.1 = value;
        } else {
            self.push((name, value));
        }
    }

    fn remove_attr(&mut self, name: &str) -> Option<CompactString> {
        self.iter()
            .position(|(k, _)| k == name)
            .map(|pos| self.remove(pos).1)
    }

    fn class_names(&self) -> ClassNames<'_> {
        ClassNames {
            inner: self.get_attr(CLASS_ATTR).unwrap_or("").split_ascii_whitespace(),
        }
    }
}

/// Iterator over the individual names of a `class` attribute
pub struct ClassNames<'a> {
    inner: std::str::SplitAsciiWhitespace<'a>,
}

impl<'a> Iterator for ClassNames<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrs_operations() {
        let mut attrs: Attrs = Vec::new();

        // Set
        attrs.set_attr("containerClass", "info");
        attrs.set_attr("alignment", "left");
        assert_eq!(attrs.len(), 2);

        // Get
        assert_eq!(attrs.get_attr("containerClass"), Some("info"));
        assert_eq!(attrs.get_attr("href"), None);

        // Has
        assert!(attrs.has_attr("alignment"));
        assert!(!attrs.has_attr("href"));

        // Update existing
        attrs.set_attr("containerClass", "warning");
        assert_eq!(attrs.get_attr("containerClass"), Some("warning"));
        assert_eq!(attrs.len(), 2);

        // Remove
        let removed = attrs.remove_attr("alignment");
        assert_eq!(removed.as_deref(), Some("left"));
        assert!(!attrs.has_attr("alignment"));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_class_names() {
        let mut attrs: Attrs = Vec::new();
        assert_eq!(attrs.class_names().count(), 0);

        attrs.set_attr(CLASS_ATTR, "  note  info ");
        let names: Vec<_> = attrs.class_names().collect();
        assert_eq!(names, vec!["note", "info"]);
    }
}
