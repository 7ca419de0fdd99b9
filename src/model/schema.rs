//! Document schema: which elements may appear where, and with which attributes.
//!
//! Elements are registered with an `ElementDef`. Children are allowed either
//! by name or by category: `$text` for text runs, `$block` for any block
//! element and `$inline` for any inline element. Custom checks can veto a
//! child or an attribute after the declarative rules pass.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::node::{PARAGRAPH, ROOT, SOFT_BREAK};

/// Generic child category for text runs.
pub const TEXT: &str = "$text";

/// Generic child category for block elements.
pub const BLOCK: &str = "$block";

/// Generic child category for inline elements.
pub const INLINE: &str = "$inline";

/// Name of the inline image element registered by default.
pub const IMAGE_INLINE: &str = "imageInline";

// =============================================================================
// Definitions
// =============================================================================

/// Declarative rules for one element name
#[derive(Debug, Clone, Default)]
pub struct ElementDef {
    /// Element name
    pub name: CompactString,
    /// Allowed children: element names, `$text`, `$block` or `$inline`
    pub allow_children: SmallVec<[CompactString; 4]>,
    /// Allowed attribute keys
    pub allow_attributes: SmallVec<[CompactString; 2]>,
    /// Block-level element (`$block` category)
    pub is_block: bool,
    /// Inline element (`$inline` category)
    pub is_inline: bool,
    /// Structural boundary that edits cannot cross
    pub is_limit: bool,
    /// Self-contained object (implies limit)
    pub is_object: bool,
}

impl ElementDef {
    /// Create a definition with no children and no attributes
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: mark as block
    pub fn block(mut self) -> Self {
        self.is_block = true;
        self
    }

    /// Builder: mark as inline
    pub fn inline(mut self) -> Self {
        self.is_inline = true;
        self
    }

    /// Builder: mark as limit
    pub fn limit(mut self) -> Self {
        self.is_limit = true;
        self
    }

    /// Builder: mark as object
    pub fn object(mut self) -> Self {
        self.is_object = true;
        self.is_limit = true;
        self
    }

    /// Builder: allow a child name or category
    pub fn allow_child(mut self, name: impl Into<CompactString>) -> Self {
        self.allow_children.push(name.into());
        self
    }

    /// Builder: allow an attribute key
    pub fn allow_attribute(mut self, key: impl Into<CompactString>) -> Self {
        self.allow_attributes.push(key.into());
        self
    }

    fn allows(&self, name: &str) -> bool {
        self.allow_children.iter().any(|c| c == name)
    }
}

/// A candidate child for `Schema::check_child`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind<'a> {
    /// A text run
    Text,
    /// An element with this name
    Element(&'a str),
}

/// The node an attribute would be set on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrTarget<'a> {
    /// A text run inside the named parent
    Text { parent: &'a str },
    /// An element with this name
    Element(&'a str),
}

/// Custom child check: `Some(false)` vetoes, `None` abstains
pub type ChildCheck = Box<dyn Fn(&str, ChildKind<'_>, &Schema) -> Option<bool> + Send + Sync>;

/// Custom attribute check: `Some(false)` vetoes, `None` abstains
pub type AttributeCheck = Box<dyn Fn(AttrTarget<'_>, &str) -> Option<bool> + Send + Sync>;

// =============================================================================
// Schema
// =============================================================================

/// Registry of element definitions and custom checks
pub struct Schema {
    defs: FxHashMap<CompactString, ElementDef>,
    text_attributes: SmallVec<[CompactString; 4]>,
    child_checks: Vec<ChildCheck>,
    attribute_checks: Vec<AttributeCheck>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("defs", &self.defs.keys().collect::<Vec<_>>())
            .field("text_attributes", &self.text_attributes)
            .field("child_checks", &self.child_checks.len())
            .field("attribute_checks", &self.attribute_checks.len())
            .finish()
    }
}

impl Default for Schema {
    /// Schema with the root, paragraphs, line breaks, inline images and
    /// `bold`/`italic` text attributes
    fn default() -> Self {
        let mut schema = Self::empty();
        schema.register(ElementDef::new(ROOT).limit().allow_child(BLOCK));
        schema.register(
            ElementDef::new(PARAGRAPH)
                .block()
                .allow_child(TEXT)
                .allow_child(INLINE)
                .allow_attribute("alignment"),
        );
        schema.register(ElementDef::new(SOFT_BREAK).inline());
        schema.register(ElementDef::new(IMAGE_INLINE).inline().object().allow_attribute("src"));
        schema.allow_text_attribute("bold");
        schema.allow_text_attribute("italic");
        schema
    }
}

impl Schema {
    /// Schema without any registrations
    pub fn empty() -> Self {
        Self {
            defs: FxHashMap::default(),
            text_attributes: SmallVec::new(),
            child_checks: Vec::new(),
            attribute_checks: Vec::new(),
        }
    }

    /// Register (or replace) an element definition
    pub fn register(&mut self, def: ElementDef) {
        self.defs.insert(def.name.clone(), def);
    }

    /// Allow a formatting attribute on text runs
    pub fn allow_text_attribute(&mut self, key: impl Into<CompactString>) {
        self.text_attributes.push(key.into());
    }

    /// Add a custom child check
    pub fn add_child_check<F>(&mut self, check: F)
    where
        F: Fn(&str, ChildKind<'_>, &Schema) -> Option<bool> + Send + Sync + 'static,
    {
        self.child_checks.push(Box::new(check));
    }

    /// Add a custom attribute check
    pub fn add_attribute_check<F>(&mut self, check: F)
    where
        F: Fn(AttrTarget<'_>, &str) -> Option<bool> + Send + Sync + 'static,
    {
        self.attribute_checks.push(Box::new(check));
    }

    /// Definition for a name
    pub fn get(&self, name: &str) -> Option<&ElementDef> {
        self.defs.get(name)
    }

    /// Check whether a name is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Check whether the element is a block
    pub fn is_block(&self, name: &str) -> bool {
        self.get(name).is_some_and(|d| d.is_block)
    }

    /// Check whether the element is a limit (the root always is)
    pub fn is_limit(&self, name: &str) -> bool {
        name == ROOT || self.get(name).is_some_and(|d| d.is_limit)
    }

    /// Check whether the element is an object
    pub fn is_object(&self, name: &str) -> bool {
        self.get(name).is_some_and(|d| d.is_object)
    }

    /// Check whether `child` may be placed inside an element named `parent`
    pub fn check_child(&self, parent: &str, child: ChildKind<'_>) -> bool {
        let Some(parent_def) = self.get(parent) else {
            return false;
        };
        let declared = match child {
            ChildKind::Text => parent_def.allows(TEXT),
            ChildKind::Element(name) => match self.get(name) {
                None => false,
                Some(def) => {
                    parent_def.allows(name)
                        || (def.is_block && parent_def.allows(BLOCK))
                        || (def.is_inline && parent_def.allows(INLINE))
                }
            },
        };
        declared
            && !self
                .child_checks
                .iter()
                .any(|check| check(parent, child, self) == Some(false))
    }

    /// Check whether `key` may be set on `target`
    pub fn check_attribute(&self, target: AttrTarget<'_>, key: &str) -> bool {
        let declared = match target {
            AttrTarget::Text { .. } => self.text_attributes.iter().any(|k| k == key),
            AttrTarget::Element(name) => self
                .get(name)
                .is_some_and(|d| d.allow_attributes.iter().any(|k| k == key)),
        };
        declared
            && !self
                .attribute_checks
                .iter()
                .any(|check| check(target, key) == Some(false))
    }
}
