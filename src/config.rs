//! Container configuration
//!
//! [`ContainerConfig`] is the user-facing, serde-loadable configuration.
//! [`ContainerRegistry`] is the validated form the editor works with: it owns
//! the ordered definitions plus the class→container and name→container
//! association tables.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default indent sequence inserted by the indent command.
pub const DEFAULT_INDENT_SEQUENCE: &str = "\t";

// =============================================================================
// ContainerDefinition
// =============================================================================

/// One configured container kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDefinition {
    /// Identifier used by commands
    pub name: CompactString,
    /// Human readable label (defaults to the name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<CompactString>,
    /// CSS class stored on the model and rendered on the wrapper (defaults to the name)
    #[serde(default, alias = "cssClass", skip_serializing_if = "Option::is_none")]
    pub css_class: Option<CompactString>,
}

impl ContainerDefinition {
    /// Definition whose label and class equal its name
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            label: None,
            css_class: None,
        }
    }

    /// Builder: set the label
    pub fn with_label(mut self, label: impl Into<CompactString>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builder: set the CSS class
    pub fn with_css_class(mut self, class: impl Into<CompactString>) -> Self {
        self.css_class = Some(class.into());
        self
    }

    /// Effective label
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Effective CSS class
    pub fn css_class(&self) -> &str {
        self.css_class.as_deref().unwrap_or(&self.name)
    }

    /// Class written to `containerClass`; the name when the CSS class is empty
    pub fn stored_class(&self) -> &str {
        match self.css_class() {
            "" => &self.name,
            class => class,
        }
    }
}

// =============================================================================
// ContainerConfig
// =============================================================================

/// Container feature configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Ordered container definitions; the first one is the default
    pub containers: Vec<ContainerDefinition>,
    /// Text inserted by indent and removed by outdent (empty disables both)
    pub indent_sequence: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            containers: ["success", "info", "warning", "error"]
                .into_iter()
                .map(ContainerDefinition::new)
                .collect(),
            indent_sequence: DEFAULT_INDENT_SEQUENCE.to_owned(),
        }
    }
}

impl ContainerConfig {
    /// Configuration with the given definitions and the default indent sequence
    pub fn with_containers(containers: impl IntoIterator<Item = ContainerDefinition>) -> Self {
        Self {
            containers: containers.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Builder: set the indent sequence
    pub fn indent_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.indent_sequence = sequence.into();
        self
    }

    /// Parse a configuration from TOML
    ///
    /// Missing keys fall back to the defaults.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that there is a default container and no definition is unnamed
    pub fn validate(&self) -> ConfigResult<()> {
        if self.containers.is_empty() {
            return Err(ConfigError::NoContainers);
        }
        match self.containers.iter().position(|d| d.name.trim().is_empty()) {
            Some(index) => Err(ConfigError::EmptyName { index }),
            None => Ok(()),
        }
    }
}

// =============================================================================
// ContainerRegistry
// =============================================================================

/// Validated definitions plus their association tables
#[derive(Debug, Clone)]
pub struct ContainerRegistry {
    definitions: Vec<ContainerDefinition>,
    by_class: FxHashMap<CompactString, usize>,
    by_name: FxHashMap<CompactString, usize>,
    indent_sequence: String,
}

impl ContainerRegistry {
    /// Validate a configuration and build the lookup tables
    ///
    /// When two definitions share a class or a name, the earlier one wins.
    pub fn new(config: ContainerConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ContainerConfig) -> Self {
        let mut by_class = FxHashMap::default();
        let mut by_name = FxHashMap::default();
        for (index, def) in config.containers.iter().enumerate() {
            by_class.entry(CompactString::from(def.css_class())).or_insert(index);
            by_class.entry(CompactString::from(def.stored_class())).or_insert(index);
            by_name.entry(def.name.clone()).or_insert(index);
        }
        Self {
            definitions: config.containers,
            by_class,
            by_name,
            indent_sequence: config.indent_sequence,
        }
    }

    /// All definitions in configuration order
    pub fn definitions(&self) -> &[ContainerDefinition] {
        &self.definitions
    }

    /// The first configured definition
    pub fn default_definition(&self) -> &ContainerDefinition {
        &self.definitions[0]
    }

    /// Definition by container name
    pub fn by_name(&self, name: &str) -> Option<&ContainerDefinition> {
        self.by_name.get(name).map(|&i| &self.definitions[i])
    }

    /// Definition by CSS class
    pub fn by_class(&self, class: &str) -> Option<&ContainerDefinition> {
        self.by_class.get(class).map(|&i| &self.definitions[i])
    }

    /// First definition matching one of `classes`, else the default
    pub fn resolve_classes<'c>(&self, classes: impl IntoIterator<Item = &'c str>) -> &ContainerDefinition {
        classes
            .into_iter()
            .find_map(|class| self.by_class(class))
            .unwrap_or_else(|| self.default_definition())
    }

    /// Class value stored for a container name or a caller-supplied literal
    pub fn class_for(&self, name_or_literal: &str) -> CompactString {
        self.by_name(name_or_literal)
            .map_or_else(|| CompactString::from(name_or_literal), |d| d.stored_class().into())
    }

    /// Label shown for a stored class value (the class itself when unknown)
    pub fn label_for_class<'a>(&'a self, class: &'a str) -> &'a str {
        self.by_class(class).map_or(class, ContainerDefinition::label)
    }

    /// Indent sequence, `None` when indenting is disabled
    pub fn indent_sequence(&self) -> Option<&str> {
        (!self.indent_sequence.is_empty()).then_some(self.indent_sequence.as_str())
    }
}

impl Default for ContainerRegistry {
    fn default() -> Self {
        Self::build(ContainerConfig::default())
    }
}
