//! # Block Type Registry
//!
//! Maps each [`BlockType`] to the template used when a block of that type is
//! created: the field schema, default props and default styles. The registry
//! is consulted only by `add_block`; existing blocks never go back to it.
//!
//! Templates are validated when they are registered, so a block created from
//! a registered template always has the shape its schema declares.

use crate::document::{Block, BlockId, BlockType, PropKind, PropMap, PropValue, StyleMap, StyleValue};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("{block_type}: field `{field}` declared as {expected:?} but default is {actual:?}")]
    SchemaMismatch {
        block_type: BlockType,
        field: String,
        expected: PropKind,
        actual: PropKind,
    },

    #[error("{block_type}: field `{field}` has no default value")]
    MissingField { block_type: BlockType, field: String },

    #[error("{block_type}: default `{field}` is not declared in the schema")]
    UndeclaredField { block_type: BlockType, field: String },
}

/// Creation template for one block type
#[derive(Debug, Clone, PartialEq)]
pub struct BlockTemplate {
    pub block_type: BlockType,
    pub fields: BTreeMap<String, PropKind>,
    pub defaults: PropMap,
    pub styles: StyleMap,
}

impl BlockTemplate {
    pub fn new(block_type: BlockType) -> Self {
        Self {
            block_type,
            fields: BTreeMap::new(),
            defaults: PropMap::new(),
            styles: StyleMap::new(),
        }
    }

    /// Declare a field together with its default value
    pub fn field(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        let value = value.into();
        self.fields.insert(name.to_string(), value.kind());
        self.defaults.insert(name.to_string(), value);
        self
    }

    pub fn style(mut self, key: &str, value: impl Into<StyleValue>) -> Self {
        self.styles.insert(key.to_string(), value.into());
        self
    }

    /// Check the defaults against the declared schema
    pub fn validate(&self) -> Result<(), RegistryError> {
        for (field, expected) in &self.fields {
            let value = self.defaults.get(field).ok_or_else(|| RegistryError::MissingField {
                block_type: self.block_type,
                field: field.clone(),
            })?;

            if value.kind() != *expected {
                return Err(RegistryError::SchemaMismatch {
                    block_type: self.block_type,
                    field: field.clone(),
                    expected: *expected,
                    actual: value.kind(),
                });
            }
        }

        if let Some(field) = self.defaults.keys().find(|k| !self.fields.contains_key(*k)) {
            return Err(RegistryError::UndeclaredField {
                block_type: self.block_type,
                field: field.clone(),
            });
        }

        Ok(())
    }

    /// Create a block from this template
    pub fn instantiate(&self, id: BlockId) -> Block {
        Block {
            id,
            block_type: self.block_type,
            props: self.defaults.clone(),
            styles: self.styles.clone(),
        }
    }
}

/// Registry of creation templates keyed by block type
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    templates: HashMap<BlockType, BlockTemplate>,
}

impl BlockRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a template for every built-in block type
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for template in standard_templates() {
            // Built-in templates are declared through `field`, so they are valid
            // by construction.
            registry.templates.insert(template.block_type, template);
        }
        registry
    }

    /// Register (or replace) a template after validating it
    pub fn register(&mut self, template: BlockTemplate) -> Result<(), RegistryError> {
        template.validate()?;
        self.templates.insert(template.block_type, template);
        Ok(())
    }

    pub fn template(&self, block_type: BlockType) -> Option<&BlockTemplate> {
        self.templates.get(&block_type)
    }

    /// Create a block of the given type with registry defaults
    pub fn create_block(&self, block_type: BlockType, id: BlockId) -> Block {
        match self.templates.get(&block_type) {
            Some(template) => template.instantiate(id),
            None => {
                tracing::warn!(%block_type, "No template registered, creating empty block");
                Block::new(id, block_type)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn item(entries: &[(&str, PropValue)]) -> PropMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn feature(title: &str, description: &str, icon: &str) -> PropMap {
    item(&[
        ("title", title.into()),
        ("description", description.into()),
        ("icon", icon.into()),
    ])
}

fn standard_templates() -> Vec<BlockTemplate> {
    vec![
        BlockTemplate::new(BlockType::Hero)
            .field("title", "Launch your next campaign")
            .field("subtitle", "Build landing pages in minutes")
            .field("ctaLabel", "Get started")
            .field("ctaHref", "#")
            .field("imageUrl", "")
            .style("padding", 64.0)
            .style("background", "#ffffff")
            .style("textAlign", "center"),
        BlockTemplate::new(BlockType::Features1)
            .field("title", "Features")
            .field("columns", PropValue::Number(3.0))
            .field(
                "items",
                PropValue::List(vec![
                    feature("Fast", "Pages load instantly", "bolt"),
                    feature("Flexible", "Rearrange any section", "grid"),
                    feature("Measurable", "Track every visit", "chart"),
                ]),
            )
            .style("padding", 48.0),
        BlockTemplate::new(BlockType::Features2)
            .field("title", "How it works")
            .field("subtitle", "")
            .field("imageUrl", "")
            .field(
                "items",
                PropValue::List(vec![
                    feature("Pick a template", "Start from a proven layout", "layout"),
                    feature("Publish", "Go live on your domain", "globe"),
                ]),
            )
            .style("padding", 48.0),
        BlockTemplate::new(BlockType::Testimonials)
            .field("title", "What customers say")
            .field(
                "items",
                PropValue::List(vec![item(&[
                    ("quote", "It doubled our sign-ups.".into()),
                    ("author", "Jane Doe".into()),
                    ("role", "Head of Growth".into()),
                ])]),
            ),
        BlockTemplate::new(BlockType::Pricing)
            .field("title", "Pricing")
            .field(
                "plans",
                PropValue::List(vec![
                    item(&[
                        ("name", "Starter".into()),
                        ("price", PropValue::Number(0.0)),
                        ("period", "month".into()),
                        ("featured", false.into()),
                    ]),
                    item(&[
                        ("name", "Pro".into()),
                        ("price", PropValue::Number(29.0)),
                        ("period", "month".into()),
                        ("featured", true.into()),
                    ]),
                ]),
            ),
        BlockTemplate::new(BlockType::Cta)
            .field("title", "Ready to start?")
            .field("buttonLabel", "Sign up")
            .field("buttonHref", "#")
            .style("background", "#111827")
            .style("color", "#ffffff"),
        BlockTemplate::new(BlockType::Faq)
            .field("title", "Frequently asked questions")
            .field(
                "items",
                PropValue::List(vec![item(&[
                    ("question", "Can I cancel anytime?".into()),
                    ("answer", "Yes.".into()),
                ])]),
            ),
        BlockTemplate::new(BlockType::Footer)
            .field("companyName", "")
            .field("copyright", "")
            .field("showSocial", true)
            .style("padding", 24.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_type() {
        let registry = BlockRegistry::standard();
        assert_eq!(registry.len(), BlockType::ALL.len());

        for ty in BlockType::ALL {
            let template = registry.template(ty).unwrap();
            assert!(template.validate().is_ok(), "{ty} template is invalid");
        }
    }

    #[test]
    fn test_create_block_uses_defaults() {
        let registry = BlockRegistry::standard();
        let block = registry.create_block(BlockType::Features1, "f-1".to_string());

        assert_eq!(block.id, "f-1");
        assert_eq!(block.props["items"].as_list().unwrap().len(), 3);
        assert_eq!(block.styles["padding"], StyleValue::Number(48.0));
    }

    #[test]
    fn test_register_rejects_mismatched_default() {
        let mut template = BlockTemplate::new(BlockType::Cta).field("title", "Go");
        template.defaults.insert("title".to_string(), PropValue::Number(1.0));

        let mut registry = BlockRegistry::new();
        let err = registry.register(template).unwrap_err();
        assert!(matches!(err, RegistryError::SchemaMismatch { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_undeclared_default() {
        let mut template = BlockTemplate::new(BlockType::Cta).field("title", "Go");
        template.defaults.insert("extra".to_string(), "x".into());

        let err = BlockRegistry::new().register(template).unwrap_err();
        assert!(matches!(err, RegistryError::UndeclaredField { .. }));
    }

    #[test]
    fn test_missing_template_creates_empty_block() {
        let registry = BlockRegistry::new();
        let block = registry.create_block(BlockType::Hero, "h".to_string());
        assert!(block.props.is_empty());
        assert_eq!(block.block_type, BlockType::Hero);
    }
}
