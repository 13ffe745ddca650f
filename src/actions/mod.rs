//! Step schema registry
//!
//! Maps every action type a step may take to its field definitions. The
//! registry is assembled once at startup (built-ins plus optional user
//! definitions) and is read-only afterwards; the editor, the serializer and the
//! terminal UI all query it rather than hard-coding per-action fields.
//!
//! ## Components
//!
//! - [`StepDefinition`]: an action type with its ordered [`FieldSpec`]s
//! - [`FieldKind`]: input kind, which also owns the submission-time validation
//! - [`ActionRegistry`]: lookup table keyed by action type

pub mod loader;
pub mod schema;

pub use schema::{DefinitionError, FieldFailure, FieldKind, FieldSpec, StepDefinition};

use anyhow::Result;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Registry holding only the embedded definitions
static BUILTIN_REGISTRY: Lazy<ActionRegistry> =
    Lazy::new(|| ActionRegistry::from_definitions(loader::load_builtins()));

/// Read-only table of step definitions keyed by action type
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    /// Definitions by action type
    definitions: HashMap<String, StepDefinition>,
    /// Action types in display order
    order: Vec<String>,
}

impl ActionRegistry {
    /// Build a registry from definitions; later entries replace earlier ones
    /// with the same action type but keep the original display slot.
    pub fn from_definitions(definitions: impl IntoIterator<Item = StepDefinition>) -> Self {
        let mut registry = Self::default();
        for definition in definitions {
            registry.insert(definition);
        }
        registry
    }

    /// The embedded built-in registry
    pub fn builtin() -> Self {
        BUILTIN_REGISTRY.clone()
    }

    /// Built-ins plus user definitions from `user_dir`
    pub fn load(user_dir: &Path) -> Result<Self> {
        let mut registry = Self::builtin();
        let user_definitions = loader::load_user_definitions(user_dir)?;
        let count = user_definitions.len();

        for definition in user_definitions {
            if registry.definitions.contains_key(&definition.action_type) {
                debug!(
                    "User action type '{}' overrides builtin",
                    definition.action_type
                );
            }
            registry.insert(definition);
        }

        if count > 0 {
            info!("Loaded {} user-defined action types", count);
        }
        Ok(registry)
    }

    fn insert(&mut self, definition: StepDefinition) {
        let key = definition.action_type.clone();
        if !self.definitions.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.definitions.insert(key, definition);
    }

    /// Look up an action type
    pub fn lookup(&self, action_type: &str) -> Option<&StepDefinition> {
        self.definitions.get(action_type)
    }

    /// Check if an action type is registered
    pub fn contains(&self, action_type: &str) -> bool {
        self.definitions.contains_key(action_type)
    }

    /// Action types in display order
    pub fn action_types(&self) -> &[String] {
        &self.order
    }

    /// Definitions in display order
    pub fn definitions(&self) -> impl Iterator<Item = &StepDefinition> {
        self.order.iter().filter_map(|key| self.definitions.get(key))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
