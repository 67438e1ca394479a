//! Mode Registry
//!
//! Populated once at startup through [`ModeRegistryBuilder`], then frozen.
//! [`ModeRegistryBuilder::build`] resolves every declared tool into a
//! [`ResolvedTool`] so the dispatcher switches on a tag instead of guessing
//! from names at call time.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ModeError, Result};
use crate::mode::{ModeDefinition, ModeId};
use crate::tool::{Tool, ToolRef, ToolSchema};

/// A declared tool after resolution
#[derive(Clone)]
pub enum ResolvedTool {
    /// Side-effecting tool
    Ordinary(Arc<dyn Tool>),
    /// Entry into a registered mode
    ModeEntry(ModeId),
}

impl std::fmt::Debug for ResolvedTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ordinary(tool) => f.debug_tuple("Ordinary").field(&tool.schema().name).finish(),
            Self::ModeEntry(id) => f.debug_tuple("ModeEntry").field(id).finish(),
        }
    }
}

/// A registered mode with its resolved tool table
#[derive(Debug)]
pub struct RegisteredMode {
    definition: Arc<ModeDefinition>,
    tools: HashMap<String, ResolvedTool>,
    catalog: Vec<ToolSchema>,
}

impl RegisteredMode {
    pub fn definition(&self) -> &Arc<ModeDefinition> {
        &self.definition
    }

    /// Look up a tool by the name the model used
    pub fn tool(&self, name: &str) -> Option<&ResolvedTool> {
        self.tools.get(name)
    }

    /// Schemas offered to the model, in declaration order
    pub fn catalog(&self) -> &[ToolSchema] {
        &self.catalog
    }
}

/// Collects mode definitions before the registry is frozen
#[derive(Default)]
pub struct ModeRegistryBuilder {
    modes: Vec<ModeDefinition>,
}

impl ModeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mode; fails if its identity is already taken
    pub fn register(&mut self, definition: ModeDefinition) -> Result<&mut Self> {
        if self.modes.iter().any(|m| m.id() == definition.id()) {
            return Err(ModeError::DuplicateMode(definition.id().to_string()));
        }
        self.modes.push(definition);
        Ok(self)
    }

    /// Chaining variant of [`register`](Self::register)
    pub fn with_mode(mut self, definition: ModeDefinition) -> Result<Self> {
        self.register(definition)?;
        Ok(self)
    }

    /// Resolve tool references and freeze the registry
    pub fn build(self) -> Result<ModeRegistry> {
        let definitions: HashMap<ModeId, Arc<ModeDefinition>> = self
            .modes
            .into_iter()
            .map(|m| (m.id().clone(), Arc::new(m)))
            .collect();

        let mut modes = HashMap::with_capacity(definitions.len());
        for (id, definition) in &definitions {
            let mut tools = HashMap::new();
            let mut catalog = Vec::new();

            for tool_ref in definition.tools() {
                let (schema, resolved) = match tool_ref {
                    ToolRef::Ordinary(tool) => (tool.schema(), ResolvedTool::Ordinary(tool.clone())),
                    ToolRef::Mode(target) => {
                        let target_def = definitions
                            .get(target)
                            .ok_or_else(|| ModeError::UnknownMode(target.to_string()))?;
                        (target_def.entry_schema(), ResolvedTool::ModeEntry(target.clone()))
                    }
                };

                if tools.insert(schema.name.clone(), resolved).is_some() {
                    return Err(ModeError::DuplicateTool {
                        mode: id.to_string(),
                        tool: schema.name,
                    });
                }
                catalog.push(schema);
            }

            tracing::debug!(mode = %id, tools = catalog.len(), "Registered mode");
            modes.insert(
                id.clone(),
                RegisteredMode {
                    definition: definition.clone(),
                    tools,
                    catalog,
                },
            );
        }

        Ok(ModeRegistry { modes })
    }
}

/// Frozen mapping from mode identity to definition. Read-only, lock-free.
#[derive(Debug)]
pub struct ModeRegistry {
    modes: HashMap<ModeId, RegisteredMode>,
}

impl ModeRegistry {
    pub fn builder() -> ModeRegistryBuilder {
        ModeRegistryBuilder::new()
    }

    /// Look up a mode's definition
    pub fn resolve(&self, id: &str) -> Result<&Arc<ModeDefinition>> {
        self.entry(id).map(RegisteredMode::definition)
    }

    /// Look up a mode together with its resolved tools
    pub fn entry(&self, id: &str) -> Result<&RegisteredMode> {
        self.modes
            .get(id)
            .ok_or_else(|| ModeError::UnknownMode(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modes.contains_key(id)
    }

    /// Mode identities, sorted
    pub fn ids(&self) -> Vec<&ModeId> {
        let mut ids: Vec<_> = self.modes.keys().collect();
        ids.sort();
        ids
    }

    /// Number of registered modes
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::tool::{ToolCall, ToolResult};
    use async_trait::async_trait;

    struct Noop(&'static str);

    #[async_trait]
    impl Tool for Noop {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.0.into(),
                description: "Does nothing".into(),
                parameters: Vec::new(),
                category: None,
                has_side_effects: false,
            }
        }

        async fn execute(&self, _call: &ToolCall) -> Result<ToolResult> {
            Ok(ToolResult::success(self.0, "ok"))
        }
    }

    fn mode(id: &str) -> crate::mode::ModeDefinitionBuilder {
        ModeDefinition::builder(id)
            .description(format!("The {id} mode"))
            .initial_state(|_| vec![Message::system("seed")])
    }

    #[test]
    fn test_duplicate_mode_rejected() {
        let mut builder = ModeRegistry::builder();
        builder.register(mode("orientation").build().unwrap()).unwrap();
        let err = builder
            .register(mode("orientation").build().unwrap())
            .err()
            .unwrap();
        assert!(matches!(err, ModeError::DuplicateMode(id) if id == "orientation"));
    }

    #[test]
    fn test_cyclic_mode_tools_resolve() {
        let registry = ModeRegistry::builder()
            .with_mode(mode("orientation").mode_tool("book_flight").build().unwrap())
            .unwrap()
            .with_mode(
                mode("book_flight")
                    .tool(Noop("search_flights"))
                    .mode_tool("orientation")
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .build()
            .unwrap();

        let orientation = registry.entry("orientation").unwrap();
        assert!(matches!(
            orientation.tool("book_flight"),
            Some(ResolvedTool::ModeEntry(id)) if id == "book_flight"
        ));
        assert_eq!(orientation.catalog()[0].description, "The book_flight mode");

        let booking = registry.entry("book_flight").unwrap();
        assert!(matches!(booking.tool("search_flights"), Some(ResolvedTool::Ordinary(_))));
        assert_eq!(booking.catalog().len(), 2);
        assert_eq!(registry.ids(), vec!["book_flight", "orientation"]);
    }

    #[test]
    fn test_dangling_mode_tool_rejected() {
        let err = ModeRegistry::builder()
            .with_mode(mode("orientation").mode_tool("missing").build().unwrap())
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, ModeError::UnknownMode(id) if id == "missing"));
    }

    #[test]
    fn test_duplicate_tool_name_rejected() {
        let err = ModeRegistry::builder()
            .with_mode(
                mode("orientation")
                    .tool(Noop("book_flight"))
                    .mode_tool("book_flight")
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .with_mode(mode("book_flight").build().unwrap())
            .unwrap()
            .build()
            .unwrap_err();
        assert!(err.is_startup_fatal());
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = ModeRegistry::builder().build().unwrap();
        assert!(registry.is_empty());
        assert!(matches!(registry.resolve("nowhere"), Err(ModeError::UnknownMode(_))));
    }
}
