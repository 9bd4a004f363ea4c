//! Tool Registry - the single source of truth for registered tools.
//!
//! Both the MCP router (stdio) and the HTTP bridge are built from the same
//! registry, so tool metadata and dispatch cannot drift apart.

use std::collections::HashMap;

use rmcp::model::Tool;
use tracing::debug;

use super::definitions;
use super::descriptor::{ToolCategory, ToolDefinition, ToolDescriptor};
use super::error::{ToolError, ToolResult};
use crate::core::config::SafetyConfig;

/// Immutable registry of tool descriptors, in registration order.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
}

/// Collects tool definitions before the registry is frozen.
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<ToolDescriptor>,
    read_only: bool,
}

impl ToolRegistryBuilder {
    /// Skip mutating tools.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn register<T: ToolDefinition>(mut self) -> Self {
        if self.read_only && T::MUTATING {
            debug!("Read-only mode: skipping {}", T::NAME);
            return self;
        }
        self.tools.push(ToolDescriptor::of::<T>());
        self
    }

    /// Freeze the registry, rejecting duplicate names and mutating tools
    /// without a `confirm` parameter.
    pub fn build(self) -> ToolResult<ToolRegistry> {
        let mut index = HashMap::with_capacity(self.tools.len());
        for (position, tool) in self.tools.iter().enumerate() {
            if index.insert(tool.name, position).is_some() {
                return Err(ToolError::internal(format!(
                    "tool '{}' registered twice",
                    tool.name
                )));
            }
            if tool.mutating && !tool.declares_confirm() {
                return Err(ToolError::internal(format!(
                    "mutating tool '{}' does not declare a confirm parameter",
                    tool.name
                )));
            }
        }

        Ok(ToolRegistry {
            tools: self.tools,
            index,
        })
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Registry with every built-in tool.
    pub fn with_defaults(safety: &SafetyConfig) -> ToolResult<Self> {
        definitions::register_builtin(Self::builder().read_only(safety.read_only)).build()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name).collect()
    }

    pub fn by_category(&self, category: ToolCategory) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().filter(move |t| t.category == category)
    }

    /// Get all tools as rmcp Tool models (metadata).
    pub fn get_all_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDescriptor::to_tool).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
