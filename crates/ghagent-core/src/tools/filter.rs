//! Tool name filtering

use std::collections::HashSet;

use crate::config::ToolSettings;
use crate::types::ToolDescriptor;

/// Selects which discovered tools are offered to the model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolFilter {
    /// If set, only include tools with these names
    pub include: Option<HashSet<String>>,
    pub exclude: HashSet<String>,
}

impl ToolFilter {
    /// Accept everything
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.include = Some(names.into_iter().collect());
        self
    }

    pub fn with_exclude(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.exclude = names.into_iter().collect();
        self
    }

    pub fn matches(&self, tool: &ToolDescriptor) -> bool {
        if self.exclude.contains(&tool.name) {
            return false;
        }
        match &self.include {
            Some(include) => include.contains(&tool.name),
            None => true,
        }
    }

    pub fn apply(&self, tools: Vec<ToolDescriptor>) -> Vec<ToolDescriptor> {
        tools.into_iter().filter(|t| self.matches(t)).collect()
    }
}

impl From<&ToolSettings> for ToolFilter {
    fn from(settings: &ToolSettings) -> Self {
        let filter = ToolFilter::new().with_exclude(settings.exclude.iter().cloned());
        if settings.include.is_empty() {
            filter
        } else {
            filter.with_include(settings.include.iter().cloned())
        }
    }
}
