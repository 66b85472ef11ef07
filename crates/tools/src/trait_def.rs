//! Tool Registry and Function Tools
//!
//! `ToolRegistry` is the dispatch table: an explicitly constructed mapping
//! from tool name to executable capability, handed to the orchestrator at
//! construction time. Nothing here is global, so tests can build registries
//! of doubles and several registries can coexist in one process.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use dataplan_core::{AnalysisContext, AnalysisTool, ArgMap, CoreResult, ToolOutput};

/// Boxed future returned by async `FunctionTool` handlers.
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = CoreResult<ToolOutput>> + Send + 'a>>;

/// Async handler signature used by `FunctionTool::new`.
pub type FunctionToolHandler =
    Box<dyn for<'a> Fn(&'a AnalysisContext, &'a ArgMap) -> ToolFuture<'a> + Send + Sync>;

/// Blocking handler signature used by `FunctionTool::from_fn`.
pub type SyncToolHandler =
    Box<dyn Fn(&AnalysisContext, &ArgMap) -> CoreResult<ToolOutput> + Send + Sync>;

enum Handler {
    Async(FunctionToolHandler),
    Sync(SyncToolHandler),
}

/// A tool created from a closure.
///
/// Useful for test doubles and for tools supplied at runtime without a
/// dedicated struct.
///
/// # Example
///
/// ```ignore
/// let tool = FunctionTool::from_fn("row_count", |ctx, _args| {
///     Ok(ToolOutput::preview(serde_json::json!(ctx.dataset().num_rows())))
/// });
/// ```
pub struct FunctionTool {
    tool_name: String,
    tool_description: String,
    handler: Handler,
}

impl FunctionTool {
    /// Create a FunctionTool from an async closure.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: for<'a> Fn(&'a AnalysisContext, &'a ArgMap) -> ToolFuture<'a> + Send + Sync + 'static,
    {
        Self {
            tool_name: name.into(),
            tool_description: String::new(),
            handler: Handler::Async(Box::new(handler)),
        }
    }

    /// Create a FunctionTool from a blocking closure.
    pub fn from_fn<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&AnalysisContext, &ArgMap) -> CoreResult<ToolOutput> + Send + Sync + 'static,
    {
        Self {
            tool_name: name.into(),
            tool_description: String::new(),
            handler: Handler::Sync(Box::new(handler)),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.tool_description = description.into();
        self
    }
}

#[async_trait]
impl AnalysisTool for FunctionTool {
    fn name(&self) -> &str {
        &self.tool_name
    }

    fn description(&self) -> &str {
        &self.tool_description
    }

    async fn execute(&self, ctx: &AnalysisContext, args: &ArgMap) -> CoreResult<ToolOutput> {
        match &self.handler {
            Handler::Async(handler) => handler(ctx, args).await,
            Handler::Sync(handler) => handler(ctx, args),
        }
    }
}

/// Dispatch table of executable tools.
///
/// O(1) lookup by name, deterministic iteration in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn AnalysisTool>>,
    /// Insertion order for deterministic iteration
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every built-in tool.
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        crate::impls::register_builtin_tools(&mut registry);
        registry
    }

    /// Register a tool. If a tool with the same name already exists, it is replaced.
    pub fn register(&mut self, tool: Arc<dyn AnalysisTool>) {
        let name = tool.name().to_string();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
    }

    /// Unregister a tool by name. Returns the removed tool, or None if not found.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn AnalysisTool>> {
        self.order.retain(|n| n != name);
        self.tools.remove(name)
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn AnalysisTool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All registered tool names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}
