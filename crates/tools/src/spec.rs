//! Tool Specification Registry
//!
//! Single source of truth for every tool's argument names, declared shapes
//! and required/optional status. The prompt builder, the coercer, the
//! validator and the dispatcher all read from the same registry so they
//! cannot drift apart.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

/// Closed set of argument shapes a tool can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgType {
    String,
    StringList,
    Float,
    Int,
    Bool,
}

impl ArgType {
    /// Label used in the prompt-facing schema block.
    pub fn label(self) -> &'static str {
        match self {
            ArgType::String => "str",
            ArgType::StringList => "List[str]",
            ArgType::Float => "float",
            ArgType::Int => "int",
            ArgType::Bool => "bool",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Declaration of one tool argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgSpec {
    pub name: String,
    pub arg_type: ArgType,
    pub required: bool,
    pub description: String,
}

impl ArgSpec {
    pub fn required(name: &str, arg_type: ArgType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            arg_type,
            required: true,
            description: description.to_string(),
        }
    }

    pub fn optional(name: &str, arg_type: ArgType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            arg_type,
            required: false,
            description: description.to_string(),
        }
    }
}

/// Declared argument shape of one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// Arguments in declaration order
    pub args: Vec<ArgSpec>,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str, args: Vec<ArgSpec>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            args,
        }
    }

    pub fn arg(&self, name: &str) -> Option<&ArgSpec> {
        self.args.iter().find(|a| a.name == name)
    }

    pub fn required_args(&self) -> impl Iterator<Item = &ArgSpec> {
        self.args.iter().filter(|a| a.required)
    }

    /// One prompt line: `- name: arg[type] (required), ...`
    pub fn spec_line(&self) -> String {
        if self.args.is_empty() {
            return format!("- {}: {{}}", self.name);
        }
        let parts: Vec<String> = self
            .args
            .iter()
            .map(|a| {
                let status = if a.required { "required" } else { "optional" };
                format!("{}[{}] ({})", a.name, a.arg_type, status)
            })
            .collect();
        format!("- {}: {}", self.name, parts.join(", "))
    }
}

/// Immutable registry of tool specifications.
///
/// O(1) lookup by name, iteration in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolSpecRegistry {
    specs: HashMap<String, ToolSpec>,
    order: Vec<String>,
}

impl ToolSpecRegistry {
    pub fn new(specs: Vec<ToolSpec>) -> Self {
        let mut registry = Self::default();
        for spec in specs {
            if !registry.specs.contains_key(&spec.name) {
                registry.order.push(spec.name.clone());
            }
            registry.specs.insert(spec.name.clone(), spec);
        }
        registry
    }

    pub fn get(&self, tool: &str) -> Option<&ToolSpec> {
        self.specs.get(tool)
    }

    pub fn contains(&self, tool: &str) -> bool {
        self.specs.contains_key(tool)
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Specs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolSpec> {
        self.order.iter().filter_map(|name| self.specs.get(name))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Render the registry as the flat text block embedded in the planning
    /// prompt. This is the only place the model learns valid call shapes.
    pub fn schema_block(&self) -> String {
        let mut lines = vec!["TOOL SPECIFICATION (strict):".to_string()];
        for spec in self.iter() {
            lines.push(format!("  {}", spec.spec_line()));
        }
        lines.join("\n")
    }
}

/// The process-wide registry of built-in tools. Every call shares one
/// instance.
pub fn builtin_specs() -> Arc<ToolSpecRegistry> {
    static SPECS: OnceLock<Arc<ToolSpecRegistry>> = OnceLock::new();
    SPECS
        .get_or_init(|| Arc::new(ToolSpecRegistry::new(builtin_tool_specs())))
        .clone()
}

fn builtin_tool_specs() -> Vec<ToolSpec> {
    use ArgType::*;

    vec![
        ToolSpec::new(
            "eda_overview",
            "Row/column counts, column names and missing values per column",
            vec![],
        ),
        ToolSpec::new(
            "summary_stats",
            "Descriptive statistics of numeric columns, optionally grouped",
            vec![
                ArgSpec::required("columns", StringList, "Numeric columns to summarise"),
                ArgSpec::optional(
                    "by",
                    String,
                    "Single grouping column (do NOT supply a list)",
                ),
            ],
        ),
        ToolSpec::new(
            "boxplot",
            "Box-and-whisker plot of a numeric column grouped by a category",
            vec![
                ArgSpec::required(
                    "x",
                    String,
                    "Grouping / category column (plotted on the x-axis)",
                ),
                ArgSpec::required(
                    "y",
                    String,
                    "Numeric column whose distribution is plotted on the y-axis",
                ),
            ],
        ),
        ToolSpec::new(
            "histogram",
            "Histogram of each numeric column",
            vec![
                ArgSpec::required("columns", StringList, "Numeric columns to plot"),
                ArgSpec::optional("bins", Int, "Number of bins (default 20)"),
            ],
        ),
        ToolSpec::new(
            "t_test",
            "Independent two-sample t-test between the two levels of a group",
            vec![
                ArgSpec::required("group_column", String, "Grouping variable (2 levels)"),
                ArgSpec::required("value_column", String, "Numeric outcome to compare"),
                ArgSpec::optional(
                    "equal_var",
                    Bool,
                    "Assume equal variances (default false, Welch's test)",
                ),
            ],
        ),
    ]
}
