//! Tree rendering for joint and scene hierarchies

use console::Style;

/// Represents a node in a tree structure
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    /// Short value printed on the node's own line
    pub detail: Option<String>,
    pub children: Vec<TreeNode>,
    pub metadata: Vec<(String, String)>,
}

/// Types of nodes in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Node,
    Joint,
}

/// Options for tree rendering
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
}

impl TreeNode {
    /// Create a new tree node
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            detail: None,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Add a child node
    pub fn add_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Set the inline detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.push((key.to_string(), value.into()));
        self
    }
}

impl NodeKind {
    /// Get emoji icon for node type
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Root => "📁",
            Self::Node => "🔹",
            Self::Joint => "🦴",
        }
    }

    /// Get color style for node type
    pub fn style(&self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                Self::Root => Style::new().bold().cyan(),
                Self::Node => Style::new().green(),
                Self::Joint => Style::new().yellow(),
            }
        }
    }
}

/// Render a tree structure to string
pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();
    render_node(root, &mut output, "", true, 0, options);
    output
}

/// Render a single node and its children
fn render_node(
    node: &TreeNode,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &TreeOptions,
) {
    if let Some(max_depth) = options.max_depth
        && depth > max_depth
    {
        return;
    }

    let style = node.kind.style(options.no_color);
    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    output.push_str(&format!(
        "{prefix}{connector}{} {}",
        node.kind.icon(),
        style.apply_to(&node.name)
    ));
    if let Some(detail) = &node.detail {
        let detail_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };
        output.push_str(&format!(" {}", detail_style.apply_to(detail)));
    }
    output.push('\n');

    let child_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{prefix}{}", if is_last { "    " } else { "│   " })
    };

    if options.show_metadata {
        for (key, value) in &node.metadata {
            output.push_str(&format!("{child_prefix}    {key}: {value}\n"));
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i == node.children.len() - 1;
        render_node(
            child,
            output,
            &child_prefix,
            is_last_child,
            depth + 1,
            options,
        );
    }
}
