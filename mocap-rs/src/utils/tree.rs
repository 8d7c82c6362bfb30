//! Tree rendering for joint hierarchies

use console::Style;
use mocap_bvh::JointRole;

/// Represents a node in a tree structure
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    /// Key/value pairs, rendered in insertion order
    pub metadata: Vec<(String, String)>,
}

/// Types of nodes in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// The file itself
    File,
    Root,
    Chain,
    Branch,
    Site,
}

impl From<JointRole> for NodeType {
    fn from(role: JointRole) -> Self {
        match role {
            JointRole::Root => Self::Root,
            JointRole::Chain => Self::Chain,
            JointRole::Branch => Self::Branch,
            JointRole::Site => Self::Site,
        }
    }
}

/// Options for tree rendering
#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
    pub compact: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            no_color: false,
            show_metadata: true,
            compact: false,
        }
    }
}

impl TreeNode {
    /// Create a new tree node
    pub fn new(name: String, node_type: NodeType) -> Self {
        Self {
            name,
            node_type,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Add a child node
    pub fn add_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.push((key.to_string(), value.to_string()));
        self
    }
}

impl NodeType {
    /// Get emoji icon for node type
    pub fn icon(self) -> &'static str {
        match self {
            NodeType::File => "📄",
            NodeType::Root => "🦴",
            NodeType::Chain => "🔗",
            NodeType::Branch => "🌿",
            NodeType::Site => "📍",
        }
    }

    /// Get color style for node type
    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                NodeType::File => Style::new().bold().cyan(),
                NodeType::Root => Style::new().bold().yellow(),
                NodeType::Chain => Style::new().green(),
                NodeType::Branch => Style::new().magenta(),
                NodeType::Site => Style::new().dim(),
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

    let style = node.node_type.style(options.no_color);
    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    let mut line = format!(
        "{}{}{} {}",
        prefix,
        connector,
        node.node_type.icon(),
        style.apply_to(&node.name)
    );

    if options.show_metadata && options.compact && !node.metadata.is_empty() {
        let parts: Vec<String> = node
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        line.push_str(&format!(" [{}]", parts.join(", ")));
    }

    output.push_str(&line);
    output.push('\n');

    let child_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    if options.show_metadata && !options.compact {
        let meta_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };
        for (key, value) in &node.metadata {
            output.push_str(&format!(
                "{}    {}: {}\n",
                child_prefix,
                meta_style.apply_to(key),
                value
            ));
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::new("walk.bvh".to_string(), NodeType::File)
            .with_metadata("joints", "4")
            .add_child(
                TreeNode::new("Hips".to_string(), NodeType::Root)
                    .with_metadata("channels", "6")
                    .add_child(
                        TreeNode::new("Spine".to_string(), NodeType::Chain)
                            .add_child(TreeNode::new("Site".to_string(), NodeType::Site)),
                    ),
            )
    }

    #[test]
    fn test_tree_rendering() {
        let options = TreeOptions {
            no_color: true,
            ..TreeOptions::default()
        };
        let output = render_tree(&sample(), &options);

        assert!(output.starts_with("📄 walk.bvh\n"));
        assert!(output.contains("    joints: 4\n"));
        assert!(output.contains("└── 🦴 Hips\n"));
        assert!(output.contains("    └── 🔗 Spine\n"));
        assert!(output.contains("        └── 📍 Site\n"));
    }

    #[test]
    fn test_max_depth() {
        let options = TreeOptions {
            max_depth: Some(1),
            no_color: true,
            show_metadata: false,
            compact: false,
        };
        let output = render_tree(&sample(), &options);

        assert!(output.contains("Hips"));
        assert!(!output.contains("Spine"));
    }

    #[test]
    fn test_compact_metadata() {
        let options = TreeOptions {
            no_color: true,
            compact: true,
            ..TreeOptions::default()
        };
        let output = render_tree(&sample(), &options);
        assert!(output.contains("Hips [channels:6]"));
    }

    #[test]
    fn test_role_mapping() {
        assert_eq!(NodeType::from(JointRole::Branch), NodeType::Branch);
        assert_eq!(NodeType::from(JointRole::Site), NodeType::Site);
    }
}
