//! Tree data structures for dependency display
//!
//! Provides `TreeNode` for the hierarchical view of a module's dependencies
//! and `FlattenedNode` for rendering it line by line.

use serde::Serialize;

use super::NodeKind;

/// A node in the dependency tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// Module ID for the root, GAVC otherwise
    pub id: String,
    pub name: String,
    pub version: String,
    /// Scope of the edge leading to this node (None for the root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub kind: NodeKind,
    /// Depth in the tree (0 = root)
    pub depth: usize,
    /// Child dependencies
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    /// Already shown elsewhere in the tree; never has children
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub revisited: bool,
}

impl TreeNode {
    /// Create a new tree node
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            scope: None,
            kind,
            depth: 0,
            children: Vec::new(),
            revisited: false,
        }
    }

    /// Sets the scope of the edge leading to this node.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Add a child node, fixing up the depth of its subtree
    pub fn add_child(&mut self, mut child: TreeNode) {
        child.set_depth(self.depth + 1);
        self.children.push(child);
    }

    fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
        for child in &mut self.children {
            child.set_depth(depth + 1);
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in the tree, root included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Finds the first node with the given ID, in pre-order
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Flatten the tree into a pre-order list for rendering
    pub fn flatten(&self) -> Vec<FlattenedNode> {
        let mut result = Vec::new();
        self.flatten_recursive(&mut result, true, &mut Vec::new());
        result
    }

    fn flatten_recursive(&self, result: &mut Vec<FlattenedNode>, is_last: bool, ancestors_are_last: &mut Vec<bool>) {
        result.push(FlattenedNode {
            id: self.id.clone(),
            scope: self.scope.clone(),
            kind: self.kind,
            depth: self.depth,
            revisited: self.revisited,
            is_last_child: is_last,
            ancestors_are_last: ancestors_are_last.clone(),
        });

        // The root's own flag never draws a rail.
        if self.depth > 0 {
            ancestors_are_last.push(is_last);
        }
        let child_count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.flatten_recursive(result, i + 1 == child_count, ancestors_are_last);
        }
        if self.depth > 0 {
            ancestors_are_last.pop();
        }
    }
}

/// A flattened representation of a tree node for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedNode {
    pub id: String,
    pub scope: Option<String>,
    pub kind: NodeKind,
    pub depth: usize,
    pub revisited: bool,
    /// Whether this is the last child of its parent
    pub is_last_child: bool,
    /// For each non-root ancestor, whether it was the last of its siblings
    pub ancestors_are_last: Vec<bool>,
}

impl FlattenedNode {
    /// Build the tree prefix (indentation and branch lines)
    pub fn tree_prefix(&self) -> String {
        let mut prefix = String::new();

        for &is_last in &self.ancestors_are_last {
            prefix.push_str(if is_last { "    " } else { "│   " });
        }

        if self.depth > 0 {
            prefix.push_str(if self.is_last_child { "└── " } else { "├── " });
        }

        prefix
    }

    /// Renders one line: prefix, ID, scope and markers
    pub fn render(&self) -> String {
        let mut line = format!("{}{}", self.tree_prefix(), self.id);
        if let Some(scope) = &self.scope {
            line.push_str(&format!(" ({scope})"));
        }
        if self.kind == NodeKind::Unresolved {
            line.push_str(" [unresolved]");
        }
        if self.revisited {
            line.push_str(" (*)");
        }
        line
    }
}
