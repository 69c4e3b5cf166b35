//! Format-independent document tree
//!
//! Parsers produce a [`TreeNode`] graph rooted at a node named [`ROOT_NAME`];
//! view-models browse and edit it; serializers turn it back into text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reactive::Describe;

/// Name of the synthesized root node
pub const ROOT_NAME: &str = "Root";

/// One structural unit of a parsed document.
///
/// A node with a value is a leaf, a node without one is a container. Names
/// are only meaningful among siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub value: Option<String>,
    pub children: Vec<TreeNode>,
    /// Whether the node is being edited interactively
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub editing: bool,
}

impl TreeNode {
    pub fn container(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Empty root container
    pub fn root() -> Self {
        Self::container(ROOT_NAME)
    }

    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }

    /// `"name": value`, the label shown for a node
    pub fn name_value_string(&self) -> String {
        format!("\"{}\": {}", self.name, self.value.as_deref().unwrap_or(""))
    }

    /// First child named `name`
    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn node_at(&self, path: &NodePath) -> Option<&TreeNode> {
        path.indices()
            .iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn node_at_mut(&mut self, path: &NodePath) -> Option<&mut TreeNode> {
        path.indices()
            .iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Resolve a slash-separated name path such as `servers/[0]/host`.
    ///
    /// Each segment picks the first child with that name. An empty string
    /// resolves to this node.
    pub fn find(&self, names: &str) -> Option<NodePath> {
        let mut node = self;
        let mut path = NodePath::root();
        for segment in names.split('/').filter(|s| !s.is_empty()) {
            let index = node.children.iter().position(|c| c.name == segment)?;
            node = &node.children[index];
            path = path.child(index);
        }
        Some(path)
    }

    /// Total number of nodes, this one included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Number of levels below and including this node
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    /// Depth-first walk in document order, with each node's path
    pub fn walk(&self, visit: &mut impl FnMut(&NodePath, &TreeNode)) {
        fn go(node: &TreeNode, path: &NodePath, visit: &mut impl FnMut(&NodePath, &TreeNode)) {
            visit(path, node);
            for (index, child) in node.children.iter().enumerate() {
                go(child, &path.child(index), visit);
            }
        }
        go(self, &NodePath::root(), visit);
    }

    /// Clear the editing flag on this node and all descendants
    pub fn clear_editing(&mut self) {
        self.editing = false;
        for child in &mut self.children {
            child.clear_editing();
        }
    }
}

impl Describe for TreeNode {
    fn describe(&self) -> String {
        match &self.value {
            Some(value) => format!("{} = {}", self.name, value),
            None => format!("{} ({} children)", self.name, self.children.len()),
        }
    }
}

/// Name used for the array element at `index`
pub fn index_name(index: usize) -> String {
    format!("[{index}]")
}

/// Parse an array element name produced by [`index_name`]
pub fn parse_index_name(name: &str) -> Option<usize> {
    let digits = name.strip_prefix('[')?.strip_suffix(']')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Position of a node as child indices from the root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

impl Describe for NodePath {
    fn describe(&self) -> String {
        self.to_string()
    }
}
