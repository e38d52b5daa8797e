/*!
 * Directory tree reconstruction from flat relative paths
 */

use std::collections::BTreeMap;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const CONTINUATION: &str = "│   ";
const PADDING: &str = "    ";

/// Index of a node in the tree arena
pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, Default)]
struct TreeNode {
    /// Child name to node, kept sorted so rendering is order-independent
    children: BTreeMap<String, NodeId>,
}

/// Arena of path nodes. Node 0 is the scan root; every other node is a path
/// segment owned by its parent. A node with children renders as a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTree {
    nodes: Vec<TreeNode>,
}

impl Default for DirectoryTree {
    fn default() -> Self {
        Self {
            nodes: vec![TreeNode::default()],
        }
    }
}

impl DirectoryTree {
    /// Build a tree from `/`-separated relative paths
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::default();
        for path in paths {
            tree.insert(path.as_ref());
        }
        tree
    }

    /// Register every segment of `path` under its parent prefix
    pub fn insert(&mut self, path: &str) {
        let mut current = ROOT;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = match self.nodes[current].children.get(segment) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TreeNode::default());
                    self.nodes[current]
                        .children
                        .insert(segment.to_string(), child);
                    child
                }
            };
        }
    }

    /// Find the node for a relative path; `""` is the root
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(ROOT, |node, segment| {
                self.nodes[node].children.get(segment).copied()
            })
    }

    /// Sorted child names of a node
    pub fn children(&self, node: NodeId) -> Vec<&str> {
        self.nodes
            .get(node)
            .map(|n| n.children.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Render as an indented text tree, one entry per line, without a
    /// trailing newline. The root itself is not printed.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        let mut prefix = String::new();
        self.render_children(ROOT, &mut prefix, &mut lines);
        lines.join("\n")
    }

    fn render_children(&self, node: NodeId, prefix: &mut String, lines: &mut Vec<String>) {
        let children = &self.nodes[node].children;
        let count = children.len();

        for (i, (name, &child)) in children.iter().enumerate() {
            let last = i + 1 == count;
            let connector = if last { LAST_BRANCH } else { BRANCH };
            lines.push(format!("{}{}{}", prefix, connector, name));

            if !self.nodes[child].children.is_empty() {
                let depth = prefix.len();
                prefix.push_str(if last { PADDING } else { CONTINUATION });
                self.render_children(child, prefix, lines);
                prefix.truncate(depth);
            }
        }
    }
}

/// Build and render the tree for a set of relative paths
pub fn render_tree<I, S>(paths: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    DirectoryTree::from_paths(paths).render()
}
