//! Rebuilds a folder hierarchy from the flat paths an archive lists.
//!
//! Archives don't always list their directories, so every intermediate path segment becomes a
//! directory node even if no entry names it explicitly.

use std::collections::HashMap;

use serde::Serialize;

use crate::archive::entry::ArchiveEntry;

/// One node of the reconstructed hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub name: String,
    /// Slash-joined path from the root, without trailing slash.
    pub full_path: String,
    pub is_directory: bool,
    pub size: u64,
    /// In first-seen order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Top-level nodes are 0.
    pub fn depth(&self) -> usize {
        self.full_path.matches('/').count()
    }

    /// Total number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }
}

/// Flat node stored while building; children are indices into the arena.
struct PendingNode {
    name: String,
    full_path: String,
    is_directory: bool,
    size: u64,
    children: Vec<usize>,
}

/// Builds the hierarchy and returns the top-level nodes. Sibling order follows the input.
pub fn build_entry_tree(entries: &[ArchiveEntry]) -> Vec<TreeNode> {
    let mut arena: Vec<PendingNode> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    let mut by_path: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let normalized = entry.display_path();
        let segments: Vec<&str> = normalized
            .trim_end_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let mut parent: Option<usize> = None;
        let mut key = String::new();

        for (i, segment) in segments.iter().enumerate() {
            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(segment);

            let index = match by_path.get(&key) {
                Some(&existing) => existing,
                None => {
                    let is_last = i == segments.len() - 1;
                    let index = arena.len();
                    arena.push(PendingNode {
                        name: (*segment).to_string(),
                        full_path: key.clone(),
                        is_directory: if is_last { entry.is_directory() } else { true },
                        size: if is_last { entry.size() } else { 0 },
                        children: Vec::new(),
                    });
                    by_path.insert(key.clone(), index);
                    match parent {
                        Some(p) => arena[p].children.push(index),
                        None => roots.push(index),
                    }
                    index
                }
            };
            parent = Some(index);
        }
    }

    roots.iter().map(|&index| materialize(&arena, index)).collect()
}

fn materialize(arena: &[PendingNode], index: usize) -> TreeNode {
    let pending = &arena[index];
    TreeNode {
        name: pending.name.clone(),
        full_path: pending.full_path.clone(),
        is_directory: pending.is_directory,
        size: pending.size,
        children: pending.children.iter().map(|&child| materialize(arena, child)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn infers_intermediate_directories() {
        let entries = vec![ArchiveEntry::file("a/b/file.txt", 10), ArchiveEntry::file("a/c.txt", 20)];

        let roots = build_entry_tree(&entries);

        assert_eq!(names(&roots), vec!["a"]);
        let a = &roots[0];
        assert!(a.is_directory);
        assert_eq!(a.depth(), 0);
        assert_eq!(names(&a.children), vec!["b", "c.txt"]);

        let b = &a.children[0];
        assert!(b.is_directory);
        assert_eq!(b.full_path, "a/b");
        assert_eq!(b.depth(), 1);
        assert_eq!(names(&b.children), vec!["file.txt"]);

        let file = &b.children[0];
        assert!(!file.is_directory);
        assert_eq!(file.size, 10);
        assert_eq!(file.depth(), 2);

        let c = &a.children[1];
        assert!(!c.is_directory);
        assert_eq!(c.size, 20);
        assert_eq!(c.depth(), 1);
        assert!(c.children.is_empty());
    }

    #[test]
    fn explicit_directory_entry_is_not_duplicated() {
        let entries = vec![
            ArchiveEntry::directory("docs/"),
            ArchiveEntry::file("docs\\guide.md", 5),
            ArchiveEntry::file("readme.txt", 1),
        ];

        let roots = build_entry_tree(&entries);

        assert_eq!(names(&roots), vec!["docs", "readme.txt"]);
        assert_eq!(names(&roots[0].children), vec!["guide.md"]);
        assert_eq!(roots.iter().map(TreeNode::node_count).sum::<usize>(), 3);
    }

    #[test]
    fn sibling_order_is_first_seen_not_sorted() {
        let entries = vec![
            ArchiveEntry::file("z.txt", 1),
            ArchiveEntry::file("m/x.txt", 1),
            ArchiveEntry::file("a.txt", 1),
            ArchiveEntry::file("m/b.txt", 1),
        ];

        let roots = build_entry_tree(&entries);

        assert_eq!(names(&roots), vec!["z.txt", "m", "a.txt"]);
        assert_eq!(names(&roots[1].children), vec!["x.txt", "b.txt"]);
    }

    #[test]
    fn first_entry_for_a_path_wins() {
        // A directory implied by a descendant keeps its directory flag even if listed later as a file
        let entries = vec![ArchiveEntry::file("a/b.txt", 1), ArchiveEntry::file("a", 99)];
        let roots = build_entry_tree(&entries);
        assert_eq!(roots.len(), 1);
        assert!(roots[0].is_directory);
        assert_eq!(roots[0].size, 0);
    }

    #[test]
    fn empty_input_and_empty_names() {
        assert!(build_entry_tree(&[]).is_empty());
        assert!(build_entry_tree(&[ArchiveEntry::directory("/")]).is_empty());
    }
}
