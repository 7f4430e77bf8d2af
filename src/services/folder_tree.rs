//! Folder hierarchy resolution over a flat folder list.
//!
//! The adjacency map is built once per request; every walk carries a visited
//! set so a corrupted parent chain terminates instead of looping.

use std::collections::{HashMap, HashSet};

use crate::models::{Folder, FolderNode};

/// Parent-to-children index over folders in storage order.
pub struct FolderTree<'a> {
    folders: &'a [Folder],
    children: HashMap<Option<i32>, Vec<usize>>,
}

impl<'a> FolderTree<'a> {
    pub fn new(folders: &'a [Folder]) -> Self {
        let mut children: HashMap<Option<i32>, Vec<usize>> = HashMap::new();
        for (idx, folder) in folders.iter().enumerate() {
            children.entry(folder.parent_id).or_default().push(idx);
        }
        Self { folders, children }
    }

    fn children_of(&self, parent: Option<i32>) -> impl Iterator<Item = &'a Folder> + '_ {
        let folders = self.folders;
        self.children
            .get(&parent)
            .into_iter()
            .flatten()
            .map(move |&idx| &folders[idx])
    }

    /// `root` plus every folder reachable by following child links downward.
    pub fn descendant_ids(&self, root: i32) -> HashSet<i32> {
        let mut seen = HashSet::from([root]);
        let mut pending = vec![root];

        while let Some(id) = pending.pop() {
            for child in self.children_of(Some(id)) {
                if seen.insert(child.id) {
                    pending.push(child.id);
                }
            }
        }

        seen
    }

    /// True when `candidate` is `ancestor` itself or lies somewhere below it.
    pub fn is_within(&self, ancestor: i32, candidate: i32) -> bool {
        self.descendant_ids(ancestor).contains(&candidate)
    }

    /// Nested forest rooted at folders without a parent, children in storage order.
    ///
    /// Folders whose parent chain never reaches a root are left out.
    pub fn forest(&self) -> Vec<FolderNode> {
        let mut visited = HashSet::new();
        self.build_level(None, &mut visited)
    }

    fn build_level(&self, parent: Option<i32>, visited: &mut HashSet<i32>) -> Vec<FolderNode> {
        let mut nodes = Vec::new();
        for folder in self.children_of(parent) {
            if !visited.insert(folder.id) {
                continue;
            }
            let children = self.build_level(Some(folder.id), visited);
            nodes.push(FolderNode {
                id: folder.id,
                name: folder.name.clone(),
                parent_id: folder.parent_id,
                project_name: folder.project_name.clone(),
                children,
            });
        }
        nodes
    }
}
