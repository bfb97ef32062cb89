// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Path-keyed node map shared by the in-memory and persisted drivers.
//!
//! Keys are normalized virtual paths (`/`, `/a`, `/a/b`). Every key except
//! the root has a directory entry for each of its ancestors.

use crate::entry::{FileEntry, WatchEvent, WatchEventType};
use crate::error::{Error, Result};
use crate::path::{self, FilePath};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::ops::Bound;

pub(crate) const ROOT: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VirtualNode {
    pub data: Vec<u8>,
    pub is_directory: bool,
    pub mtime: DateTime<Utc>,
}

impl VirtualNode {
    pub fn directory() -> Self {
        Self {
            data: Vec::new(),
            is_directory: true,
            mtime: Utc::now(),
        }
    }

    pub fn file(data: Vec<u8>) -> Self {
        Self {
            data,
            is_directory: false,
            mtime: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VirtualTree {
    nodes: BTreeMap<String, VirtualNode>,
}

impl Default for VirtualTree {
    fn default() -> Self {
        Self::new()
    }
}

fn child_prefix(key: &str) -> String {
    if key == ROOT {
        ROOT.to_string()
    } else {
        format!("{key}/")
    }
}

fn ancestors(key: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = path::parent(key);
    while let Some(p) = current {
        current = path::parent(&p);
        out.push(p);
    }
    out.reverse();
    out
}

fn event(kind: WatchEventType, key: &str) -> WatchEvent {
    WatchEvent::new(kind, FilePath::new_unchecked(key))
}

impl VirtualTree {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        let _ = nodes.insert(ROOT.to_string(), VirtualNode::directory());
        Self { nodes }
    }

    /// Rebuild from stored nodes, restoring the root and any missing ancestors.
    pub fn from_nodes(nodes: BTreeMap<String, VirtualNode>) -> Self {
        let mut tree = Self::new();
        for (key, node) in nodes {
            let key = path::normalize_virtual(&key);
            for dir in ancestors(&key) {
                let _ = tree.nodes.entry(dir).or_insert_with(VirtualNode::directory);
            }
            let _ = tree.nodes.insert(key, node);
        }
        tree
    }

    pub fn nodes(&self) -> &BTreeMap<String, VirtualNode> {
        &self.nodes
    }

    /// True when nothing but the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn entry(&self, key: &str) -> Option<FileEntry> {
        self.nodes.get(key).map(|node| Self::to_entry(key, node))
    }

    fn to_entry(key: &str, node: &VirtualNode) -> FileEntry {
        let path = FilePath::new_unchecked(key);
        if node.is_directory {
            FileEntry::directory(path, Some(node.mtime))
        } else {
            FileEntry::file(path, node.data.len() as u64, Some(node.mtime))
        }
    }

    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        match self.nodes.get(key) {
            Some(node) if !node.is_directory => Ok(node.data.clone()),
            _ => Err(Error::not_found(key)),
        }
    }

    fn ensure_directories(&mut self, dirs: &[String], changes: &mut Vec<WatchEvent>) -> Result<()> {
        for dir in dirs {
            match self.nodes.get(dir) {
                Some(node) if node.is_directory => {}
                Some(_) => return Err(Error::not_a_directory(dir)),
                None => {
                    let _ = self.nodes.insert(dir.clone(), VirtualNode::directory());
                    changes.push(event(WatchEventType::Created, dir));
                }
            }
        }
        Ok(())
    }

    /// Write a file whose parent directory already exists.
    pub fn write(&mut self, key: &str, data: &[u8]) -> Result<Vec<WatchEvent>> {
        let parent = path::parent(key).unwrap_or_else(|| ROOT.to_string());
        match self.nodes.get(&parent) {
            Some(node) if node.is_directory => {}
            Some(_) => return Err(Error::not_a_directory(&parent)),
            None => return Err(Error::not_found(&parent)),
        }
        self.put_file(key, data, Vec::new())
    }

    /// Write a file, creating missing ancestor directories.
    pub fn write_creating_parents(&mut self, key: &str, data: &[u8]) -> Result<Vec<WatchEvent>> {
        let mut changes = Vec::new();
        self.ensure_directories(&ancestors(key), &mut changes)?;
        self.put_file(key, data, changes)
    }

    fn put_file(&mut self, key: &str, data: &[u8], mut changes: Vec<WatchEvent>) -> Result<Vec<WatchEvent>> {
        if key == ROOT {
            return Err(Error::not_a_file(key));
        }
        let kind = match self.nodes.get(key) {
            Some(existing) if existing.is_directory => return Err(Error::not_a_file(key)),
            Some(_) => WatchEventType::Modified,
            None => WatchEventType::Created,
        };
        let _ = self.nodes.insert(key.to_string(), VirtualNode::file(data.to_vec()));
        changes.push(event(kind, key));
        Ok(changes)
    }

    pub fn readdir(&self, key: &str) -> Result<Vec<FileEntry>> {
        match self.nodes.get(key) {
            None => return Err(Error::not_found(key)),
            Some(node) if !node.is_directory => return Err(Error::not_a_directory(key)),
            Some(_) => {}
        }
        let prefix = child_prefix(key);
        let entries = self
            .nodes
            .range::<str, _>((Bound::Excluded(prefix.as_str()), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(&prefix))
            .filter(|(k, _)| !k[prefix.len()..].contains('/'))
            .map(|(k, node)| Self::to_entry(k, node))
            .collect();
        Ok(entries)
    }

    pub fn mkdir(&mut self, key: &str) -> Result<Vec<WatchEvent>> {
        let mut dirs = ancestors(key);
        dirs.push(key.to_string());
        let mut changes = Vec::new();
        self.ensure_directories(&dirs, &mut changes)?;
        Ok(changes)
    }

    /// Remove a node and everything below it. Removing the root clears
    /// its children but keeps the root itself.
    pub fn rm(&mut self, key: &str) -> Vec<WatchEvent> {
        let prefix = child_prefix(key);
        let doomed: Vec<String> = self
            .nodes
            .range::<str, _>((Bound::Excluded(prefix.as_str()), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, _)| k.clone())
            .collect();
        for k in &doomed {
            let _ = self.nodes.remove(k);
        }
        let existed = key != ROOT && self.nodes.remove(key).is_some();
        if existed || (key == ROOT && !doomed.is_empty()) {
            vec![event(WatchEventType::Deleted, key)]
        } else {
            Vec::new()
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_write_creating_parents() {
        let mut tree = VirtualTree::new();
        let changes = tree.write_creating_parents("/a/b/c.txt", b"x").unwrap();
        assert!(tree.entry("/a").unwrap().is_directory);
        assert!(tree.entry("/a/b").unwrap().is_directory);
        let kinds: Vec<_> = changes.iter().map(|c| (c.kind, c.path.to_string())).collect();
        assert_eq!(
            kinds,
            vec![
                (WatchEventType::Created, "/a".to_string()),
                (WatchEventType::Created, "/a/b".to_string()),
                (WatchEventType::Created, "/a/b/c.txt".to_string()),
            ]
        );
        let again = tree.write("/a/b/c.txt", b"y").unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].kind, WatchEventType::Modified);
    }

    #[test]
    fn test_write_through_file_fails() {
        let mut tree = VirtualTree::new();
        let _ = tree.write("/f", b"").unwrap();
        let err = tree.write("/f/g", b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongKind);
        let err = tree.write_creating_parents("/f/g", b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongKind);
        assert_eq!(tree.write("/", b"").unwrap_err().kind(), ErrorKind::WrongKind);
    }

    #[test]
    fn test_write_needs_parent() {
        let mut tree = VirtualTree::new();
        let err = tree.write("/no/such/f.txt", b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!tree.exists("/no"));
        assert!(!tree.exists("/no/such"));

        let _ = tree.mkdir("/no/such").unwrap();
        let changes = tree.write("/no/such/f.txt", b"x").unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, WatchEventType::Created);
    }

    #[test]
    fn test_readdir_excludes_nested_and_siblings() {
        let mut tree = VirtualTree::new();
        let _ = tree.mkdir("/d/sub").unwrap();
        let _ = tree.write("/d/a.txt", b"1").unwrap();
        let _ = tree.write("/d/sub/deep.txt", b"2").unwrap();
        let _ = tree.write_creating_parents("/d2/other.txt", b"3").unwrap();
        let names: Vec<_> = tree.readdir("/d").unwrap().into_iter().map(|e| (e.name, e.is_directory)).collect();
        assert_eq!(names, vec![("a.txt".to_string(), false), ("sub".to_string(), true)]);
        let root: Vec<_> = tree.readdir("/").unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(root, vec!["d", "d2"]);
    }

    #[test]
    fn test_rm_is_recursive_and_idempotent() {
        let mut tree = VirtualTree::new();
        let _ = tree.write_creating_parents("/d/sub/x", b"").unwrap();
        assert_eq!(tree.rm("/d").len(), 1);
        assert!(!tree.exists("/d/sub/x"));
        assert!(tree.rm("/d").is_empty());
        assert!(tree.exists("/"));
    }

    #[test]
    fn test_from_nodes_restores_ancestors() {
        let mut nodes = BTreeMap::new();
        let _ = nodes.insert("/x/y.txt".to_string(), VirtualNode::file(b"y".to_vec()));
        let tree = VirtualTree::from_nodes(nodes);
        assert!(tree.entry("/x").unwrap().is_directory);
        assert_eq!(tree.read("/x/y.txt").unwrap(), b"y");
    }
}
