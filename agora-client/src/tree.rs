use std::collections::{HashMap, HashSet};

use crate::api::{CommentId, CommentRecord, TaggedMessage};

/// One node of the threaded view. Owns its children; depth is 0 for a root
/// and parent + 1 below, which for a well-formed record set equals the
/// length of the record's ancestor path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub record: CommentRecord,
    pub children: Vec<CommentNode>,
    pub depth: u32,
    pub collapsed: bool,
}

impl CommentNode {
    /// Number of nodes in this subtree, itself included.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(CommentNode::len).sum::<usize>()
    }
}

/// Re-derives the threaded tree from a flat record set. Pure: same records
/// in, structurally identical tree out. A record whose declared parent is
/// absent from the set (e.g. the parent was purged) is placed at root level
/// rather than dropped.
pub fn build_tree(records: &[CommentRecord]) -> Vec<CommentNode> {
    build_tree_with(records, &HashMap::new())
}

fn build_tree_with(
    records: &[CommentRecord],
    collapsed: &HashMap<CommentId, bool>,
) -> Vec<CommentNode> {
    let present: HashSet<CommentId> = records.iter().map(|r| r.id).collect();
    // Indices grouped by parent, in input order. Input order is what defines
    // sibling order, so an optimistic reply unshifted into the flat set
    // comes out first among its siblings.
    let mut children: HashMap<Option<CommentId>, Vec<usize>> = HashMap::new();
    for (idx, r) in records.iter().enumerate() {
        let parent = r.parent_id().filter(|p| *p != r.id && present.contains(p));
        if parent.is_none() && r.parent_id().is_some() {
            tracing::debug!(comment = ?r.id, "comment parent not in record set, placing at root");
        }
        children.entry(parent).or_default().push(idx);
    }
    attach(records, &children, collapsed, None, 0)
}

fn attach(
    records: &[CommentRecord],
    children: &HashMap<Option<CommentId>, Vec<usize>>,
    collapsed: &HashMap<CommentId, bool>,
    parent: Option<CommentId>,
    depth: u32,
) -> Vec<CommentNode> {
    children
        .get(&parent)
        .map(|idxs| {
            idxs.iter()
                .map(|&idx| {
                    let record = records[idx].clone();
                    let node_children =
                        attach(records, children, collapsed, Some(record.id), depth + 1);
                    CommentNode {
                        collapsed: collapsed.get(&record.id).copied().unwrap_or(false),
                        record,
                        children: node_children,
                        depth,
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

/// The flat record set for one post, plus the collapse side map. The tree is
/// never mutated in place: every [`CommentStore::tree`] call re-derives it,
/// and collapse state lives outside the records so a rebuild from fresh
/// server data does not discard it.
#[derive(Clone, Debug, Default)]
pub struct CommentStore {
    records: Vec<CommentRecord>,
    collapsed: HashMap<CommentId, bool>,
}

impl CommentStore {
    pub fn new() -> CommentStore {
        CommentStore::default()
    }

    /// Replace the whole record set, e.g. from a (re)fetch. Collapse state
    /// is kept.
    pub fn load(&mut self, records: Vec<CommentRecord>) {
        self.records = records;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: CommentId) -> Option<&CommentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn tree(&self) -> Vec<CommentNode> {
        build_tree_with(&self.records, &self.collapsed)
    }

    /// Insert an optimistic local reply at the front of the flat set, so it
    /// renders first among its siblings and a later full rebuild is
    /// idempotent. No-op if the id is already present (e.g. the server
    /// echoed our own comment back first).
    pub fn insert_local_reply(&mut self, record: CommentRecord) -> bool {
        if self.get(record.id).is_some() {
            return false;
        }
        self.records.insert(0, record);
        true
    }

    /// Insert or replace a server-delivered record.
    pub fn upsert(&mut self, record: CommentRecord) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Remove a record entirely. Its descendants, if any, will surface at
    /// root level on the next rebuild (degraded but non-fatal).
    pub fn remove(&mut self, id: CommentId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    pub fn is_collapsed(&self, id: CommentId) -> bool {
        self.collapsed.get(&id).copied().unwrap_or(false)
    }

    pub fn toggle_collapsed(&mut self, id: CommentId) {
        let entry = self.collapsed.entry(id).or_insert(false);
        *entry = !*entry;
    }

    /// Apply a tagged server message to the flat set. Unknown tags are a
    /// no-op; the widget owning this store is required to never fail on
    /// messages it does not own.
    pub fn apply(&mut self, msg: &TaggedMessage) -> bool {
        match msg {
            TaggedMessage::CommentCreated(record) => {
                self.upsert(record.clone());
                true
            }
            TaggedMessage::CommentEdited {
                comment_id,
                content,
            } => match self.records.iter_mut().find(|r| r.id == *comment_id) {
                Some(r) => {
                    r.content = content.clone();
                    true
                }
                None => false,
            },
            TaggedMessage::CommentDeleted { comment_id } => {
                match self.records.iter_mut().find(|r| r.id == *comment_id) {
                    Some(r) => {
                        r.deleted = true;
                        true
                    }
                    None => false,
                }
            }
            TaggedMessage::ReplyMarkedRead { comment_id } => {
                match self.records.iter_mut().find(|r| r.id == *comment_id) {
                    Some(r) => {
                        r.read = true;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }
}
