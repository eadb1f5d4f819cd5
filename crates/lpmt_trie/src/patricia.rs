use std::fmt::{Debug, Formatter};

use bitvec::prelude::*;
use log::trace;
use lpmt_core::{bit_at, first_diff, Mask, Prefix, KEY_BITS};

#[cfg(feature = "graphviz")]
use graphviz_rust::{
    cmd::{CommandArg, Format},
    exec, parse,
    printer::PrinterContext,
};
#[cfg(feature = "graphviz")]
use std::fmt::Display;

use crate::{
    iter::Iter,
    node::{MaskEntry, Node, NodeId, NodeRef},
};

/// What to do when an (address, mask) pair is inserted a second time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Keep a single entry per mask and hand the previous data back to the caller.
    #[default]
    Replace,
    /// Keep every entry; lookups resolve to the one inserted first.
    Append,
}

/// Patricia trie over 32-bit keys for longest-prefix-match lookup.
///
/// Nodes live in an arena. The root is slot 0, is keyed `0.0.0.0`, branches on bit 0 and always
/// carries the default `/0` entry, so every lookup resolves to something.
pub struct PatriciaTrie<V> {
    pub(crate) nodes: Vec<Node<V>>,
    pub(crate) live: BitVec,
    free: Vec<NodeId>,
    pub(crate) entries: usize,
    policy: MergePolicy,
}

impl<V> PatriciaTrie<V> {
    /// Creates a trie whose default route carries `default`.
    #[inline]
    pub fn new(default: V) -> Self {
        Self::with_policy(default, MergePolicy::default())
    }

    pub fn with_policy(default: V, policy: MergePolicy) -> Self {
        PatriciaTrie {
            nodes: vec![Node::with_entry(0, 0, MaskEntry::new(Mask::ANY, default))],
            live: bitvec![1; 1],
            free: Vec::new(),
            entries: 1,
            policy,
        }
    }

    #[inline]
    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Number of stored prefixes, the default route included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Whether the default route is the only entry left.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries == 1
    }

    /// Number of linked nodes, branch nodes included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.live.count_ones()
    }

    #[inline]
    pub fn root(&self) -> NodeRef<'_, V> {
        NodeRef::new(NodeId::ROOT, self.at(NodeId::ROOT))
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, V>> {
        match self.live.get(id.index()) {
            Some(live) if *live => Some(NodeRef::new(id, self.at(id))),
            _ => None,
        }
    }

    /// Drops every entry but the default route.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.live.truncate(1);
        self.free.clear();
        let root = &mut self.nodes[NodeId::ROOT.index()];
        root.children = [None, None];
        let specific = root.masks.partition_point(|e| !e.mask.is_any());
        root.masks.drain(..specific);
        root.masks.truncate(1);
        self.entries = 1;
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self)
    }

    /// Raw structural walk: follows `key`'s bits until there is no child in that direction.
    ///
    /// The node reached is only a candidate. Its key may diverge from `key` outside its own
    /// masks, so check it with [NodeRef::matching] before trusting it, or use
    /// [search](Self::search), which does that on the way down.
    pub fn candidate(&self, key: u32) -> NodeRef<'_, V> {
        let mut cur = NodeId::ROOT;
        while let Some(child) = self.at(cur).child_toward(key) {
            cur = child;
        }
        NodeRef::new(cur, self.at(cur))
    }

    /// Longest-prefix match: the deepest node holding an entry that covers `key`.
    /// Falls back to the root when nothing more specific is stored.
    #[inline]
    pub fn search(&self, key: u32) -> NodeRef<'_, V> {
        let (id, _) = self.best_match(key, KEY_BITS);
        NodeRef::new(id, self.at(id))
    }

    /// Longest stored prefix covering `key`, with its data.
    pub fn lookup(&self, key: u32) -> (Prefix, &V) {
        let (id, i) = self.best_match(key, KEY_BITS);
        let node = self.at(id);
        let entry = &node.masks[i];
        (Prefix::masked(node.key, entry.mask), &entry.data)
    }

    /// Exact prefix lookup.
    pub fn get(&self, prefix: &Prefix) -> Option<&V> {
        let id = self.find(prefix.addr())?;
        self.at(id)
            .masks
            .iter()
            .find(|e| e.mask == prefix.mask())
            .map(|e| &e.data)
    }

    pub fn get_mut(&mut self, prefix: &Prefix) -> Option<&mut V> {
        let id = self.find(prefix.addr())?;
        self.nodes[id.index()]
            .masks
            .iter_mut()
            .find(|e| e.mask == prefix.mask())
            .map(|e| &mut e.data)
    }

    /// Installs `data` under `prefix`.
    ///
    /// Returns the node now holding the prefix's address: a fresh node, or the existing one the
    /// entry was merged into. Under [MergePolicy::Replace] re-inserting a stored prefix swaps the
    /// data and returns the previous value.
    pub fn insert(&mut self, prefix: Prefix, data: V) -> (NodeId, Option<V>) {
        let key = prefix.addr();
        let len = prefix.len();
        let entry = MaskEntry::new(prefix.mask(), data);
        if key == self.at(NodeId::ROOT).key {
            return (NodeId::ROOT, self.merge(NodeId::ROOT, entry));
        }

        let mut parent = NodeId::ROOT;
        loop {
            let side = bit_at(key, self.at(parent).bit);
            let next = self.at(parent).children[side as usize];
            let Some(child) = next else {
                let id = self.attach(key, len, entry);
                self.link(parent, side, id);
                return (id, None);
            };
            let (ckey, cbit) = {
                let c = self.at(child);
                (c.key, c.bit)
            };
            if ckey == key {
                if len < cbit {
                    self.lift(child, len);
                }
                return (child, self.merge(child, entry));
            }
            let diff = first_diff(key, ckey);
            if cbit <= diff.min(len) {
                parent = child;
                continue;
            }

            // the edge parent -> child must be split
            let id = if len <= diff {
                trace!("{} takes over {:#010x}/{} from above", prefix, ckey, cbit);
                let id = self.attach(key, len, entry);
                self.link(id, bit_at(ckey, len), child);
                id
            } else if Mask::saturating(diff).apply(key) == key {
                trace!("{} branches at bit {} over {:#010x}", prefix, diff, ckey);
                let id = self.attach(key, diff, entry);
                self.link(id, bit_at(ckey, diff), child);
                id
            } else if Mask::saturating(diff).apply(ckey) == ckey {
                trace!("{:#010x} lifted to bit {} for {}", ckey, diff, prefix);
                self.lift(child, diff);
                let id = self.attach(key, len, entry);
                self.link(child, bit_at(key, diff), id);
                return (id, None);
            } else {
                trace!("{} splits {:#010x} at bit {}", prefix, ckey, diff);
                let id = self.attach(key, len, entry);
                let mut children = [None, None];
                children[bit_at(key, diff) as usize] = Some(id);
                children[bit_at(ckey, diff) as usize] = Some(child);
                let branch = self.alloc(Node::branch(Mask::saturating(diff).apply(key), diff, children));
                self.link(parent, side, branch);
                return (id, None);
            };
            self.link(parent, side, id);
            return (id, None);
        }
    }

    /// Search-then-insert: looks up the unmasked `addr` first and installs `addr/mask` only
    /// when nothing but the default route matches it.
    ///
    /// Any stored entry covering `addr` blocks the insert, including ones longer than `mask`.
    /// On refusal the node holding the best match is returned as the error.
    pub fn insert_unless_covered(&mut self, addr: u32, mask: Mask, data: V) -> Result<NodeId, NodeId> {
        let (id, i) = self.best_match(addr, KEY_BITS);
        if !self.at(id).masks[i].mask.is_any() {
            return Err(id);
        }
        Ok(self.insert(Prefix::masked(addr, mask), data).0)
    }

    /// Removes one stored prefix and returns its data.
    ///
    /// The last `/0` entry of the root is never removed. Nodes left without entries are
    /// unlinked, or replaced by their only child; the released slots are reused by later inserts.
    /// The arena itself never shrinks here, only [clear](Self::clear) gives the memory back.
    pub fn remove(&mut self, prefix: &Prefix) -> Option<V> {
        let key = prefix.addr();
        let mut path = Vec::new();
        let mut cur = NodeId::ROOT;
        while self.at(cur).key != key {
            let node = self.at(cur);
            let child = node.child_toward(key)?;
            if !self.at(child).spans(key) {
                return None;
            }
            path.push((cur, bit_at(key, node.bit)));
            cur = child;
        }

        let masks = &self.nodes[cur.index()].masks;
        let pos = masks.iter().position(|e| e.mask == prefix.mask())?;
        if cur == NodeId::ROOT && prefix.is_default() && masks.iter().filter(|e| e.mask.is_any()).count() == 1 {
            return None;
        }
        let entry = self.nodes[cur.index()].masks.remove(pos);
        self.entries -= 1;
        self.prune(path, cur);
        Some(entry.data)
    }

    /// Deepest node on `key`'s path holding an entry of at most `max_len` bits that covers it,
    /// with the entry's position.
    pub(crate) fn best_match(&self, key: u32, max_len: u8) -> (NodeId, usize) {
        let root = self.at(NodeId::ROOT);
        // the default route is the root's last entry
        let mut best = (NodeId::ROOT, root.masks.len() - 1);
        let mut cur = NodeId::ROOT;
        loop {
            let node = self.at(cur);
            if let Some(i) = node.matching(key, max_len) {
                best = (cur, i);
            }
            match node.child_toward(key) {
                Some(child) if self.at(child).bit <= max_len && self.at(child).spans(key) => {
                    cur = child
                }
                _ => return best,
            }
        }
    }

    /// First node on `key`'s path keyed exactly `key`; that node owns every entry for it.
    pub(crate) fn find(&self, key: u32) -> Option<NodeId> {
        let mut cur = NodeId::ROOT;
        loop {
            let node = self.at(cur);
            if node.key == key {
                return Some(cur);
            }
            let child = node.child_toward(key)?;
            if !self.at(child).spans(key) {
                return None;
            }
            cur = child;
        }
    }

    #[inline]
    pub(crate) fn at(&self, id: NodeId) -> &Node<V> {
        &self.nodes[id.index()]
    }

    fn alloc(&mut self, node: Node<V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = node;
                self.live.set(id.index(), true);
                id
            }
            None => {
                self.nodes.push(node);
                self.live.push(true);
                NodeId::new(self.nodes.len() - 1)
            }
        }
    }

    fn attach(&mut self, key: u32, bit: u8, entry: MaskEntry<V>) -> NodeId {
        self.entries += 1;
        self.alloc(Node::with_entry(key, bit, entry))
    }

    fn release(&mut self, id: NodeId) {
        debug_assert_ne!(id, NodeId::ROOT);
        let node = &mut self.nodes[id.index()];
        node.children = [None, None];
        node.masks = Vec::new();
        self.live.set(id.index(), false);
        self.free.push(id);
    }

    #[inline]
    fn link(&mut self, parent: NodeId, side: bool, child: NodeId) {
        debug_assert!(self.at(child).bit > self.at(parent).bit);
        self.nodes[parent.index()].children[side as usize] = Some(child);
    }

    /// Moves node `id` up to branch on `bit`, which its key must already be masked to.
    /// The old subtree shares the node's (zero) bit at that position, so it all goes left.
    fn lift(&mut self, id: NodeId, bit: u8) {
        let node = &mut self.nodes[id.index()];
        debug_assert!(bit < node.bit && !bit_at(node.key, bit));
        let (key, old_bit) = (node.key, node.bit);
        let children = std::mem::take(&mut node.children);
        node.bit = bit;
        let below = match children {
            [Some(_), Some(_)] => Some(self.alloc(Node::branch(key, old_bit, children))),
            [only, None] | [None, only] => only,
        };
        self.nodes[id.index()].children = [below, None];
    }

    fn merge(&mut self, id: NodeId, entry: MaskEntry<V>) -> Option<V> {
        let masks = &mut self.nodes[id.index()].masks;
        let len = entry.mask.len();
        if self.policy == MergePolicy::Replace {
            if let Some(existing) = masks.iter_mut().find(|e| e.mask == entry.mask) {
                return Some(std::mem::replace(&mut existing.data, entry.data));
            }
        }
        let pos = masks.partition_point(|e| e.mask.len() >= len);
        masks.insert(pos, entry);
        self.entries += 1;
        None
    }

    /// Compacts upwards from `id` after it lost an entry. `path` holds the ancestors of `id`
    /// with the side each one was left through.
    fn prune(&mut self, mut path: Vec<(NodeId, bool)>, mut id: NodeId) {
        while let Some((parent, side)) = path.pop() {
            let node = self.at(id);
            if !node.masks.is_empty() {
                return;
            }
            let children = node.children;
            match children {
                [Some(_), Some(_)] => return,
                [Some(only), None] | [None, Some(only)] => {
                    trace!("{} spliced out, {} moves up", id, only);
                    self.nodes[parent.index()].children[side as usize] = Some(only);
                    self.release(id);
                    return;
                }
                [None, None] => {
                    trace!("{} unlinked", id);
                    self.nodes[parent.index()].children[side as usize] = None;
                    self.release(id);
                    id = parent;
                }
            }
        }
    }
}

impl<'a, V> IntoIterator for &'a PatriciaTrie<V> {
    type Item = (Prefix, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: Default> Default for PatriciaTrie<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: Debug> Debug for PatriciaTrie<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut stack = vec![(NodeId::ROOT, 0)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.at(id);
            let span = Prefix::masked(node.key, Mask::saturating(node.bit));
            write!(f, "{}{} {:b}", "-".repeat(depth), id, span)?;
            if node.masks.is_empty() {
                writeln!(f, " -- Branch")?;
            } else {
                let masks = node
                    .masks
                    .iter()
                    .map(|e| format!("/{} => {:?}", e.mask.len(), e.data))
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(f, " -- Masks: {}", masks)?;
            }
            for child in node.children.iter().rev().flatten() {
                stack.push((*child, depth + 1));
            }
        }
        Ok(())
    }
}

#[cfg(feature = "graphviz")]
pub trait GraphvizDebug {
    fn visualize(&self, filename: &str) -> std::io::Result<()>;
}

#[cfg(feature = "graphviz")]
impl<V: Display> GraphvizDebug for PatriciaTrie<V> {
    fn visualize(&self, filename: &str) -> std::io::Result<()> {
        let mut graph = String::new();
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = self.at(id);
            let node_id = format!("node_{}", id.index());
            let span = Prefix::masked(node.key, Mask::saturating(node.bit));
            let masks = node
                .masks
                .iter()
                .map(|e| format!("/{}: {}", e.mask.len(), e.data))
                .collect::<Vec<String>>()
                .join(", ");
            graph.push_str(&format!(
                r#"{node_id} [label="{{{span} | bit: {bit} | masks: {masks}}}"];
                "#,
                bit = node.bit,
            ));
            for (label, child) in node.children.iter().enumerate() {
                if let Some(child) = child {
                    graph.push_str(&format!(
                        r#"{node_id} -> node_{} [label="{label}"];
                        "#,
                        child.index(),
                    ));
                    stack.push(*child);
                }
            }
        }
        let graph_str = format!(
            r#"digraph PatriciaTrie {{
            node [shape=record];
            {}
        }}"#,
            graph
        );
        let g = parse(&graph_str)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        exec(
            g,
            &mut PrinterContext::default(),
            vec![
                Format::Pdf.into(),
                CommandArg::Output(String::from(filename)),
            ],
        )?;
        Ok(())
    }
}
