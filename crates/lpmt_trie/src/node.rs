use std::fmt::{Display, Formatter};

use lpmt_core::{bit_at, Mask, Prefix, KEY_BITS};

/// Index of a node in the trie's arena.
///
/// Ids stay valid until the node is released by [remove](crate::PatriciaTrie::remove) or
/// [clear](crate::PatriciaTrie::clear); the slot may be reused afterwards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        NodeId(index as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One prefix length installed at a node, with the caller's payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskEntry<V> {
    pub mask: Mask,
    pub data: V,
}

impl<V> MaskEntry<V> {
    #[inline]
    pub fn new(mask: Mask, data: V) -> Self {
        MaskEntry { mask, data }
    }
}

#[derive(Debug)]
pub(crate) struct Node<V> {
    // masked to `bit` leading bits
    pub(crate) key: u32,
    pub(crate) bit: u8,
    pub(crate) children: [Option<NodeId>; 2],
    // longest mask first
    pub(crate) masks: Vec<MaskEntry<V>>,
}

impl<V> Node<V> {
    pub(crate) fn with_entry(key: u32, bit: u8, entry: MaskEntry<V>) -> Self {
        debug_assert!(bit <= entry.mask.len());
        Node {
            key,
            bit,
            children: [None, None],
            masks: vec![entry],
        }
    }

    pub(crate) fn branch(key: u32, bit: u8, children: [Option<NodeId>; 2]) -> Self {
        Node {
            key,
            bit,
            children,
            masks: Vec::new(),
        }
    }

    /// Child on `key`'s side of this node's branching bit.
    #[inline]
    pub(crate) fn child_toward(&self, key: u32) -> Option<NodeId> {
        if self.bit >= KEY_BITS {
            return None;
        }
        self.children[bit_at(key, self.bit) as usize]
    }

    /// Whether `key` lies inside the prefix this node's subtree spans.
    #[inline]
    pub(crate) fn spans(&self, key: u32) -> bool {
        Mask::saturating(self.bit).covers(key, self.key)
    }

    /// Position of the longest entry covering `key` whose length is at most `max_len`.
    #[inline]
    pub(crate) fn matching(&self, key: u32, max_len: u8) -> Option<usize> {
        self.masks
            .iter()
            .position(|e| e.mask.len() <= max_len && e.mask.covers(key, self.key))
    }
}

/// Borrowed view of a trie node, as returned by searches.
///
/// A node keeps one address and every mask installed at it. Use [NodeRef::matching] to check
/// which of them, if any, actually cover a queried key.
pub struct NodeRef<'a, V> {
    id: NodeId,
    node: &'a Node<V>,
}

impl<'a, V> Clone for NodeRef<'a, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, V> Copy for NodeRef<'a, V> {}

impl<'a, V> NodeRef<'a, V> {
    #[inline]
    pub(crate) fn new(id: NodeId, node: &'a Node<V>) -> Self {
        NodeRef { id, node }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.id == NodeId::ROOT
    }

    #[inline]
    pub fn key(&self) -> u32 {
        self.node.key
    }

    #[inline]
    pub fn bit_position(&self) -> u8 {
        self.node.bit
    }

    #[inline]
    pub fn left(&self) -> Option<NodeId> {
        self.node.children[0]
    }

    #[inline]
    pub fn right(&self) -> Option<NodeId> {
        self.node.children[1]
    }

    /// Installed entries, longest mask first.
    #[inline]
    pub fn masks(&self) -> &'a [MaskEntry<V>] {
        &self.node.masks
    }

    /// Nodes without entries only split two subtrees.
    #[inline]
    pub fn is_branch(&self) -> bool {
        self.node.masks.is_empty()
    }

    /// The longest entry of this node covering `key`.
    pub fn matching(&self, key: u32) -> Option<&'a MaskEntry<V>> {
        self.node
            .matching(key, KEY_BITS)
            .map(|i| &self.node.masks[i])
    }

    /// Every prefix stored at this node, longest first.
    pub fn prefixes(&self) -> impl Iterator<Item = Prefix> + 'a {
        let key = self.node.key;
        self.node.masks.iter().map(move |e| Prefix::masked(key, e.mask))
    }
}
