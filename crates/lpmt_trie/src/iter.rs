use std::slice;

use lpmt_core::Prefix;

use crate::{
    node::{MaskEntry, NodeId},
    patricia::PatriciaTrie,
};

/// Pre-order walk over every stored prefix. Entries of one node come out longest mask first,
/// and the left subtree is visited before the right one.
pub struct Iter<'a, V> {
    trie: &'a PatriciaTrie<V>,
    stack: Vec<NodeId>,
    key: u32,
    masks: slice::Iter<'a, MaskEntry<V>>,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(trie: &'a PatriciaTrie<V>) -> Self {
        Iter {
            trie,
            stack: vec![NodeId::ROOT],
            key: 0,
            masks: [].iter(),
            remaining: trie.len(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Prefix, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.masks.next() {
                self.remaining -= 1;
                return Some((Prefix::masked(self.key, entry.mask), &entry.data));
            }
            let id = self.stack.pop()?;
            let node = self.trie.at(id);
            self.stack.extend(node.children.iter().rev().flatten());
            self.key = node.key;
            self.masks = node.masks.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V> ExactSizeIterator for Iter<'a, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_pre_order() {
        let mut trie = PatriciaTrie::new(0);
        for (addr, len) in [
            (0x0A80_0000, 16),
            (0x0A00_0000, 8),
            (0x0A01_0000, 16),
            (0xC0A8_0000, 16),
            (0x0A00_0000, 24),
        ] {
            trie.insert(Prefix::new(addr, len).unwrap(), len);
        }
        let iter = trie.iter();
        assert_eq!(iter.len(), 6);
        let listed = iter.map(|(p, v)| (p.to_string(), *v)).collect::<Vec<_>>();
        assert_eq!(
            listed,
            [
                ("0.0.0.0/0".to_string(), 0),
                ("10.0.0.0/24".to_string(), 24),
                ("10.0.0.0/8".to_string(), 8),
                ("10.1.0.0/16".to_string(), 16),
                ("10.128.0.0/16".to_string(), 16),
                ("192.168.0.0/16".to_string(), 16),
            ]
        );
        assert_eq!((&trie).into_iter().count(), trie.len());
    }
}
