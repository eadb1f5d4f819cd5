use fxhash::{FxHashMap, FxHashSet};
use lpmt_core::{bit_at, Error, Mask, KEY_BITS};

use crate::{node::NodeId, patricia::PatriciaTrie};

macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(Error::Corrupted(format!($($arg)+)));
        }
    };
}

impl<V> PatriciaTrie<V> {
    /// Walks the whole trie and checks its structural invariants.
    ///
    /// Meant for tests and debugging: regular operations never leave the trie in a state this
    /// rejects.
    pub fn validate(&self) -> Result<(), Error> {
        let root = self.at(NodeId::ROOT);
        ensure!(
            root.key == 0 && root.bit == 0,
            "root is {:#010x} at bit {}",
            root.key,
            root.bit
        );
        ensure!(
            root.masks.last().is_some_and(|e| e.mask.is_any()),
            "root lost its default route"
        );

        let mut visited = FxHashSet::default();
        let mut owners = FxHashMap::default();
        let mut entries = 0;
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            ensure!(visited.insert(id), "{} reached twice", id);
            ensure!(
                self.live.get(id.index()).is_some_and(|live| *live),
                "{} is linked but released",
                id
            );
            let node = self.at(id);
            ensure!(node.bit <= KEY_BITS, "{} branches on bit {}", id, node.bit);
            ensure!(
                Mask::saturating(node.bit).apply(node.key) == node.key,
                "{} key {:#010x} has bits past {}",
                id,
                node.key,
                node.bit
            );
            ensure!(
                node.masks.windows(2).all(|w| w[0].mask.len() >= w[1].mask.len()),
                "{} masks out of order",
                id
            );
            ensure!(
                node.masks.iter().all(|e| e.mask.len() >= node.bit),
                "{} holds a mask shorter than bit {}",
                id,
                node.bit
            );
            if node.masks.is_empty() {
                ensure!(
                    id == NodeId::ROOT || node.children.iter().all(Option::is_some),
                    "branch {} does not branch",
                    id
                );
            } else {
                entries += node.masks.len();
                if let Some(other) = owners.insert(node.key, id) {
                    return Err(Error::Corrupted(format!(
                        "{} and {} both hold entries for {:#010x}",
                        other, id, node.key
                    )));
                }
            }
            if node.bit == KEY_BITS {
                ensure!(
                    node.children.iter().all(Option::is_none),
                    "host node {} has children",
                    id
                );
            }

            for (side, child) in node.children.iter().enumerate() {
                let Some(child) = *child else { continue };
                ensure!(
                    child.index() < self.nodes.len(),
                    "{} points past the arena at {}",
                    id,
                    child
                );
                let c = self.at(child);
                ensure!(
                    c.bit > node.bit,
                    "{} at bit {} sits below {} at bit {}",
                    child,
                    c.bit,
                    id,
                    node.bit
                );
                ensure!(
                    Mask::saturating(node.bit).apply(c.key) == node.key,
                    "{} is outside the span of its parent {}",
                    child,
                    id
                );
                ensure!(
                    bit_at(c.key, node.bit) == (side == 1),
                    "{} hangs on the wrong side of {}",
                    child,
                    id
                );
                stack.push(child);
            }
        }

        for (key, id) in owners {
            ensure!(
                self.find(key) == Some(id),
                "entries for {:#010x} are shadowed above {}",
                key,
                id
            );
        }
        ensure!(
            entries == self.entries,
            "counted {} entries, expected {}",
            entries,
            self.entries
        );
        ensure!(
            visited.len() == self.node_count(),
            "reached {} nodes, {} are allocated",
            visited.len(),
            self.node_count()
        );
        Ok(())
    }
}
