//! This module provides the Patricia trie that stores IPv4 prefixes and answers longest-prefix
//! match queries. Every trie carries a default route, so a lookup always resolves.
mod check;
mod iter;
mod node;
mod patricia;
mod shared;

#[cfg(test)]
mod proptests;

pub use crate::{
    iter::Iter,
    node::{MaskEntry, NodeId, NodeRef},
    patricia::{MergePolicy, PatriciaTrie},
    shared::SharedTrie,
};

#[cfg(feature = "graphviz")]
pub use crate::patricia::GraphvizDebug;

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{patricia::MergePolicy, patricia::PatriciaTrie, shared::SharedTrie};
}
