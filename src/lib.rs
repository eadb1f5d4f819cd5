//! Longest-prefix match over IPv4 routes.
//!
//! [PatriciaTrie] keeps prefixes in a compressed binary trie that always holds a default route,
//! so [PatriciaTrie::lookup] resolves every address. [SharedTrie] wraps one behind a lock for
//! concurrent readers.
//!
//! ```
//! use lpmt::prelude::*;
//!
//! let mut trie = PatriciaTrie::new("default");
//! trie.insert(Prefix::with_mask(0x0A00_0300, 0xffff_0000).unwrap(), "10.0/16");
//! trie.insert(Prefix::with_mask(0x0A00_0400, 0xffff_ff00).unwrap(), "10.0.4/24");
//! assert_eq!(*trie.lookup(0x0A00_0304).1, "10.0/16");
//! assert_eq!(*trie.lookup(0x0A00_0405).1, "10.0.4/24");
//! assert_eq!(*trie.lookup(0x0808_0808).1, "default");
//! ```
pub use lpmt_core::{bit_at, first_diff, Error, Mask, Prefix, KEY_BITS};
pub use lpmt_trie::{Iter, MaskEntry, MergePolicy, NodeId, NodeRef, PatriciaTrie, SharedTrie};

#[cfg(feature = "graphviz")]
pub use lpmt_trie::GraphvizDebug;

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use lpmt_core::prelude::*;
    #[doc(hidden)]
    pub use lpmt_trie::prelude::*;
}
