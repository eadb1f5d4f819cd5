use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("prefix length {0} exceeds 32 bits")]
    PrefixLength(u8),
    #[error("mask {0:#010x} is not a run of leading ones")]
    NonContiguousMask(u32),
    /// Raised by structure validation, never by regular trie operations.
    #[error("trie structure corrupted: {0}")]
    Corrupted(String),
}
