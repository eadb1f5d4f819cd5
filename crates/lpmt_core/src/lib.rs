//! This crate provides the address-level building blocks shared by the trie: masks, IPv4
//! prefixes, bit helpers and the error type.
mod bits;
mod error;
mod mask;
mod prefix;

pub use crate::{
    bits::{bit_at, first_diff, KEY_BITS},
    error::Error,
    mask::Mask,
    prefix::Prefix,
};

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{Error, Mask, Prefix};
}
