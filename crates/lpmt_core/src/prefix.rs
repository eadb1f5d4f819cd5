use std::{
    fmt::{Binary, Display, Formatter},
    net::Ipv4Addr,
};

use bitvec::prelude::*;

use crate::{error::Error, mask::Mask};

/// Prefix is an IPv4 network in host byte order: an address and its CIDR mask.
///
/// The address is always stored masked, so `10.0.3.0/16` and `10.0.0.0/16` are the same prefix.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Prefix {
    addr: u32,
    mask: Mask,
}

impl Prefix {
    pub fn new(addr: u32, len: u8) -> Result<Self, Error> {
        Ok(Self::masked(addr, Mask::from_len(len)?))
    }

    /// Builds a prefix from a raw mask value such as `0xffff0000`.
    pub fn with_mask(addr: u32, mask: u32) -> Result<Self, Error> {
        Ok(Self::masked(addr, Mask::try_from(mask)?))
    }

    #[inline]
    pub fn from_ipv4(addr: Ipv4Addr, len: u8) -> Result<Self, Error> {
        Self::new(addr.into(), len)
    }

    #[inline]
    pub const fn masked(addr: u32, mask: Mask) -> Self {
        Prefix {
            addr: mask.apply(addr),
            mask,
        }
    }

    /// `0.0.0.0/0`
    #[inline]
    pub const fn default_route() -> Self {
        Prefix {
            addr: 0,
            mask: Mask::ANY,
        }
    }

    #[inline]
    pub const fn addr(&self) -> u32 {
        self.addr
    }

    #[inline]
    pub const fn mask(&self) -> Mask {
        self.mask
    }

    #[inline]
    pub const fn len(&self) -> u8 {
        self.mask.len()
    }

    #[inline]
    pub const fn is_default(&self) -> bool {
        self.mask.is_any()
    }

    #[inline]
    pub const fn contains(&self, key: u32) -> bool {
        self.mask.covers(key, self.addr)
    }

    /// Whether every address of `other` is also inside `self`.
    #[inline]
    pub const fn covers(&self, other: &Prefix) -> bool {
        self.len() <= other.len() && self.contains(other.addr)
    }
}

impl From<Ipv4Addr> for Prefix {
    fn from(value: Ipv4Addr) -> Self {
        Self::masked(value.into(), Mask::HOST)
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", Ipv4Addr::from(self.addr), self.len())
    }
}

/// Ternary rendering, one digit per bit and `*` past the mask: `00001010********.../8`.
impl Binary for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let len = self.len() as usize;
        for (i, bit) in self.addr.view_bits::<Msb0>().iter().by_vals().enumerate() {
            match (i < len, bit) {
                (true, true) => write!(f, "1")?,
                (true, false) => write!(f, "0")?,
                _ => write!(f, "*")?,
            }
        }
        write!(f, "/{}", len)
    }
}
