use std::fmt::{Display, Formatter, LowerHex};

use crate::{bits::KEY_BITS, error::Error};

/// A CIDR mask: `len` leading one-bits followed by zeros, e.g. /24 is `0xFFFFFF00`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Mask(u32);

impl Mask {
    /// The /0 mask of the default route, matches every key.
    pub const ANY: Mask = Mask(0);
    /// The /32 mask of a host route.
    pub const HOST: Mask = Mask(u32::MAX);

    pub fn from_len(len: u8) -> Result<Self, Error> {
        if len > KEY_BITS {
            return Err(Error::PrefixLength(len));
        }
        Ok(Self::saturating(len))
    }

    /// Like [Mask::from_len], but lengths past 32 clamp to [Mask::HOST].
    #[inline]
    pub const fn saturating(len: u8) -> Self {
        match len {
            0 => Mask::ANY,
            len if len >= KEY_BITS => Mask::HOST,
            len => Mask(u32::MAX << (KEY_BITS - len) as u32),
        }
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Number of leading one-bits.
    #[inline]
    pub const fn len(self) -> u8 {
        self.0.leading_ones() as u8
    }

    #[inline]
    pub const fn is_any(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn apply(self, key: u32) -> u32 {
        key & self.0
    }

    /// Whether `a` and `b` agree on every bit this mask keeps.
    #[inline]
    pub const fn covers(self, a: u32, b: u32) -> bool {
        a & self.0 == b & self.0
    }
}

impl TryFrom<u32> for Mask {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value.leading_ones() + value.trailing_zeros() == u32::BITS {
            Ok(Mask(value))
        } else {
            Err(Error::NonContiguousMask(value))
        }
    }
}

impl From<Mask> for u32 {
    #[inline]
    fn from(value: Mask) -> Self {
        value.0
    }
}

impl LowerHex for Mask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        LowerHex::fmt(&self.0, f)
    }
}

impl Display for Mask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
