use bitvec::prelude::*;

/// Width of a key in bits. Bit positions range over `0..=KEY_BITS`.
pub const KEY_BITS: u8 = u32::BITS as u8;

/// Returns the bit of `key` at `pos`, counted from the most significant bit (0-based).
///
/// Position [KEY_BITS] lies past the key and always reads as 0, so host routes branch left.
#[inline]
pub fn bit_at(key: u32, pos: u8) -> bool {
    key.view_bits::<Msb0>()
        .get(pos as usize)
        .is_some_and(|bit| *bit)
}

/// Index of the first bit, most significant first, where `a` and `b` differ.
/// Returns [KEY_BITS] when the keys are equal.
#[inline]
pub fn first_diff(a: u32, b: u32) -> u8 {
    (a ^ b).leading_zeros() as u8
}
