//! Bit arithmetic on 64-bit fragments of a 128-bit key.
//!
//! A 128-bit key is carried as a `(high, low)` pair of `u64` words, `high` holding bits `0..64`
//! (most significant first) and `low` holding bits `64..128`. A *run* is a fragment of such a key,
//! left-justified in a `u64`, of which only the leading `len` bits are meaningful.

use num_traits::{PrimInt, Zero};

/// Number of bits in one run word.
pub const RUN_BITS: u8 = 64;

/// Number of bits in a full key.
pub const KEY_BITS: u8 = 128;

/// Create a mask that keeps the leading `len` bits of `R`.
pub(crate) fn mask_from_prefix_len<R>(len: u8) -> R
where
    R: PrimInt + Zero,
{
    if len as u32 == R::zero().count_zeros() {
        !R::zero()
    } else if len == 0 {
        R::zero()
    } else {
        !((!R::zero()) >> len as usize)
    }
}

/// The most significant bit of `word`.
#[inline(always)]
pub fn leading_bit(word: u64) -> u8 {
    (word >> 63) as u8
}

/// Return bits `[index, index + 64)` of the key `high ⧺ low`, left-justified. Bits past the end
/// of the key are filled with zeros.
///
/// ```
/// # use pop_trie::bits::window_at;
/// assert_eq!(window_at(0xFFFF0000FFFF0000, 0x0000000FFFFFFFFF, 32), 0xFFFF00000000000F);
/// assert_eq!(window_at(0x00000000000000FF, 0xF000000000000000, 56), 0xFFF0000000000000);
/// assert_eq!(window_at(0, 0x00000000000000AB, 120), 0xAB00000000000000);
/// ```
///
/// # Panics
/// if `index > 127`.
#[inline]
pub fn window_at(high: u64, low: u64, index: u8) -> u64 {
    assert!(index < KEY_BITS, "window index {index} is outside of a 128-bit key");
    let key = ((high as u128) << 64) | low as u128;
    ((key << index) >> 64) as u64
}

/// Number of leading bits in which `a` and `b` agree (`64` if they are equal).
#[inline(always)]
pub fn common_prefix_len(a: u64, b: u64) -> u8 {
    (a ^ b).leading_zeros() as u8
}

/// Append the leading `second_len` bits of `second` to the leading `first_len` bits of `first`.
/// Returns the merged run and its length.
///
/// ```
/// # use pop_trie::bits::combine_runs;
/// let (run, len) = combine_runs(0xA000000000000000, 4, 0xC000000000000000, 2);
/// assert_eq!((run, len), (0xAC00000000000000, 6));
/// ```
///
/// # Panics
/// if the merged run is longer than 64 bits.
#[inline]
pub fn combine_runs(first: u64, first_len: u8, second: u64, second_len: u8) -> (u64, u8) {
    let len = first_len as u32 + second_len as u32;
    assert!(len <= RUN_BITS as u32, "merged run of {len} bits does not fit into one word");
    let first = first & mask_from_prefix_len::<u64>(first_len);
    let second = (second & mask_from_prefix_len::<u64>(second_len))
        .checked_shr(first_len as u32)
        .unwrap_or(0);
    (first | second, len as u8)
}

/// Cut `run` after `split_index` bits. The first word holds the leading `split_index` bits, the
/// second word holds the remaining bits, shifted back to bit 0.
///
/// ```
/// # use pop_trie::bits::split_run;
/// assert_eq!(split_run(0xABCD000000000000, 8), (0xAB00000000000000, 0xCD00000000000000));
/// ```
///
/// # Panics
/// if `split_index > 64`.
#[inline]
pub fn split_run(run: u64, split_index: u8) -> (u64, u64) {
    assert!(split_index <= RUN_BITS, "cannot split a run at bit {split_index}");
    let high = run & mask_from_prefix_len::<u64>(split_index);
    let low = run.checked_shl(split_index as u32).unwrap_or(0);
    (high, low)
}

/// Extract the `len` key bits starting at `index` as a left-justified run, with all bits after
/// `len` cleared. A run that straddles the `high`/`low` boundary is stitched from both halves.
///
/// # Panics
/// if `len > 64` or the run reaches past bit 127.
pub(crate) fn run_at(high: u64, low: u64, index: u8, len: u8) -> u64 {
    assert!(len <= RUN_BITS);
    assert!(index as u32 + len as u32 <= KEY_BITS as u32);
    if len == 0 {
        0
    } else if index < RUN_BITS && index + len > RUN_BITS {
        let head_len = RUN_BITS - index;
        combine_runs(high << index, head_len, low, len - head_len).0
    } else {
        window_at(high, low, index) & mask_from_prefix_len::<u64>(len)
    }
}
