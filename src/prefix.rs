//! Description of the generic type `RoutePrefix`.

#[cfg(feature = "ipnet")]
use ipnet::Ipv6Net;
#[cfg(feature = "ipnetwork")]
use ipnetwork::Ipv6Network;
use num_traits::{PrimInt, Unsigned};

use crate::bits::{mask_from_prefix_len, KEY_BITS};

/// Trait for anything that can be routed or configured in a [`crate::PopTrie`]: a 128-bit key
/// together with the number of leading bits that are significant.
pub trait RoutePrefix {
    /// The key, left-justified in 128 bits. Bits after `prefix_len` may be set; they are ignored.
    fn key(&self) -> u128;

    /// Prefix length (at most 128).
    fn prefix_len(&self) -> u8;

    /// The key with all bits after `self.prefix_len()` cleared.
    fn mask(&self) -> u128 {
        self.key() & mask_from_prefix_len::<u128>(self.prefix_len())
    }

    /// The masked key split into its `(high, low)` words.
    fn halves(&self) -> (u64, u64) {
        let key = self.mask();
        ((key >> 64) as u64, key as u64)
    }
}

#[cfg(feature = "ipnet")]
impl RoutePrefix for Ipv6Net {
    fn key(&self) -> u128 {
        self.network().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn mask(&self) -> u128 {
        self.network().into()
    }
}

#[cfg(feature = "ipnetwork")]
impl RoutePrefix for Ipv6Network {
    fn key(&self) -> u128 {
        self.network().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }
}

#[cfg(feature = "cidr")]
impl RoutePrefix for cidr::Ipv6Cidr {
    fn key(&self) -> u128 {
        self.first_address().into()
    }

    fn prefix_len(&self) -> u8 {
        self.network_length()
    }
}

/// A plain unsigned integer with a length. The integer is left-justified into the 128-bit key, so
/// `(0xfe80u16, 10)` denotes `fe80::/10`, and `(u128, u8)` is the raw form.
impl<R> RoutePrefix for (R, u8)
where
    R: Unsigned + PrimInt,
{
    fn key(&self) -> u128 {
        let width = R::zero().count_zeros() as u8;
        self.0.to_u128().unwrap_or_default() << (KEY_BITS - width)
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }
}
