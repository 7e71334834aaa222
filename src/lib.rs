//! This crate maps IPv6 addresses and subnets to the point of presence (PoP) they are assigned to.
//! A routing table of IPv6 prefixes, each assigned to a PoP identifier, is stored in a
//! path-compressed binary trie. Any lookup performs longest-prefix match and reports both the PoP
//! and the length of the matching prefix (the *scope*).
//!
//! ```
//! # use pop_trie::*;
//! let mut trie = PopTrie::new();
//! trie.insert(0x2001_0db8_0000_0000, 0, 32, 1);
//! trie.insert(0x2001_0db8_abcd_0000, 0, 48, 2);
//! assert_eq!(trie.route(0x2001_0db8_abcd_0012, 0, 64), (2, 48));
//! assert_eq!(trie.route(0x2001_0db8_ffff_0000, 0, 64), (1, 32));
//! assert_eq!(trie.route(0x2a00_0000_0000_0000, 0, 64), (0, 0));
//! ```
//!
//! # Description of the Tree
//!
//! Keys are 128 bits wide and are handled as two `u64` words, `high` and `low`. Each node stores a
//! *run* of up to 64 key bits, left-justified in a `u64`, an optional PoP (set if a configured
//! prefix ends exactly after this run), and two optional children. To descend from a node, we look
//! at the first key bit after its run: if it is not set, we take the left branch, otherwise the
//! right one. The selected child's run starts with that same bit. The root holds an empty run;
//! it only stores the PoP of `::/0`.
//!
//! A run cannot hold more than 64 bits. Prefixes that diverge from everything else for more than
//! 64 bits are stored as a chain of nodes with single children. When a new prefix diverges in the
//! middle of an existing run, that run is split in two, and the tail (together with the PoP and
//! the children of the original node) moves into a new node.
//!
//! The functions in [`bits`] implement the arithmetic on runs.
//!
//! # Operations on the tree
//!
//! | Operation                                 | Complexity      |
//! |-------------------------------------------|-----------------|
//! | `insert`, `insert_prefix`                 | `O(prefix len)` |
//! | `route`, `get_lpm`, `route_addr`          | `O(prefix len)` |
//! | `get`, `get_prefix`                       | `O(prefix len)` |
//! | `len`, `is_empty`, `node_count`           | `O(1)`          |
//!
//! Prefixes cannot be removed. The trie is meant to be built once from a complete routing table
//! (see [`loader`]) and queried afterwards. A built trie can be shared between threads for
//! reading; to change the table, build a new trie and swap it in.
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade. Insertion emits `trace` records for new nodes and
//! splits, the loader reports skipped records with `warn`. Lookups never log.

#![deny(missing_docs)]

pub mod bits;
mod fmt;
#[cfg(test)]
#[cfg(feature = "ipnet")]
mod fuzzing;
#[cfg(feature = "ipnet")]
pub mod loader;
mod prefix;
mod trie;

pub use prefix::RoutePrefix;
pub use trie::{PopId, PopTrie, Route, INVALID_POP};
