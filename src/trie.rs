//! Implementation of the PoP trie.

use std::net::Ipv6Addr;

use log::trace;

use crate::bits::{
    common_prefix_len, leading_bit, run_at, split_run, window_at, KEY_BITS, RUN_BITS,
};
use crate::RoutePrefix;

/// Identifier of a point of presence.
pub type PopId = u16;

/// PoP identifier reserved at the table boundary to mean "no PoP". The trie itself never stores
/// it as a marker; loaders reject records that carry it.
pub const INVALID_POP: PopId = PopId::MAX;

/// Result of a longest-prefix match: the PoP of the most specific configured prefix, and the
/// length of that prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Route {
    /// PoP assigned to the matched prefix.
    pub pop: PopId,
    /// Length of the matched prefix in bits.
    pub len: u8,
}

impl From<Route> for (PopId, u8) {
    fn from(route: Route) -> Self {
        (route.pop, route.len)
    }
}

/// Path-compressed binary trie over 128-bit keys, mapping prefixes to PoP identifiers.
///
/// Every node stores a run of up to 64 key bits. The child of a node is chosen by the first bit
/// after the node's run (`left` for `0`, `right` for `1`), and that bit is also the first bit of
/// the child's own run. A prefix longer than 64 bits below its branching point is therefore held
/// by a chain of nodes. The root holds no bits; it only carries the PoP of `::/0`.
#[derive(Clone, Default)]
pub struct PopTrie {
    pub(crate) table: Vec<Node>,
    count: usize,
}

impl PopTrie {
    /// Create an empty trie. No node is allocated until the first insertion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of configured prefixes.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no prefix was configured yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of allocated nodes, including the root and pure branch points.
    pub fn node_count(&self) -> usize {
        self.table.len()
    }

    /// Assign `pop` to the prefix given by the leading `prefix_len` bits of `high ⧺ low`. Returns
    /// the PoP that was assigned to exactly this prefix before, if any.
    ///
    /// ```
    /// # use pop_trie::*;
    /// let mut trie = PopTrie::new();
    /// assert_eq!(trie.insert(0x2001_0db8_0000_0000, 0, 32, 1), None);
    /// assert_eq!(trie.insert(0x2001_0db8_0000_0000, 0, 32, 2), Some(1));
    /// assert_eq!(trie.route(0x2001_0db8_1234_0000, 0, 64), (2, 32));
    /// ```
    ///
    /// # Panics
    /// if `prefix_len > 128`.
    pub fn insert(&mut self, high: u64, low: u64, prefix_len: u8, pop: PopId) -> Option<PopId> {
        assert!(prefix_len <= KEY_BITS, "prefix length {prefix_len} exceeds 128 bits");
        if self.table.is_empty() {
            self.table.push(Node::default());
        }

        let mut idx = 0;
        let mut consumed: u8 = 0;
        while consumed < prefix_len {
            let window = window_at(high, low, consumed);
            let right = leading_bit(window) == 1;
            let remaining = prefix_len - consumed;
            match self.get_child(idx, right) {
                None => {
                    let run_len = remaining.min(RUN_BITS);
                    let run = run_at(high, low, consumed, run_len);
                    let new = self.new_node(run, run_len);
                    self.set_child(idx, new, right);
                    trace!(
                        "new node {new} below {idx} covering bits {consumed}..{}",
                        consumed + run_len
                    );
                    consumed += run_len;
                    idx = new;
                }
                Some(child) => {
                    let child_len = self.table[child].run_len;
                    let matching = common_prefix_len(window, self.table[child].run).min(remaining);
                    if matching < child_len {
                        self.split(child, matching);
                        consumed += matching;
                    } else {
                        consumed += child_len;
                    }
                    idx = child;
                }
            }
        }

        let old = self.table[idx].pop.replace(pop);
        if old.is_none() {
            self.count += 1;
        }
        old
    }

    /// Longest-prefix match of the leading `query_len` bits of `high ⧺ low`. Returns
    /// `(pop, matched_len)` of the most specific configured prefix that covers the query and is
    /// not longer than `query_len`, or `(0, 0)` if there is none.
    ///
    /// ```
    /// # use pop_trie::*;
    /// let mut trie = PopTrie::new();
    /// trie.insert(0x2001_0db8_0000_0000, 0, 32, 1);
    /// trie.insert(0x2001_0db8_abcd_0000, 0, 48, 2);
    /// assert_eq!(trie.route(0x2001_0db8_abcd_0000, 0, 64), (2, 48));
    /// assert_eq!(trie.route(0x2001_0db8_abcd_0000, 0, 40), (1, 32));
    /// assert_eq!(trie.route(0x2001_0db9_0000_0000, 0, 64), (0, 0));
    /// ```
    ///
    /// # Panics
    /// if `query_len > 128`.
    pub fn route(&self, high: u64, low: u64, query_len: u8) -> (PopId, u8) {
        self.get_lpm(high, low, query_len)
            .map(Into::into)
            .unwrap_or((0, 0))
    }

    /// Longest-prefix match like [`Self::route`], returning `None` if no configured prefix covers
    /// the query.
    ///
    /// # Panics
    /// if `query_len > 128`.
    pub fn get_lpm(&self, high: u64, low: u64, query_len: u8) -> Option<Route> {
        assert!(query_len <= KEY_BITS, "query length {query_len} exceeds 128 bits");
        let root = self.table.first()?;
        let mut best = root.pop.map(|pop| Route { pop, len: 0 });
        let mut idx = 0;
        let mut consumed: u8 = 0;
        while consumed < query_len {
            let window = window_at(high, low, consumed);
            let Some(child) = self.get_child(idx, leading_bit(window) == 1) else {
                break;
            };
            let node = &self.table[child];
            if node.run_len > query_len - consumed
                || common_prefix_len(window, node.run) < node.run_len
            {
                break;
            }
            consumed += node.run_len;
            if let Some(pop) = node.pop {
                best = Some(Route { pop, len: consumed });
            }
            idx = child;
        }
        best
    }

    /// Exact match: the PoP assigned to precisely this prefix.
    ///
    /// ```
    /// # use pop_trie::*;
    /// let mut trie = PopTrie::new();
    /// trie.insert(0xfe80_0000_0000_0000, 0, 10, 7);
    /// assert_eq!(trie.get(0xfe80_0000_0000_0000, 0, 10), Some(7));
    /// assert_eq!(trie.get(0xfe80_0000_0000_0000, 0, 11), None);
    /// assert_eq!(trie.get(0xfe80_0000_0000_0000, 0, 9), None);
    /// ```
    ///
    /// # Panics
    /// if `prefix_len > 128`.
    pub fn get(&self, high: u64, low: u64, prefix_len: u8) -> Option<PopId> {
        assert!(prefix_len <= KEY_BITS, "prefix length {prefix_len} exceeds 128 bits");
        self.table.first()?;
        let mut idx = 0;
        let mut consumed: u8 = 0;
        while consumed < prefix_len {
            let window = window_at(high, low, consumed);
            let child = self.get_child(idx, leading_bit(window) == 1)?;
            let node = &self.table[child];
            if node.run_len > prefix_len - consumed
                || common_prefix_len(window, node.run) < node.run_len
            {
                return None;
            }
            consumed += node.run_len;
            idx = child;
        }
        self.table[idx].pop
    }

    /// Insert any [`RoutePrefix`]. Bits after its length are ignored.
    ///
    /// ```
    /// # use pop_trie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use ipnet::Ipv6Net;
    /// let mut trie = PopTrie::new();
    /// trie.insert_prefix(&"2001:db8::/32".parse::<Ipv6Net>()?, 3);
    /// assert_eq!(trie.route_prefix(&"2001:db8:1::/48".parse::<Ipv6Net>()?), (3, 32));
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn insert_prefix<P: RoutePrefix>(&mut self, prefix: &P, pop: PopId) -> Option<PopId> {
        let (high, low) = prefix.halves();
        self.insert(high, low, prefix.prefix_len(), pop)
    }

    /// Route any [`RoutePrefix`], using its length as the query length.
    pub fn route_prefix<P: RoutePrefix>(&self, prefix: &P) -> (PopId, u8) {
        let (high, low) = prefix.halves();
        self.route(high, low, prefix.prefix_len())
    }

    /// Exact match of any [`RoutePrefix`].
    pub fn get_prefix<P: RoutePrefix>(&self, prefix: &P) -> Option<PopId> {
        let (high, low) = prefix.halves();
        self.get(high, low, prefix.prefix_len())
    }

    /// Route a single address (a query of length 128).
    ///
    /// ```
    /// # use pop_trie::*;
    /// # use std::net::Ipv6Addr;
    /// let mut trie = PopTrie::new();
    /// trie.insert(0x2001_0db8_0000_0000, 0, 32, 9);
    /// assert_eq!(trie.route_addr("2001:db8::1".parse::<Ipv6Addr>().unwrap()), (9, 32));
    /// ```
    pub fn route_addr(&self, addr: Ipv6Addr) -> (PopId, u8) {
        self.route_prefix(&(u128::from(addr), KEY_BITS))
    }
}

/// Private function implementations
impl PopTrie {
    /// Cut the run of `idx` after `at` bits. The trailing bits move into a new node that takes
    /// over the PoP and both children of `idx`, and becomes the only child of `idx`.
    fn split(&mut self, idx: usize, at: u8) {
        let node = &self.table[idx];
        assert!(
            at > 0 && at < node.run_len,
            "cannot split a run of {} bits at {at}",
            node.run_len
        );
        let (head, tail) = split_run(node.run, at);
        let tail_len = node.run_len - at;

        let new = self.new_node(tail, tail_len);
        let node = &mut self.table[idx];
        let pop = node.pop.take();
        let left = node.left.take();
        let right = node.right.take();
        node.run = head;
        node.run_len = at;

        let tail_node = &mut self.table[new];
        tail_node.pop = pop;
        tail_node.left = left;
        tail_node.right = right;
        self.set_child(idx, new, leading_bit(tail) == 1);
        trace!("split node {idx} after {at} bits, moved {tail_len} bits into node {new}");
    }

    /// Get the child of a node, either to the left or the right
    #[inline(always)]
    fn get_child(&self, idx: usize, right: bool) -> Option<usize> {
        if right {
            self.table[idx].right
        } else {
            self.table[idx].left
        }
    }

    /// Attach `child` to the left or right of a node.
    #[inline(always)]
    fn set_child(&mut self, idx: usize, child: usize, right: bool) {
        if right {
            self.table[idx].right = Some(child);
        } else {
            self.table[idx].left = Some(child);
        }
    }

    /// Insert a new node without PoP or children into the table and return its index.
    #[inline(always)]
    fn new_node(&mut self, run: u64, run_len: u8) -> usize {
        let idx = self.table.len();
        self.table.push(Node {
            run,
            run_len,
            pop: None,
            left: None,
            right: None,
        });
        idx
    }
}

impl<P: RoutePrefix> FromIterator<(P, PopId)> for PopTrie {
    fn from_iter<I: IntoIterator<Item = (P, PopId)>>(iter: I) -> Self {
        let mut trie = PopTrie::new();
        trie.extend(iter);
        trie
    }
}

impl<P: RoutePrefix> Extend<(P, PopId)> for PopTrie {
    fn extend<I: IntoIterator<Item = (P, PopId)>>(&mut self, iter: I) {
        for (prefix, pop) in iter {
            self.insert_prefix(&prefix, pop);
        }
    }
}

/// One segment of the trie: a run of key bits, an optional PoP if a configured prefix ends
/// exactly here, and up to two children.
#[derive(Clone, Default, PartialEq, Eq)]
pub(crate) struct Node {
    /// Left-justified bits of this segment; bits after `run_len` are zero.
    pub(crate) run: u64,
    pub(crate) run_len: u8,
    pub(crate) pop: Option<PopId>,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
}
