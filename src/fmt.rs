//! Formatting implementation for the PopTrie

use std::fmt::{Debug, Formatter, Result};

use crate::trie::{Node, PopTrie};

impl Debug for PopTrie {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.table.is_empty() {
            f.write_str("{}")
        } else {
            DebugPopTrie(self, 0).fmt(f)
        }
    }
}

struct DebugPopTrie<'a>(&'a PopTrie, usize);

/// The bits of a run, written out as a binary string (`*` for the empty root run).
struct Run<'a>(&'a Node);

impl Debug for Run<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let node = self.0;
        if node.run_len == 0 {
            f.write_str("*")
        } else {
            let bits = node.run >> (64 - node.run_len as u32);
            write!(f, "{:0width$b}", bits, width = node.run_len as usize)
        }
    }
}

impl Debug for DebugPopTrie<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let trie = self.0;
        let node = &trie.table[self.1];
        let run = Run(node);
        match (node.pop.as_ref(), node.left, node.right) {
            (None, None, None) => run.fmt(f),
            (None, None, Some(child)) | (None, Some(child), None) => {
                f.debug_map().entry(&run, &Self(trie, child)).finish()
            }
            (None, Some(left), Some(right)) => f
                .debug_map()
                .entry(&run, &(Self(trie, left), Self(trie, right)))
                .finish(),
            (Some(p), None, None) => f.debug_map().entry(&run, p).finish(),
            (Some(p), None, Some(child)) | (Some(p), Some(child), None) => f
                .debug_map()
                .entry(&run, &(p, Self(trie, child)))
                .finish(),
            (Some(p), Some(left), Some(right)) => f
                .debug_map()
                .entry(&run, &(p, Self(trie, left), Self(trie, right)))
                .finish(),
        }
    }
}
