//! Building a [`PopTrie`] from a routing table in text form.
//!
//! The table holds one record per line: an IPv6 prefix in CIDR notation and the PoP identifier it
//! is assigned to, separated by whitespace. Blank lines and lines starting with `#` are ignored.
//!
//! ```text
//! # prefix            pop
//! 2001:db8::/32       1
//! 2001:db8:abcd::/48  2
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::num::ParseIntError;
use std::path::Path;
use std::str::Utf8Error;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use log::{debug, info, warn};

use crate::trie::{PopId, PopTrie, INVALID_POP};

/// How the loader treats malformed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Abort on the first malformed record instead of logging and skipping it.
    pub strict: bool,
}

/// Summary of a completed load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Records inserted into the trie (including reassignments of an existing prefix).
    pub inserted: usize,
    /// Malformed records that were skipped.
    pub skipped: usize,
}

/// Errors raised while reading a routing table. Record errors carry the 1-based line number.
#[derive(Debug)]
pub enum LoadError {
    /// Reading the source failed.
    Io(io::Error),
    /// A record is not valid UTF-8.
    Utf8 {
        /// Line of the record.
        line: usize,
        /// Decoding failure.
        source: Utf8Error,
    },
    /// A record does not consist of exactly a prefix and a PoP.
    Fields {
        /// Line of the record.
        line: usize,
        /// Number of whitespace-separated fields found.
        found: usize,
    },
    /// The prefix is not valid CIDR notation.
    Prefix {
        /// Line of the record.
        line: usize,
        /// Parse failure.
        source: ipnet::AddrParseError,
    },
    /// The PoP is not an unsigned 16-bit number.
    Pop {
        /// Line of the record.
        line: usize,
        /// Parse failure.
        source: ParseIntError,
    },
    /// The prefix is an IPv4 prefix.
    Ipv4 {
        /// Line of the record.
        line: usize,
        /// The offending prefix.
        prefix: Ipv4Net,
    },
    /// The PoP equals the reserved [`INVALID_POP`].
    ReservedPop {
        /// Line of the record.
        line: usize,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "cannot read routing table: {e}"),
            LoadError::Utf8 { line, source } => write!(f, "line {line}: {source}"),
            LoadError::Fields { line, found } => {
                write!(f, "line {line}: expected `<prefix> <pop>`, found {found} fields")
            }
            LoadError::Prefix { line, source } => {
                write!(f, "line {line}: invalid prefix: {source}")
            }
            LoadError::Pop { line, source } => write!(f, "line {line}: invalid pop: {source}"),
            LoadError::Ipv4 { line, prefix } => {
                write!(f, "line {line}: {prefix} is not an IPv6 prefix")
            }
            LoadError::ReservedPop { line } => {
                write!(f, "line {line}: pop {INVALID_POP} is reserved")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Utf8 { source, .. } => Some(source),
            LoadError::Prefix { source, .. } => Some(source),
            LoadError::Pop { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}

/// Parse a single line of a routing table. Returns `Ok(None)` for blank and comment lines.
///
/// ```
/// # use pop_trie::loader::parse_record;
/// let (prefix, pop) = parse_record(1, "2001:db8::/32 7").unwrap().unwrap();
/// assert_eq!(prefix.to_string(), "2001:db8::/32");
/// assert_eq!(pop, 7);
/// assert!(parse_record(2, "   ").unwrap().is_none());
/// assert!(parse_record(3, "10.0.0.0/8 7").is_err());
/// ```
pub fn parse_record(line: usize, text: &str) -> Result<Option<(Ipv6Net, PopId)>, LoadError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    let fields: Vec<&str> = text.split_whitespace().collect();
    let [prefix, pop] = fields.as_slice() else {
        return Err(LoadError::Fields {
            line,
            found: fields.len(),
        });
    };
    let pop: PopId = pop
        .parse()
        .map_err(|source| LoadError::Pop { line, source })?;
    if pop == INVALID_POP {
        return Err(LoadError::ReservedPop { line });
    }
    match prefix.parse::<IpNet>() {
        Ok(IpNet::V6(prefix)) => Ok(Some((prefix, pop))),
        Ok(IpNet::V4(prefix)) => Err(LoadError::Ipv4 { line, prefix }),
        Err(source) => Err(LoadError::Prefix { line, source }),
    }
}

/// Decode one raw line and parse it with [`parse_record`].
fn parse_line(line: usize, bytes: &[u8]) -> Result<Option<(Ipv6Net, PopId)>, LoadError> {
    let text = std::str::from_utf8(bytes).map_err(|source| LoadError::Utf8 { line, source })?;
    parse_record(line, text)
}

/// Build a trie from a routing table. Lines are split on `\n`; records that are not valid UTF-8
/// are treated like any other malformed record.
pub fn load<R: BufRead>(
    reader: R,
    options: LoadOptions,
) -> Result<(PopTrie, LoadStats), LoadError> {
    let mut trie = PopTrie::new();
    let mut stats = LoadStats::default();
    for (i, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        match parse_line(i + 1, &bytes) {
            Ok(Some((prefix, pop))) => {
                if let Some(old) = trie.insert_prefix(&prefix, pop) {
                    debug!("line {}: {prefix} reassigned from pop {old} to {pop}", i + 1);
                }
                stats.inserted += 1;
            }
            Ok(None) => {}
            Err(e) if !options.strict => {
                warn!("skipping record: {e}");
                stats.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    info!(
        "loaded {} prefixes into {} nodes ({} records skipped)",
        trie.len(),
        trie.node_count(),
        stats.skipped
    );
    Ok((trie, stats))
}

/// Build a trie from the routing table stored at `path`.
pub fn load_path<P: AsRef<Path>>(
    path: P,
    options: LoadOptions,
) -> Result<(PopTrie, LoadStats), LoadError> {
    let path = path.as_ref();
    debug!("reading routing table from {}", path.display());
    load(BufReader::new(File::open(path)?), options)
}
