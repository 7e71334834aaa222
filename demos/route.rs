//! Look up the PoP serving a prefix.
//!
//! ```text
//! RUST_LOG=info cargo run --example route -- <routing-table> <ipv6-prefix>
//! ```

use std::error::Error;
use std::process::ExitCode;

use ipnet::Ipv6Net;
use pop_trie::loader::{load_path, LoadOptions};

fn main() -> Result<ExitCode, Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let [_, table, query] = args.as_slice() else {
        eprintln!("usage: route <routing-table> <ipv6-prefix>");
        return Ok(ExitCode::FAILURE);
    };

    let (trie, _) = load_path(table, LoadOptions::default())?;
    let query: Ipv6Net = query.parse()?;
    let (pop, scope) = trie.route_prefix(&query);
    println!("Pop id: {pop}, Scope: {scope}");
    Ok(ExitCode::SUCCESS)
}
