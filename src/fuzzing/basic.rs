use super::*;

qc!(route_matches_oracle, _route_matches_oracle);
fn _route_matches_oracle((list, queries): (Vec<(TestPrefix, PopId)>, Vec<TestPrefix>)) -> bool {
    let mut trie = PopTrie::new();
    let mut entries = HashMap::new();
    for (p, pop) in list {
        trie.insert_prefix(&p, pop);
        entries.insert(p, pop);
    }
    validate(&trie);

    // every configured prefix is also queried, exactly and as the covering prefix of itself
    entries
        .keys()
        .chain(queries.iter())
        .all(|q| trie.route_prefix(q) == oracle_lpm(&entries, q))
}

qc!(exact_match, _exact_match);
fn _exact_match((list, queries): (Vec<(TestPrefix, PopId)>, Vec<TestPrefix>)) -> bool {
    let trie: PopTrie = list.iter().copied().collect();
    let entries: HashMap<TestPrefix, PopId> = list.into_iter().collect();
    trie.len() == entries.len()
        && entries.iter().all(|(p, pop)| trie.get_prefix(p) == Some(*pop))
        && queries
            .iter()
            .all(|q| trie.get_prefix(q) == entries.get(q).copied())
}

qc!(insert_order_is_irrelevant, _insert_order_is_irrelevant);
fn _insert_order_is_irrelevant(
    (list, queries): (Vec<(TestPrefix, PopId)>, Vec<TestPrefix>),
) -> bool {
    let entries: HashMap<TestPrefix, PopId> = list.into_iter().collect();
    let mut sorted: Vec<(TestPrefix, PopId)> = entries.into_iter().collect();
    sorted.sort_by_key(|(p, _)| (p.1, p.0));
    let forward: PopTrie = sorted.iter().copied().collect();
    let backward: PopTrie = sorted.iter().rev().copied().collect();
    validate(&forward);
    validate(&backward);
    sorted
        .iter()
        .map(|(p, _)| p)
        .chain(queries.iter())
        .all(|q| forward.route_prefix(q) == backward.route_prefix(q))
}

qc!(reinsert_is_idempotent, _reinsert_is_idempotent);
fn _reinsert_is_idempotent(list: Vec<(TestPrefix, PopId)>) -> bool {
    let mut trie: PopTrie = list.iter().copied().collect();
    let repr = format!("{trie:?}");
    let nodes = trie.node_count();
    let len = trie.len();
    let entries: HashMap<TestPrefix, PopId> = list.into_iter().collect();
    for (p, pop) in entries.iter() {
        if trie.insert_prefix(p, *pop) != Some(*pop) {
            return false;
        }
    }
    format!("{trie:?}") == repr && trie.node_count() == nodes && trie.len() == len
}

qc!(shorter_query_never_matches_longer_prefix, _shorter_query);
fn _shorter_query((list, queries): (Vec<(TestPrefix, PopId)>, Vec<TestPrefix>)) -> bool {
    let trie: PopTrie = list.into_iter().collect();
    queries.iter().all(|q| {
        let (_, len) = trie.route_prefix(q);
        len <= q.1
    })
}
