use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

fn validate_trie<K: Eq + Hash + Clone, V>(t: &Trie<K, V>) {
    assert!(
        !t.nodes.node(NodeId::ROOT).is_terminal(),
        "root must never be terminal"
    );

    let mut stack = vec![NodeId::ROOT];
    let mut reachable = 0usize;
    let mut terminals = 0usize;
    while let Some(id) = stack.pop() {
        reachable += 1;
        let node = t.nodes.node(id);
        if node.is_terminal() {
            terminals += 1;
        }
        if id != NodeId::ROOT {
            assert!(
                node.is_terminal() || node.has_children(),
                "childless non-terminal node must have been pruned"
            );
        }

        let mut listed = 0usize;
        for child in t.nodes.children(id) {
            listed += 1;
            let token = t
                .nodes
                .node(child)
                .token()
                .expect("non-root node carries a token");
            assert_eq!(
                t.nodes.child(id, token),
                Some(child),
                "sibling list and token map must agree"
            );
            stack.push(child);
        }
        assert_eq!(listed, node.child_count(), "sibling list length must match map");
        assert_eq!(listed, t.nodes.children(id).rev().count());
    }

    assert_eq!(reachable, t.nodes.live(), "every live node must be reachable");
    assert_eq!(terminals, t.len(), "terminal count must match Trie::len");
}

fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, x) in a.iter().enumerate() {
        let mut cur = vec![i + 1; b.len() + 1];
        for (j, y) in b.iter().enumerate() {
            let cost = usize::from(x != y);
            cur[j + 1] = (prev[j + 1] + 1).min(cur[j] + 1).min(prev[j] + cost);
        }
        prev = cur;
    }
    prev[b.len()]
}

fn apply_edit_ops<T: Clone>(ops: &[EditOp<T>]) -> (Vec<T>, Vec<T>) {
    let mut from = Vec::new();
    let mut to = Vec::new();
    for op in ops {
        match op {
            EditOp::NoEdit(t) => {
                from.push(t.clone());
                to.push(t.clone());
            }
            EditOp::Insert(t) => to.push(t.clone()),
            EditOp::Delete(t) => from.push(t.clone()),
            EditOp::Replace(t, with) => {
                from.push(t.clone());
                to.push(with.clone());
            }
        }
    }
    (from, to)
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A four-token alphabet keeps keys sharing prefixes and near each other.
    prop::collection::vec(0u8..4, 0..=6)
}

fn keys_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(key_strategy(), 0..=60)
}

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Put(#[proptest(strategy = "key_strategy()")] Vec<u8>, u16),
    #[proptest(weight = 3)]
    Delete(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 2)]
    Get(#[proptest(strategy = "key_strategy()")] Vec<u8>),
}

fn build(keys: &[Vec<u8>]) -> Trie<u8, usize> {
    let mut t = Trie::new();
    for (i, key) in keys.iter().enumerate() {
        t.put(key, i);
    }
    t
}

fn edit_search(t: &Trie<u8, usize>, query: &[u8], distance: usize) -> SearchResults<u8, usize> {
    let opts = SearchOptions::builder()
        .max_edit_distance(distance)
        .edit_ops()
        .build()
        .unwrap();
    t.search(query, &opts)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_map(ops in prop::collection::vec(any::<Op>(), 0..=400)) {
        let mut t: Trie<u8, u16> = Trie::new();
        let mut m: HashMap<Vec<u8>, u16> = HashMap::new();

        for op in ops {
            match op {
                Op::Put(key, value) => {
                    let existed = t.put(&key, value);
                    if key.is_empty() {
                        prop_assert!(!existed);
                    } else {
                        prop_assert_eq!(existed, m.insert(key, value).is_some());
                    }
                }
                Op::Delete(key) => {
                    prop_assert_eq!(t.delete(&key), m.remove(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                }
            }
            prop_assert_eq!(t.len(), m.len());
        }

        validate_trie(&t);
        let mut got: Vec<(Vec<u8>, u16)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let mut expected: Vec<(Vec<u8>, u16)> = m.into_iter().collect();
        got.sort();
        expected.sort();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_exact_round_trip(keys in keys_strategy()) {
        let mut t = build(&keys);
        let exact = SearchOptions::builder().exact_key().build().unwrap();
        let live: HashSet<&Vec<u8>> = keys.iter().filter(|k| !k.is_empty()).collect();

        for key in &live {
            let results = t.search(key, &exact);
            prop_assert_eq!(results.len(), 1);
            prop_assert_eq!(&results.as_slice()[0].key, *key);
            prop_assert_eq!(Some(&results.as_slice()[0].value), t.get(key));
        }
        for key in &live {
            prop_assert!(t.delete(key).is_some());
            prop_assert!(t.search(key, &exact).is_empty());
        }
        prop_assert!(t.is_empty());
        prop_assert_eq!(t.node_count(), 0);
        validate_trie(&t);
    }

    #[test]
    fn prop_empty_prefix_lists_every_key_once(keys in keys_strategy()) {
        let t = build(&keys);
        let results = t.search(&[], &SearchOptions::default());
        let listed: Vec<Vec<u8>> = results.iter().map(|r| r.key.clone()).collect();
        let unique: HashSet<&Vec<u8>> = listed.iter().collect();
        prop_assert_eq!(unique.len(), listed.len());
        prop_assert_eq!(listed.len(), t.len());

        // Siblings come out in first-insertion order: a key is listed before
        // any key whose first token was inserted later.
        let mut first_seen: Vec<u8> = Vec::new();
        for key in keys.iter().filter(|k| !k.is_empty()) {
            if !first_seen.contains(&key[0]) {
                first_seen.push(key[0]);
            }
        }
        let mut heads: Vec<u8> = listed.iter().map(|k| k[0]).collect();
        heads.dedup();
        prop_assert_eq!(heads, first_seen);
    }

    #[test]
    fn prop_edit_distance_matches_brute_force(
        keys in keys_strategy(),
        query in key_strategy(),
        distance in 1usize..=3
    ) {
        let t = build(&keys);
        let results = edit_search(&t, &query, distance);

        let got: HashSet<(Vec<u8>, usize)> = results
            .iter()
            .map(|r| (r.key.clone(), r.edit_distance))
            .collect();
        prop_assert_eq!(got.len(), results.len());

        let expected: HashSet<(Vec<u8>, usize)> = t
            .iter()
            .map(|(k, _)| {
                let d = levenshtein(&k, &query);
                (k, d)
            })
            .filter(|(_, d)| *d <= distance)
            .collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_edit_ops_explain_the_match(
        keys in keys_strategy(),
        query in key_strategy(),
        distance in 1usize..=3
    ) {
        let t = build(&keys);
        for result in edit_search(&t, &query, distance) {
            let ops = result.edit_ops.expect("edit ops were requested");
            let (from, to) = apply_edit_ops(&ops);
            prop_assert_eq!(&from, &result.key);
            prop_assert_eq!(&to, &query);
            prop_assert_eq!(ops.iter().filter(|op| op.is_edit()).count(), result.edit_distance);
        }
    }

    #[test]
    fn prop_larger_distance_keeps_results(
        keys in keys_strategy(),
        query in key_strategy(),
        distance in 1usize..=3
    ) {
        let t = build(&keys);
        let near: HashSet<Vec<u8>> = edit_search(&t, &query, distance)
            .into_iter()
            .map(|r| r.key)
            .collect();
        let far: HashSet<Vec<u8>> = edit_search(&t, &query, distance + 1)
            .into_iter()
            .map(|r| r.key)
            .collect();
        prop_assert!(near.is_subset(&far));
    }

    #[test]
    fn prop_top_k_is_stable_prefix_of_sorted(
        keys in keys_strategy(),
        query in key_strategy(),
        distance in 1usize..=3,
        k in 1usize..=8
    ) {
        let t = build(&keys);
        let mut all = edit_search(&t, &query, distance).into_vec();
        // Stable sort keeps discovery order among equal distances.
        all.sort_by_key(|r| r.edit_distance);
        all.truncate(k);

        let opts = SearchOptions::builder()
            .max_edit_distance(distance)
            .edit_ops()
            .top_k_least_edited(k)
            .build()
            .unwrap();
        let top = t.search(&query, &opts).into_vec();
        prop_assert_eq!(top, all);
    }

    #[test]
    fn prop_max_results_truncates_traversal_order(
        keys in keys_strategy(),
        query in key_strategy(),
        distance in 1usize..=3,
        n in 1usize..=8
    ) {
        let t = build(&keys);
        let mut all = edit_search(&t, &query, distance).into_vec();
        all.truncate(n);

        let opts = SearchOptions::builder()
            .max_edit_distance(distance)
            .edit_ops()
            .max_results(n)
            .build()
            .unwrap();
        prop_assert_eq!(t.search(&query, &opts).into_vec(), all);

        let mut prefixed = t.search(&query, &SearchOptions::default()).into_vec();
        prefixed.truncate(n);
        let capped = SearchOptions::builder().max_results(n).build().unwrap();
        prop_assert_eq!(t.search(&query, &capped).into_vec(), prefixed);
    }
}

#[test]
fn exhaustive_delete_order_small_set() {
    let keys: Vec<Vec<u8>> = vec![
        vec![0],
        vec![0, 1],
        vec![0, 1, 2],
        vec![0, 2],
        vec![1],
        vec![1, 0, 0],
    ];

    fn for_each_permutation(items: &[Vec<u8>], f: &mut impl FnMut(Vec<Vec<u8>>)) {
        fn rec(
            items: &[Vec<u8>],
            used: &mut [bool],
            out: &mut Vec<Vec<u8>>,
            f: &mut impl FnMut(Vec<Vec<u8>>),
        ) {
            if out.len() == items.len() {
                f(out.clone());
                return;
            }
            for i in 0..items.len() {
                if used[i] {
                    continue;
                }
                used[i] = true;
                out.push(items[i].clone());
                rec(items, used, out, f);
                out.pop();
                used[i] = false;
            }
        }
        let mut used = vec![false; items.len()];
        rec(items, &mut used, &mut Vec::new(), f);
    }

    let base = build(&keys);
    for_each_permutation(&keys, &mut |perm| {
        let mut t = base.clone();
        let mut remaining = keys.len();
        for key in perm {
            assert!(t.delete(&key).is_some());
            remaining -= 1;
            assert_eq!(t.len(), remaining);
            validate_trie(&t);
        }
        assert_eq!(t.node_count(), 0);
        assert_eq!(t.to_string(), "^\n");
    });
}
