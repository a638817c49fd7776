use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Check every structural invariant of `t`:
/// - each child sits in the slot its key hashes to at the parent's level,
/// - keys are unique,
/// - the reachable node count matches `len()`.
fn validate_tree<K, V, const ORDER: usize, H>(t: &AneTree<K, V, ORDER, H>)
where
    K: Eq + Hash + std::fmt::Debug,
    H: SlotHasher<K>,
{
    let mut seen: HashSet<&K> = HashSet::new();
    let mut stack: Vec<(&Node<K, V, ORDER>, usize)> = Vec::new();
    if let Some(root) = t.root.as_deref() {
        stack.push((root, 0));
    }

    while let Some((node, level)) = stack.pop() {
        assert!(seen.insert(&node.key), "duplicate key {:?}", node.key);
        for (slot, child) in node.children.iter().enumerate() {
            let Some(child) = child.as_deref() else {
                continue;
            };
            assert_eq!(
                t.hasher.slot(ORDER, level, &child.key),
                slot,
                "key {:?} misplaced below level {level}",
                child.key
            );
            stack.push((child, level + 1));
        }
    }

    assert_eq!(seen.len(), t.count, "reachable nodes must match AneTree::len");
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 4)]
    Insert(#[proptest(strategy = "0u64..256")] u64, u32),
    #[proptest(weight = 2)]
    Replace(#[proptest(strategy = "0u64..256")] u64, u32),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "0u64..256")] u64),
    #[proptest(weight = 2)]
    Get(#[proptest(strategy = "0u64..256")] u64),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=600)
}

fn run_against_model<const ORDER: usize>(ops: Vec<Op>) -> std::result::Result<(), TestCaseError> {
    let mut t: AneTree<u64, u32, ORDER> = AneTree::new();
    let mut m: HashMap<u64, u32> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(key, value) => {
                let expected = if m.contains_key(&key) {
                    Err(AneError::DuplicateKey)
                } else {
                    m.insert(key, value);
                    Ok(())
                };
                prop_assert_eq!(t.insert(key, value), expected);
            }
            Op::Replace(key, value) => {
                prop_assert_eq!(t.insert_or_replace(key, value), Ok(m.insert(key, value)));
            }
            Op::Remove(key) => {
                let before = t.len();
                let got = t.remove(&key);
                match m.remove(&key) {
                    Some(v) => {
                        prop_assert_eq!(got, Ok(v));
                        prop_assert_eq!(t.len(), before - 1);
                    }
                    None => prop_assert_eq!(got, Err(AneError::NotFound)),
                }
            }
            Op::Get(key) => {
                prop_assert_eq!(t.get(&key), m.get(&key));
            }
        }

        prop_assert_eq!(t.len(), m.len());
    }

    validate_tree(&t);
    for (k, v) in &m {
        prop_assert_eq!(t.find(k), Ok(v));
    }
    prop_assert_eq!(t.iter().count(), m.len());
    Ok(())
}

fn string_key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9:_ -]{0,32}"
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_order_2(ops in ops_strategy()) {
        run_against_model::<2>(ops)?;
    }

    #[test]
    fn prop_equivalence_order_1(ops in prop::collection::vec(any::<Op>(), 0..=200)) {
        run_against_model::<1>(ops)?;
    }

    #[test]
    fn prop_equivalence_order_5(ops in ops_strategy()) {
        run_against_model::<5>(ops)?;
    }

    #[test]
    fn prop_remove_leaves_others_intact(
        keys in prop::collection::hash_set(any::<u64>(), 1..200),
        pick in any::<prop::sample::Index>(),
    ) {
        let keys: Vec<u64> = keys.into_iter().collect();
        let mut t: AneTree<u64, u64, 3> = AneTree::new();
        for &k in &keys {
            t.insert(k, k.wrapping_mul(31)).unwrap();
        }
        let victim = keys[pick.index(keys.len())];

        prop_assert_eq!(t.remove(&victim), Ok(victim.wrapping_mul(31)));
        prop_assert_eq!(t.find(&victim), Err(AneError::NotFound));
        for &k in keys.iter().filter(|&&k| k != victim) {
            prop_assert_eq!(t.get(&k), Some(&k.wrapping_mul(31)));
        }
        prop_assert_eq!(t.len(), keys.len() - 1);
        validate_tree(&t);
    }

    #[test]
    fn prop_string_keys(
        entries in prop::collection::vec((string_key_strategy(), any::<u16>()), 0..300),
        removals in prop::collection::vec(string_key_strategy(), 0..100),
    ) {
        let mut t: StringTree<u16, 3> = AneTree::new();
        let mut m: HashMap<String, u16> = HashMap::new();
        for (k, v) in entries {
            prop_assert_eq!(t.insert_or_replace(k.clone(), v), Ok(m.insert(k, v)));
        }
        for k in removals {
            prop_assert_eq!(t.remove(k.as_str()).ok(), m.remove(&k));
        }
        validate_tree(&t);
        for (k, v) in &m {
            prop_assert_eq!(t.get(k.as_str()), Some(v));
        }
    }

    #[test]
    fn prop_clone_matches(keys in prop::collection::vec(any::<u32>(), 0..300)) {
        let mut t: AneTree<u32, u32, 4> = AneTree::new();
        for k in keys {
            let _ = t.insert(k, !k);
        }
        let copy = t.clone();
        validate_tree(&copy);
        let a: Vec<(u32, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let b: Vec<(u32, u32)> = copy.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(a, b);
        prop_assert_eq!(t.stats(), copy.stats());
    }
}

/// Calls `f` with every ordering of `SMALL_SET` (Heap's algorithm).
fn for_each_small_set_order(mut f: impl FnMut(&[u64])) {
    let mut keys = SMALL_SET;
    let mut counters = [0usize; SMALL_SET.len()];
    f(&keys);

    let mut i = 1;
    while i < keys.len() {
        if counters[i] < i {
            let j = if i % 2 == 0 { 0 } else { counters[i] };
            keys.swap(j, i);
            f(&keys);
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
}

const SMALL_SET: [u64; 6] = [4, 1, 9000, 2300, 15, 7];

#[test]
fn exhaustive_insert_order_small_set() {
    let mut orders = 0;
    for_each_small_set_order(|keys| {
        orders += 1;
        let mut t: AneTree<u64, u64, 2> = AneTree::new();
        for (i, &k) in keys.iter().enumerate() {
            assert_eq!(t.insert(k, i as u64), Ok(()));
            assert_eq!(t.insert(k, 0), Err(AneError::DuplicateKey));
        }

        validate_tree(&t);
        for k in SMALL_SET {
            assert!(t.contains_key(&k));
        }
        assert_eq!(t.iter().count(), SMALL_SET.len());
    });
    assert_eq!(orders, 720);
}

#[test]
fn exhaustive_remove_order_small_set() {
    // Insert in a fixed order, then remove in all permutations.
    let mut base: AneTree<u64, u64, 2> = AneTree::new();
    for (i, &k) in SMALL_SET.iter().enumerate() {
        base.insert(k, i as u64).unwrap();
    }

    for_each_small_set_order(|keys| {
        let mut t = base.clone();
        let mut live: HashSet<u64> = SMALL_SET.into_iter().collect();

        for &k in keys {
            let expected = SMALL_SET.iter().position(|&s| s == k).unwrap() as u64;
            assert_eq!(t.remove(&k), Ok(expected));
            live.remove(&k);
            assert_eq!(t.len(), live.len());
            validate_tree(&t);
            for other in &live {
                assert!(t.contains_key(other), "lost {other} after removing {k}");
            }
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_none());
    });
}
