use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Get(u16),
    Clear,
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    // A narrow key range keeps overwrites and removals of present keys common.
    let key = 0u16..512;
    let op = prop_oneof![
        50 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        30 => key.clone().prop_map(Op::Remove),
        19 => key.prop_map(Op::Get),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=1000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_avl_equivalence(ops in ops_strategy()) {
        let mut t: AvlTree<u16, u32> = AvlTree::new();
        let mut m: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    prop_assert_eq!(t.insert(key, value), m.insert(key, value));
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.remove(&key), m.remove(&key));
                    prop_assert!(t.get(&key).is_none());
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                    prop_assert_eq!(t.at(&key).ok(), m.get(&key));
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            // Balanced after every single operation, not just at the end
            t.check_consistency();
            prop_assert!(t.is_balanced());
            prop_assert_eq!(t.len(), m.len());
        }

        let got: Vec<(u16, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_plain_equivalence(ops in ops_strategy()) {
        let mut t: BinarySearchTree<u16, u32> = BinarySearchTree::new();
        let mut m: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    prop_assert_eq!(t.insert(key, value), m.insert(key, value));
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.remove(&key), m.remove(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }
            prop_assert_eq!(t.len(), m.len());
        }

        t.check_consistency();
        let got: Vec<(u16, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected);
        let got_rev: Vec<u16> = t.keys().rev().copied().collect();
        let expected_rev: Vec<u16> = m.keys().rev().copied().collect();
        prop_assert_eq!(got_rev, expected_rev);
    }

    #[test]
    fn prop_remove_two_children_keeps_order(keys in prop::collection::btree_set(any::<i32>(), 3..200)) {
        let keys: Vec<i32> = keys.into_iter().collect();
        let mut t: AvlTree<i32, ()> = keys.iter().map(|k| (*k, ())).collect();

        let root = t.as_tree().root;
        let target = t.as_tree().arena[root.unwrap()].key;
        t.remove(&target);
        t.check_consistency();

        let expected: Vec<i32> = keys.into_iter().filter(|k| *k != target).collect();
        let got: Vec<i32> = t.keys().copied().collect();
        prop_assert_eq!(got, expected);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
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
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<i32> = (0..6).collect();
    for_each_permutation(&keys, |perm| {
        let mut t = AvlTree::new();
        for (i, k) in perm.into_iter().enumerate() {
            t.insert(k, i);
            t.check_consistency();
        }
        assert_eq!(t.len(), keys.len());
        assert!(t.height() <= 3);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<i32> = (0..6).collect();
    for_each_permutation(&keys, |perm| {
        let mut t: AvlTree<i32, ()> = keys.iter().map(|k| (*k, ())).collect();
        let mut plain: BinarySearchTree<i32, ()> = keys.iter().map(|k| (*k, ())).collect();
        for k in perm {
            assert!(t.remove(&k).is_some());
            t.check_consistency();
            assert!(plain.remove(&k).is_some());
            plain.check_consistency();
        }
        assert!(t.is_empty());
        assert!(plain.is_empty());
    });
}
