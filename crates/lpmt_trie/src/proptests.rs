use super::*;

use lpmt_core::{Mask, Prefix};
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(Prefix, u32),
    InsertUnlessCovered(u32, Mask, u32),
    Remove(Prefix),
    Lookup(u32),
    Clear,
}

fn addr_strategy() -> impl Strategy<Value = u32> + Clone {
    // a handful of shared high octets keeps the prefixes overlapping
    let base = prop::sample::select(vec![0u32, 0x0A00_0000, 0x0A80_0000, 0xC0A8_0000, 0xFFFF_FF00]);
    let last = prop::sample::select(vec![0u32, 1, 2, 128, 255]);
    (base, any::<u16>(), last).prop_map(|(base, mid, last)| base ^ ((mid as u32) << 8) ^ last)
}

fn prefix_strategy() -> impl Strategy<Value = Prefix> + Clone {
    (addr_strategy(), 0u8..=32).prop_map(|(addr, len)| Prefix::masked(addr, Mask::saturating(len)))
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let prefix = prefix_strategy();
    let op = prop_oneof![
        40 => (prefix.clone(), any::<u32>()).prop_map(|(p, v)| Op::Insert(p, v)),
        10 => (addr_strategy(), 0u8..=32, any::<u32>())
            .prop_map(|(addr, len, v)| Op::InsertUnlessCovered(addr, Mask::saturating(len), v)),
        25 => prefix.prop_map(Op::Remove),
        24 => addr_strategy().prop_map(Op::Lookup),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=400)
}

/// Brute-force longest match over every stored (addr, len).
fn oracle_lookup(m: &BTreeMap<(u32, u8), u32>, key: u32) -> (Prefix, u32) {
    m.iter()
        .filter(|((addr, len), _)| Mask::saturating(*len).covers(key, *addr))
        .max_by_key(|((_, len), _)| *len)
        .map(|(&(addr, len), &v)| (Prefix::masked(addr, Mask::saturating(len)), v))
        .unwrap_or((Prefix::default_route(), 0))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 20_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_brute_force(ops in ops_strategy()) {
        let mut t = PatriciaTrie::new(0u32);
        let mut m: BTreeMap<(u32, u8), u32> = BTreeMap::new();
        m.insert((0, 0), 0);

        for op in ops {
            match op {
                Op::Insert(p, v) => {
                    let (_, old_t) = t.insert(p, v);
                    let old_m = m.insert((p.addr(), p.len()), v);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::InsertUnlessCovered(addr, mask, v) => {
                    let covered = !oracle_lookup(&m, addr).0.is_default();
                    prop_assert_eq!(t.insert_unless_covered(addr, mask, v).is_err(), covered);
                    if !covered {
                        let p = Prefix::masked(addr, mask);
                        m.insert((p.addr(), p.len()), v);
                    }
                }
                Op::Remove(p) => {
                    let old_t = t.remove(&p);
                    let old_m = if p.is_default() {
                        None
                    } else {
                        m.remove(&(p.addr(), p.len()))
                    };
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Lookup(key) => {
                    let (prefix, data) = t.lookup(key);
                    prop_assert_eq!((prefix, *data), oracle_lookup(&m, key));
                    let found = t.search(key);
                    prop_assert_eq!(found.key(), prefix.addr());
                    prop_assert_eq!(found.matching(key).map(|e| e.mask), Some(prefix.mask()));
                }
                Op::Clear => {
                    t.clear();
                    let default = m[&(0, 0)];
                    m.clear();
                    m.insert((0, 0), default);
                }
            }
            prop_assert!(t.validate().is_ok(), "{:?}", t.validate());
            prop_assert_eq!(t.len(), m.len());
        }

        for (&(addr, len), v) in &m {
            prop_assert_eq!(t.get(&Prefix::masked(addr, Mask::saturating(len))), Some(v));
        }
        prop_assert_eq!(t.iter().count(), m.len());
    }
}

#[test]
fn exhaustive_insert_order_small_set() {
    let prefixes = [
        (0x0A00_0000, 8),
        (0x0A00_0000, 16),
        (0x0A01_0000, 16),
        (0x0A80_0000, 16),
        (0x0A00_0100, 24),
    ];
    let probes = [0x0A00_0101, 0x0A00_0201, 0x0A01_0001, 0x0A80_0001, 0x0A40_0001, 0x0B00_0000];
    let mut order = [0usize, 1, 2, 3, 4];
    let mut permutations = 0;
    loop {
        let mut t = PatriciaTrie::new(0u8);
        for &i in &order {
            let (addr, len) = prefixes[i];
            t.insert(Prefix::new(addr, len).unwrap(), len);
        }
        t.validate().unwrap();
        let answers = probes.map(|key| *t.lookup(key).1);
        assert_eq!(answers, [24, 16, 16, 16, 8, 0], "order {:?}", order);

        for &i in order.iter().rev() {
            let (addr, len) = prefixes[i];
            assert_eq!(t.remove(&Prefix::new(addr, len).unwrap()), Some(len));
            t.validate().unwrap();
        }
        assert_eq!(t.node_count(), 1);

        permutations += 1;
        if !next_permutation(&mut order) {
            break;
        }
    }
    assert_eq!(permutations, 120);
}

fn next_permutation(items: &mut [usize]) -> bool {
    let Some(i) = items.windows(2).rposition(|w| w[0] < w[1]) else {
        return false;
    };
    let j = items.iter().rposition(|&x| x > items[i]).unwrap_or(i + 1);
    items.swap(i, j);
    items[i + 1..].reverse();
    true
}
