use std::net::Ipv4Addr;

use lpmt_core::Prefix;
use lpmt_trie::{MergePolicy, PatriciaTrie, SharedTrie};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn route(addr: [u8; 4], mask: u32) -> Prefix {
    Prefix::with_mask(Ipv4Addr::from(addr).into(), mask).unwrap()
}

fn key(addr: [u8; 4]) -> u32 {
    Ipv4Addr::from(addr).into()
}

#[test]
fn test_route_table() {
    init();
    let mut trie = PatriciaTrie::new("default");
    trie.insert(route([10, 0, 3, 0], 0xffff_0000), "10.0/16");
    trie.insert(route([10, 0, 4, 0], 0xffff_ff00), "10.0.4/24");
    trie.insert(route([192, 168, 0, 0], 0xffff_0000), "192.168/16");
    trie.insert(route([192, 168, 7, 1], 0xffff_ffff), "host");
    trie.insert(route([172, 16, 0, 0], 0xfff0_0000), "172.16/12");
    trie.validate().unwrap();

    let cases = [
        ([10, 0, 3, 4], "10.0/16"),
        ([10, 0, 4, 5], "10.0.4/24"),
        ([10, 1, 4, 5], "default"),
        ([8, 8, 8, 8], "default"),
        ([192, 168, 7, 1], "host"),
        ([192, 168, 7, 2], "192.168/16"),
        ([172, 31, 255, 255], "172.16/12"),
        ([172, 32, 0, 0], "default"),
    ];
    for (addr, expected) in cases {
        assert_eq!(*trie.lookup(key(addr)).1, expected, "lookup {:?}", addr);
    }
    assert_eq!(trie.lookup(key([10, 0, 4, 5])).0.to_string(), "10.0.4.0/24");
    println!("{:?}", trie);
}

#[test]
fn test_withdraw_and_reannounce() {
    init();
    let mut trie = PatriciaTrie::with_policy(0u32, MergePolicy::Replace);
    let prefixes = (0..32u32)
        .map(|i| Prefix::new(0x0A00_0000 | (i << 16), 16).unwrap())
        .collect::<Vec<_>>();
    for (i, p) in prefixes.iter().enumerate() {
        trie.insert(*p, i as u32 + 1);
    }
    for p in prefixes.iter().step_by(2) {
        assert!(trie.remove(p).is_some());
    }
    trie.validate().unwrap();
    for (i, p) in prefixes.iter().enumerate() {
        let expected = if i % 2 == 0 { 0 } else { i as u32 + 1 };
        assert_eq!(*trie.lookup(p.addr() | 0x1234).1, expected);
    }
    for (i, p) in prefixes.iter().enumerate().step_by(2) {
        assert_eq!(trie.insert(*p, i as u32 + 100).1, None);
    }
    assert_eq!(trie.len(), 33);
    assert_eq!(*trie.lookup(0x0A00_0001).1, 100);
    trie.validate().unwrap();
}

#[test]
fn test_shared_trie_handle() {
    init();
    let shared = SharedTrie::new(String::from("default"));
    let writer = shared.clone();
    writer.insert(route([10, 0, 0, 0], 0xff00_0000), String::from("ten"));
    assert_eq!(shared.lookup_cloned(key([10, 9, 9, 9])).1, "ten");
    assert_eq!(shared.read().search(key([10, 9, 9, 9])).key(), key([10, 0, 0, 0]));
    shared.write().clear();
    assert!(writer.is_empty());
}
