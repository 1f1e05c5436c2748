//! Convergence under concurrent commits and arbitrary delivery order.

use std::collections::HashSet;

use merkledb_crdt::Payload;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::tests::{as_set, clock_on, commit, fresh_store, sync_blocks};
use crate::Processed;

#[test]
fn fork_resolves_identically_regardless_of_order() {
    let x = clock_on(&fresh_store(), "field");
    let y = clock_on(&fresh_store(), "field");

    let c1 = commit(&x, b"base");
    sync_blocks(&x, &y);
    assert_eq!(y.process_node(c1).unwrap(), Processed::Applied);

    // both replicas commit concurrently from the shared head
    let c2x = commit(&x, b"X");
    let c2y = commit(&y, b"Y");

    let first = clock_on(&fresh_store(), "field");
    sync_blocks(&x, &first);
    sync_blocks(&y, &first);
    assert_eq!(first.process_node(c2x).unwrap(), Processed::Applied);
    assert_eq!(first.process_node(c2y).unwrap(), Processed::Applied);

    let second = clock_on(&fresh_store(), "field");
    sync_blocks(&x, &second);
    sync_blocks(&y, &second);
    assert_eq!(second.process_node(c2y).unwrap(), Processed::Applied);
    assert_eq!(second.process_node(c2x).unwrap(), Processed::Applied);

    for observer in [&first, &second] {
        assert_eq!(as_set(&observer.heads().unwrap()), as_set(&[c2x, c2y]));

        // equal priority; the lexicographically greater value wins everywhere
        assert_eq!(observer.payload().value().unwrap().unwrap(), b"Y");
        assert_eq!(observer.payload().priority().unwrap(), Some(2));
    }
}

#[test]
fn random_delivery_order_converges() {
    // reference history: two replicas interleaving commits, forks and a
    // merging commit on top
    let a = clock_on(&fresh_store(), "field");
    let b = clock_on(&fresh_store(), "field");

    let c1 = commit(&a, b"a1");
    sync_blocks(&a, &b);
    assert_eq!(b.process_node(c1).unwrap(), Processed::Applied);

    let c2a = commit(&a, b"a2");
    let c2b = commit(&b, b"b2");

    sync_blocks(&a, &b);
    sync_blocks(&b, &a);
    assert_eq!(a.process_node(c2b).unwrap(), Processed::Applied);
    assert_eq!(b.process_node(c2a).unwrap(), Processed::Applied);

    let c3a = commit(&a, b"a3");
    let c3b = commit(&b, b"b3");

    sync_blocks(&a, &b);
    sync_blocks(&b, &a);
    assert_eq!(a.process_node(c3b).unwrap(), Processed::Applied);
    assert_eq!(b.process_node(c3a).unwrap(), Processed::Applied);

    let reference_value = a.payload().value().unwrap();
    let reference_heads = as_set(&a.heads().unwrap());
    assert_eq!(reference_value, b.payload().value().unwrap());
    assert_eq!(reference_heads, as_set(&b.heads().unwrap()));

    let mut all: Vec<_> = a.blocks().all_keys().unwrap();

    for seed in 0..8 {
        let observer = clock_on(&fresh_store(), "field");
        sync_blocks(&a, &observer);

        let mut rng = StdRng::seed_from_u64(seed);
        all.shuffle(&mut rng);

        for cid in &all {
            let _processed = observer.process_node(*cid).unwrap();
        }

        assert_eq!(observer.payload().value().unwrap(), reference_value);
        assert_eq!(as_set(&observer.heads().unwrap()), reference_heads);
    }
}

#[test]
fn replicas_converge_after_exchanging_everything() {
    let a = clock_on(&fresh_store(), "field");
    let b = clock_on(&fresh_store(), "field");
    let c = clock_on(&fresh_store(), "field");

    let ha = commit(&a, b"alpha");
    let hb = commit(&b, b"beta");
    let hc = commit(&c, b"gamma");

    // full mesh exchange
    let replicas = [&a, &b, &c];
    for from in replicas {
        for to in replicas {
            sync_blocks(from, to);
        }
    }
    for replica in replicas {
        for head in [ha, hb, hc] {
            let _processed = replica.process_node(head).unwrap();
        }
    }

    let values: HashSet<_> = replicas
        .iter()
        .map(|r| r.payload().value().unwrap().unwrap())
        .collect();

    assert_eq!(values.len(), 1);
    // three independent roots, none linking another: a three-way fork
    for replica in replicas {
        assert_eq!(as_set(&replica.heads().unwrap()), as_set(&[ha, hb, hc]));
    }
}
