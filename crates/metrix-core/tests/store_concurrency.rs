//! Store behaviour under many concurrent writers and readers.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use metrix_core::snapshot::Snapshot;
use metrix_core::store::{CounterIncrementer, MemStorage, MetricReader, MetricRestorer, MetricWriter};

#[test]
fn concurrent_counter_adds_are_not_lost() {
    let store = Arc::new(MemStorage::new());
    let workers: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    store.set_counter("hits", i + 1).unwrap();
                    store.incr_counter("ticks").unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    // 1_000 * (1 + 2 + ... + 8)
    assert_eq!(store.get_counter("hits").unwrap(), 36_000);
    assert_eq!(store.get_counter("ticks").unwrap(), 8_000);
}

#[test]
fn readers_never_see_half_a_restore() {
    let store = Arc::new(MemStorage::new());
    let epoch = |n: i64| {
        let counters: HashMap<String, i64> = (0..50).map(|k| (format!("c{k}"), n)).collect();
        let gauges: HashMap<String, f64> = (0..50).map(|k| (format!("g{k}"), n as f64)).collect();
        (counters, gauges)
    };
    let (c, g) = epoch(0);
    store.restore_all(c, g).unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for n in 1..200 {
                let (c, g) = epoch(n);
                store.restore_all(c, g).unwrap();
            }
        })
    };

    for _ in 0..500 {
        let snap = Snapshot::capture(store.as_ref()).unwrap();
        let first = snap.counters["c0"];
        assert!(snap.counters.values().all(|v| *v == first));
        assert!(snap.gauges.values().all(|v| *v == first as f64));
    }
    writer.join().unwrap();
}

#[test]
fn gauges_last_write_wins_per_name() {
    let store = Arc::new(MemStorage::new());
    let workers: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let name = format!("g{i}");
                for v in 0..=500 {
                    store.set_gauge(&name, v as f64).unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    for i in 0..4 {
        assert_eq!(store.get_gauge(&format!("g{i}")).unwrap(), 500.0);
    }
}
