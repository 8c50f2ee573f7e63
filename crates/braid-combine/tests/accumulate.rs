//! Multi-threaded accumulation under contention.

use std::cell::Cell;
use std::thread;

use braid_combine::Combinable;

#[test]
fn simultaneous_first_calls_do_not_lose_entries() {
    const THREADS: usize = 24;

    for _ in 0..50 {
        let mut c: Combinable<Cell<u64>> = Combinable::new();
        let (start_tx, start_rx) = crossbeam_channel::bounded::<()>(0);

        // Rendezvous all threads before the first `local()` call so the
        // insertion CAS loops actually contend for the bucket heads.
        thread::scope(|scope| {
            for _ in 0..THREADS {
                let c = &c;
                let start_rx = start_rx.clone();
                scope.spawn(move || {
                    start_rx.recv().unwrap();
                    let local = c.local();
                    local.set(local.get() + 1);
                });
            }
            for _ in 0..THREADS {
                start_tx.send(()).unwrap();
            }
        });

        let total = c.combine(|a, b| Cell::new(a.get() + b.get()));
        assert_eq!(total.get() as usize, THREADS);
    }
}

#[test]
fn accumulation_rounds_interleave_with_clear() {
    let mut c: Combinable<Cell<u64>> = Combinable::with_thread_hint(16);
    for round in 1..=5u64 {
        thread::scope(|scope| {
            for _ in 0..8 {
                let c = &c;
                scope.spawn(move || {
                    for _ in 0..round {
                        let local = c.local();
                        local.set(local.get() + 1);
                    }
                });
            }
        });
        let total = c.combine(|a, b| Cell::new(a.get() + b.get()));
        assert_eq!(total.get(), 8 * round, "round {round}");
        c.clear();
    }
}

#[test]
fn per_thread_counts_stay_private() {
    let mut c: Combinable<Cell<u64>> = Combinable::new();
    thread::scope(|scope| {
        for tid in 1..=6u64 {
            let c = &c;
            scope.spawn(move || {
                for _ in 0..tid * 100 {
                    let local = c.local();
                    local.set(local.get() + 1);
                }
                assert_eq!(c.local().get(), tid * 100);
            });
        }
    });
    let mut counts: Vec<u64> = Vec::new();
    c.combine_each(|value| counts.push(value.get()));
    counts.sort_unstable();
    assert_eq!(counts, vec![100, 200, 300, 400, 500, 600]);
}
