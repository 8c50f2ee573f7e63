//! Benchmark workloads for the Braid container crates.
//!
//! Provides deterministic, seeded workload generators so benchmark runs
//! are comparable across machines and revisions:
//!
//! - [`uniform_values`]: a reproducible value stream.
//! - [`push_pop_schedule`]: a reproducible interleaving of queue pushes
//!   and pops with a bounded backlog.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One step of a queue workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueOp {
    /// Push the given value.
    Push(u64),
    /// Pop one element.
    Pop,
}

/// `count` values drawn from a seeded generator.
pub fn uniform_values(seed: u64, count: usize) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| rng.random()).collect()
}

/// A reproducible push/pop interleaving of `count` operations whose
/// live backlog never exceeds `max_backlog`.
pub fn push_pop_schedule(seed: u64, count: usize, max_backlog: usize) -> Vec<QueueOp> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut backlog = 0usize;
    let mut ops = Vec::with_capacity(count);
    for _ in 0..count {
        let push = backlog == 0 || (backlog < max_backlog && rng.random_bool(0.5));
        if push {
            ops.push(QueueOp::Push(rng.random()));
            backlog += 1;
        } else {
            ops.push(QueueOp::Pop);
            backlog -= 1;
        }
    }
    ops
}
