//! # Stripe Adder - Adaptive Striped Atomic Counters
//!
//! A Rust library providing counters built for workloads where many threads
//! update the same value very often and read it rarely.
//!
//! ## The Problem
//!
//! A single atomic shared by every writer is correct but slow: each update
//! needs exclusive ownership of one cache line, so with many cores the line
//! spends its life **bouncing** between them.
//!
//! ## The Solution: Adaptive Striping
//!
//! A [`LongAdder`](counters::long_adder::LongAdder) starts as a single atomic.
//! Only when two writers actually collide does it switch to a table of
//! cache-line-padded cells, with each writer hashed to a cell by its own
//! [`Probe`](striped::probe::Probe). Writers that keep colliding first rehash
//! to another cell, and only grow the table after colliding twice at the same
//! size. The table never grows past the number of execution units.
//!
//! ### Design Principles
//!
//! 1. **Pay for contention only when it happens**: no table is allocated for
//!    counters that are never contended.
//!
//! 2. **Cache Line Padding**: each cell is wrapped in
//!    [`crossbeam_utils::CachePadded`] so neighbouring cells never share a line.
//!
//! 3. **Explicit probes**: the stripe a writer uses lives in a token the
//!    writer owns. There is no thread-local state, so the same counter works
//!    from threads, thread pools or tasks.
//!
//! 4. **Aggregation on Read**: `sum()` folds the base and every cell. Reads
//!    get slower as the table grows, which is the right trade-off when writes
//!    vastly outnumber reads.
//!
//! 5. **Never wait**: the only lock guards table replacement and is only ever
//!    *tried*. A writer that can't take it rehashes and retries.
//!
//! ## Available Counter Types
//!
//! | Type | Description | Use Case |
//! |------|-------------|----------|
//! | [`LongAdder`](counters::long_adder::LongAdder) | Signed striped sum | Event counts, gauges, byte totals |
//! | [`LongAccumulator`](counters::long_accumulator::LongAccumulator) | Striped fold with any associative, commutative function | Peak/floor tracking |
//!
//! ## Quick Start
//!
//! ```rust
//! use stripe_adder::counters::long_adder::LongAdder;
//! use stripe_adder::striped::probe::Probe;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let counter = Arc::new(LongAdder::new().with_name("requests"));
//!
//! let handles: Vec<_> = (0..8)
//!     .map(|_| {
//!         let counter = Arc::clone(&counter);
//!         thread::spawn(move || {
//!             // One probe per writer
//!             let mut probe = Probe::new();
//!             for _ in 0..10_000 {
//!                 counter.increment(&mut probe);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(counter.sum(), 80_000);
//! let drained = counter.sum_then_reset();
//! assert_eq!(drained, 80_000);
//! assert_eq!(counter.sum(), 0);
//! ```
//!
//! ## Consistency
//!
//! `sum()` and `reset()` visit cells one at a time. With writers still running
//! they may observe some updates and miss others. `sum_then_reset()` drains
//! each cell with an atomic swap, so every update is reported by exactly one
//! call, but not all at the same instant. Quiesce writers if you need an exact
//! snapshot.
//!
//! ## Observers
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | `table` | [`observers::table`] | Pretty-print counters as ASCII tables |
//! | `json` | [`observers::json`] | Serialize counters to JSON |
//! | `serde` | [`snapshot`] | Serializable counter snapshots |
//! | `full` | All observers | Enables all observer modules |
//!
//! ## Logging
//!
//! Table installation and growth are reported through `tracing` at `trace`
//! and `debug` level. Nothing is logged on the update path.

pub mod adapters;
pub mod counters;
pub mod observers;
pub mod striped;

#[cfg(feature = "serde")]
pub mod snapshot;
