//! Adaptive striping core shared by every counter in this crate.
//!
//! A [`StripedAdder`] starts life as a single atomic `base`. As long as writers
//! don't collide, every update is one CAS on that word. The first time a CAS on
//! `base` fails, a table of two [`Cell`]s is installed and writers are spread
//! across it by their [`Probe`]. A writer that keeps losing the race on its cell
//! first rehashes to another cell and, if it still collides at the same table
//! size, doubles the table. Growth stops at the number of execution units
//! available to the process (rounded down to a power of two).
//!
//! ```text
//!                    ┌──────────┐
//!   no contention ──►│   base   │
//!                    └──────────┘
//!                          │ first failed CAS
//!                          ▼
//!          ┌──────────┬──────────┬─────┬──────────┐
//!   probe ►│ Cell[0]  │ Cell[1]  │ ... │ Cell[n-1]│  (CachePadded, n = 2^k)
//!          └──────────┴──────────┴─────┴──────────┘
//!                          │ two collisions at the same size
//!                          ▼
//!                  table replaced by 2n cells,
//!                  old cells carried over
//! ```
//!
//! # Table replacement
//!
//! The table is never resized in place. A new, larger table is built holding the
//! same `Arc<Cell>`s plus fresh ones, and published with a single pointer swap.
//! Writers that loaded the old pointer keep operating on cells that are still
//! reachable from the new table, so no update is lost. The old table itself is
//! retired through `crossbeam_epoch` and freed once no pinned thread can still
//! see it.
//!
//! Structural changes are guarded by a one-bit `busy` flag that is only ever
//! *tried*. A writer that can't get it goes back to rehashing instead of waiting.

pub(crate) mod cell;
pub mod probe;

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};

use self::cell::Cell;
use self::probe::{stripe_index, Probe};

/// Returns the largest power of two not exceeding `units`, and never less than 2.
///
/// # Examples
///
/// ```rust
/// use stripe_adder::striped::stripe_cap;
///
/// assert_eq!(stripe_cap(1), 2);
/// assert_eq!(stripe_cap(6), 4);
/// assert_eq!(stripe_cap(16), 16);
/// ```
pub const fn stripe_cap(units: usize) -> usize {
    if units <= 2 {
        2
    } else {
        1 << (usize::BITS - 1 - units.leading_zeros())
    }
}

/// Default stripe cap, derived once from the available parallelism.
fn default_stripe_cap() -> usize {
    static CAP: OnceLock<usize> = OnceLock::new();
    *CAP.get_or_init(|| {
        let units = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        stripe_cap(units)
    })
}

/// What a writer does after losing a CAS on its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collision {
    /// Forget earlier collisions and move to another cell.
    Rehash,
    /// Remember the collision and move to another cell.
    Mark,
    /// Try to double the table. Falls back to `Rehash` if `busy` is taken or
    /// the table changed under us.
    Grow,
}

/// Decides how to react to a failed CAS on a table of `n` cells.
///
/// A table that is already at `cap`, or that was replaced since the writer
/// loaded it, never grows. Otherwise the first collision at a given size is
/// only remembered and the second one asks for growth.
const fn collision_step(n: usize, cap: usize, is_current: bool, collide: bool) -> Collision {
    if n >= cap || !is_current {
        Collision::Rehash
    } else if !collide {
        Collision::Mark
    } else {
        Collision::Grow
    }
}

/// A published set of cells. Its length is always a power of two, at least 2.
struct Table {
    cells: Box<[Arc<Cell>]>,
}

impl Table {
    fn seeded(probe: i32, seed: i64, identity: i64) -> Self {
        let mut values = [identity; 2];
        values[stripe_index(probe, 2)] = seed;
        Table {
            cells: Box::new(values.map(|v| Arc::new(Cell::new(v)))),
        }
    }

    fn doubled(&self, identity: i64) -> Self {
        let n = self.cells.len();
        let mut cells = Vec::with_capacity(n << 1);
        cells.extend(self.cells.iter().cloned());
        cells.resize_with(n << 1, || Arc::new(Cell::new(identity)));
        Table {
            cells: cells.into_boxed_slice(),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn cell(&self, probe: i32) -> &Cell {
        &self.cells[stripe_index(probe, self.cells.len())]
    }
}

/// The striping engine behind [`LongAdder`](crate::counters::long_adder::LongAdder)
/// and [`LongAccumulator`](crate::counters::long_accumulator::LongAccumulator).
///
/// Updates are expressed as a combining function `f(current, x)` that must be
/// associative and commutative, with `identity` as its neutral element. The
/// logical value is `base` folded with every cell through the same function.
pub struct StripedAdder {
    base: AtomicI64,
    cells: Atomic<Table>,
    busy: AtomicBool,
    identity: i64,
    pub(crate) max_cells: usize,
}

impl StripedAdder {
    /// Creates an adder whose base starts at `identity`.
    ///
    /// A `max_cells` of 0 means the cap is taken from the available parallelism.
    pub(crate) const fn new(identity: i64, max_cells: usize) -> Self {
        StripedAdder {
            base: AtomicI64::new(identity),
            cells: Atomic::null(),
            busy: AtomicBool::new(false),
            identity,
            max_cells,
        }
    }

    /// The neutral element of the combining function.
    #[inline]
    pub(crate) fn identity(&self) -> i64 {
        self.identity
    }

    /// Maximum number of cells the table may grow to.
    pub(crate) fn cap(&self) -> usize {
        if self.max_cells == 0 {
            default_stripe_cap()
        } else {
            self.max_cells
        }
    }

    /// Current number of cells, or 0 while the table hasn't been installed.
    pub(crate) fn stripes(&self) -> usize {
        let guard = &epoch::pin();
        // SAFETY: tables are only freed through `defer_destroy`, and we are pinned.
        unsafe { self.cells.load(Ordering::Acquire, guard).as_ref() }.map_or(0, Table::len)
    }

    /// Applies `f(_, x)` to the value.
    ///
    /// This is the fast path: a single CAS on `base` while no table exists, or
    /// on the caller's cell once it does. Anything else goes through
    /// [`accumulate`](Self::accumulate).
    #[inline]
    pub(crate) fn update<F>(&self, probe: &mut Probe, x: i64, f: F)
    where
        F: Fn(i64, i64) -> i64 + Copy,
    {
        // SAFETY: only the null-ness of the pointer is inspected, nothing is dereferenced.
        if unsafe { self.cells.load(Ordering::Acquire, epoch::unprotected()) }.is_null() {
            let b = self.base.load(Ordering::Relaxed);
            let r = f(b, x);
            if r != b && !self.cas_base(b, r) {
                self.accumulate(probe, x, f, true, &epoch::pin());
            }
            return;
        }

        let guard = &epoch::pin();
        // SAFETY: tables are only freed through `defer_destroy`, and we are pinned.
        match unsafe { self.cells.load(Ordering::Acquire, guard).as_ref() } {
            Some(table) => {
                let cell = table.cell(probe.get());
                let v = cell.load();
                let r = f(v, x);
                if r != v && !cell.compare_and_swap(v, r) {
                    self.accumulate(probe, x, f, false, guard);
                }
            }
            None => self.accumulate(probe, x, f, true, guard),
        }
    }

    /// Contended slow path: rehash, install or grow the table, or retry `base`.
    ///
    /// `was_uncontended` is `false` when the caller already lost a CAS on the
    /// cell its probe points at.
    fn accumulate<F>(
        &self,
        probe: &mut Probe,
        x: i64,
        f: F,
        mut was_uncontended: bool,
        guard: &Guard,
    ) where
        F: Fn(i64, i64) -> i64 + Copy,
    {
        let mut hash = probe.get();
        if hash == 0 {
            hash = probe.init();
            // The first attempt with a fresh hash is not charged as contention.
            was_uncontended = true;
        }

        let mut collide = false;
        loop {
            let current = self.cells.load(Ordering::Acquire, guard);
            // SAFETY: tables are only freed through `defer_destroy`, and we are pinned.
            if let Some(table) = unsafe { current.as_ref() } {
                if !was_uncontended {
                    // The cell is known to be contended: move away before retrying.
                    was_uncontended = true;
                    hash = probe.advance(hash);
                    continue;
                }

                let cell = table.cell(hash);
                let v = cell.load();
                let r = f(v, x);
                if r == v || cell.compare_and_swap(v, r) {
                    return;
                }

                let step = collision_step(
                    table.len(),
                    self.cap(),
                    self.is_current(current, guard),
                    collide,
                );
                match step {
                    Collision::Rehash => collide = false,
                    Collision::Mark => collide = true,
                    Collision::Grow => {
                        collide = false;
                        if self.try_lock() {
                            let grown = self.is_current(current, guard);
                            if grown {
                                self.grow(table, guard);
                            }
                            self.unlock();
                            if grown {
                                continue;
                            }
                        }
                    }
                }
                hash = probe.advance(hash);
            } else if self.try_lock() {
                let absent = self.cells.load(Ordering::Acquire, guard).is_null();
                if absent {
                    let seed = f(self.identity, x);
                    self.cells.store(
                        Owned::new(Table::seeded(hash, seed, self.identity)),
                        Ordering::Release,
                    );
                    tracing::trace!(stripes = 2, "installed initial cell table");
                }
                self.unlock();
                if absent {
                    return;
                }
            } else {
                let b = self.base.load(Ordering::Relaxed);
                let r = f(b, x);
                if r == b || self.cas_base(b, r) {
                    return;
                }
            }
        }
    }

    /// Publishes a table twice the size of `table`. Caller holds `busy`.
    fn grow(&self, table: &Table, guard: &Guard) {
        let from = table.len();
        let old = self.cells.swap(
            Owned::new(table.doubled(self.identity)),
            Ordering::AcqRel,
            guard,
        );
        // SAFETY: `old` is unreachable from `self.cells` now. Readers that loaded
        // it before the swap are pinned and keep it alive until they unpin.
        unsafe { guard.defer_destroy(old) };
        tracing::debug!(from, to = from << 1, "grew cell table");
    }

    /// Folds `base` and every cell through `f`.
    pub(crate) fn fold<F>(&self, f: F) -> i64
    where
        F: Fn(i64, i64) -> i64,
    {
        let guard = &epoch::pin();
        let mut acc = self.base.load(Ordering::Relaxed);
        // SAFETY: tables are only freed through `defer_destroy`, and we are pinned.
        if let Some(table) = unsafe { self.cells.load(Ordering::Acquire, guard).as_ref() } {
            for cell in table.cells.iter() {
                acc = f(acc, cell.load());
            }
        }
        acc
    }

    /// Stores the identity into `base` and every cell. The table is kept.
    pub(crate) fn reset(&self) {
        let guard = &epoch::pin();
        self.base.store(self.identity, Ordering::Relaxed);
        // SAFETY: tables are only freed through `defer_destroy`, and we are pinned.
        if let Some(table) = unsafe { self.cells.load(Ordering::Acquire, guard).as_ref() } {
            for cell in table.cells.iter() {
                cell.reset(self.identity);
            }
        }
    }

    /// Swaps the identity into `base` and every cell, folding what was drained.
    ///
    /// Each cell is drained with a single atomic swap, so a value is counted by
    /// exactly one sweep.
    pub(crate) fn fold_then_reset<F>(&self, f: F) -> i64
    where
        F: Fn(i64, i64) -> i64,
    {
        let guard = &epoch::pin();
        let mut acc = self.base.swap(self.identity, Ordering::Relaxed);
        // SAFETY: tables are only freed through `defer_destroy`, and we are pinned.
        if let Some(table) = unsafe { self.cells.load(Ordering::Acquire, guard).as_ref() } {
            for cell in table.cells.iter() {
                acc = f(acc, cell.get_and_set(self.identity));
            }
        }
        acc
    }

    /// Calls `visit` with the index and value of every cell.
    pub(crate) fn for_each_cell(&self, mut visit: impl FnMut(usize, i64)) {
        let guard = &epoch::pin();
        // SAFETY: tables are only freed through `defer_destroy`, and we are pinned.
        if let Some(table) = unsafe { self.cells.load(Ordering::Acquire, guard).as_ref() } {
            for (i, cell) in table.cells.iter().enumerate() {
                visit(i, cell.load());
            }
        }
    }

    /// Current value of `base` alone.
    pub(crate) fn base(&self) -> i64 {
        self.base.load(Ordering::Relaxed)
    }

    #[inline]
    fn cas_base(&self, current: i64, new: i64) -> bool {
        self.base
            .compare_exchange(current, new, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    /// Pointer equality is enough: a retired table can't be reused while we're pinned.
    #[inline]
    fn is_current(&self, seen: Shared<'_, Table>, guard: &Guard) -> bool {
        self.cells.load(Ordering::Acquire, guard) == seen
    }

    #[inline]
    fn try_lock(&self) -> bool {
        !self.busy.load(Ordering::Relaxed)
            && self
                .busy
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
    }

    #[inline]
    fn unlock(&self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl Drop for StripedAdder {
    fn drop(&mut self) {
        // SAFETY: `&mut self` guarantees no other thread can reach the table.
        unsafe {
            let guard = epoch::unprotected();
            let table = self.cells.swap(Shared::null(), Ordering::Relaxed, guard);
            if !table.is_null() {
                drop(table.into_owned());
            }
        }
    }
}
