//! Per-caller stripe selection.
//!
//! A [`Probe`] is the token every writer hands to an adder. It holds a 32-bit
//! hash that picks which cell the writer touches. The hash starts out as zero
//! and is randomized lazily, the first time the writer runs into contention.
//! After that it is only ever rehashed with [`xorshift`] when a CAS on the
//! chosen cell fails, so two writers fighting over one cell drift apart without
//! drawing on any shared source of randomness.
//!
//! Probes are owned by the caller. Give each thread (or task) its own:
//!
//! ```rust
//! use stripe_adder::counters::long_adder::LongAdder;
//! use stripe_adder::striped::probe::Probe;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let counter = Arc::new(LongAdder::new());
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let counter = Arc::clone(&counter);
//!         thread::spawn(move || {
//!             let mut probe = Probe::new();
//!             for _ in 0..1000 {
//!                 counter.increment(&mut probe);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(counter.sum(), 4000);
//! ```

use rand::Rng;

/// A caller-owned stripe selector.
///
/// A probe either has storage for its hash ([`Probe::new`],
/// [`Probe::with_seed`]) or not ([`Probe::detached`]). A detached probe reads as
/// zero on every call. That is still correct, the writer just loses the benefit
/// of remembering a good stripe between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    slot: Option<i32>,
}

impl Probe {
    /// Creates an uninitialized probe with storage.
    pub const fn new() -> Self {
        Probe { slot: Some(0) }
    }

    /// Creates a probe with no storage.
    ///
    /// Every [`get`](Self::get) returns 0, and nothing computed by
    /// [`init`](Self::init) or [`advance`](Self::advance) is remembered.
    pub const fn detached() -> Self {
        Probe { slot: None }
    }

    /// Creates a probe with storage holding `hash`.
    ///
    /// A zero `hash` behaves like [`Probe::new`].
    pub const fn with_seed(hash: i32) -> Self {
        Probe { slot: Some(hash) }
    }

    /// Returns `true` if this probe remembers its hash between calls.
    pub const fn is_attached(&self) -> bool {
        self.slot.is_some()
    }

    /// Returns the stored hash, or 0 if uninitialized or detached.
    #[inline]
    pub fn get(&self) -> i32 {
        self.slot.unwrap_or(0)
    }

    /// Draws a fresh nonzero 31-bit hash, stores it if possible and returns it.
    pub fn init(&mut self) -> i32 {
        let hash = rand::rng().random_range(1..=i32::MAX);
        self.store(hash);
        hash
    }

    /// Rehashes `probe` with [`xorshift`], stores it if possible and returns it.
    #[inline]
    pub fn advance(&mut self, probe: i32) -> i32 {
        let hash = xorshift(probe);
        self.store(hash);
        hash
    }

    #[inline]
    fn store(&mut self, hash: i32) {
        if let Some(slot) = self.slot.as_mut() {
            *slot = hash;
        }
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

/// One step of Marsaglia's 13/17/5 xorshift, applied to the bit pattern of
/// `probe`.
///
/// Shifts are logical. The map is a bijection on nonzero values, so a
/// nonzero probe never collapses to zero.
#[inline]
pub const fn xorshift(probe: i32) -> i32 {
    // Work on `u32` so `>> 17` shifts in zeros. On `i32` it would copy the
    // sign bit, which is not invertible and can map a nonzero value to 0.
    let mut x = probe as u32;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    x as i32
}

/// Maps `probe` to a slot of a power-of-two sized table.
#[inline]
pub(crate) const fn stripe_index(probe: i32, len: usize) -> usize {
    (probe as u32 as usize) & (len - 1)
}
