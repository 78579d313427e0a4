//! Fixed-capacity byte ring shared by the sampling interrupt and the main loop.
//!
//! # Safety Contract
//!
//! - Only ONE context may call [`enqueue()`](SampleQueue::enqueue) (the "producer").
//! - Only ONE context may call [`dequeue()`](SampleQueue::dequeue) (the "consumer").
//! - [`clear()`](SampleQueue::clear) may only run while neither side is active,
//!   i.e. between sessions with the timer disarmed.
//!
//! The producer owns `tail`, the consumer owns `head`. The occupancy count is
//! the only field both sides write, and it is updated with a single atomic
//! read-modify-write, so neither side ever spins.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::constants::QSIZE;
use crate::control::ByteSink;
use crate::error::QueueOverflow;

/// Single-producer single-consumer byte queue holding exactly `N` bytes.
///
/// Unlike a Lamport queue no slot is sacrificed: fullness is tracked by an
/// explicit occupancy count, so all `N` bytes are usable.
pub struct SampleQueue<const N: usize = QSIZE> {
    buffer: UnsafeCell<[u8; N]>,
    /// Read position (only modified by the consumer).
    head: AtomicUsize,
    /// Write position (only modified by the producer).
    tail: AtomicUsize,
    /// Bytes currently stored, in `[0, N]`.
    count: AtomicUsize,
    /// Set when an enqueue found the queue full. Sticky until `clear()`.
    overflow: AtomicBool,
}

// SAFETY: The SPSC contract ensures each buffer slot is written only by the
// producer while it is free and read only by the consumer while it is
// occupied. Ownership of a slot changes hands through the Release/Acquire
// pair on `count`.
unsafe impl<const N: usize> Sync for SampleQueue<N> {}
unsafe impl<const N: usize> Send for SampleQueue<N> {}

impl<const N: usize> SampleQueue<N> {
    /// Create a new empty queue.
    ///
    /// # Panics
    ///
    /// Compile-time assertion: `N` must be at least 1.
    pub const fn new() -> Self {
        assert!(N >= 1, "sample queue must hold at least one byte");

        SampleQueue {
            buffer: UnsafeCell::new([0; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
            overflow: AtomicBool::new(false),
        }
    }

    /// Reset indices, occupancy and the overflow flag.
    pub fn clear(&self) {
        self.head.store(0, Ordering::Relaxed);
        self.tail.store(0, Ordering::Relaxed);
        self.overflow.store(false, Ordering::Relaxed);
        self.count.store(0, Ordering::Release);
    }

    /// Append a byte (producer side).
    ///
    /// Never blocks. If the queue is full the byte is dropped, the sticky
    /// overflow flag is set and `Err(QueueOverflow)` is returned.
    #[inline]
    pub fn enqueue(&self, byte: u8) -> Result<(), QueueOverflow> {
        if self.count.load(Ordering::Acquire) >= N {
            self.overflow.store(true, Ordering::Relaxed);
            return Err(QueueOverflow);
        }

        let tail = self.tail.load(Ordering::Relaxed);
        // SAFETY: We are the sole producer and `tail` is only advanced by us.
        // `count < N` guarantees the consumer is not reading this slot.
        unsafe {
            self.slot(tail).write(byte);
        }
        self.tail.store(Self::next(tail), Ordering::Relaxed);

        // Release publishes the slot write before the consumer can see it.
        self.count.fetch_add(1, Ordering::Release);
        Ok(())
    }

    /// Remove the oldest byte (consumer side).
    ///
    /// Returns `None` if the queue is empty.
    #[inline]
    pub fn dequeue(&self) -> Option<u8> {
        if self.count.load(Ordering::Acquire) == 0 {
            return None;
        }

        let head = self.head.load(Ordering::Relaxed);
        // SAFETY: We are the sole consumer and `head` is only advanced by us.
        // `count > 0` guarantees the producer has finished writing this slot.
        let byte = unsafe { self.slot(head).read() };
        self.head.store(Self::next(head), Ordering::Relaxed);

        // Release hands the slot back to the producer after the read.
        self.count.fetch_sub(1, Ordering::Release);
        Some(byte)
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.count.load(Ordering::Acquire) == 0
    }

    /// Check if the queue is full.
    pub fn is_full(&self) -> bool {
        self.count.load(Ordering::Acquire) >= N
    }

    /// Return the number of bytes currently in the queue.
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Total number of bytes the queue can hold.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Whether an enqueue has been dropped since the last `clear()`.
    pub fn is_overflowed(&self) -> bool {
        self.overflow.load(Ordering::Relaxed)
    }

    #[inline]
    fn next(index: usize) -> usize {
        if index + 1 == N {
            0
        } else {
            index + 1
        }
    }

    /// Pointer to one byte of the buffer. Never forms a reference to the
    /// whole array, so producer and consumer never alias.
    #[inline]
    fn slot(&self, index: usize) -> *mut u8 {
        debug_assert!(index < N);
        // SAFETY: `index < N` by construction of `head`/`tail`.
        unsafe { self.buffer.get().cast::<u8>().add(index) }
    }
}

impl<const N: usize> Default for SampleQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lets a small queue stage compressor output for the main loop.
/// Bytes that do not fit are dropped and flagged like any other overflow.
impl<const N: usize> ByteSink for SampleQueue<N> {
    fn emit(&mut self, byte: u8) {
        let _ = self.enqueue(byte);
    }
}
