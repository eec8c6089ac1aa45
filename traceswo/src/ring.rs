//! Lock-free single-producer single-consumer byte pipe.
//!
//! The pipe is split once into a [`Producer`] and a [`Consumer`]. Each handle is the only writer
//! of its own index; the opposite side reads it as a snapshot. Indices are plain word-sized
//! atomics accessed with load/store only, so the pipe works on cores without compare-and-swap.
//!
//! One slot is always kept free to tell a full pipe from an empty one: a pipe of capacity `N`
//! holds at most `N - 1` bytes.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Returned by [`Producer::push`] when the pipe has no free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Full;

/// Contiguous run of unread bytes
///
/// A run never straddles the end of storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferAttempt {
    pub offset: usize,
    pub length: usize,
}

/// Byte storage with wrapping write and read indices
///
/// `N` must be a power of two and at least 2. Violations fail at compile time.
pub struct Pipe<const N: usize> {
    storage: UnsafeCell<[u8; N]>,
    write: AtomicUsize,
    read: AtomicUsize,
}

// Safety: cells are written only by the producer at the write index and read only by the
// consumer in [read, write). The index handshake orders these accesses.
unsafe impl<const N: usize> Sync for Pipe<N> {}

impl<const N: usize> Pipe<N> {
    const VALID_CAPACITY: () = core::assert!(
        N >= 2 && N.is_power_of_two(),
        "Pipe capacity must be a power of two"
    );

    const MASK: usize = N - 1;

    pub const CAPACITY: usize = N;

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CAPACITY;
        Self {
            storage: UnsafeCell::new([0; N]),
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
        }
    }

    /// Splits the pipe into its producer and consumer halves.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let pipe: &Self = self;
        (Producer { pipe }, Consumer { pipe })
    }

    /// Number of unread bytes.
    pub fn available(&self) -> usize {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        write.wrapping_sub(read) & Self::MASK
    }

    pub fn is_empty(&self) -> bool {
        self.write.load(Ordering::Acquire) == self.read.load(Ordering::Acquire)
    }

    pub fn is_full(&self) -> bool {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        (write + 1) & Self::MASK == read
    }

    fn cells(&self) -> *mut u8 {
        self.storage.get().cast()
    }
}

impl<const N: usize> Default for Pipe<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Writing half of a [`Pipe`]
///
/// Owns the write index. Intended for the receiver interrupt.
pub struct Producer<'a, const N: usize> {
    pipe: &'a Pipe<N>,
}

impl<'a, const N: usize> Producer<'a, N> {
    /// Returns `true` if pushing one more byte would overwrite unread data.
    pub fn is_full(&self) -> bool {
        let write = self.pipe.write.load(Ordering::Relaxed);
        let read = self.pipe.read.load(Ordering::Acquire);
        (write + 1) & Pipe::<N>::MASK == read
    }

    /// Number of unread bytes, as seen from the producer.
    pub fn available(&self) -> usize {
        self.pipe.available()
    }

    /// Stores a byte at the write index and publishes it.
    ///
    /// Leaves the pipe untouched if it is full.
    pub fn push(&mut self, byte: u8) -> Result<(), Full> {
        let write = self.pipe.write.load(Ordering::Relaxed);
        let next = (write + 1) & Pipe::<N>::MASK;
        // Acquire pairs with the consumer's release in advance_read: the slot is no longer read
        if next == self.pipe.read.load(Ordering::Acquire) {
            return Err(Full);
        }

        // Safety: the consumer never touches the cell at the write index
        unsafe { self.pipe.cells().add(write).write(byte) };
        self.pipe.write.store(next, Ordering::Release);
        Ok(())
    }
}

/// Reading half of a [`Pipe`]
///
/// Owns the read index.
pub struct Consumer<'a, const N: usize> {
    pipe: &'a Pipe<N>,
}

impl<'a, const N: usize> Consumer<'a, N> {
    /// Number of unread bytes, including bytes behind the wrap point.
    pub fn available(&self) -> usize {
        self.pipe.available()
    }

    pub fn is_empty(&self) -> bool {
        self.pipe.write.load(Ordering::Acquire) == self.pipe.read.load(Ordering::Relaxed)
    }

    /// Length of the unread run starting at the read index and ending at the write index or
    /// at the end of storage, whichever comes first.
    pub fn contiguous(&self) -> usize {
        let write = self.pipe.write.load(Ordering::Acquire);
        let read = self.pipe.read.load(Ordering::Relaxed);
        if write >= read { write - read } else { N - read }
    }

    /// Describes the next run to send, at most `max_length` bytes long.
    ///
    /// Returns `None` if the pipe is empty.
    pub fn next_attempt(&self, max_length: usize) -> Option<TransferAttempt> {
        let length = self.contiguous().min(max_length);
        if length == 0 {
            return None;
        }
        Some(TransferAttempt {
            offset: self.pipe.read.load(Ordering::Relaxed),
            length,
        })
    }

    /// Borrows the bytes described by `attempt`.
    ///
    /// The attempt must come from [`Consumer::next_attempt`] with no `advance_read` since.
    pub fn run(&self, attempt: TransferAttempt) -> &[u8] {
        assert!(attempt.offset == self.pipe.read.load(Ordering::Relaxed));
        assert!(attempt.length <= self.contiguous());
        // Safety: [read, read + length) lies before the write index and inside the storage, so
        // the producer does not write it until advance_read releases it
        unsafe { core::slice::from_raw_parts(self.pipe.cells().add(attempt.offset), attempt.length) }
    }

    /// Releases `n` bytes from the read index back to the producer.
    pub fn advance_read(&mut self, n: usize) {
        debug_assert!(n <= self.available());
        let read = self.pipe.read.load(Ordering::Relaxed);
        // Release pairs with the producer's acquire: reads of the run finish before reuse
        self.pipe
            .read
            .store(read.wrapping_add(n) & Pipe::<N>::MASK, Ordering::Release);
    }
}
