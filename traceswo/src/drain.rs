//! Consumer side: moves buffered bytes to the transport one packet at a time.

use traceswo_driver::transport::Transport;

use crate::fmt::Bytes;
use crate::ring::Consumer;

/// Result of a single drain attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrainOutcome {
    /// Nothing to send. The transport was not called.
    Idle,
    /// The transport accepted the whole run of the given length.
    Sent(usize),
    /// The transport accepted less than offered. The read index was left unchanged and the
    /// same bytes are offered on the next attempt.
    BackPressure { offered: usize, accepted: usize },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrainStats {
    /// Bytes confirmed by the transport
    pub sent: u32,
    /// Packets confirmed by the transport
    pub packets: u32,
    /// Attempts rejected by the transport
    pub rejected: u32,
}

/// Drain engine
///
/// Every call offers the first contiguous run of unread bytes, bounded by the transport packet
/// size and by the end of storage. Content that wraps around the end of storage takes two calls.
/// The read index advances only if the transport took the whole run.
pub struct Drain<'a, T: Transport, const N: usize> {
    consumer: Consumer<'a, N>,
    transport: T,
    max_chunk: usize,
    stats: DrainStats,
}

impl<'a, T: Transport, const N: usize> Drain<'a, T, N> {
    pub fn new(consumer: Consumer<'a, N>, transport: T) -> Self {
        let max_chunk = usize::from(transport.packet_size());
        Self {
            consumer,
            transport,
            max_chunk,
            stats: Default::default(),
        }
    }

    /// Offers the next run to the transport. Never blocks.
    pub fn drain(&mut self) -> DrainOutcome {
        let Some(attempt) = self.consumer.next_attempt(self.max_chunk) else {
            return DrainOutcome::Idle;
        };

        let run = self.consumer.run(attempt);
        let accepted = self.transport.write_packet(run);
        if accepted != attempt.length {
            trace!(
                "transport took {} of {} bytes, retrying later",
                accepted,
                attempt.length
            );
            self.stats.rejected = self.stats.rejected.wrapping_add(1);
            return DrainOutcome::BackPressure {
                offered: attempt.length,
                accepted: accepted.min(attempt.length),
            };
        }

        trace!("sent {}: {:02x}", attempt.length, Bytes(run));
        self.consumer.advance_read(attempt.length);
        self.stats.sent = self.stats.sent.wrapping_add(attempt.length as u32);
        self.stats.packets = self.stats.packets.wrapping_add(1);
        DrainOutcome::Sent(attempt.length)
    }

    /// Upper bound of a single transfer, equal to the transport packet size.
    pub fn max_chunk(&self) -> usize {
        self.max_chunk
    }

    /// Number of bytes waiting to be sent.
    pub fn available(&self) -> usize {
        self.consumer.available()
    }

    pub fn stats(&self) -> DrainStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
