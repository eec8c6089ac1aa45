//! Producer side: moves bytes from the receiver FIFO into the pipe.

use traceswo_driver::line::LineParameters;
use traceswo_driver::receiver::Receiver;

use crate::ring::Producer;

/// Result of servicing one receiver interrupt
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureOutcome {
    /// Bytes moved into the pipe
    pub captured: usize,
    /// The receiver signaled a receive timeout
    pub idle: bool,
    /// The pipe saturated. One byte was lost; the rest was left in the receiver FIFO.
    pub overflow: bool,
}

impl CaptureOutcome {
    /// A drain should follow: either the line went idle or the pipe is saturated.
    pub fn flush_needed(&self) -> bool {
        self.idle || self.overflow
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureStats {
    /// Bytes moved into the pipe
    pub captured: u32,
    /// Interrupts that found the pipe saturated
    pub overflows: u32,
    /// Receive timeouts observed
    pub idle_flushes: u32,
}

/// Capture handler
///
/// Owns the receiver and the pipe producer. [`Capture::on_interrupt`] should run in the
/// receiver interrupt; it never blocks and touches only the write index.
pub struct Capture<'a, R: Receiver, const N: usize> {
    producer: Producer<'a, N>,
    receiver: R,
    stats: CaptureStats,
}

impl<'a, R: Receiver, const N: usize> Capture<'a, R, N> {
    pub fn new(producer: Producer<'a, N>, receiver: R) -> Self {
        Self {
            producer,
            receiver,
            stats: Default::default(),
        }
    }

    /// Empties the receiver FIFO into the pipe.
    ///
    /// Stops at the first byte that does not fit. That byte is dropped, newer bytes stay in the
    /// receiver FIFO. The caller should drain if [`CaptureOutcome::flush_needed`] is set.
    pub fn on_interrupt(&mut self) -> CaptureOutcome {
        let mut outcome = CaptureOutcome {
            idle: self.receiver.idle_asserted(),
            ..Default::default()
        };
        if outcome.idle {
            self.receiver.clear_idle();
        }

        while !self.receiver.is_empty() {
            let byte = self.receiver.read();
            if self.producer.push(byte).is_err() {
                outcome.overflow = true;
                break;
            }
            outcome.captured += 1;
        }

        self.stats.captured = self.stats.captured.wrapping_add(outcome.captured as u32);
        if outcome.overflow {
            warn!("trace buffer full, byte dropped");
            self.stats.overflows = self.stats.overflows.wrapping_add(1);
        }
        if outcome.idle {
            debug!("trace line idle, {} pending", self.producer.available());
            self.stats.idle_flushes = self.stats.idle_flushes.wrapping_add(1);
        }
        outcome
    }

    pub fn set_line_parameters(&mut self, parameters: LineParameters) {
        debug!(
            "line set to {} baud, {} data bits",
            parameters.baud,
            parameters.data_bits
        );
        self.receiver.set_line_parameters(parameters);
    }

    pub fn baud(&self) -> u32 {
        self.receiver.baud()
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut R {
        &mut self.receiver
    }
}
