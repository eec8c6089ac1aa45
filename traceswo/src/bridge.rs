use core::cell::RefCell;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use traceswo_driver::line::LineParameters;
use traceswo_driver::receiver::Receiver;
use traceswo_driver::transport::Transport;

use crate::capture::{Capture, CaptureOutcome, CaptureStats};
use crate::config::Config;
use crate::drain::{Drain, DrainOutcome, DrainStats};
use crate::ring::Pipe;
use crate::runner::Runner;

/// Counter snapshot of both bridge halves
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Statistics {
    pub capture: CaptureStats,
    pub drain: DrainStats,
}

/// Capture bridge between a receiver and a transport.
///
/// The bridge is shared by reference between the receiver interrupt, the transport completion
/// callback, the periodic tick and the [`Runner`] task. The two halves are kept behind separate
/// blocking mutexes: capturing never waits for a transfer and a transfer never waits for
/// the receiver. The halves communicate through the lock-free [`Pipe`] only.
///
/// Mutex choice:
/// * `CriticalSectionRawMutex` allows calls from interrupts of any priority.
/// * `NoopRawMutex` restricts the bridge to a single execution context.
/// * `ThreadModeRawMutex` panics on [`Bridge::on_interrupt`] called from an interrupt.
pub struct Bridge<'a, M: RawMutex, R: Receiver, T: Transport, const N: usize> {
    capture: Mutex<M, RefCell<Capture<'a, R, N>>>,
    drain: Mutex<M, RefCell<Drain<'a, T, N>>>,
    drain_request: Signal<M, ()>,
    tick_period: Option<Duration>,
}

impl<'a, M: RawMutex, R: Receiver, T: Transport, const N: usize> Bridge<'a, M, R, T, N> {
    /// Creates the bridge over an unsplit pipe and applies the line configuration.
    pub fn new(pipe: &'a mut Pipe<N>, mut receiver: R, transport: T, config: Config) -> Self {
        let (producer, consumer) = pipe.split();
        receiver.set_line_parameters(config.line);
        info!(
            "trace capture: {} baud, {} byte buffer",
            receiver.baud(),
            Pipe::<N>::CAPACITY
        );

        Self {
            capture: Mutex::new(RefCell::new(Capture::new(producer, receiver))),
            drain: Mutex::new(RefCell::new(Drain::new(consumer, transport))),
            drain_request: Signal::new(),
            tick_period: config.tick_period,
        }
    }

    /// Receiver interrupt entry point.
    ///
    /// Moves received bytes into the pipe and drains once if the line went idle or the pipe
    /// saturated.
    pub fn on_interrupt(&self) -> CaptureOutcome {
        let outcome = self.capture.lock(|cell| cell.borrow_mut().on_interrupt());
        if outcome.flush_needed() {
            self.drain();
        }
        outcome
    }

    /// Offers the next contiguous run to the transport. A no-op if nothing is buffered.
    pub fn drain(&self) -> DrainOutcome {
        self.drain.lock(|cell| cell.borrow_mut().drain())
    }

    /// Periodic tick entry point.
    pub fn tick(&self) -> DrainOutcome {
        self.drain()
    }

    /// Transport completion entry point.
    ///
    /// Sends the next packet right away so consecutive packets go out back to back.
    pub fn on_transfer_complete(&self) -> DrainOutcome {
        self.drain()
    }

    /// Asks the [`Runner`] to drain. Safe to call from any context.
    ///
    /// Use instead of [`Bridge::on_transfer_complete`] to move the transport call out of the
    /// completion interrupt.
    pub fn request_drain(&self) {
        self.drain_request.signal(());
    }

    pub fn set_line_parameters(&self, parameters: LineParameters) {
        self.capture
            .lock(|cell| cell.borrow_mut().set_line_parameters(parameters));
    }

    /// Changes the trace rate. Data width is reset to 8 bits.
    pub fn set_baud(&self, baud: u32) {
        self.set_line_parameters(LineParameters::trace(baud));
    }

    /// Bit rate reported by the receiver.
    pub fn baud(&self) -> u32 {
        self.capture.lock(|cell| cell.borrow().baud())
    }

    /// Number of bytes waiting to be sent.
    pub fn available(&self) -> usize {
        self.drain.lock(|cell| cell.borrow().available())
    }

    pub fn statistics(&self) -> Statistics {
        // Sample both halves at once
        critical_section::with(|_| Statistics {
            capture: self.capture.lock(|cell| cell.borrow().stats()),
            drain: self.drain.lock(|cell| cell.borrow().stats()),
        })
    }

    /// Runs `f` with exclusive access to the receiver.
    pub fn with_receiver<U>(&self, f: impl FnOnce(&mut R) -> U) -> U {
        self.capture.lock(|cell| f(cell.borrow_mut().receiver_mut()))
    }

    /// Runs `f` with exclusive access to the transport.
    pub fn with_transport<U>(&self, f: impl FnOnce(&mut T) -> U) -> U {
        self.drain.lock(|cell| f(cell.borrow_mut().transport_mut()))
    }

    /// Creates the drain task. Run it unless every drain trigger calls the bridge directly.
    pub fn runner(&self) -> Runner<'_, 'a, M, R, T, N> {
        Runner::new(self)
    }

    pub(crate) fn drain_request(&self) -> &Signal<M, ()> {
        &self.drain_request
    }

    pub(crate) fn tick_period(&self) -> Option<Duration> {
        self.tick_period
    }
}
