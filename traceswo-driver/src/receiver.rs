//! Serial receiver feeding the capture handler

use crate::line::LineControl;

/// Interrupt-driven byte receiver
///
/// The capture handler runs in the receiver interrupt and calls the methods in this order:
/// `idle_asserted`, `clear_idle` (only when asserted), then `is_empty`/`read` until the
/// hardware queue is empty or the bridge buffer saturates.
///
/// The receiver interrupt should fire on both "data available" (e.g., a FIFO trigger level) and
/// "receive timeout" conditions. The timeout lets the bridge flush a trailing partial packet
/// instead of waiting for more data.
pub trait Receiver: LineControl {
    /// Returns `true` if the hardware receive queue holds no bytes.
    fn is_empty(&self) -> bool;

    /// Pops one byte from the hardware receive queue.
    ///
    /// Called only after `is_empty` returned `false`.
    fn read(&mut self) -> u8;

    /// Returns `true` if the receive timeout (line idle) condition is signaled.
    fn idle_asserted(&self) -> bool;

    /// Acknowledges the receive timeout condition.
    fn clear_idle(&mut self);
}
