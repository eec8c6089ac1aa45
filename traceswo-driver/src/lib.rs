//! traceswo driver interface
//!
//! The crate provides an interface between peripheral drivers and the traceswo capture bridge.
//! Limited scope facilitates compatibility across versions.
//! Driver crates should depend on this crate. Bridge users should depend on the `traceswo`
//! crate instead.
//!
//! Two peripherals take part in a capture session:
//! * `Receiver` is the serial receiver sampling the trace line (typically a UART fed by the
//!   target's SWO pin). The bridge drains its hardware FIFO from the receive interrupt.
//! * `Transport` is the host-facing packet endpoint (typically a USB bulk IN endpoint).
//!   The bridge offers it one contiguous run per call.
//!
//! Both traits are synchronous. A receiver is serviced from its own interrupt handler, so every
//! method should complete within a few register accesses. A transport must never wait for the
//! host: when the endpoint is busy it reports back-pressure by accepting fewer bytes than
//! offered, usually zero. The bridge keeps the bytes and offers them again on the next drain.
//!
//! The bridge does not validate line parameters. A receiver should clamp or reject unsupported
//! values itself and report the rate it actually applied through `LineControl::baud`.

#![no_std]

pub mod line;
pub mod receiver;
pub mod transport;
