//! # traceswo
//!
//! This library relays a continuous byte stream captured by an interrupt-driven serial receiver
//! (typically ARM SWO trace output in NRZ/UART mode) to a packet transport (typically a USB bulk
//! IN endpoint) in no_std environments. It requires no dynamic memory allocation: the buffer is
//! a user-provided const-generic [`Pipe`].
//!
//! ## Architecture
//!
//! ```text
//!  receiver IRQ                        tick / completion / Runner
//!       │                                        │
//!       ▼                                        ▼
//! ┌──────────┐   ┌─────────┐   ┌──────┐   ┌─────────┐   ┌───────────┐
//! │ Receiver ├──►│ Capture ├──►│ Pipe ├──►│  Drain  ├──►│ Transport │
//! └──────────┘   └────┬────┘   └──────┘   └─────────┘   └───────────┘
//!                     │     flush on idle/overflow            ▲
//!                     └───────────────────────────────────────┘
//! ```
//! Components:
//! * _Pipe_ is a fixed-capacity SPSC byte ring with one reserved slot. It is split into a
//!   producer and a consumer, each the only writer of its own index.
//! * _Capture_ runs in the receiver interrupt. It empties the receiver FIFO into the pipe and
//!   requests a flush when the receiver reports a receive timeout or when the pipe saturates.
//!   Bytes arriving into a saturated pipe are dropped.
//! * _Drain_ offers the first contiguous run of buffered bytes to the transport, bounded by the
//!   packet size and the end of storage, and consumes it only if the transport took all of it.
//! * _Bridge_ ties both halves together and exposes the entry points for interrupt handlers
//!   and the scheduler.
//! * _Runner_ is an optional task draining on request and on a periodic tick.
//!
//! ## Concurrency model
//!
//! The pipe itself is lock-free: indices are word-sized atomics used with load and store only,
//! so it works on cores without compare-and-swap (e.g., Cortex-M0).
//!
//! A drain may be triggered from the receiver interrupt (flush), the transport completion
//! callback and thread mode (tick, runner). The drain half therefore sits behind a blocking
//! mutex. With `CriticalSectionRawMutex` the critical section spans a single transport call.
//! The capture half has its own mutex, taken by the receiver interrupt and by line
//! reconfiguration.
//!
//! ## Delivery guarantees
//!
//! Delivery is best effort. Bytes are sent in arrival order and are never reported as sent
//! before the transport accepts them. Under sustained overload the newest bytes are lost;
//! [`Bridge::statistics`] counts overflow episodes.
//!
//! ## Example
//!
//! ```ignore
//! static PIPE: StaticCell<Pipe<256>> = StaticCell::new();
//! static BRIDGE: StaticCell<Bridge<CriticalSectionRawMutex, Uart, BulkIn, 256>> = StaticCell::new();
//!
//! let pipe = PIPE.init(Pipe::new());
//! let bridge = BRIDGE.init(Bridge::new(pipe, uart, bulk_in, Config::default()));
//! spawner.spawn(drain_task(bridge.runner()))?;
//!
//! // In the UART interrupt handler:
//! bridge.on_interrupt();
//! // In the endpoint completion callback:
//! bridge.request_drain();
//! ```
#![no_std]

pub use traceswo_driver as driver;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod bridge;
pub mod capture;
pub mod config;
pub mod drain;
pub mod ring;
mod runner;

pub use bridge::{Bridge, Statistics};
pub use config::Config;
pub use ring::Pipe;
pub use runner::Runner;
