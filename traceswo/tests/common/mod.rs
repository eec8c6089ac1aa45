#![allow(dead_code)]

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Deque;
use std::collections::VecDeque;
use std::vec::Vec;
use traceswo::driver::line::{LineControl, LineParameters};
use traceswo::driver::receiver::Receiver;
use traceswo::driver::transport::{PacketSize, Transport};
use traceswo::{Bridge, Config, Pipe};

pub const FIFO_DEPTH: usize = 16;

/// UART with a hardware receive FIFO and a receive timeout flag
#[derive(Default)]
pub struct FakeUart {
    pub fifo: Deque<u8, FIFO_DEPTH>,
    pub timeout: bool,
    pub line: LineParameters,
    pub line_changes: usize,
}

impl FakeUart {
    /// Queues bytes as if received on the line. Returns how many fit into the FIFO.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        bytes
            .iter()
            .take_while(|&&byte| self.fifo.push_back(byte).is_ok())
            .count()
    }

    pub fn feed_and_idle(&mut self, bytes: &[u8]) -> usize {
        self.timeout = true;
        self.feed(bytes)
    }
}

impl LineControl for FakeUart {
    fn set_line_parameters(&mut self, parameters: LineParameters) {
        self.line = parameters;
        self.line_changes += 1;
    }

    fn baud(&self) -> u32 {
        self.line.baud
    }
}

impl Receiver for FakeUart {
    fn is_empty(&self) -> bool {
        self.fifo.is_empty()
    }

    fn read(&mut self) -> u8 {
        self.fifo.pop_front().unwrap()
    }

    fn idle_asserted(&self) -> bool {
        self.timeout
    }

    fn clear_idle(&mut self) {
        self.timeout = false;
    }
}

/// Bulk IN endpoint with a one-packet buffer
///
/// Rejects writes while a packet is in flight. `complete` emulates the host reading it.
#[derive(Default)]
pub struct FakeBulkIn {
    pub in_flight: Option<Vec<u8>>,
    pub delivered: Vec<Vec<u8>>,
    pub offered: Vec<usize>,
    /// Accept every write immediately
    pub always_ready: bool,
}

impl FakeBulkIn {
    pub fn always_ready() -> Self {
        Self {
            always_ready: true,
            ..Default::default()
        }
    }

    pub fn complete(&mut self) -> bool {
        match self.in_flight.take() {
            Some(packet) => {
                self.delivered.push(packet);
                true
            }
            None => false,
        }
    }

    pub fn stream(&self) -> Vec<u8> {
        self.delivered.iter().flatten().copied().collect()
    }
}

impl Transport for FakeBulkIn {
    fn packet_size(&self) -> PacketSize {
        PacketSize::FullSpeed
    }

    fn write_packet(&mut self, data: &[u8]) -> usize {
        assert!(data.len() <= 64);
        self.offered.push(data.len());
        if self.always_ready {
            self.delivered.push(data.to_vec());
            return data.len();
        }
        if self.in_flight.is_some() {
            return 0;
        }
        self.in_flight = Some(data.to_vec());
        data.len()
    }
}

pub type TestBridge<const N: usize> = Bridge<'static, CriticalSectionRawMutex, FakeUart, FakeBulkIn, N>;

pub fn make_bridge<const N: usize>(transport: FakeBulkIn, config: Config) -> &'static TestBridge<N> {
    let pipe = Box::leak(Box::new(Pipe::<N>::new()));
    Box::leak(Box::new(Bridge::new(pipe, FakeUart::default(), transport, config)))
}

/// Runs interrupts until the receiver FIFO is empty
pub fn receive<const N: usize>(bridge: &TestBridge<N>, bytes: &[u8], idle_at_end: bool) {
    let mut rest = bytes;
    while !rest.is_empty() {
        let fed = bridge.with_receiver(|uart| uart.feed(rest));
        rest = &rest[fed..];
        if rest.is_empty() && idle_at_end {
            bridge.with_receiver(|uart| uart.timeout = true);
        }
        bridge.on_interrupt();
    }
}
