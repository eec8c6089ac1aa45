//! Host-facing packet endpoint

/// Maximum packet size of the transport endpoint
///
/// The bridge never offers more than one packet per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketSize {
    /// USB full-speed bulk endpoint
    FullSpeed,
    /// USB high-speed bulk endpoint
    HighSpeed,
}

impl From<PacketSize> for usize {
    fn from(value: PacketSize) -> Self {
        match value {
            PacketSize::FullSpeed => 64,
            PacketSize::HighSpeed => 512,
        }
    }
}

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IncorrectPacketSize;

impl TryFrom<usize> for PacketSize {
    type Error = IncorrectPacketSize;
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            64 => Ok(PacketSize::FullSpeed),
            512 => Ok(PacketSize::HighSpeed),
            _ => Err(IncorrectPacketSize),
        }
    }
}

/// Non-blocking packet writer
///
/// Packet size must be constant for the transport lifetime.
pub trait Transport {
    /// Maximum number of bytes `write_packet` may accept at once.
    fn packet_size(&self) -> PacketSize;

    /// Attempts to queue `data` for transmission.
    ///
    /// Returns the number of bytes accepted. Returns 0 if the endpoint is still busy with the
    /// previous packet. Must not block. The bridge treats anything other than `data.len()` as
    /// a rejection and offers the same bytes again later, so an implementation should either
    /// take the whole slice or nothing.
    fn write_packet(&mut self, data: &[u8]) -> usize;
}
