//! Serial line parameters

/// Asynchronous serial line settings
///
/// Values are passed to the receiver as-is. Range checks are the receiver's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineParameters {
    /// Bit rate in baud
    pub baud: u32,
    /// Number of data bits per character
    pub data_bits: u8,
}

impl LineParameters {
    /// Data width of the SWO NRZ (UART) encoding
    pub const TRACE_DATA_BITS: u8 = 8;

    pub const fn new(baud: u32, data_bits: u8) -> Self {
        Self { baud, data_bits }
    }

    /// Trace line settings: the given rate, 8 data bits.
    pub const fn trace(baud: u32) -> Self {
        Self::new(baud, Self::TRACE_DATA_BITS)
    }
}

impl Default for LineParameters {
    fn default() -> Self {
        Self::trace(800_000)
    }
}

/// Line configuration access
pub trait LineControl {
    /// Applies new line settings.
    ///
    /// May be called while reception is running. Bytes in flight may get corrupted.
    fn set_line_parameters(&mut self, parameters: LineParameters);

    /// Returns the bit rate the hardware is currently configured for.
    ///
    /// The value may differ from the requested one due to clock divider rounding.
    fn baud(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_swo_rate() {
        let parameters = LineParameters::default();
        assert_eq!(parameters.baud, 800_000);
        assert_eq!(parameters.data_bits, 8);
    }

    #[test]
    fn test_trace_forces_eight_bits() {
        assert_eq!(
            LineParameters::trace(2_250_000),
            LineParameters::new(2_250_000, 8)
        );
    }
}
