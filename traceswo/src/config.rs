use embassy_time::Duration;
use traceswo_driver::line::LineParameters;

/// Bridge config struct
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Line settings applied to the receiver when the bridge is created
    pub line: LineParameters,
    /// Drain cadence of the [`Runner`](crate::Runner). `None` disables periodic drains: the
    /// runner then only serves [`Bridge::request_drain`](crate::Bridge::request_drain).
    pub tick_period: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line: Default::default(),
            tick_period: Some(Duration::from_millis(10)),
        }
    }
}
