use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Ticker;
use traceswo_driver::receiver::Receiver;
use traceswo_driver::transport::Transport;

use crate::bridge::Bridge;

/// Drain task.
///
/// Drains once per [`Bridge::request_drain`] and once per configured tick.
pub struct Runner<'b, 'a, M: RawMutex, R: Receiver, T: Transport, const N: usize> {
    bridge: &'b Bridge<'a, M, R, T, N>,
}

impl<'b, 'a, M: RawMutex, R: Receiver, T: Transport, const N: usize> Runner<'b, 'a, M, R, T, N> {
    pub(crate) fn new(bridge: &'b Bridge<'a, M, R, T, N>) -> Self {
        Self { bridge }
    }

    pub async fn run(&mut self) -> ! {
        let request = self.bridge.drain_request();
        match self.bridge.tick_period() {
            Some(period) => {
                let mut ticker = Ticker::every(period);
                loop {
                    select(request.wait(), ticker.next()).await;
                    self.bridge.drain();
                }
            }
            None => loop {
                request.wait().await;
                self.bridge.drain();
            },
        }
    }
}
