use super::ClientInner;
use std::sync::Weak;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;

/// Spawn the recurring flush timer. The task holds only a weak client
/// reference: it exits on cancellation, and also when the client itself
/// is gone. The first tick fires one full interval after start.
pub(crate) fn spawn(
    handle: &Handle,
    client: Weak<ClientInner>,
    period: Duration,
    shutdown: CancellationToken,
) {
    handle.spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(client) = client.upgrade() else { break };
                    client.request_flush();
                }
            }
        }
    });
}
