use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancel `token` once `signal` resolves. The watcher stops early if the token is
/// cancelled some other way.
pub fn cancel_on<F>(token: CancellationToken, signal: F) -> JoinHandle<()>
where
    F: Future + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            _ = signal => {
                log::info!("interrupted, cancelling in-flight requests");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}
