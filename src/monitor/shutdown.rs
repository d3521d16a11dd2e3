use tokio::select;
use tokio_util::sync::CancellationToken;

/// Cancels `cancelation` once the process is asked to stop (Ctrl-C), or returns as soon as
/// somebody else cancels it.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => {}
    };
}
