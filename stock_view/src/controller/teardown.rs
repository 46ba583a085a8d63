use std::future::Future;

use tokio::sync::watch;

/// Signals that the hosting view is gone.
///
/// Dropping the handle without calling [`TeardownHandle::teardown`] leaves the
/// controller running.
#[derive(Debug)]
pub struct TeardownHandle {
    tx: watch::Sender<bool>,
}

impl TeardownHandle {
    pub(crate) fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, rx)
    }

    /// Mark the view as torn down. Outstanding reads are discarded on arrival.
    pub fn teardown(&self) {
        self.tx.send_replace(true);
    }
}

async fn torn_down(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|down| *down).await.is_err() {
        // Handle dropped without teardown: never fires.
        std::future::pending::<()>().await;
    }
}

/// Run `fut` unless teardown happens first. `None` means torn down.
pub(crate) async fn race_teardown<F: Future>(
    rx: &mut watch::Receiver<bool>,
    fut: F,
) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = torn_down(rx) => None,
        out = fut => Some(out),
    }
}
