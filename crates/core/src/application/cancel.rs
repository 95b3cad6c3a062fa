// Cancellation token for abandoning retries early

use tokio::sync::watch;

/// Cancellation signal observed between retry attempts
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the cancellation signal
    ///
    /// Never resolves if the sender is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            let cancelled = *self.rx.borrow_and_update();
            if cancelled {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Cancellation sender
pub struct CancelSender {
    tx: watch::Sender<bool>,
}

impl CancelSender {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a cancellation channel
pub fn cancel_channel() -> (CancelSender, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelSender { tx }, CancelToken { rx })
}
