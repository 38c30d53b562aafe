use tokio::sync::mpsc;
use tracing::warn;

/// Fire-and-forget handle for user-visible status messages. The receiving
/// half is drained by a delivery service task owned by the binary.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<String>,
}

impl Notifier {
    pub fn channel(capacity: usize) -> (Notifier, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Notifier { tx }, rx)
    }

    pub fn notify(&self, text: impl Into<String>) {
        let text = text.into();
        if let Err(e) = self.tx.try_send(text) {
            warn!("Dropping notification, channel unavailable: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_delivers_in_order() {
        let (notifier, mut rx) = Notifier::channel(8);
        notifier.notify("first");
        notifier.notify(String::from("second"));
        assert_eq!(rx.recv().await.as_deref(), Some("first"));
        assert_eq!(rx.recv().await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn notify_never_blocks_when_full() {
        let (notifier, _rx) = Notifier::channel(1);
        notifier.notify("kept");
        notifier.notify("dropped");
    }
}
