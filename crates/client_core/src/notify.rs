use shared::domain::ToastMessage;
use tokio::sync::broadcast;
use tracing::debug;

pub trait Notifier: Send + Sync {
    fn publish(&self, toast: ToastMessage);
}

#[derive(Clone)]
pub struct ToastChannel {
    tx: broadcast::Sender<ToastMessage>,
}

impl ToastChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToastMessage> {
        self.tx.subscribe()
    }
}

impl Default for ToastChannel {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for ToastChannel {
    fn publish(&self, toast: ToastMessage) {
        if let Err(broadcast::error::SendError(toast)) = self.tx.send(toast) {
            debug!(kind = ?toast.kind, title = %toast.title, "toast dropped: no subscribers");
        }
    }
}
