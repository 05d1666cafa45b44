use crate::service::ServiceReply;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

/// Waiters for planning service replies, keyed by request id
#[derive(Clone, Default)]
pub struct Pending {
    inner: Arc<DashMap<Uuid, oneshot::Sender<ServiceReply>>>,
}

impl Pending {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: Uuid) -> oneshot::Receiver<ServiceReply> {
        let (tx, rx) = oneshot::channel();
        self.inner.insert(id, tx);
        debug!(%id, "Registered pending request");
        rx
    }

    /// Returns false for unknown ids (late or duplicate replies)
    pub fn complete(&self, id: Uuid, reply: ServiceReply) -> bool {
        if let Some((_, tx)) = self.inner.remove(&id) {
            // the waiter may have given up already
            let _ = tx.send(reply);
            true
        } else {
            warn!(%id, "Reply for unknown request");
            false
        }
    }

    pub fn cancel(&self, id: &Uuid) -> bool {
        self.inner.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_wakes_waiter() {
        let pending = Pending::new();
        let id = Uuid::new_v4();
        let rx = pending.register(id);

        assert!(pending.complete(id, ServiceReply::Execute { success: true }));
        assert_eq!(rx.await.unwrap(), ServiceReply::Execute { success: true });
        assert!(pending.is_empty());
    }

    #[test]
    fn unknown_and_duplicate_replies_are_dropped() {
        let pending = Pending::new();
        let id = Uuid::new_v4();
        let _rx = pending.register(id);

        assert!(!pending.complete(Uuid::new_v4(), ServiceReply::Execute { success: true }));
        assert_eq!(pending.len(), 1);
        assert!(pending.complete(id, ServiceReply::Execute { success: false }));
        assert!(!pending.complete(id, ServiceReply::Execute { success: false }));
    }

    #[test]
    fn cancel_removes_waiter() {
        let pending = Pending::new();
        let id = Uuid::new_v4();
        let mut rx = pending.register(id);

        assert!(pending.cancel(&id));
        assert!(!pending.cancel(&id));
        assert!(rx.try_recv().is_err());
        assert!(!pending.complete(id, ServiceReply::Execute { success: true }));
    }
}
