//! Unbounded FIFO channel between request handlers and the writer worker.
//!
//! Enqueue is fire-and-forget: it never blocks the request path and never
//! fails observably to the caller. There is no maximum size; unbounded growth
//! during a sustained storage outage is accepted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::audit::record::AuditRecord;
use crate::audit::trace_link::TraceLinkage;

/// Queue message. `Shutdown` is the sentinel telling the consumer to release
/// its connection and exit.
#[derive(Debug)]
pub enum AuditMessage {
    Entry(AuditRecord, TraceLinkage),
    Shutdown,
}

/// Producer half, cloned into every request handler.
#[derive(Debug, Clone)]
pub struct AuditQueue {
    tx: mpsc::UnboundedSender<AuditMessage>,
    depth: Arc<AtomicUsize>,
}

/// Consumer half, owned by the single writer worker.
#[derive(Debug)]
pub struct AuditQueueReceiver {
    rx: mpsc::UnboundedReceiver<AuditMessage>,
    depth: Arc<AtomicUsize>,
}

/// Create a connected producer/consumer pair.
pub fn channel() -> (AuditQueue, AuditQueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = Arc::new(AtomicUsize::new(0));
    (
        AuditQueue {
            tx,
            depth: depth.clone(),
        },
        AuditQueueReceiver { rx, depth },
    )
}

impl AuditQueue {
    /// Hand a record to the writer. Errors (consumer gone) are swallowed:
    /// audit failures must never reach the request path.
    pub fn enqueue(&self, record: AuditRecord, linkage: TraceLinkage) {
        // Counted before the send; a consumer racing ahead of the producer
        // must never decrement first and wrap the gauge.
        self.depth.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(AuditMessage::Entry(record, linkage)).is_err() {
            self.depth.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Push the shutdown sentinel. Messages already queued drain first.
    pub fn shutdown(&self) {
        let _ = self.tx.send(AuditMessage::Shutdown);
    }

    /// Number of entries waiting for the writer.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }
}

impl AuditQueueReceiver {
    /// Block until a message is available. A closed channel behaves like the
    /// shutdown sentinel.
    pub async fn recv(&mut self) -> AuditMessage {
        match self.rx.recv().await {
            Some(AuditMessage::Entry(record, linkage)) => {
                self.depth.fetch_sub(1, Ordering::Relaxed);
                AuditMessage::Entry(record, linkage)
            }
            Some(AuditMessage::Shutdown) | None => AuditMessage::Shutdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> (AuditRecord, TraceLinkage) {
        (
            AuditRecord::new(path, "GET", 200, 1, None, None, None),
            TraceLinkage::capture(),
        )
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let (queue, mut rx) = channel();
        for path in ["/a", "/b", "/c"] {
            let (record, linkage) = entry(path);
            queue.enqueue(record, linkage);
        }

        for expected in ["/a", "/b", "/c"] {
            match rx.recv().await {
                AuditMessage::Entry(record, _) => assert_eq!(record.path, expected),
                AuditMessage::Shutdown => panic!("unexpected shutdown"),
            }
        }
    }

    #[tokio::test]
    async fn test_depth_tracks_entries() {
        let (queue, mut rx) = channel();
        assert_eq!(queue.depth(), 0);

        let (record, linkage) = entry("/time");
        queue.enqueue(record, linkage);
        let (record, linkage) = entry("/time");
        queue.enqueue(record, linkage);
        assert_eq!(queue.depth(), 2);

        rx.recv().await;
        assert_eq!(queue.depth(), 1);
        rx.recv().await;
        assert_eq!(queue.depth(), 0);
    }

    #[tokio::test]
    async fn test_sentinel_after_backlog() {
        let (queue, mut rx) = channel();
        let (record, linkage) = entry("/time");
        queue.enqueue(record, linkage);
        queue.shutdown();

        assert!(matches!(rx.recv().await, AuditMessage::Entry(_, _)));
        assert!(matches!(rx.recv().await, AuditMessage::Shutdown));
    }

    #[tokio::test]
    async fn test_closed_channel_behaves_like_shutdown() {
        let (queue, mut rx) = channel();
        drop(queue);
        assert!(matches!(rx.recv().await, AuditMessage::Shutdown));
    }

    #[tokio::test]
    async fn test_depth_stays_bounded_with_concurrent_consumer() {
        let (queue, mut rx) = channel();
        let consumer = tokio::spawn(async move {
            loop {
                if matches!(rx.recv().await, AuditMessage::Shutdown) {
                    return;
                }
            }
        });

        // However the producer and consumer interleave, the gauge can never
        // exceed the number of sends so far, and never wraps below zero.
        for sent in 1..=200usize {
            let (record, linkage) = entry("/time");
            queue.enqueue(record, linkage);
            assert!(queue.depth() <= sent, "gauge wrapped: {}", queue.depth());
            tokio::task::yield_now().await;
        }

        queue.shutdown();
        consumer.await.unwrap();
        assert_eq!(queue.depth(), 0);
    }

    #[tokio::test]
    async fn test_enqueue_after_consumer_gone_is_silent() {
        let (queue, rx) = channel();
        drop(rx);
        let (record, linkage) = entry("/time");
        queue.enqueue(record, linkage);
        assert_eq!(queue.depth(), 0);
    }
}
