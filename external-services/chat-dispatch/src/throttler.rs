//! Paced delivery of reply batches.
//!
//! A single worker owns the outbound queue and keeps at least `interval`
//! between any two deliveries, across all chats. Callers enqueue a batch and
//! get a receipt; they never hold a database transaction while waiting.

use crate::error::{DispatchError, DispatchResult};
use crate::messenger::Messenger;
use config_engine::DispatchSettings;
use logger_redacted::PiiRedactor;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// Outcome of one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
    /// Messages dropped because the batch deadline passed before their turn
    pub expired: usize,
}

impl DeliveryReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.expired == 0
    }
}

/// Resolves once every message of a batch was delivered, failed or expired
pub struct DeliveryReceipt {
    report: oneshot::Receiver<DeliveryReport>,
}

impl DeliveryReceipt {
    pub async fn wait(self) -> DispatchResult<DeliveryReport> {
        self.report.await.map_err(|_| DispatchError::ReportLost)
    }
}

struct Batch {
    chat_id: i64,
    texts: Vec<String>,
    expires_at: Option<Instant>,
    report: oneshot::Sender<DeliveryReport>,
}

/// Handle to the dispatch worker. Cheap to clone.
#[derive(Clone)]
pub struct DispatchThrottler {
    queue: mpsc::Sender<Batch>,
    deadline: Option<Duration>,
}

impl DispatchThrottler {
    /// Start the worker on the current runtime
    pub fn spawn(messenger: Arc<dyn Messenger>, settings: &DispatchSettings) -> (Self, JoinHandle<()>) {
        let (queue, rx) = mpsc::channel(settings.queue_capacity.max(1));
        let worker = Worker {
            messenger,
            interval: settings.interval(),
            next_slot: None,
            redactor: PiiRedactor::default(),
        };
        let handle = tokio::spawn(worker.run(rx));

        info!(
            interval_ms = settings.interval_ms,
            capacity = settings.queue_capacity,
            "Dispatch throttler started"
        );
        (
            Self {
                queue,
                deadline: settings.delivery_timeout(),
            },
            handle,
        )
    }

    /// Enqueue `texts` for `chat_id`, waiting for queue space if it is full.
    ///
    /// The batch deadline starts counting now.
    pub async fn dispatch(&self, chat_id: i64, texts: Vec<String>) -> DispatchResult<DeliveryReceipt> {
        let (report, receipt) = oneshot::channel();
        let batch = Batch {
            chat_id,
            texts,
            expires_at: self.deadline.map(|d| Instant::now() + d),
            report,
        };
        self.queue
            .send(batch)
            .await
            .map_err(|_| DispatchError::QueueClosed)?;
        Ok(DeliveryReceipt { report: receipt })
    }
}

struct Worker {
    messenger: Arc<dyn Messenger>,
    interval: Duration,
    next_slot: Option<Instant>,
    redactor: PiiRedactor,
}

impl Worker {
    async fn run(mut self, mut rx: mpsc::Receiver<Batch>) {
        while let Some(batch) = rx.recv().await {
            let chat = self.redactor.chat_id(batch.chat_id);
            let report = self.deliver(&batch).await;
            if report.is_complete() {
                debug!(chat = %chat, delivered = report.delivered, "Batch delivered");
            } else {
                warn!(
                    chat = %chat,
                    delivered = report.delivered,
                    failed = report.failed,
                    expired = report.expired,
                    "Batch partially delivered"
                );
            }
            // The caller may have stopped waiting.
            let _ = batch.report.send(report);
        }
        debug!("Dispatch queue closed, worker exiting");
    }

    async fn deliver(&mut self, batch: &Batch) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for text in &batch.texts {
            let slot = self.next_slot.map_or_else(Instant::now, |slot| slot.max(Instant::now()));
            if batch.expires_at.is_some_and(|expires_at| slot >= expires_at) {
                report.expired += 1;
                continue;
            }

            sleep_until(slot).await;
            match self.messenger.send_text(batch.chat_id, text).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(error = %e, "Message delivery failed");
                    report.failed += 1;
                }
            }
            self.next_slot = Some(Instant::now() + self.interval);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(i64, String, Instant)>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_text(&self, chat_id: i64, text: &str) -> DispatchResult<()> {
            if self.fail_on.as_deref() == Some(text) {
                return Err(DispatchError::Rejected("blocked".to_string()));
            }
            self.sent.lock().push((chat_id, text.to_string(), Instant::now()));
            Ok(())
        }
    }

    fn settings(interval_ms: u64, deadline_secs: Option<u64>) -> DispatchSettings {
        DispatchSettings {
            interval_ms,
            delivery_timeout_secs: deadline_secs,
            queue_capacity: 8,
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_messages_spaced_by_interval() {
        let messenger = Arc::new(RecordingMessenger::default());
        let (throttler, _worker) = DispatchThrottler::spawn(messenger.clone(), &settings(2000, None));

        let report = throttler
            .dispatch(1, texts(&["a", "b", "c"]))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(report, DeliveryReport { delivered: 3, failed: 0, expired: 0 });

        let sent = messenger.sent.lock();
        let texts: Vec<&str> = sent.iter().map(|(_, t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        for pair in sent.windows(2) {
            assert!(pair[1].2 - pair[0].2 >= Duration::from_millis(2000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_spacing_holds_across_chats() {
        let messenger = Arc::new(RecordingMessenger::default());
        let (throttler, _worker) = DispatchThrottler::spawn(messenger.clone(), &settings(2000, None));

        let first = throttler.dispatch(1, texts(&["one"])).await.unwrap();
        let second = throttler.dispatch(2, texts(&["two"])).await.unwrap();
        first.wait().await.unwrap();
        second.wait().await.unwrap();

        let sent = messenger.sent.lock();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].0, 2);
        assert!(sent[1].2 - sent[0].2 >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_messages_past_deadline_expire() {
        let messenger = Arc::new(RecordingMessenger::default());
        let (throttler, _worker) = DispatchThrottler::spawn(messenger.clone(), &settings(2000, Some(3)));

        // Slots at t=0 and t=2 fit, t=4 and t=6 are past the 3 s deadline.
        let report = throttler
            .dispatch(1, texts(&["a", "b", "c", "d"]))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(report, DeliveryReport { delivered: 2, failed: 0, expired: 2 });
        assert_eq!(messenger.sent.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_message_does_not_stop_batch() {
        let messenger = Arc::new(RecordingMessenger {
            fail_on: Some("b".to_string()),
            ..Default::default()
        });
        let (throttler, _worker) = DispatchThrottler::spawn(messenger.clone(), &settings(100, None));

        let report = throttler
            .dispatch(1, texts(&["a", "b", "c"]))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(report, DeliveryReport { delivered: 2, failed: 1, expired: 0 });
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_dispatch_after_worker_stopped() {
        let messenger = Arc::new(RecordingMessenger::default());
        let (throttler, worker) = DispatchThrottler::spawn(messenger, &settings(10, None));
        worker.abort();
        let _ = worker.await;

        assert!(matches!(
            throttler.dispatch(1, texts(&["a"])).await,
            Err(DispatchError::QueueClosed)
        ));
    }
}
