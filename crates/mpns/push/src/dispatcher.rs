//! Notification queue and batch delivery.

use std::sync::Arc;
use std::time::Duration;

use mpns_core::{DeliveryOutcome, DeliveryResponse, NotificationMessage};

use crate::{DispatchError, DispatcherConfig, Transport, build_request, parse_status};

/// Outcome of one [`Dispatcher::dispatch_all`] pass, in queue order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DispatchReport {
    /// Number of messages attempted.
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of messages the push service accepted.
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of messages that ended up failed.
    pub fn failed(&self) -> usize {
        self.attempted() - self.delivered()
    }
}

/// Queues notifications and delivers them one at a time.
///
/// `failed` and `responses` accumulate across passes. Messages are tracked by
/// identity, so two equal messages enqueued separately are distinct entries.
pub struct Dispatcher<T> {
    transport: T,
    timeout: Duration,
    queued: Vec<Arc<NotificationMessage>>,
    failed: Vec<Arc<NotificationMessage>>,
    responses: Vec<Option<DeliveryResponse>>,
}

impl<T> Dispatcher<T> {
    /// Default connection timeout per delivery attempt.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(7);

    /// Create a dispatcher with the default timeout.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: Self::DEFAULT_TIMEOUT,
            queued: Vec::new(),
            failed: Vec::new(),
            responses: Vec::new(),
        }
    }

    /// Create a dispatcher from settings.
    pub fn from_config(transport: T, config: &DispatcherConfig) -> Self {
        Self::new(transport).with_timeout(config.connect_timeout())
    }

    /// Set the connection timeout per delivery attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Append a message. Nothing is validated until dispatch.
    pub fn enqueue(&mut self, message: NotificationMessage) {
        self.queued.push(Arc::new(message));
    }

    /// Remove the most recently enqueued message, if any.
    pub fn dequeue_last(&mut self) -> Option<NotificationMessage> {
        self.queued.pop().map(Arc::unwrap_or_clone)
    }

    /// Drop all queued messages, failures and responses.
    pub fn clear(&mut self) {
        self.queued.clear();
        self.failed.clear();
        self.responses.clear();
    }

    pub fn count_queued(&self) -> usize {
        self.queued.len()
    }

    pub fn count_failed(&self) -> usize {
        self.failed.len()
    }

    /// Destinations of failed messages, in the order they failed.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed.iter().map(|m| m.destination.as_str()).collect()
    }

    /// Destinations of queued messages that are not in the failed set.
    pub fn succeeded_ids(&self) -> Vec<&str> {
        self.succeeded_messages()
            .into_iter()
            .map(|m| m.destination.as_str())
            .collect()
    }

    /// Destinations of every queued message, regardless of outcome.
    pub fn queued_ids(&self) -> Vec<&str> {
        self.queued.iter().map(|m| m.destination.as_str()).collect()
    }

    /// Queued messages not in the failed set, in queue order.
    pub fn succeeded_messages(&self) -> Vec<&NotificationMessage> {
        self.queued
            .iter()
            .filter(|m| !self.failed.iter().any(|f| Arc::ptr_eq(f, m)))
            .map(|m| &**m)
            .collect()
    }

    /// Failed messages, in the order they failed.
    pub fn failed_messages(&self) -> Vec<&NotificationMessage> {
        self.failed.iter().map(|m| &**m).collect()
    }

    /// Recorded responses, one per delivery attempt. `None` marks a message
    /// that produced no payload.
    pub fn responses(&self) -> &[Option<DeliveryResponse>] {
        &self.responses
    }

    /// Queued message at `index`.
    pub fn message_at(&self, index: usize) -> Result<&NotificationMessage, DispatchError> {
        self.queued
            .get(index)
            .map(|m| &**m)
            .ok_or(DispatchError::IndexOutOfRange {
                what: "queue",
                index,
                len: self.queued.len(),
            })
    }

    /// Response recorded at `index`.
    pub fn response_at(&self, index: usize) -> Result<Option<&DeliveryResponse>, DispatchError> {
        self.responses
            .get(index)
            .map(Option::as_ref)
            .ok_or(DispatchError::IndexOutOfRange {
                what: "responses",
                index,
                len: self.responses.len(),
            })
    }
}

impl<T: Transport> Dispatcher<T> {
    /// Deliver every queued message in order.
    ///
    /// Never short-circuits: each message is attempted exactly once and every
    /// failure mode lands the message in the failed set.
    pub async fn dispatch_all(&mut self) -> DispatchReport {
        let queued = self.queued.clone();
        let mut report = DispatchReport {
            outcomes: Vec::with_capacity(queued.len()),
        };

        for message in queued {
            let (outcome, response) = self.deliver(&message).await;

            if !outcome.is_success() {
                self.failed.push(message);
            }
            self.responses.push(response);
            report.outcomes.push(outcome);
        }

        tracing::info!(
            attempted = report.attempted(),
            delivered = report.delivered(),
            failed = report.failed(),
            "dispatch pass complete"
        );

        report
    }

    async fn deliver(
        &self,
        message: &NotificationMessage,
    ) -> (DeliveryOutcome, Option<DeliveryResponse>) {
        let Some(payload) = message.render() else {
            tracing::warn!(
                destination = %message.destination,
                kind = %message.kind,
                "message has no payload"
            );
            return (DeliveryOutcome::RenderFailed, None);
        };

        let request = build_request(message, payload, self.timeout);
        tracing::debug!(
            destination = %message.destination,
            class = message.kind.class(),
            bytes = request.body.len(),
            "sending notification"
        );

        let (head, transport_failed) = match self.transport.post(&request).await {
            Ok(response) => (response.head, false),
            Err(e) => {
                tracing::warn!(
                    destination = %message.destination,
                    error = %e,
                    "transport failed"
                );
                (String::new(), true)
            }
        };

        let response = parse_status(&head);
        let outcome = if response.is_received() {
            DeliveryOutcome::Delivered
        } else if transport_failed {
            DeliveryOutcome::TransportFailed
        } else {
            tracing::warn!(
                destination = %message.destination,
                notification_status = %response.notification_status,
                subscription_status = %response.subscription_status,
                device_connection_status = %response.device_connection_status,
                "notification not received"
            );
            DeliveryOutcome::NotReceived
        };

        (outcome, Some(response))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use mpns_core::NotificationKind;

    use super::*;
    use crate::{DeliveryRequest, NOTIFICATION_CLASS, RawResponse};

    const RECEIVED: &str = "HTTP/1.1 200 OK\r\n\
                            X-NotificationStatus: Received\r\n\
                            X-SubscriptionStatus: Active\r\n\
                            X-DeviceConnectionStatus: Connected\r\n";
    const DROPPED: &str = "HTTP/1.1 404 Not Found\r\n\
                           X-NotificationStatus: Dropped\r\n\
                           X-SubscriptionStatus: Expired\r\n\
                           X-DeviceConnectionStatus: Disconnected\r\n";

    /// Replies with a fixed header block per destination; unknown destinations fail.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: HashMap<String, String>,
        requests: Mutex<Vec<DeliveryRequest>>,
    }

    impl ScriptedTransport {
        fn reply(mut self, url: &str, head: &str) -> Self {
            self.replies.insert(url.to_string(), head.to_string());
            self
        }

        fn sent(&self) -> Vec<DeliveryRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn post(&self, request: &DeliveryRequest) -> color_eyre::eyre::Result<RawResponse> {
            self.requests.lock().unwrap().push(request.clone());
            match self.replies.get(&request.url) {
                Some(head) => Ok(RawResponse {
                    head: head.clone(),
                    body: Vec::new(),
                }),
                None => Err(color_eyre::eyre::eyre!("connection refused")),
            }
        }
    }

    fn toast(dest: &str) -> NotificationMessage {
        NotificationMessage::toast(dest, "A", "B")
    }

    #[tokio::test]
    async fn test_dispatch_classifies_each_message() {
        let transport = ScriptedTransport::default()
            .reply("http://ok", RECEIVED)
            .reply("http://dropped", DROPPED);
        let mut dispatcher = Dispatcher::new(transport);

        dispatcher.enqueue(toast("http://ok"));
        dispatcher.enqueue(toast("http://dropped"));
        dispatcher.enqueue(toast("http://down"));
        dispatcher.enqueue(NotificationMessage::new("http://ok"));

        let report = dispatcher.dispatch_all().await;
        assert_eq!(
            report.outcomes,
            vec![
                DeliveryOutcome::Delivered,
                DeliveryOutcome::NotReceived,
                DeliveryOutcome::TransportFailed,
                DeliveryOutcome::RenderFailed,
            ]
        );
        assert_eq!(report.delivered(), 1);
        assert_eq!(report.failed(), 3);

        assert_eq!(dispatcher.count_failed(), 3);
        assert_eq!(
            dispatcher.failed_ids(),
            vec!["http://dropped", "http://down", "http://ok"]
        );
        assert_eq!(dispatcher.succeeded_ids(), vec!["http://ok"]);
        assert_eq!(dispatcher.queued_ids().len(), 4);

        // Unknown kind is never sent.
        assert_eq!(dispatcher.transport().sent().len(), 3);
    }

    #[tokio::test]
    async fn test_responses_align_with_queue() {
        let transport = ScriptedTransport::default()
            .reply("http://a", RECEIVED)
            .reply("http://b", DROPPED);
        let mut dispatcher = Dispatcher::new(transport);

        dispatcher.enqueue(toast("http://a"));
        dispatcher.enqueue(NotificationMessage::new("http://unknown"));
        dispatcher.enqueue(toast("http://b"));
        dispatcher.enqueue(toast("http://c"));
        dispatcher.dispatch_all().await;

        assert_eq!(dispatcher.responses().len(), dispatcher.count_queued());

        let a = dispatcher.response_at(0).unwrap().unwrap();
        assert!(a.is_received());
        assert_eq!(a.device_connection_status, "Connected");

        assert_eq!(dispatcher.response_at(1).unwrap(), None);

        let b = dispatcher.response_at(2).unwrap().unwrap();
        assert_eq!(b.notification_status, "Dropped");
        assert_eq!(b.subscription_status, "Expired");

        let c = dispatcher.response_at(3).unwrap().unwrap();
        assert!(c.is_empty());

        assert_eq!(dispatcher.message_at(2).unwrap().destination, "http://b");
    }

    #[tokio::test]
    async fn test_received_status_is_exact() {
        let transport = ScriptedTransport::default()
            .reply("http://lower", "X-NotificationStatus: received\r\n")
            .reply("http://mixed", "x-NOTIFICATIONSTATUS: Received\r\n");
        let mut dispatcher = Dispatcher::new(transport);

        dispatcher.enqueue(toast("http://lower"));
        dispatcher.enqueue(toast("http://mixed"));
        dispatcher.dispatch_all().await;

        assert_eq!(dispatcher.failed_ids(), vec!["http://lower"]);
        assert_eq!(dispatcher.succeeded_ids(), vec!["http://mixed"]);
    }

    #[tokio::test]
    async fn test_dispatch_twice_resends_and_accumulates() {
        let transport = ScriptedTransport::default().reply("http://ok", RECEIVED);
        let mut dispatcher = Dispatcher::new(transport);

        dispatcher.enqueue(toast("http://ok"));
        dispatcher.enqueue(toast("http://down"));

        dispatcher.dispatch_all().await;
        dispatcher.dispatch_all().await;

        assert_eq!(dispatcher.transport().sent().len(), 4);
        assert_eq!(dispatcher.responses().len(), 4);
        assert_eq!(dispatcher.failed_ids(), vec!["http://down", "http://down"]);
        assert_eq!(dispatcher.count_queued(), 2);
    }

    #[tokio::test]
    async fn test_request_carries_headers_and_timeout() {
        let transport = ScriptedTransport::default().reply("http://ok", RECEIVED);
        let mut dispatcher =
            Dispatcher::new(transport).with_timeout(Duration::from_secs(3));

        dispatcher.enqueue(
            NotificationMessage::new("http://ok")
                .with_kind(NotificationKind::TileDelayLong)
                .with_title("T")
                .with_correlation_id("id-1"),
        );
        dispatcher.dispatch_all().await;

        let sent = dispatcher.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header(NOTIFICATION_CLASS), Some("21"));
        assert_eq!(sent[0].header("X-MessageID"), Some("id-1"));
        assert_eq!(sent[0].connect_timeout, Duration::from_secs(3));
        assert!(String::from_utf8_lossy(&sent[0].body).contains("<wp:Title>T</wp:Title>"));
    }

    #[test]
    fn test_dequeue_last() {
        let mut dispatcher = Dispatcher::new(ScriptedTransport::default());
        assert!(dispatcher.dequeue_last().is_none());
        assert_eq!(dispatcher.count_queued(), 0);

        dispatcher.enqueue(toast("http://a"));
        dispatcher.enqueue(toast("http://b"));
        let last = dispatcher.dequeue_last().unwrap();
        assert_eq!(last.destination, "http://b");
        assert_eq!(dispatcher.queued_ids(), vec!["http://a"]);
    }

    #[test]
    fn test_accessors_out_of_range() {
        let mut dispatcher = Dispatcher::new(ScriptedTransport::default());
        dispatcher.enqueue(toast("http://a"));

        assert!(dispatcher.message_at(0).is_ok());
        assert_eq!(
            dispatcher.message_at(1).unwrap_err(),
            DispatchError::IndexOutOfRange {
                what: "queue",
                index: 1,
                len: 1,
            }
        );
        assert!(dispatcher.response_at(0).is_err());
    }

    #[tokio::test]
    async fn test_succeeded_messages_by_identity() {
        let transport = ScriptedTransport::default().reply("http://ok", RECEIVED);
        let mut dispatcher = Dispatcher::new(transport);

        dispatcher.enqueue(toast("http://ok"));
        dispatcher.enqueue(toast("http://down"));
        dispatcher.dispatch_all().await;

        // An equal message enqueued later has not failed yet.
        dispatcher.enqueue(toast("http://down"));

        let succeeded = dispatcher.succeeded_messages();
        assert_eq!(succeeded.len(), 2);
        assert_eq!(succeeded[0].destination, "http://ok");
        assert_eq!(succeeded[1].destination, "http://down");
        assert_eq!(dispatcher.failed_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_resets_state() {
        let mut dispatcher = Dispatcher::from_config(
            ScriptedTransport::default(),
            &DispatcherConfig::default(),
        );
        assert_eq!(dispatcher.timeout(), Duration::from_secs(7));

        dispatcher.enqueue(toast("http://down"));
        dispatcher.dispatch_all().await;
        dispatcher.clear();

        assert_eq!(dispatcher.count_queued(), 0);
        assert_eq!(dispatcher.count_failed(), 0);
        assert!(dispatcher.responses().is_empty());
    }
}
